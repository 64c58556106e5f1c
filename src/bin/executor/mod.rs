use domainconnect_apply::{
    apply::{build_apply_url, ApplyRequest, ApplyUrl},
    discovery::{compare_versions, Discovery, DiscoveryError, VersionMismatch},
    filler::Filler,
    placeholder::parse_kvs,
    signer::{KeyLoadError, PrivateKey, SigningError},
    template::{Template, TemplateError},
};
use log::{debug, info, warn};
use thiserror::Error;

use crate::cli::Cli;

/// An executor performs the complete set of steps needed to print an apply URL
pub struct Executor<'a> {
    discovery: &'a dyn Discovery,
    filler: &'a dyn Filler,
}

#[derive(Error, Debug)]
pub enum ExecutorError {
    #[error("{0}")]
    Template(TemplateError),
    #[error("{0}")]
    Discovery(DiscoveryError),
    #[error("{0}")]
    VersionMismatch(VersionMismatch),
    #[error("{0}")]
    KeyLoad(KeyLoadError),
    #[error("{0}")]
    Signing(SigningError),
}
impl From<TemplateError> for ExecutorError {
    fn from(t: TemplateError) -> Self {
        ExecutorError::Template(t)
    }
}
impl From<DiscoveryError> for ExecutorError {
    fn from(d: DiscoveryError) -> Self {
        ExecutorError::Discovery(d)
    }
}
impl From<VersionMismatch> for ExecutorError {
    fn from(v: VersionMismatch) -> Self {
        ExecutorError::VersionMismatch(v)
    }
}
impl From<KeyLoadError> for ExecutorError {
    fn from(k: KeyLoadError) -> Self {
        ExecutorError::KeyLoad(k)
    }
}
impl From<SigningError> for ExecutorError {
    fn from(s: SigningError) -> Self {
        ExecutorError::Signing(s)
    }
}

impl ExecutorError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            ExecutorError::VersionMismatch(_) => 2,
            _ => 1,
        }
    }
}

impl<'a> Executor<'a> {
    pub fn new(discovery: &'a dyn Discovery, filler: &'a dyn Filler) -> Executor<'a> {
        Self { discovery, filler }
    }

    pub async fn run(&self, cli: &Cli) -> Result<ApplyUrl, ExecutorError> {
        let template = Template::from_file(&cli.template)?;
        info!(
            "Using template {}/{} version {}",
            template.provider_id, template.service_id, template.version
        );

        // Load the key up front, a broken key must not cost a round trip
        let private_key = match &cli.private_key {
            Some(path) => Some(PrivateKey::load(path)?),
            None => None,
        };

        let settings = self.discovery.settings(&cli.domain).await?;
        info!("Sync UX of {} is at {}", cli.domain, settings.url_sync_ux);

        if cli.check_versions {
            let remote = self
                .discovery
                .provider_version(&settings, &template.provider_id, &template.service_id)
                .await?;
            match compare_versions(&template, &remote) {
                Ok(_) => {}
                Err(mismatch) if cli.strict_versions => return Err(mismatch.into()),
                Err(mismatch) => warn!("{}", mismatch),
            }
        } else {
            debug!("Skipping version check");
        }

        let kvs = parse_kvs(&cli.kvs);
        let params = cli.apply_params();
        let request = ApplyRequest {
            template: &template,
            settings: &settings,
            fqdn: &cli.domain,
            params: &params,
            kvs: &kvs,
            private_key: private_key.as_ref(),
            append_variables: cli.append_variables,
        };
        let apply = build_apply_url(&request, self.filler)?;
        debug!("Template variables: {:?}", apply.variables);
        Ok(apply)
    }
}
