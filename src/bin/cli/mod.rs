use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use domainconnect_apply::query::ApplyParams;
use log::LevelFilter;

macro_rules! env_prefix {
    () => {
        "DOMAINCONNECT_APPLY_"
    };
}

/// Show how a Domain Connect template is used in an 'apply' request.
///
/// See also https://github.com/Domain-Connect/spec/blob/master/Domain%20Connect%20Spec%20Draft.adoc
#[derive(Debug, Clone, PartialEq, Eq, Hash, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Domain Connect template file (JSON)
    #[arg(value_name = "TEMPLATE")]
    pub template: PathBuf,

    /// Domain the template is applied to
    #[arg(value_name = "DOMAIN")]
    pub domain: String,

    /// host query parameter
    #[arg(long, env = concat!(env_prefix!(), "HOST"))]
    pub host: Option<String>,

    /// redirect_uri query parameter
    #[arg(long, value_name = "URL", env = concat!(env_prefix!(), "REDIRECT_URL"))]
    pub redirect_url: Option<String>,

    /// state query parameter. A random value is used if not set
    #[arg(long, env = concat!(env_prefix!(), "STATE"))]
    pub state: Option<String>,

    /// Template variables, for example: '%key1%val1%key2%val2%'.
    /// Variables without a value get a random one
    #[arg(long, default_value = "", env = concat!(env_prefix!(), "KVS"))]
    pub kvs: String,

    /// providerName query parameter
    #[arg(long, value_name = "NAME", env = concat!(env_prefix!(), "PROVIDER_NAME"))]
    pub provider_name: Option<String>,

    /// serviceName query parameter
    #[arg(long, value_name = "NAME", env = concat!(env_prefix!(), "SERVICE_NAME"))]
    pub service_name: Option<String>,

    /// groupId query parameter. Only records of this group are cross-referenced
    #[arg(long, value_name = "ID", env = concat!(env_prefix!(), "GROUP_ID"))]
    pub group_id: Option<String>,

    /// key query parameter
    #[arg(long, env = concat!(env_prefix!(), "KEY"))]
    pub key: Option<String>,

    /// Path to a PEM encoded PKCS#8 RSA private key. Adds the 'sig' query parameter
    #[arg(long, value_name = "PATH", env = concat!(env_prefix!(), "PRIVATE_KEY"))]
    pub private_key: Option<PathBuf>,

    /// Compare the template version with the one known by the DNS provider
    #[arg(
        long,
        action = ArgAction::Set,
        default_value_t = true,
        value_name = "BOOL",
        env = concat!(env_prefix!(), "CHECK_VERSIONS")
    )]
    pub check_versions: bool,

    /// Abort if the template version differs from the DNS provider's
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "STRICT_VERSIONS"))]
    pub strict_versions: bool,

    /// Append the resolved template variables to the query
    #[arg(long, action, default_value_t = false, env = concat!(env_prefix!(), "APPEND_VARIABLES"))]
    pub append_variables: bool,

    /// Set the loglevel of the application
    #[arg(
        value_enum,
        short = 'l',
        long,
        default_value_t = Loglevel::Info,
        value_name = "LEVEL",
        env = concat!(env_prefix!(), "LOGLEVEL")
    )]
    pub loglevel: Loglevel,
}

impl Cli {
    /// Query parameters as given on the command line
    pub fn apply_params(&self) -> ApplyParams {
        ApplyParams {
            host: self.host.to_owned(),
            redirect_url: self.redirect_url.to_owned(),
            state: self.state.to_owned(),
            provider_name: self.provider_name.to_owned(),
            service_name: self.service_name.to_owned(),
            group_id: self.group_id.to_owned(),
            key: self.key.to_owned(),
        }
    }
}

/// Used to set the applications loglevel
// This is essentially a re-creation of log:Level. However, that enum doesn't derive ValueEnum, so we have to do it manually here
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, ValueEnum)]
pub enum Loglevel {
    /// Disable logging
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}
impl From<Loglevel> for LevelFilter {
    fn from(ll: Loglevel) -> Self {
        match ll {
            Loglevel::Off => LevelFilter::Off,
            Loglevel::Error => LevelFilter::Error,
            Loglevel::Warn => LevelFilter::Warn,
            Loglevel::Info => LevelFilter::Info,
            Loglevel::Debug => LevelFilter::Debug,
            Loglevel::Trace => LevelFilter::Trace,
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn should_have_valid_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn should_parse_defaults() {
        let cli =
            Cli::try_parse_from(["domainconnect-apply", "./template.json", "example.com"]).unwrap();
        assert_eq!(cli.template, PathBuf::from("./template.json"));
        assert_eq!(cli.domain, "example.com");
        assert_eq!(cli.kvs, "");
        assert!(cli.check_versions);
        assert!(!cli.strict_versions);
        assert!(!cli.append_variables);
        assert_eq!(cli.private_key, None);
        assert_eq!(cli.loglevel, Loglevel::Info);
        assert_eq!(cli.apply_params(), ApplyParams::default());
    }

    #[test]
    fn should_parse_query_parameters() {
        let cli = Cli::try_parse_from([
            "domainconnect-apply",
            "--host",
            "www",
            "--redirect-url",
            "https://service.example/done",
            "--state",
            "st",
            "--kvs",
            "%ip%192.0.2.1%",
            "--provider-name",
            "Provider",
            "--service-name",
            "Service",
            "--group-id",
            "g1",
            "--key",
            "_dck1",
            "--private-key",
            "./key.pem",
            "--check-versions",
            "false",
            "-l",
            "trace",
            "./template.json",
            "example.com",
        ])
        .unwrap();
        assert_eq!(cli.kvs, "%ip%192.0.2.1%");
        assert_eq!(cli.private_key, Some(PathBuf::from("./key.pem")));
        assert!(!cli.check_versions);
        assert_eq!(LevelFilter::from(cli.loglevel), LevelFilter::Trace);
        let params = cli.apply_params();
        assert_eq!(params.host.as_deref(), Some("www"));
        assert_eq!(
            params.redirect_url.as_deref(),
            Some("https://service.example/done")
        );
        assert_eq!(params.group_id.as_deref(), Some("g1"));
        assert_eq!(params.key.as_deref(), Some("_dck1"));
    }

    #[test]
    fn should_silence_logging() {
        let cli = Cli::try_parse_from([
            "domainconnect-apply",
            "--loglevel",
            "off",
            "./template.json",
            "example.com",
        ])
        .unwrap();
        assert_eq!(cli.loglevel, Loglevel::Off);
        assert_eq!(LevelFilter::from(cli.loglevel), LevelFilter::Off);
    }

    #[test]
    fn should_require_template_and_domain() {
        assert!(Cli::try_parse_from(["domainconnect-apply", "./template.json"]).is_err());
    }
}
