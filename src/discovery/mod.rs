//! Discovery of a domain's Domain Connect endpoints.
//!
//! A DNS provider supporting Domain Connect publishes a single TXT record at `_domainconnect.<domain>`
//! pointing to its API host. That host serves the [`Settings`] for the domain, which in turn name the URLs
//! used for template version checks and the synchronous apply flow.
//!
//! [`HttpDiscovery`] performs these lookups over DNS and HTTPS. Everything else only depends on the
//! [`Discovery`] trait.

use std::{fmt::Display, time::Duration};

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use log::{debug, info, trace};
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::template::Template;

/// Prefix of the TXT record announcing the Domain Connect API host
pub const DISCOVERY_PREFIX: &str = "_domainconnect";

const HTTP_TIMEOUT_SECS: u64 = 2;

/// Domain Connect settings published by the DNS provider of a domain
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the synchronous (interactive) apply flow
    #[serde(rename = "urlSyncUX", alias = "URLSyncUX")]
    pub url_sync_ux: String,
    /// Base URL of the provider's template API
    #[serde(rename = "urlAPI", alias = "URLAPI")]
    pub url_api: String,
    #[serde(rename = "providerId")]
    pub provider_id: Option<String>,
    #[serde(rename = "providerName")]
    pub provider_name: Option<String>,
    #[serde(rename = "providerDisplayName")]
    pub provider_display_name: Option<String>,
}

/// Template version as currently known by the DNS provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderVersion {
    #[serde(alias = "Version")]
    pub version: u32,
}

/// Lookup of the DNS provider side of a Domain Connect flow
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Retrieve the Domain Connect settings for `fqdn`
    async fn settings(&self, fqdn: &str) -> Result<Settings, DiscoveryError>;

    /// Retrieve the provider's version of the template identified by `provider_id` and `service_id`
    async fn provider_version(
        &self,
        settings: &Settings,
        provider_id: &str,
        service_id: &str,
    ) -> Result<ProviderVersion, DiscoveryError>;
}

/// Discovers settings through the system DNS resolver and a HTTPS client.
///
/// HTTP requests time out after two seconds, nothing is retried.
pub struct HttpDiscovery {
    resolver: TokioResolver,
    client: Client,
}

impl HttpDiscovery {
    pub fn try_new() -> Result<HttpDiscovery, DiscoveryError> {
        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| format!("cannot load system DNS configuration: {}", e))?
            .build();
        let client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| format!("cannot create HTTP client: {}", e))?;
        Ok(HttpDiscovery { resolver, client })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, DiscoveryError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| format!("request to {} failed: {}", url, e))?;
        let body = response
            .text()
            .await
            .map_err(|e| format!("cannot read response from {}: {}", url, e))?;
        trace!("Response from {}: {}", url, body);
        serde_json::from_str(&body)
            .map_err(|e| format!("cannot decode response from {}: {}", url, e).into())
    }
}

#[async_trait]
impl Discovery for HttpDiscovery {
    async fn settings(&self, fqdn: &str) -> Result<Settings, DiscoveryError> {
        let name = discovery_name(fqdn);
        let lookup = self
            .resolver
            .txt_lookup(name.as_str())
            .await
            .map_err(|e| format!("lookup of {} failed: {}", name, e))?;
        let records = lookup
            .iter()
            .map(|txt| {
                txt.iter()
                    .map(|data| String::from_utf8_lossy(data).to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>();
        let api_host = select_api_host(fqdn, records)?;
        info!("Domain Connect API host for {}: {}", fqdn, api_host);

        let settings: Settings = self.get_json(&settings_url(&api_host, fqdn)).await?;
        debug!(
            "Settings for {} from provider {}: {:?}",
            fqdn,
            settings
                .provider_display_name
                .as_deref()
                .or(settings.provider_name.as_deref())
                .unwrap_or("<unnamed>"),
            settings
        );
        Ok(settings)
    }

    async fn provider_version(
        &self,
        settings: &Settings,
        provider_id: &str,
        service_id: &str,
    ) -> Result<ProviderVersion, DiscoveryError> {
        self.get_json(&version_url(settings, provider_id, service_id)).await
    }
}

/// Name of the TXT record announcing the API host of `fqdn`
pub fn discovery_name(fqdn: &str) -> String {
    format!("{}.{}", DISCOVERY_PREFIX, fqdn)
}

/// Pick the API host from the discovery TXT records. Exactly one record is required
pub fn select_api_host(fqdn: &str, mut records: Vec<String>) -> Result<String, DiscoveryError> {
    match records.len() {
        1 => Ok(records.remove(0)),
        n => Err(format!("unexpected number of txt records for {}: {}", fqdn, n).into()),
    }
}

pub fn settings_url(api_host: &str, fqdn: &str) -> String {
    format!("https://{}/v2/{}/settings", api_host, fqdn)
}

pub fn version_url(settings: &Settings, provider_id: &str, service_id: &str) -> String {
    format!(
        "{}/v2/domainTemplates/providers/{}/services/{}",
        settings.url_api, provider_id, service_id
    )
}

/// Check the local template against the provider's version of it
pub fn compare_versions(template: &Template, remote: &ProviderVersion) -> Result<(), VersionMismatch> {
    if template.version != remote.version {
        return Err(VersionMismatch {
            remote: remote.version,
            local: template.version,
        });
    }
    debug!("Template version {} is current", template.version);
    Ok(())
}

/// Returned when settings or version documents cannot be discovered
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiscoveryError {
    msg: String,
}
impl Display for DiscoveryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg.as_str())
    }
}
impl std::error::Error for DiscoveryError {}
impl From<String> for DiscoveryError {
    fn from(s: String) -> Self {
        DiscoveryError { msg: s }
    }
}

/// The provider knows a different version of the template than the local file
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[error("version check: {remote} != {local}")]
pub struct VersionMismatch {
    pub remote: u32,
    pub local: u32,
}
