//! Domain Connect service provider templates.
//!
//! A [`Template`] describes the DNS records a service wants applied to a domain.
//! Most string fields may contain `%placeholder%` references, see [`crate::placeholder`].

use std::{fmt::Display, fs, path::Path};

use log::debug;
use serde::Deserialize;

/// A service provider template as published in the Domain Connect templates repository.
///
/// Field names follow the published camelCase JSON, the PascalCase spellings are accepted as well.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Template {
    #[serde(rename = "providerId", alias = "ProviderID")]
    pub provider_id: String,
    #[serde(rename = "serviceId", alias = "ServiceID")]
    pub service_id: String,
    #[serde(rename = "providerName", alias = "ProviderName")]
    pub provider_name: String,
    #[serde(rename = "serviceName", alias = "ServiceName")]
    pub service_name: String,
    #[serde(rename = "logoUrl", alias = "Logo", alias = "logo")]
    pub logo: String,
    #[serde(alias = "Version")]
    pub version: u32,
    #[serde(alias = "Records")]
    pub records: Vec<Record>,
}

/// A single DNS record entry of a [`Template`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Record {
    #[serde(rename = "type", alias = "Type")]
    pub record_type: String,
    #[serde(alias = "Host")]
    pub host: String,
    #[serde(alias = "Name")]
    pub name: String,
    #[serde(rename = "pointsTo", alias = "PointsTo")]
    pub points_to: String,
    #[serde(alias = "Data")]
    pub data: String,
    #[serde(alias = "Service")]
    pub service: String,
    #[serde(alias = "Target")]
    pub target: String,
    #[serde(rename = "spfRules", alias = "SPFRules")]
    pub spf_rules: String,
    /// Empty if the record is not part of any group. Such a record is only included when no group filter is given
    #[serde(rename = "groupId", alias = "GroupID")]
    pub group_id: String,
}

impl Record {
    /// All fields that may carry placeholders, in a fixed order
    pub fn placeholder_fields(&self) -> [&str; 8] {
        [
            self.record_type.as_str(),
            self.host.as_str(),
            self.name.as_str(),
            self.points_to.as_str(),
            self.data.as_str(),
            self.service.as_str(),
            self.target.as_str(),
            self.spf_rules.as_str(),
        ]
    }

    /// Whether this record is selected by the given group filter. An empty filter selects every record
    pub fn in_group(&self, group_id: &str) -> bool {
        group_id.is_empty() || self.group_id == group_id
    }
}

impl Template {
    /// Read and decode a template from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Template, TemplateError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {}", path.display(), e))?;
        let template = Template::from_json(&raw)
            .map_err(|e| format!("cannot decode {}: {}", path.display(), e))?;
        debug!(
            "Loaded template {}/{} version {} with {} records",
            template.provider_id,
            template.service_id,
            template.version,
            template.records.len()
        );
        Ok(template)
    }

    pub fn from_json(raw: &str) -> Result<Template, TemplateError> {
        serde_json::from_str(raw).map_err(|e| e.to_string().into())
    }
}

/// Returned when a template cannot be read or decoded
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateError {
    msg: String,
}
impl Display for TemplateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg.as_str())
    }
}
impl std::error::Error for TemplateError {}
impl From<String> for TemplateError {
    fn from(s: String) -> Self {
        TemplateError { msg: s }
    }
}
