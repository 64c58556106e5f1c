//! Assembly of the apply query string.
//!
//! The parameter order is fixed: a signature covers the exact string, so reordering invalidates it.
//! Values are inserted verbatim, no URL escaping is performed.

use std::collections::HashMap;

use itertools::Itertools;
use log::debug;

use crate::{
    discovery::Settings,
    filler::{Filler, FILLER_LEN},
    template::Template,
};

/// Optional query parameters of an apply request. Empty values are treated like absent ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ApplyParams {
    pub host: Option<String>,
    /// Emitted as `redirect_uri`
    pub redirect_url: Option<String>,
    /// A random value is generated if none is set
    pub state: Option<String>,
    pub provider_name: Option<String>,
    pub service_name: Option<String>,
    /// Emitted as `groupId`. Also restricts which template records are cross-referenced
    pub group_id: Option<String>,
    pub key: Option<String>,
}

impl ApplyParams {
    /// The group filter for cross-referencing, empty if no group is selected
    pub fn group_filter(&self) -> &str {
        non_empty(&self.group_id).unwrap_or_default()
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

fn push_param(query: &mut String, name: &str, value: &str) {
    query.push('&');
    query.push_str(name);
    query.push('=');
    query.push_str(value);
}

/// Build the unsigned query string for `fqdn`.
///
/// Parameters appear in the order `domain, host, redirect_uri, state, providerName, serviceName, groupId, key`.
pub fn assemble_query(fqdn: &str, params: &ApplyParams, filler: &dyn Filler) -> String {
    let mut query = format!("domain={}", fqdn);

    if let Some(host) = non_empty(&params.host) {
        push_param(&mut query, "host", host);
    }
    if let Some(redirect) = non_empty(&params.redirect_url) {
        push_param(&mut query, "redirect_uri", redirect);
    }
    match non_empty(&params.state) {
        Some(state) => push_param(&mut query, "state", state),
        None => push_param(&mut query, "state", &filler.fill(FILLER_LEN)),
    }
    if let Some(provider_name) = non_empty(&params.provider_name) {
        push_param(&mut query, "providerName", provider_name);
    }
    if let Some(service_name) = non_empty(&params.service_name) {
        push_param(&mut query, "serviceName", service_name);
    }
    if let Some(group_id) = non_empty(&params.group_id) {
        push_param(&mut query, "groupId", group_id);
    }
    if let Some(key) = non_empty(&params.key) {
        push_param(&mut query, "key", key);
    }

    debug!("Assembled query {}", query);
    query
}

/// Append resolved template variables as `&name=value`, sorted by name
pub fn append_variables(mut query: String, variables: &HashMap<String, String>) -> String {
    for (name, value) in variables.iter().sorted() {
        push_param(&mut query, name, value);
    }
    query
}

/// Full apply URL for the synchronous flow of the domain's DNS provider
pub fn apply_url(settings: &Settings, template: &Template, query: &str) -> String {
    format!(
        "{}/v2/domainTemplates/providers/{}/services/{}/apply?{}",
        settings.url_sync_ux, template.provider_id, template.service_id, query
    )
}
