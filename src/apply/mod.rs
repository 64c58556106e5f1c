//! The apply URL pipeline: resolve, assemble, sign.
//!
//! All inputs are already loaded, so the only failure left is signing. If it fails no URL is produced.

use std::collections::HashMap;

use log::{debug, info};

use crate::{
    discovery::Settings,
    filler::Filler,
    query::{append_variables, apply_url, assemble_query, ApplyParams},
    resolver::cross_reference,
    signer::{append_signature, sign_payload, PrivateKey, SigningError},
    template::Template,
};

/// Everything needed to build the apply URL for a single domain
#[derive(Debug, Clone)]
pub struct ApplyRequest<'a> {
    pub template: &'a Template,
    pub settings: &'a Settings,
    pub fqdn: &'a str,
    pub params: &'a ApplyParams,
    /// Values supplied for template variables
    pub kvs: &'a HashMap<String, String>,
    /// Sign the query with this key
    pub private_key: Option<&'a PrivateKey>,
    /// Append the resolved template variables to the query
    pub append_variables: bool,
}

/// A finished apply URL along with the values used for the template variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyUrl {
    pub url: String,
    pub variables: HashMap<String, String>,
    pub signed: bool,
}

/// Build the apply URL for `request`.
pub fn build_apply_url(
    request: &ApplyRequest,
    filler: &dyn Filler,
) -> Result<ApplyUrl, SigningError> {
    let variables = cross_reference(
        request.template,
        request.kvs,
        request.params.group_filter(),
        filler,
    );
    debug!("Resolved {} template variables", variables.len());

    let mut query = assemble_query(request.fqdn, request.params, filler);
    if request.append_variables {
        query = append_variables(query, &variables);
    }

    // sig covers everything before it, so this has to stay last
    let signed = match request.private_key {
        Some(key) => {
            let signature = sign_payload(key, &query)?;
            query = append_signature(query, &signature);
            info!("Signed apply query for {}", request.fqdn);
            true
        }
        None => false,
    };

    Ok(ApplyUrl {
        url: apply_url(request.settings, request.template, &query),
        variables,
        signed,
    })
}
