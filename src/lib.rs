//! Main crate for the `domainconnect-apply` application.
//!
//! Shows how a Domain Connect template is used in a synchronous `.../apply?` request:
//! template variables are cross-referenced against supplied values, the query string is assembled in its
//! canonical order and, if a private key is given, signed.
//!
//! For more information, choose one of the modules below.
//! The following modules might be of interest if you want to extend the tool:
//! - [`placeholder`] implements the `%variable%` syntax used in templates and on the command line
//! - [`resolver`] cross-references template variables with supplied or generated values
//! - [`query`] assembles the apply query string and URL
//! - [`signer`] produces the `sig` parameter
//! - [`discovery`] looks up a domain's Domain Connect settings

#![allow(clippy::uninlined_format_args)]

pub mod apply;
pub mod discovery;
pub mod filler;
pub mod placeholder;
pub mod query;
pub mod resolver;
pub mod signer;
pub mod template;
