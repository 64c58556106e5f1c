//! Signing of apply query strings.
//!
//! Providers that require signed requests verify a `sig` parameter: the base64 encoded RSA PKCS#1 v1.5
//! signature over the SHA-256 digest of the complete query string preceding it.
//! Signing must therefore always be the last step before the URL is emitted.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, trace};
use rsa::{
    pkcs1,
    pkcs8::{self, der::Decode, ObjectIdentifier, PrivateKeyInfo, SecretDocument},
    Pkcs1v15Sign, RsaPrivateKey,
};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// A private key loaded from a PKCS#8 document, tagged by its algorithm.
/// Only RSA keys can sign.
#[derive(Debug, Clone)]
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
    /// Any other PKCS#8 key algorithm
    Unsupported { algorithm: ObjectIdentifier },
}

impl PrivateKey {
    /// Load a PEM encoded PKCS#8 private key from a file
    pub fn load(path: impl AsRef<Path>) -> Result<PrivateKey, KeyLoadError> {
        let path = path.as_ref();
        let pem = fs::read_to_string(path).map_err(|source| KeyLoadError::Read {
            path: path.to_owned(),
            source,
        })?;
        let key = PrivateKey::from_pem(&pem)?;
        debug!("Loaded {} key from {}", key.algorithm(), path.display());
        Ok(key)
    }

    /// Decode a PEM encoded PKCS#8 private key.
    ///
    /// Text before the `BEGIN` line and after the `END` line is ignored, as in openssl exports that
    /// carry `Bag Attributes`.
    pub fn from_pem(pem: &str) -> Result<PrivateKey, KeyLoadError> {
        let (label, document) =
            SecretDocument::from_pem(pem_block(pem)).map_err(KeyLoadError::Decode)?;
        debug!("Decoded PEM block {}", label);
        let info = PrivateKeyInfo::from_der(document.as_bytes())
            .map_err(|e| KeyLoadError::Parse(e.into()))?;

        if info.algorithm.oid == pkcs1::ALGORITHM_OID {
            Ok(PrivateKey::Rsa(RsaPrivateKey::try_from(info)?))
        } else {
            Ok(PrivateKey::Unsupported {
                algorithm: info.algorithm.oid,
            })
        }
    }

    /// Dotted OID of the key algorithm
    pub fn algorithm(&self) -> ObjectIdentifier {
        match self {
            PrivateKey::Rsa(_) => pkcs1::ALGORITHM_OID,
            PrivateKey::Unsupported { algorithm } => *algorithm,
        }
    }
}

// Cut `s` down to its first PEM block. Input without one is returned as is, the decoder reports it
fn pem_block(s: &str) -> &str {
    let Some(start) = s.find(PEM_BEGIN) else {
        return s;
    };
    let block = &s[start..];
    let end = block
        .find(PEM_END)
        .and_then(|end| {
            let after_label = end + PEM_END.len();
            block[after_label..]
                .find(PEM_BOUNDARY)
                .map(|close| after_label + close + PEM_BOUNDARY.len())
        })
        .unwrap_or(block.len());
    trace!("Using PEM block at bytes {}..{}", start, start + end);
    &block[..end]
}

const PEM_BEGIN: &str = "-----BEGIN ";
const PEM_END: &str = "-----END ";
const PEM_BOUNDARY: &str = "-----";

/// Sign `payload` and return the base64 encoded signature.
///
/// The SHA-256 digest of the UTF-8 payload is signed using RSA PKCS#1 v1.5, which is deterministic:
/// the same key and payload always produce the same signature.
pub fn sign_payload(key: &PrivateKey, payload: &str) -> Result<String, SigningError> {
    let digest = Sha256::digest(payload.as_bytes());
    let signature = match key {
        PrivateKey::Rsa(rsa_key) => rsa_key.sign(Pkcs1v15Sign::new::<Sha256>(), &digest)?,
        PrivateKey::Unsupported { algorithm } => return Err(SigningError::NotRsa(*algorithm)),
    };
    Ok(STANDARD.encode(signature))
}

/// Append the signature as the final `sig` parameter
pub fn append_signature(mut query: String, signature: &str) -> String {
    query.push_str("&sig=");
    query.push_str(signature);
    query
}

/// Returned when a private key cannot be loaded
#[derive(Error, Debug)]
pub enum KeyLoadError {
    #[error("cannot read key file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("cannot decode PEM key: {0}")]
    Decode(pkcs8::der::Error),
    #[error("cannot parse PKCS#8 key: {0}")]
    Parse(#[from] pkcs8::Error),
}

/// Returned when a payload cannot be signed
#[derive(Error, Debug)]
pub enum SigningError {
    #[error("not an RSA key (algorithm {0})")]
    NotRsa(ObjectIdentifier),
    #[error("rsa sign failed: {0}")]
    Rsa(#[from] rsa::Error),
}
