//! Request and URL signing
//!
//! Two signatures share one digest primitive ([`Signer`]):
//!
//! - URL signatures: `base64url(digest(path + secret))`, truncated to 8
//!   (or 32) characters and embedded as `s--<sig>--`.
//! - API request signatures: `hex(digest(sorted "k=v" joined by "&" + secret))`,
//!   full length, used by upload and admin requests.
//!
//! Token based authorization ([`AuthToken`]) uses HMAC-SHA256 instead.

pub mod auth_token;

use std::collections::BTreeMap;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha1::Sha1;
use sha2::{Digest, Sha256};

pub use auth_token::{AkamaiToken, AuthToken};

use crate::config::Configuration;
use crate::error::{CloudinaryError, Result};
use crate::transformation::ParamValue;

type HmacSha256 = Hmac<Sha256>;

/// Digest used for URL and API request signatures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignatureAlgorithm {
    #[default]
    Sha1,
    Sha256,
}

impl std::str::FromStr for SignatureAlgorithm {
    type Err = CloudinaryError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "sha1" | "sha-1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" | "sha-256" => Ok(SignatureAlgorithm::Sha256),
            _ => Err(CloudinaryError::invalid_param(
                "signature_algorithm",
                format!("unknown algorithm: {}", s),
            )),
        }
    }
}

/// Message digest with a fixed algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signer {
    algorithm: SignatureAlgorithm,
}

impl Signer {
    pub fn new(algorithm: SignatureAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    /// Unkeyed digest of `message`
    pub fn digest(&self, message: &[u8]) -> Vec<u8> {
        match self.algorithm {
            SignatureAlgorithm::Sha1 => Sha1::digest(message).to_vec(),
            SignatureAlgorithm::Sha256 => Sha256::digest(message).to_vec(),
        }
    }

    /// Keyed HMAC-SHA256 of `message`
    pub fn hmac_sha256(key: &[u8], message: &[u8]) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(key).expect("HMAC can take key of any size");
        mac.update(message);
        mac.finalize().into_bytes().to_vec()
    }
}

/// Compute the `s--<signature>--` path component for a delivery URL
///
/// `to_sign` is `transformation/source` with slashes already merged.
pub fn sign_url_path(
    to_sign: &str,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
    length: usize,
) -> String {
    let mut message = String::with_capacity(to_sign.len() + api_secret.len());
    message.push_str(to_sign);
    message.push_str(api_secret);

    let digest = Signer::new(algorithm).digest(message.as_bytes());
    let encoded = URL_SAFE_NO_PAD.encode(digest);
    let truncated: String = encoded.chars().take(length).collect();

    tracing::debug!(signed = %to_sign, ?algorithm, "Signed delivery URL");
    format!("s--{}--", truncated)
}

/// The `k=v&k=v` string that API signatures are computed over
///
/// Keys are sorted and lists joined with `,`. Values that are blank after
/// joining are left out.
pub fn string_to_sign(params: &BTreeMap<String, ParamValue>) -> Result<String> {
    let mut pairs = Vec::with_capacity(params.len());
    for (key, value) in params {
        let rendered = value.try_render_joined(",")?;
        if !rendered.trim().is_empty() {
            pairs.push(format!("{}={}", key, rendered));
        }
    }
    Ok(pairs.join("&"))
}

/// Hex signature for upload / admin API parameters
pub fn api_sign_request(
    params: &BTreeMap<String, ParamValue>,
    api_secret: &str,
    algorithm: SignatureAlgorithm,
) -> Result<String> {
    let payload = format!("{}{}", string_to_sign(params)?, api_secret);
    Ok(hex::encode(Signer::new(algorithm).digest(payload.as_bytes())))
}

/// Add `timestamp`, `signature` and `api_key` to request parameters
///
/// A caller supplied `timestamp` is kept; otherwise the current Unix time
/// is used.
pub fn sign_request(
    mut params: BTreeMap<String, ParamValue>,
    config: &Configuration,
) -> Result<BTreeMap<String, ParamValue>> {
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or(CloudinaryError::MissingApiKey)?;
    let api_secret = config
        .api_secret
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or(CloudinaryError::MissingApiSecret)?;

    params
        .entry("timestamp".to_string())
        .or_insert_with(|| ParamValue::Int(chrono::Utc::now().timestamp()));
    params.remove("signature");
    params.remove("api_key");

    let signature = api_sign_request(&params, api_secret, config.signature_algorithm)?;
    params.insert("signature".to_string(), ParamValue::Str(signature));
    params.insert("api_key".to_string(), ParamValue::Str(api_key.to_string()));

    Ok(params)
}
