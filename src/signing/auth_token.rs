//! Token based authorization for delivery URLs
//!
//! Produces `__cld_token__=ip=..~st=..~exp=..~acl=..~hmac=..`, sent as a
//! cookie or appended as a query parameter. The HMAC-SHA256 key is given
//! hex encoded.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::Signer;
use crate::constants::DEFAULT_TOKEN_NAME;
use crate::error::{CloudinaryError, Result};

static UNSAFE_CHARS: OnceLock<Regex> = OnceLock::new();

fn unsafe_chars() -> &'static Regex {
    UNSAFE_CHARS.get_or_init(|| {
        Regex::new(r##"[ "#%&'/:;<=>?@\[\\\]^`{|}~]"##)
            .expect("Invalid token escape regex - this is a compile-time bug")
    })
}

/// Percent-escape URL-unsafe characters with lowercase hex digits
fn escape_to_lower(value: &str) -> String {
    unsafe_chars()
        .replace_all(value, |caps: &regex::Captures| {
            caps[0]
                .bytes()
                .map(|b| format!("%{:02x}", b))
                .collect::<String>()
        })
        .into_owned()
}

fn default_token_name() -> String {
    DEFAULT_TOKEN_NAME.to_string()
}

/// Authorization token settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthToken {
    /// Hex encoded HMAC key
    pub key: String,
    #[serde(default = "default_token_name")]
    pub token_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
    /// Unix seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<i64>,
    /// Unix seconds; takes precedence over `duration`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,
    /// Seconds from `start_time` (or now)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<String>,
}

impl AuthToken {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            token_name: default_token_name(),
            ip: None,
            start_time: None,
            expiration: None,
            duration: None,
            acl: None,
        }
    }

    pub fn token_name(mut self, name: impl Into<String>) -> Self {
        self.token_name = name.into();
        self
    }

    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    pub fn start_time(mut self, start_time: i64) -> Self {
        self.start_time = Some(start_time);
        self
    }

    pub fn expiration(mut self, expiration: i64) -> Self {
        self.expiration = Some(expiration);
        self
    }

    pub fn duration(mut self, duration: i64) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn acl(mut self, acl: impl Into<String>) -> Self {
        self.acl = Some(acl.into());
        self
    }

    fn resolve_expiration(&self) -> Result<i64> {
        if let Some(expiration) = self.expiration {
            return Ok(expiration);
        }
        match self.duration {
            Some(duration) if duration > 0 => {
                let start = self
                    .start_time
                    .unwrap_or_else(|| chrono::Utc::now().timestamp());
                Ok(start + duration)
            }
            _ => Err(CloudinaryError::invalid_param(
                "auth_token",
                "Must provide either expiration or duration",
            )),
        }
    }

    /// Generate the token; `url` is signed only when no ACL is set
    pub fn generate(&self, url: Option<&str>) -> Result<String> {
        let expiration = self.resolve_expiration()?;

        let mut parts: Vec<String> = Vec::new();
        if let Some(ip) = &self.ip {
            parts.push(format!("ip={}", ip));
        }
        if let Some(start) = self.start_time {
            parts.push(format!("st={}", start));
        }
        parts.push(format!("exp={}", expiration));
        if let Some(acl) = &self.acl {
            parts.push(format!("acl={}", escape_to_lower(acl)));
        }

        let mut to_sign = parts.clone();
        if let (Some(url), None) = (url, &self.acl) {
            to_sign.push(format!("url={}", escape_to_lower(url)));
        }

        let key = hex::decode(&self.key)
            .map_err(|e| CloudinaryError::invalid_param("auth_token", format!("key: {}", e)))?;
        let digest = hex::encode(Signer::hmac_sha256(&key, to_sign.join("~").as_bytes()));
        parts.push(format!("hmac={}", digest));

        Ok(format!("{}={}", self.token_name, parts.join("~")))
    }
}

/// Akamai-style token: always ACL based, never bound to a single URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AkamaiToken(AuthToken);

impl AkamaiToken {
    pub fn new(token: AuthToken) -> Self {
        Self(token)
    }

    pub fn generate(&self) -> Result<String> {
        if self.0.acl.as_deref().map(str::is_empty).unwrap_or(true) {
            return Err(CloudinaryError::invalid_param(
                "auth_token",
                "Must provide acl",
            ));
        }
        self.0.generate(None)
    }
}
