// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::OnceLock;

use crate::constants::{API_VERSION, CLOUDINARY_URL_ENV, DEFAULT_UPLOAD_PREFIX};
use crate::error::{CloudinaryError, Result};
use crate::signing::{AuthToken, SignatureAlgorithm};

static ENV_VAR_PATTERN: OnceLock<Regex> = OnceLock::new();

fn env_var_pattern() -> &'static Regex {
    ENV_VAR_PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .expect("Invalid env var regex - this is a compile-time bug")
    })
}

fn default_force_version() -> bool {
    true
}

/// Account and delivery settings
///
/// Every [`crate::Url`] holds its own copy, so per-URL overrides never leak
/// back into the shared configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    pub cloud_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_secret: Option<String>,

    /// Host used for `https` delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_distribution: Option<String>,
    /// Host used for `http` delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_prefix: Option<String>,

    pub secure: bool,
    pub private_cdn: bool,
    pub cdn_subdomain: bool,
    pub secure_cdn_subdomain: bool,
    pub shorten: bool,
    pub sign_url: bool,
    pub use_root_path: bool,
    /// Add `v1` to sources in folders that carry no explicit version (default: true)
    #[serde(default = "default_force_version")]
    pub force_version: bool,
    pub client_hints: bool,
    /// 32 character SHA-256 URL signatures
    pub long_url_signature: bool,
    pub signature_algorithm: SignatureAlgorithm,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<AuthToken>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            cloud_name: None,
            api_key: None,
            api_secret: None,
            secure_distribution: None,
            cname: None,
            upload_prefix: None,
            secure: false,
            private_cdn: false,
            cdn_subdomain: false,
            secure_cdn_subdomain: false,
            shorten: false,
            sign_url: false,
            use_root_path: false,
            force_version: default_force_version(),
            client_hints: false,
            long_url_signature: false,
            signature_algorithm: SignatureAlgorithm::default(),
            auth_token: None,
        }
    }
}

impl Configuration {
    pub fn new(cloud_name: impl Into<String>) -> Self {
        Self {
            cloud_name: Some(cloud_name.into()),
            ..Default::default()
        }
    }

    /// Parse a `cloudinary://<key>:<secret>@<cloud>[/<distribution>][?k=v&...]` string
    pub fn from_url(url: &str) -> Result<Self> {
        let rest = url.strip_prefix("cloudinary://").ok_or_else(|| {
            CloudinaryError::config(format!(
                "Invalid {}: scheme must be cloudinary://",
                CLOUDINARY_URL_ENV
            ))
        })?;

        let (location, query) = match rest.split_once('?') {
            Some((location, query)) => (location, Some(query)),
            None => (rest, None),
        };

        let mut config = Configuration::default();

        let host_and_path = match location.rsplit_once('@') {
            Some((userinfo, host)) => {
                let (key, secret) = match userinfo.split_once(':') {
                    Some((key, secret)) => (key, Some(secret)),
                    None => (userinfo, None),
                };
                config.api_key = non_empty(decode(key)?);
                config.api_secret = secret.map(decode).transpose()?.and_then(non_empty);
                host
            }
            None => location,
        };

        let (cloud, distribution) = match host_and_path.split_once('/') {
            Some((cloud, path)) => (cloud, non_empty(path.trim_matches('/').to_string())),
            None => (host_and_path, None),
        };
        if cloud.is_empty() {
            return Err(CloudinaryError::config(format!(
                "Invalid {}: missing cloud name",
                CLOUDINARY_URL_ENV
            )));
        }
        config.cloud_name = Some(decode(cloud)?);
        if let Some(distribution) = distribution {
            config.secure_distribution = Some(distribution);
            config.private_cdn = true;
        }

        for pair in query.into_iter().flat_map(|q| q.split('&')) {
            if pair.is_empty() {
                continue;
            }
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            config.set(key, &decode(value)?)?;
        }

        Ok(config)
    }

    /// Read the connection string from `CLOUDINARY_URL`
    pub fn from_env() -> Result<Self> {
        let url = std::env::var(CLOUDINARY_URL_ENV).map_err(|_| {
            CloudinaryError::config(format!(
                "Environment variable '{}' is not set",
                CLOUDINARY_URL_ENV
            ))
        })?;
        Self::from_url(&url)
    }

    pub fn from_yaml_with_env(yaml: &str) -> Result<Self> {
        let re = env_var_pattern();

        // Every referenced variable must exist before substituting any
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            std::env::var(var_name).map_err(|_| {
                CloudinaryError::config(format!(
                    "Environment variable '{}' is referenced but not set",
                    var_name
                ))
            })?;
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        serde_yaml::from_str(&substituted).map_err(|e| CloudinaryError::config(e.to_string()))
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .map_err(|e| CloudinaryError::config(format!("Failed to read config file: {}", e)))?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cloud_name.as_deref().map(str::is_empty).unwrap_or(true) {
            return Err(CloudinaryError::MissingCloudName);
        }
        if let Some(token) = &self.auth_token {
            if hex::decode(&token.key).is_err() {
                return Err(CloudinaryError::config(
                    "auth_token.key must be hex encoded",
                ));
            }
        }
        Ok(())
    }

    /// Set a single option by its connection string name
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let flag = || parse_bool(key, value);
        match key {
            "cloud_name" => self.cloud_name = non_empty(value.to_string()),
            "api_key" => self.api_key = non_empty(value.to_string()),
            "api_secret" => self.api_secret = non_empty(value.to_string()),
            "secure_distribution" => self.secure_distribution = non_empty(value.to_string()),
            "cname" => self.cname = non_empty(value.to_string()),
            "upload_prefix" => self.upload_prefix = non_empty(value.to_string()),
            "secure" => self.secure = flag()?,
            "private_cdn" => self.private_cdn = flag()?,
            "cdn_subdomain" => self.cdn_subdomain = flag()?,
            "secure_cdn_subdomain" => self.secure_cdn_subdomain = flag()?,
            "shorten" => self.shorten = flag()?,
            "sign_url" => self.sign_url = flag()?,
            "use_root_path" => self.use_root_path = flag()?,
            "force_version" => self.force_version = flag()?,
            "client_hints" => self.client_hints = flag()?,
            "long_url_signature" => self.long_url_signature = flag()?,
            "signature_algorithm" => self.signature_algorithm = value.parse()?,
            _ => tracing::warn!(key = %key, "Ignoring unknown configuration option"),
        }
        Ok(())
    }

    /// `<upload_prefix>/v1_1/<cloud>/<resource_type>/<action>`
    pub fn api_url(&self, action: &str, resource_type: &str) -> Result<String> {
        let cloud = self
            .cloud_name
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(CloudinaryError::MissingCloudName)?;
        let prefix = self
            .upload_prefix
            .as_deref()
            .unwrap_or(DEFAULT_UPLOAD_PREFIX)
            .trim_end_matches('/');

        let mut parts = vec![prefix, API_VERSION, cloud];
        if !resource_type.is_empty() {
            parts.push(resource_type);
        }
        parts.push(action);
        Ok(parts.join("/"))
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn decode(value: &str) -> Result<String> {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .map_err(|e| CloudinaryError::config(format!("Invalid escape in '{}': {}", value, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" | "" => Ok(false),
        _ => Err(CloudinaryError::config(format!(
            "Option '{}' expects a boolean, got '{}'",
            key, value
        ))),
    }
}
