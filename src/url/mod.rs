//! Delivery URL assembly
//!
//! ```text
//! <prefix>/<resource_type>/<type>/<signature>/<transformation>/<version>/<source>.<format>
//! ```
//!
//! Every segment except the prefix is optional. Empty segments are skipped
//! and runs of `/` are collapsed without touching a `scheme://`.

pub mod encoding;
pub mod tag;

use regex::Regex;
use std::sync::OnceLock;

use crate::config::Configuration;
use crate::constants::{
    DEFAULT_DELIVERY_TYPE, DEFAULT_RESOURCE_TYPE, LONG_URL_SIGNATURE_LENGTH,
    OLD_AKAMAI_SHARED_CDN, SHARED_CDN, SHORT_URL_SIGNATURE_LENGTH,
};
use crate::error::{CloudinaryError, Result};
use crate::signing::{sign_url_path, AuthToken, SignatureAlgorithm};
use crate::transformation::{RenderOptions, RenderedMeta, Transformation};
use encoding::{
    is_absolute_url, merge_double_slash, merge_slashes, shard, smart_escape,
    strip_leading_slashes, unescape,
};

static VERSIONED_SOURCE: OnceLock<Regex> = OnceLock::new();

fn versioned_source() -> &'static Regex {
    VERSIONED_SOURCE.get_or_init(|| {
        Regex::new(r"^v\d+").expect("Invalid version regex - this is a compile-time bug")
    })
}

/// A generated URL plus the values tag rendering needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedUrl {
    pub url: String,
    pub meta: RenderedMeta,
}

/// Delivery URL builder
///
/// Holds its own copy of the [`Configuration`]; setters such as
/// [`Url::secure`] override the copy only.
#[derive(Debug, Clone)]
pub struct Url {
    config: Configuration,
    resource_type: String,
    delivery_type: String,
    public_id: Option<String>,
    format: Option<String>,
    version: Option<String>,
    url_suffix: Option<String>,
    transformation: Option<Transformation>,
    render_options: RenderOptions,
}

impl Url {
    pub fn new(config: &Configuration) -> Self {
        Self {
            config: config.clone(),
            resource_type: DEFAULT_RESOURCE_TYPE.to_string(),
            delivery_type: DEFAULT_DELIVERY_TYPE.to_string(),
            public_id: None,
            format: None,
            version: None,
            url_suffix: None,
            transformation: None,
            render_options: RenderOptions::default(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    // === Asset ===

    pub fn resource_type(mut self, value: impl Into<String>) -> Self {
        self.resource_type = value.into();
        self
    }

    /// Delivery type (`upload`, `private`, `fetch`, `authenticated`, ...)
    pub fn delivery_type(mut self, value: impl Into<String>) -> Self {
        self.delivery_type = value.into();
        self
    }

    /// Source used when `generate` is called with an empty source
    pub fn public_id(mut self, value: impl Into<String>) -> Self {
        self.public_id = Some(value.into());
        self
    }

    pub fn format(mut self, value: impl Into<String>) -> Self {
        self.format = Some(value.into());
        self
    }

    pub fn version(mut self, value: impl ToString) -> Self {
        self.version = Some(value.to_string());
        self
    }

    /// SEO suffix appended after the public id (private CDN only)
    pub fn url_suffix(mut self, value: impl Into<String>) -> Self {
        self.url_suffix = Some(value.into());
        self
    }

    pub fn transformation(mut self, transformation: Transformation) -> Self {
        self.transformation = Some(transformation);
        self
    }

    pub fn render_options(mut self, options: RenderOptions) -> Self {
        self.render_options = options;
        self
    }

    // === Configuration overrides ===

    pub fn cloud_name(mut self, value: impl Into<String>) -> Self {
        self.config.cloud_name = Some(value.into());
        self
    }

    pub fn secure(mut self, value: bool) -> Self {
        self.config.secure = value;
        self
    }

    pub fn private_cdn(mut self, value: bool) -> Self {
        self.config.private_cdn = value;
        self
    }

    pub fn secure_distribution(mut self, value: impl Into<String>) -> Self {
        self.config.secure_distribution = Some(value.into());
        self
    }

    pub fn cname(mut self, value: impl Into<String>) -> Self {
        self.config.cname = Some(value.into());
        self
    }

    pub fn cdn_subdomain(mut self, value: bool) -> Self {
        self.config.cdn_subdomain = value;
        self
    }

    pub fn secure_cdn_subdomain(mut self, value: bool) -> Self {
        self.config.secure_cdn_subdomain = value;
        self
    }

    pub fn shorten(mut self, value: bool) -> Self {
        self.config.shorten = value;
        self
    }

    pub fn sign_url(mut self, value: bool) -> Self {
        self.config.sign_url = value;
        self
    }

    pub fn use_root_path(mut self, value: bool) -> Self {
        self.config.use_root_path = value;
        self
    }

    pub fn force_version(mut self, value: bool) -> Self {
        self.config.force_version = value;
        self
    }

    pub fn long_url_signature(mut self, value: bool) -> Self {
        self.config.long_url_signature = value;
        self
    }

    pub fn signature_algorithm(mut self, value: SignatureAlgorithm) -> Self {
        self.config.signature_algorithm = value;
        self
    }

    pub fn auth_token(mut self, token: Option<AuthToken>) -> Self {
        self.config.auth_token = token;
        self
    }

    // === Generation ===

    /// Generate the delivery URL for `source`
    ///
    /// An empty `source` falls back to [`Url::public_id`]; with neither set
    /// the result is `Ok(None)`.
    pub fn generate(&self, source: &str) -> Result<Option<String>> {
        Ok(self.generate_with_meta(source)?.map(|generated| generated.url))
    }

    pub fn generate_with_meta(&self, source: &str) -> Result<Option<GeneratedUrl>> {
        let cloud_name = self
            .config
            .cloud_name
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(CloudinaryError::MissingCloudName)?;

        let url_suffix = self
            .url_suffix
            .as_deref()
            .filter(|suffix| !suffix.trim().is_empty());
        if !self.config.private_cdn {
            if url_suffix.is_some() {
                return Err(CloudinaryError::UrlSuffixRequiresPrivateCdn);
            }
            if self.config.use_root_path {
                return Err(CloudinaryError::RootPathRequiresPrivateCdn);
            }
        }

        let source = if source.is_empty() {
            self.public_id.as_deref().unwrap_or_default()
        } else {
            source
        };
        if source.is_empty() {
            return Ok(None);
        }

        let mut transformation = self.transformation.clone().unwrap_or_default();
        let mut format = self.format.clone().filter(|f| !f.is_empty());
        if self.delivery_type == "fetch" {
            if let Some(fetch_format) = format.take() {
                transformation = transformation.fetch_format(&fetch_format);
            }
        }
        let rendered = transformation.render(&self.render_options)?;

        if is_absolute_url(source)
            && (self.delivery_type == "upload" || self.delivery_type == "asset")
        {
            return Ok(Some(GeneratedUrl {
                url: source.to_string(),
                meta: rendered.meta,
            }));
        }

        let (source, source_to_sign) = finalize_source(source, format.as_deref(), url_suffix)?;

        let mut version = self.version.clone().filter(|v| !v.is_empty());
        if self.config.force_version
            && version.is_none()
            && source_to_sign.contains('/')
            && !versioned_source().is_match(&source_to_sign)
            && !is_absolute_url(&source_to_sign)
        {
            version = Some("1".to_string());
        }
        let version = version.map(|v| format!("v{}", v)).unwrap_or_default();

        let signature = if self.config.sign_url && self.config.auth_token.is_none() {
            self.signature(&rendered.path, &source_to_sign)?
        } else {
            String::new()
        };

        let (resource_type, delivery_type) = self.finalize_resource_type(url_suffix.is_some())?;
        let prefix = self.unsigned_prefix(cloud_name, &source);

        let joined = [
            prefix.as_str(),
            resource_type,
            delivery_type,
            signature.as_str(),
            rendered.path.as_str(),
            version.as_str(),
            source.as_str(),
        ]
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("/");
        let mut url = merge_slashes(&joined).into_owned();

        if self.config.sign_url {
            if let Some(token) = &self.config.auth_token {
                let path = url_path(&url);
                let token = token.generate(Some(path))?;
                url = format!("{}?{}", url, token);
            }
        }

        tracing::debug!(url = %url, "Generated delivery URL");
        Ok(Some(GeneratedUrl {
            url,
            meta: rendered.meta,
        }))
    }

    fn signature(&self, transformation: &str, source_to_sign: &str) -> Result<String> {
        let secret = self
            .config
            .api_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(CloudinaryError::MissingApiSecret)?;

        let joined = if transformation.is_empty() {
            source_to_sign.to_string()
        } else {
            format!("{}/{}", transformation, source_to_sign)
        };
        let stripped = strip_leading_slashes(&joined);
        let to_sign = merge_slashes(&stripped);

        let (algorithm, length) = if self.config.long_url_signature {
            (SignatureAlgorithm::Sha256, LONG_URL_SIGNATURE_LENGTH)
        } else {
            (self.config.signature_algorithm, SHORT_URL_SIGNATURE_LENGTH)
        };
        Ok(sign_url_path(&to_sign, secret, algorithm, length))
    }

    /// Resource type and delivery type path segments after suffix, root path
    /// and shortening rewrites
    fn finalize_resource_type(&self, has_suffix: bool) -> Result<(&str, &str)> {
        let mut resource_type = self.resource_type.as_str();
        let mut delivery_type = self.delivery_type.as_str();

        if has_suffix {
            resource_type = match (resource_type, delivery_type) {
                ("image", "upload") => "images",
                ("image", "private") => "private_images",
                ("image", "authenticated") => "authenticated_images",
                ("raw", "upload") => "files",
                ("video", "upload") => "videos",
                _ => return Err(CloudinaryError::UnsupportedUrlSuffix),
            };
            delivery_type = "";
        }

        if self.config.use_root_path {
            let root = (resource_type == "image" && delivery_type == "upload")
                || (resource_type == "images" && delivery_type.is_empty());
            if !root {
                return Err(CloudinaryError::UnsupportedRootPath);
            }
            resource_type = "";
            delivery_type = "";
        }

        if self.config.shorten && resource_type == "image" && delivery_type == "upload" {
            resource_type = "iu";
            delivery_type = "";
        }

        Ok((resource_type, delivery_type))
    }

    /// Scheme, host and (for shared domains) cloud name
    fn unsigned_prefix(&self, cloud_name: &str, source: &str) -> String {
        if cloud_name.starts_with('/') {
            return format!("/res{}", cloud_name);
        }

        let config = &self.config;
        let private_host = || format!("{}-res.cloudinary.com", cloud_name);
        let mut shared_domain = !config.private_cdn;

        let prefix = if config.secure {
            let mut distribution = match config.secure_distribution.as_deref() {
                Some(dist) if !dist.is_empty() && dist != OLD_AKAMAI_SHARED_CDN => dist.to_string(),
                _ if config.private_cdn => private_host(),
                _ => SHARED_CDN.to_string(),
            };
            shared_domain = shared_domain || distribution == SHARED_CDN;
            if config.secure_cdn_subdomain && shared_domain {
                distribution = distribution.replace(
                    "res.cloudinary.com",
                    &format!("res-{}.cloudinary.com", shard(source)),
                );
            }
            format!("https://{}", distribution)
        } else {
            let subdomain = if config.cdn_subdomain {
                format!("a{}.", shard(source))
            } else {
                String::new()
            };
            let host = match config.cname.as_deref().filter(|c| !c.is_empty()) {
                Some(cname) => cname.to_string(),
                None if config.private_cdn => private_host(),
                None => SHARED_CDN.to_string(),
            };
            format!("http://{}{}", subdomain, host)
        };

        if shared_domain {
            format!("{}/{}", prefix, cloud_name)
        } else {
            prefix
        }
    }
}

/// Encode the source and append suffix / format
///
/// Returns `(source, source_to_sign)`; the URL suffix is not signed.
fn finalize_source(
    source: &str,
    format: Option<&str>,
    url_suffix: Option<&str>,
) -> Result<(String, String)> {
    let source = merge_double_slash(source);

    if is_absolute_url(&source) {
        let escaped = smart_escape(&source);
        return Ok((escaped.clone(), escaped));
    }

    let mut escaped = smart_escape(&unescape(&source));
    let mut to_sign = escaped.clone();

    if let Some(suffix) = url_suffix {
        if suffix.contains('.') || suffix.contains('/') {
            return Err(CloudinaryError::InvalidUrlSuffix);
        }
        escaped = format!("{}/{}", escaped, suffix);
    }

    if let Some(format) = format {
        escaped = format!("{}.{}", escaped, format);
        to_sign = format!("{}.{}", to_sign, format);
    }

    Ok((escaped, to_sign))
}

/// Path component of an absolute URL (or the input if it has no host)
fn url_path(url: &str) -> &str {
    match url.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|idx| &rest[idx..]).unwrap_or("/"),
        None => url,
    }
}
