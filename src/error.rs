// Error types module

use thiserror::Error;

/// Centralized error type for URL generation and request signing
///
/// Every variant is a caller-input validation error. Nothing here is
/// transient: the same inputs always fail the same way.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CloudinaryError {
    /// No cloud name in the configuration or on the URL builder
    #[error("Must supply cloud_name in tag or in configuration")]
    MissingCloudName,

    /// Signing was requested without an API secret
    #[error("Must supply api_secret")]
    MissingApiSecret,

    /// Request signing needs the API key as well
    #[error("Must supply api_key")]
    MissingApiKey,

    /// URL suffixes are only served from private CDN distributions
    #[error("URL Suffix only supported in private CDN")]
    UrlSuffixRequiresPrivateCdn,

    /// URL suffix contains a path separator or extension dot
    #[error("url_suffix should not include . or /")]
    InvalidUrlSuffix,

    /// URL suffix requested for a resource/delivery type without a suffix route
    #[error("URL Suffix only supported for image/upload, image/private, image/authenticated, raw/upload and video/upload")]
    UnsupportedUrlSuffix,

    /// Root path URLs are only served from private CDN distributions
    #[error("Root path only supported in private CDN")]
    RootPathRequiresPrivateCdn,

    /// Root path requested for anything but image/upload
    #[error("Root path only supported for image/upload")]
    UnsupportedRootPath,

    /// Structurally malformed parameter (offset arrays, layers, tokens)
    #[error("Invalid parameter '{param}': {message}")]
    InvalidParameter { param: String, message: String },

    /// Configuration could not be loaded or parsed
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CloudinaryError {
    pub fn invalid_param(param: impl Into<String>, message: impl Into<String>) -> Self {
        CloudinaryError::InvalidParameter {
            param: param.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        CloudinaryError::Config(message.into())
    }
}

pub type Result<T> = std::result::Result<T, CloudinaryError>;
