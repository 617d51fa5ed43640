// Constants module - centralized hosts and defaults
//
// Host names and token defaults are part of the delivery contract with the
// remote service. Changing them changes every generated URL.

// =============================================================================
// Delivery hosts
// =============================================================================

/// Legacy Akamai host; treated as "unset" when found in secure_distribution
pub const OLD_AKAMAI_SHARED_CDN: &str = "cloudinary-a.akamaihd.net";

/// Shared multi-tenant delivery host
pub const AKAMAI_SHARED_CDN: &str = "res.cloudinary.com";

/// Alias used when deciding whether a secure distribution is shared
pub const SHARED_CDN: &str = AKAMAI_SHARED_CDN;

/// Default API endpoint used by upload and admin requests
pub const DEFAULT_UPLOAD_PREFIX: &str = "https://api.cloudinary.com";

/// API version path segment
pub const API_VERSION: &str = "v1_1";

// =============================================================================
// URL defaults
// =============================================================================

pub const DEFAULT_RESOURCE_TYPE: &str = "image";

pub const DEFAULT_DELIVERY_TYPE: &str = "upload";

/// Number of base64url characters kept from a URL signature
pub const SHORT_URL_SIGNATURE_LENGTH: usize = 8;

/// Signature length when `long_url_signature` is enabled
pub const LONG_URL_SIGNATURE_LENGTH: usize = 32;

/// Number of CDN shards addressed by subdomain sharding
pub const CDN_SHARD_COUNT: u32 = 5;

// =============================================================================
// Tag rendering
// =============================================================================

/// 1x1 transparent GIF used for `responsive_placeholder = "blank"`
pub const BLANK_PLACEHOLDER: &str =
    "data:image/gif;base64,R0lGODlhAQABAIAAAAAAAP///yH5BAEAAAAALAAAAAABAAEAAAIBRAA7";

pub const RESPONSIVE_CLASS: &str = "cld-responsive";

pub const HIDPI_CLASS: &str = "cld-hidpi";

// =============================================================================
// Token authentication
// =============================================================================

pub const DEFAULT_TOKEN_NAME: &str = "__cld_token__";

/// Environment variable holding the `cloudinary://` connection string
pub const CLOUDINARY_URL_ENV: &str = "CLOUDINARY_URL";
