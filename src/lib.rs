// Cloudinary delivery library
//
// Pure, synchronous building blocks: transformation compiler, delivery URL
// assembly, request signing and token authorization.

pub mod config;
pub mod constants;
pub mod error;
pub mod expression;
pub mod logging;
pub mod signing;
pub mod transformation;
pub mod url;

pub use config::Configuration;
pub use error::{CloudinaryError, Result};
pub use expression::{normalize, Expression, ExpressionKind};
pub use signing::{
    api_sign_request, sign_request, AkamaiToken, AuthToken, SignatureAlgorithm, Signer,
};
pub use transformation::{
    render_transformation, Layer, ParamValue, RenderOptions, Rendered, RenderedMeta, Stage,
    TextStyle, Transformation, VideoCodec,
};
pub use url::{GeneratedUrl, Url};
