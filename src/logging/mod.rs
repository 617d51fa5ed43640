// Logging module for structured logging using the tracing crate

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Output format for log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human readable single-line output
    #[default]
    Text,
    /// One JSON object per event, for log aggregation systems
    Json,
}

/// Initialize the tracing subscriber for structured logging
///
/// The filter defaults to `info` and can be overridden through `RUST_LOG`
/// (e.g. `RUST_LOG=cloudinary=debug` to see rendered transformations and
/// generated URLs). Output goes to stderr so that stdout stays usable for
/// the generated URL.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
///
/// # Examples
///
/// ```
/// use cloudinary::logging::{init_subscriber, LogFormat};
///
/// // A second initialisation fails instead of panicking
/// let _ = init_subscriber(LogFormat::Text);
/// tracing::info!("Application started");
/// ```
pub fn init_subscriber(format: LogFormat) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    }
}
