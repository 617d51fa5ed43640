use anyhow::Context;
use clap::Parser;
use std::collections::BTreeMap;
use std::path::PathBuf;

use cloudinary::logging::{init_subscriber, LogFormat};
use cloudinary::{Configuration, Transformation, Url};

/// Print a Cloudinary delivery URL (or <img> tag) for a public id
#[derive(Parser, Debug)]
#[command(name = "cloudinary-url")]
#[command(version, about, long_about = None)]
struct Args {
    /// Public id or remote URL to deliver
    public_id: String,

    /// YAML configuration file (defaults to CLOUDINARY_URL)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resource type (image, video, raw)
    #[arg(long, default_value = "image")]
    resource_type: String,

    /// Delivery type (upload, private, fetch, ...)
    #[arg(long = "type", default_value = "upload")]
    delivery_type: String,

    #[arg(short, long)]
    width: Option<String>,

    #[arg(long)]
    height: Option<String>,

    #[arg(long)]
    crop: Option<String>,

    /// Output format / file extension
    #[arg(short, long)]
    format: Option<String>,

    #[arg(long)]
    version_number: Option<String>,

    /// Raw transformation appended verbatim
    #[arg(long)]
    raw: Option<String>,

    #[arg(long)]
    secure: bool,

    /// Add a URL signature (requires api_secret)
    #[arg(long)]
    sign: bool,

    /// Print an <img> tag instead of the bare URL
    #[arg(long)]
    tag: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let format = if args.json_logs {
        LogFormat::Json
    } else {
        LogFormat::Text
    };
    init_subscriber(format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging subsystem: {}", e))?;

    let config = match &args.config {
        Some(path) => Configuration::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Configuration::from_env().context("Failed to load configuration")?,
    };
    config.validate().context("Invalid configuration")?;

    tracing::debug!(
        cloud_name = ?config.cloud_name,
        secure = config.secure,
        private_cdn = config.private_cdn,
        "Configuration loaded successfully"
    );

    let mut transformation = Transformation::new();
    if let Some(width) = &args.width {
        transformation = transformation.width(width.as_str());
    }
    if let Some(height) = &args.height {
        transformation = transformation.height(height.as_str());
    }
    if let Some(crop) = &args.crop {
        transformation = transformation.crop(crop);
    }
    if let Some(raw) = &args.raw {
        transformation = transformation.raw_transformation(raw);
    }

    let mut url = Url::new(&config)
        .resource_type(args.resource_type.as_str())
        .delivery_type(args.delivery_type.as_str())
        .transformation(transformation);
    if args.secure {
        url = url.secure(true);
    }
    if args.sign {
        url = url.sign_url(true);
    }
    if let Some(format) = &args.format {
        url = url.format(format.as_str());
    }
    if let Some(version) = &args.version_number {
        url = url.version(version);
    }

    let output = if args.tag {
        url.image_tag(&args.public_id, &BTreeMap::new())?
    } else {
        url.generate(&args.public_id)?
    };

    match output {
        Some(output) => {
            println!("{}", output);
            Ok(())
        }
        None => anyhow::bail!("No public id given"),
    }
}
