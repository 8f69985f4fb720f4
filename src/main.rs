//! pagesmith - Entry point
//!
//! HTTP service for PDF page extraction and reconstruction.

use clap::Parser;
use pagesmith::{run_server_with_config, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments, each with a `PAGESMITH_*` environment fallback
#[derive(Parser, Debug)]
#[command(name = "pagesmith", version, about)]
struct Args {
    /// Address to listen on
    #[arg(long, env = "PAGESMITH_BIND", default_value = "127.0.0.1:8080")]
    bind: String,

    /// Maximum request body size in bytes
    #[arg(long, env = "PAGESMITH_MAX_UPLOAD_BYTES", default_value_t = 100 * 1024 * 1024)]
    max_upload_bytes: usize,

    /// Thumbnail width in pixels
    #[arg(long, env = "PAGESMITH_THUMBNAIL_WIDTH", default_value_t = 200)]
    thumbnail_width: u16,

    /// Maximum render resolution for image export
    #[arg(long, env = "PAGESMITH_MAX_DPI", default_value_t = 300)]
    max_dpi: u32,

    /// Maximum pixel area of one exported page image
    #[arg(long, env = "PAGESMITH_MAX_IMAGE_PIXELS", default_value_t = 100_000_000)]
    max_image_pixels: u64,

    /// Maximum encoded thumbnail bytes cached per request
    #[arg(long, env = "PAGESMITH_THUMBNAIL_CACHE_BYTES", default_value_t = 64 * 1024 * 1024)]
    thumbnail_cache_bytes: usize,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        ServerConfig {
            bind_addr: args.bind,
            max_upload_bytes: args.max_upload_bytes,
            thumbnail_width: args.thumbnail_width,
            max_dpi: args.max_dpi,
            max_image_pixels: args.max_image_pixels,
            thumbnail_cache_bytes: args.thumbnail_cache_bytes,
            ..ServerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagesmith=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting pagesmith");

    run_server_with_config(args.into()).await
}
