//! The `aperture thumbnail` command: read back a stored preview.

use std::io::Write;
use std::path::PathBuf;

use aperture_core::{Config, ImageProcessor, StoreError, THUMBNAIL_CONTENT_TYPE};
use clap::Args;

/// Arguments for the `thumbnail` command.
#[derive(Args, Debug)]
pub struct ThumbnailArgs {
    /// Thumbnail key as reported by `analyze` (e.g. thumb_<storage key>)
    pub key: String,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory uploads and thumbnails are stored in
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,
}

/// Execute the thumbnail command.
pub async fn execute(args: ThumbnailArgs, mut config: Config) -> anyhow::Result<()> {
    if let Some(dir) = args.upload_dir {
        config.general.upload_dir = dir;
    }
    let processor = ImageProcessor::new(&config)?;

    let bytes = match processor.fetch_thumbnail(&args.key) {
        Ok(bytes) => bytes,
        Err(StoreError::NotFound(_)) => {
            anyhow::bail!("No thumbnail stored under key: {}", args.key)
        }
        Err(e) => return Err(e.into()),
    };
    tracing::debug!(
        "Fetched {} ({} bytes, {})",
        args.key,
        bytes.len(),
        THUMBNAIL_CONTENT_TYPE
    );

    match &args.output {
        Some(path) => {
            std::fs::write(path, &bytes)?;
            tracing::info!("Thumbnail written to {:?}", path);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes)?;
            stdout.flush()?;
        }
    }

    Ok(())
}
