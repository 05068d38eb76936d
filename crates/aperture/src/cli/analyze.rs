//! The `aperture analyze` command: ingest photos and report their metrics.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use aperture_core::output::OutputFormat as CoreOutputFormat;
use aperture_core::{
    AnalysisRecord, Config, DiscoveredFile, FileDiscovery, ImageProcessor, OutputWriter,
    UploadedImage,
};
use clap::{Args, ValueEnum};
use tokio::sync::Semaphore;

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image files or directories to analyze
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (defaults to `[output] format` from config)
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Number of uploads analyzed at once
    #[arg(short, long)]
    pub parallel: Option<usize>,

    /// Directory uploads and thumbnails are stored in
    #[arg(long)]
    pub upload_dir: Option<PathBuf>,

    /// Longest thumbnail side in pixels
    #[arg(long)]
    pub thumbnail_size: Option<u32>,
}

/// Supported output formats.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON array
    Json,
    /// One JSON object per line (newline-delimited)
    Jsonl,
}

impl From<OutputFormat> for CoreOutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => CoreOutputFormat::Json,
            OutputFormat::Jsonl => CoreOutputFormat::JsonLines,
        }
    }
}

/// Fold CLI overrides into the loaded config.
fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) -> anyhow::Result<()> {
    if let Some(dir) = &args.upload_dir {
        config.general.upload_dir = dir.clone();
    }
    if let Some(size) = args.thumbnail_size {
        config.thumbnail.size = size;
    }
    if let Some(parallel) = args.parallel {
        if parallel == 0 {
            anyhow::bail!("--parallel must be at least 1");
        }
        config.processing.parallel_workers = parallel;
    }
    Ok(())
}

/// Resolve every input to the uploads it names.
fn discover_inputs(inputs: &[PathBuf]) -> anyhow::Result<Vec<DiscoveredFile>> {
    let discovery = FileDiscovery::new();
    let mut files = Vec::new();
    for input in inputs {
        if !input.exists() {
            anyhow::bail!("Input path does not exist: {:?}", input);
        }
        let found = discovery.discover(input);
        if found.is_empty() {
            tracing::warn!("No supported images found in {:?}", input);
        }
        files.extend(found);
    }
    Ok(files)
}

/// Read one file from disk and run it through the pipeline.
///
/// A file that cannot be read never reaches the pipeline, so it has no
/// record; the read error is returned for the caller to skip it.
fn analyze_file(processor: &ImageProcessor, file: &DiscoveredFile) -> io::Result<AnalysisRecord> {
    let bytes = std::fs::read(&file.path)?;
    let result = processor.process(&UploadedImage::new(bytes, file.file_name()));
    if let Err(e) = &result {
        tracing::error!("Failed: {:?} - {}", file.path, e);
    }
    Ok(AnalysisRecord::from_result(
        file.path.display().to_string(),
        &result,
    ))
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, mut config: Config) -> anyhow::Result<()> {
    apply_overrides(&mut config, &args)?;

    let format = match args.format {
        Some(format) => format.into(),
        None => CoreOutputFormat::parse(&config.output.format).unwrap_or(CoreOutputFormat::Json),
    };

    let files = discover_inputs(&args.inputs)?;
    if files.is_empty() {
        tracing::warn!("Nothing to analyze");
        return Ok(());
    }
    tracing::info!(
        "Analyzing {} file(s) ({:.1} MB) into {:?}",
        files.len(),
        FileDiscovery::total_size(&files) as f64 / 1_000_000.0,
        config.upload_dir()
    );

    let processor = Arc::new(ImageProcessor::new(&config)?);
    let workers = config.processing.parallel_workers;
    let semaphore = Arc::new(Semaphore::new(workers));
    tracing::debug!("Using {} worker(s)", workers);

    let progress = create_progress_bar(files.len() as u64);
    let start_time = Instant::now();

    // Workers are started in input order and joined in the same order,
    // so output order matches the input regardless of completion order.
    let mut handles = Vec::with_capacity(files.len());
    for file in files {
        let permit = semaphore.clone().acquire_owned().await?;
        let processor = Arc::clone(&processor);
        handles.push(tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let record = analyze_file(&processor, &file);
            (file, record)
        }));
    }

    let sink: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };
    let mut writer = OutputWriter::new(sink, format, config.output.pretty);

    let mut succeeded: u64 = 0;
    let mut failed: u64 = 0;
    let mut skipped: u64 = 0;
    for handle in handles {
        let (file, record) = handle.await?;
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("Skipping {:?}: cannot read file: {}", file.path, e);
                skipped += 1;
                progress.inc(1);
                continue;
            }
        };
        if record.is_ok() {
            succeeded += 1;
        } else {
            failed += 1;
        }
        writer.write(&record)?;

        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            progress.set_message(format!("{:.1} img/sec", (succeeded + failed) as f64 / elapsed));
        }
    }
    writer.finish()?;
    progress.finish_and_clear();

    if let Some(path) = &args.output {
        tracing::info!("Output written to {:?}", path);
    }
    print_summary(succeeded, failed, skipped, start_time.elapsed());

    Ok(())
}

/// Create a progress bar drawn to stderr.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    if total <= 1 {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
    ) {
        pb.set_style(style.progress_chars("##-"));
    }
    pb.set_message("starting...");
    pb
}

/// Print a short summary after a batch.
fn print_summary(succeeded: u64, failed: u64, skipped: u64, elapsed: std::time::Duration) {
    let total = succeeded + failed + skipped;
    if total <= 1 {
        return;
    }
    let rate = if elapsed.as_secs_f64() > 0.0 {
        total as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };

    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", succeeded);
    if failed > 0 {
        eprintln!("    Failed:       {:>8}", failed);
    }
    if skipped > 0 {
        eprintln!("    Skipped:      {:>8}", skipped);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", total);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}
