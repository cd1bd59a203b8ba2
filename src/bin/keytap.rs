use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};

use keytap::collect::{load_ignore_map, Collector, IgnoreMap};
use keytap::config::{AppConfig, SegmentationConfig};
use keytap::signal::{Segmenter, ThresholdEstimator};
use keytap::storage::KeystrokeStore;
use keytap::{audio, digest};

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();

    let cli = Cli::parse();
    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("keytap error: {err:?}");
            ExitCode::from(1)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "keytap", about = "Acoustic keystroke capture pipeline CLI")]
struct Cli {
    /// Path to a JSON config file with calibration constants.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    fn execute(self) -> Result<()> {
        let config = match &self.config {
            Some(path) => AppConfig::load_from_file(path),
            None => AppConfig::default(),
        };
        match self.command {
            Command::Collect(args) => collect_command(args, config),
            Command::Segment(args) => segment_command(args, &config.segmentation),
            Command::Threshold(args) => threshold_command(args, &config.segmentation),
            Command::Stats(args) => stats_command(args),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Collect labeled keystrokes from a dataset directory into a store.
    Collect(CollectArgs),
    /// Segment a single recording and print the extracted windows.
    Segment(SegmentArgs),
    /// Print the estimated silence threshold of a recording.
    Threshold(FileArgs),
    /// Print per-key counts from an existing store.
    Stats(StatsArgs),
}

#[derive(Args, Debug)]
struct CollectArgs {
    /// Dataset root containing one subdirectory per key.
    #[arg(long, default_value = "datasets/keystrokes")]
    base_dir: PathBuf,
    /// SQLite database to persist collected keystrokes into.
    #[arg(long)]
    db: PathBuf,
    /// JSON map of file names to keystroke indices to skip.
    #[arg(long)]
    ignore: Option<PathBuf>,
    /// Worker threads (overrides config; 0 = available parallelism).
    #[arg(long)]
    workers: Option<usize>,
    /// Segment and report without writing to the store.
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct SegmentArgs {
    /// WAV recording to segment.
    file: PathBuf,
}

#[derive(Args, Debug)]
struct FileArgs {
    /// WAV recording to analyze.
    file: PathBuf,
}

#[derive(Args, Debug)]
struct StatsArgs {
    /// SQLite database to read.
    #[arg(long)]
    db: PathBuf,
}

fn collect_command(args: CollectArgs, mut config: AppConfig) -> Result<()> {
    if let Some(workers) = args.workers {
        config.collection.workers = workers;
    }
    let ignore = match &args.ignore {
        Some(path) => load_ignore_map(path)?,
        None => IgnoreMap::new(),
    };
    if !args.base_dir.is_dir() {
        bail!("dataset directory {} does not exist", args.base_dir.display());
    }

    let collector = Collector::new(config.segmentation, config.collection);
    let cancel = AtomicBool::new(false);
    let report = collector.collect(&args.base_dir, &ignore, &cancel);

    println!(
        "Collected {} keystrokes from {} files ({} windows, {} degenerate)",
        report.records.len(),
        report.files_ok.len(),
        report.total_windows,
        report.degenerate_windows
    );
    for failure in &report.files_failed {
        println!("  failed: {}: {}", failure.path.display(), failure.reason);
    }

    if args.dry_run {
        println!("Dry run: nothing persisted");
        return Ok(());
    }
    if report.records.is_empty() {
        println!("Nothing to persist");
        return Ok(());
    }

    let mut store = KeystrokeStore::open(&args.db)
        .with_context(|| format!("opening store {}", args.db.display()))?;
    store.insert_all(&report.records)?;
    println!("Persisted {} keystrokes to {}", report.records.len(), args.db.display());
    Ok(())
}

fn segment_command(args: SegmentArgs, config: &SegmentationConfig) -> Result<()> {
    let recording = audio::read_wav(&args.file)?;
    let config = SegmentationConfig {
        sample_rate: recording.sample_rate,
        ..config.clone()
    };

    let threshold = ThresholdEstimator::with_config(&config).estimate(&recording.samples)?;
    let segmenter = Segmenter::with_config(&config);
    let windows = segmenter.segment(&recording.samples, threshold)?;

    println!(
        "{}: {} keystrokes (threshold {}, window {} samples)",
        args.file.display(),
        windows.len(),
        threshold,
        segmenter.window_len()
    );
    for (index, window) in windows.iter().enumerate() {
        println!(
            "  [{index}] onset {} active {} padding {} digest {}",
            window.onset,
            window.active_len,
            window.padding_len(),
            digest::sound_digest(&window.samples)
        );
    }
    Ok(())
}

fn threshold_command(args: FileArgs, config: &SegmentationConfig) -> Result<()> {
    let recording = audio::read_wav(&args.file)?;
    let config = SegmentationConfig {
        sample_rate: recording.sample_rate,
        ..config.clone()
    };

    let estimator = ThresholdEstimator::with_config(&config);
    let floor = estimator.noise_floor(&recording.samples)?;
    let threshold = estimator.estimate(&recording.samples)?;
    println!(
        "{}: noise floor {}, threshold {} (factor {})",
        args.file.display(),
        floor,
        threshold,
        config.threshold_factor
    );
    Ok(())
}

fn stats_command(args: StatsArgs) -> Result<()> {
    let store = KeystrokeStore::open(&args.db)
        .with_context(|| format!("opening store {}", args.db.display()))?;
    let counts = store.count_by_key()?;
    if counts.is_empty() {
        println!("Store is empty");
        return Ok(());
    }
    let total: usize = counts.iter().map(|(_, count)| count).sum();
    for (key, count) in &counts {
        println!("{key:>8}: {count}");
    }
    println!("{:>8}: {total}", "total");
    Ok(())
}
