// Batch collection driver - dataset directories to labeled keystrokes
//
// A dataset is a directory of per-key subdirectories, each holding WAV
// recordings of that key being typed repeatedly:
//
//     datasets/keystrokes/a/take1.wav
//     datasets/keystrokes/a/take2.wav
//     datasets/keystrokes/space/take1.wav
//
// The driver fans the files out over a worker pool, runs the segmentation
// pipeline on each, tags every extracted window with its directory's key
// label, and aggregates the results deterministically. One bad recording
// never stops the run: failures are reported per file and the rest of the
// queue keeps draining. Setting the cancel flag drains the remaining queue
// unprocessed while keeping everything already collected.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use anyhow::Context;
use crossbeam_channel::unbounded;

use crate::audio;
use crate::config::{CollectionConfig, SegmentationConfig};
use crate::digest::sound_digest;
use crate::signal;
use crate::storage::KeystrokeRecord;

/// File name -> window indices to drop. Mislabeled or corrupted captures
/// are common enough that selective skipping is a first-class feature.
pub type IgnoreMap = HashMap<String, HashSet<usize>>;

/// Load an ignore map from a JSON file of the form
/// `{"take1.wav": [0, 3], "take7.wav": [12]}`.
pub fn load_ignore_map(path: &Path) -> anyhow::Result<IgnoreMap> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading ignore map {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("parsing ignore map {}", path.display()))
}

/// A recording that could not be processed, with the reason it failed.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a collection run.
#[derive(Debug, Default)]
pub struct CollectionReport {
    /// Every collected keystroke, in dataset order
    pub records: Vec<KeystrokeRecord>,
    /// Files fully processed
    pub files_ok: Vec<PathBuf>,
    /// Files that failed, without aborting the rest of the batch
    pub files_failed: Vec<FileFailure>,
    /// Files left unprocessed after cancellation
    pub files_skipped: Vec<PathBuf>,
    /// Windows emitted across all processed files (before the ignore map)
    pub total_windows: usize,
    /// Windows whose active region fell below the configured minimum -
    /// valid but low-quality output, surfaced for dataset review
    pub degenerate_windows: usize,
}

struct FileJob {
    index: usize,
    key: String,
    path: PathBuf,
}

enum OutcomeKind {
    Collected {
        records: Vec<KeystrokeRecord>,
        windows: usize,
        degenerate: usize,
    },
    Failed {
        reason: String,
    },
    Skipped,
}

struct FileOutcome {
    index: usize,
    path: PathBuf,
    kind: OutcomeKind,
}

/// Walks a dataset and turns every recording into labeled keystrokes.
pub struct Collector {
    segmentation: SegmentationConfig,
    collection: CollectionConfig,
}

impl Collector {
    pub fn new(segmentation: SegmentationConfig, collection: CollectionConfig) -> Self {
        Self {
            segmentation,
            collection,
        }
    }

    /// Collect every configured key's recordings under `base_dir`.
    ///
    /// Per-file segmentation runs on a worker pool; the aggregate report is
    /// ordered by key and file name regardless of worker scheduling. The
    /// `cancel` flag may be set at any time to drain the remaining queue
    /// unprocessed.
    pub fn collect(
        &self,
        base_dir: &Path,
        ignore: &IgnoreMap,
        cancel: &AtomicBool,
    ) -> CollectionReport {
        let jobs = self.enumerate_jobs(base_dir);
        tracing::info!(
            "[Collect] {} files queued across {} keys",
            jobs.len(),
            self.collection.keys.len()
        );

        let workers = self.worker_count().min(jobs.len().max(1));
        let (job_tx, job_rx) = unbounded::<FileJob>();
        let (outcome_tx, outcome_rx) = unbounded::<FileOutcome>();
        for job in jobs {
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let outcome_tx = outcome_tx.clone();
                scope.spawn(move || {
                    for job in job_rx.iter() {
                        let outcome = if cancel.load(Ordering::SeqCst) {
                            FileOutcome {
                                index: job.index,
                                path: job.path,
                                kind: OutcomeKind::Skipped,
                            }
                        } else {
                            self.process_file(job, ignore)
                        };
                        let _ = outcome_tx.send(outcome);
                    }
                });
            }
        });
        drop(outcome_tx);

        let mut outcomes: Vec<FileOutcome> = outcome_rx.iter().collect();
        outcomes.sort_by_key(|outcome| outcome.index);

        let mut report = CollectionReport::default();
        for outcome in outcomes {
            match outcome.kind {
                OutcomeKind::Collected {
                    records,
                    windows,
                    degenerate,
                } => {
                    report.total_windows += windows;
                    report.degenerate_windows += degenerate;
                    report.records.extend(records);
                    report.files_ok.push(outcome.path);
                }
                OutcomeKind::Failed { reason } => {
                    tracing::warn!(
                        "[Collect] Skipping {}: {}",
                        outcome.path.display(),
                        reason
                    );
                    report.files_failed.push(FileFailure {
                        path: outcome.path,
                        reason,
                    });
                }
                OutcomeKind::Skipped => report.files_skipped.push(outcome.path),
            }
        }

        tracing::info!(
            "[Collect] Done: {} keystrokes from {} files ({} failed, {} skipped, {} degenerate windows)",
            report.records.len(),
            report.files_ok.len(),
            report.files_failed.len(),
            report.files_skipped.len(),
            report.degenerate_windows
        );
        report
    }

    fn enumerate_jobs(&self, base_dir: &Path) -> Vec<FileJob> {
        let mut jobs = Vec::new();
        let mut index = 0usize;
        for key in &self.collection.keys {
            let key_dir = base_dir.join(key);
            if !key_dir.is_dir() {
                tracing::warn!("[Collect] No directory for key '{}', skipping", key);
                continue;
            }

            let mut paths: Vec<PathBuf> = match fs::read_dir(&key_dir) {
                Ok(entries) => entries
                    .filter_map(|entry| entry.ok())
                    .map(|entry| entry.path())
                    .filter(|path| {
                        path.extension()
                            .and_then(|ext| ext.to_str())
                            .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"))
                    })
                    .collect(),
                Err(err) => {
                    tracing::warn!(
                        "[Collect] Failed to read {}: {}",
                        key_dir.display(),
                        err
                    );
                    continue;
                }
            };
            paths.sort();

            tracing::info!(
                "[Collect] Reading {} files from {} for key '{}'",
                paths.len(),
                key_dir.display(),
                key
            );
            for path in paths {
                jobs.push(FileJob {
                    index,
                    key: key.clone(),
                    path,
                });
                index += 1;
            }
        }
        jobs
    }

    fn process_file(&self, job: FileJob, ignore: &IgnoreMap) -> FileOutcome {
        match self.extract_records(&job.key, &job.path, ignore) {
            Ok((records, windows, degenerate)) => {
                tracing::info!(
                    "[Collect] Extracted {} keystrokes from {}",
                    records.len(),
                    job.path.display()
                );
                FileOutcome {
                    index: job.index,
                    path: job.path,
                    kind: OutcomeKind::Collected {
                        records,
                        windows,
                        degenerate,
                    },
                }
            }
            Err(err) => FileOutcome {
                index: job.index,
                path: job.path,
                kind: OutcomeKind::Failed {
                    reason: format!("{err:#}"),
                },
            },
        }
    }

    fn extract_records(
        &self,
        key: &str,
        path: &Path,
        ignore: &IgnoreMap,
    ) -> anyhow::Result<(Vec<KeystrokeRecord>, usize, usize)> {
        let recording = audio::read_wav(path)?;
        // Calibration constants come from config, but the lead-in and
        // window lengths follow the file's actual rate
        let seg_config = SegmentationConfig {
            sample_rate: recording.sample_rate,
            ..self.segmentation.clone()
        };
        let windows = signal::segment_recording(&recording.samples, &seg_config)?;

        let ignored = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| ignore.get(name));

        let mut records = Vec::with_capacity(windows.len());
        let mut degenerate = 0usize;
        for (index, window) in windows.iter().enumerate() {
            if window.active_len < self.collection.min_active_samples {
                degenerate += 1;
            }
            if ignored.is_some_and(|indices| indices.contains(&index)) {
                continue;
            }
            records.push(KeystrokeRecord {
                key_type: key.to_string(),
                sound_digest: sound_digest(&window.samples),
                sound_data: window.samples.clone(),
            });
        }
        Ok((records, windows.len(), degenerate))
    }

    fn worker_count(&self) -> usize {
        if self.collection.workers > 0 {
            self.collection.workers
        } else {
            thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        }
    }
}
