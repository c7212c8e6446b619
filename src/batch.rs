//! Batch conversion of every image in a directory
//!
//! [`run_batch`] scans the source directory once and then converts each
//! image in turn. A failure while scanning aborts the run; a failure while
//! converting one file is logged, reported through [`BatchProgress`] and
//! the batch moves on to the next file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{info, instrument, warn};

use crate::Result;
use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::convert::Converter;
use crate::error::ConvertError;
use crate::scan::{ImageFileRef, scan_directory};

/// Where to read images from, where to write documents, and how often
#[derive(Debug, Clone)]
pub struct BatchConfig {
    pub source_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Number of times the whole set is converted; useful for timing runs
    pub passes: u32,
}

impl BatchConfig {
    /// Convert the images in `source_dir` into `source_dir/pdf`
    pub fn new(source_dir: impl Into<PathBuf>) -> Self {
        let source_dir = source_dir.into();
        let output_dir = source_dir.join(DEFAULT_OUTPUT_DIR);
        Self {
            source_dir,
            output_dir,
            passes: 1,
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_passes(mut self, passes: u32) -> Self {
        self.passes = passes.max(1);
        self
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

/// Outcome of converting one file
#[derive(Debug)]
pub struct ConversionReport {
    pub source: ImageFileRef,
    /// 1-indexed pass this conversion belongs to
    pub pass: u32,
    pub outcome: Result<PathBuf>,
}

impl ConversionReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Totals for a finished batch
#[derive(Debug)]
pub struct BatchSummary {
    /// Images matched by the scan
    pub found: usize,
    pub passes: u32,
    /// Successful conversions across all passes
    pub converted: usize,
    /// Failed conversions across all passes
    pub failed: usize,
    pub elapsed: Duration,
    pub reports: Vec<ConversionReport>,
}

impl BatchSummary {
    pub fn failures(&self) -> impl Iterator<Item = &ConversionReport> {
        self.reports.iter().filter(|r| !r.is_success())
    }
}

/// Receives events while a batch runs.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait BatchProgress: Send + Sync {
    /// Called once after the scan, before anything is converted
    fn on_batch_start(&self, total_files: usize, passes: u32) {
        let _ = (total_files, passes);
    }

    /// Called at the start of each pass (1-indexed)
    fn on_pass_start(&self, pass: u32, passes: u32) {
        let _ = (pass, passes);
    }

    /// Called before a file is converted; `index` is 1-indexed
    fn on_file_start(&self, index: usize, total: usize, file: &ImageFileRef) {
        let _ = (index, total, file);
    }

    /// Called after a document was written
    fn on_file_converted(&self, index: usize, total: usize, file: &ImageFileRef, output: &Path) {
        let _ = (index, total, file, output);
    }

    /// Called after a file failed to convert
    fn on_file_failed(&self, index: usize, total: usize, file: &ImageFileRef, error: &ConvertError) {
        let _ = (index, total, file, error);
    }

    /// Called once when every pass has finished
    fn on_batch_complete(&self, summary: &BatchSummary) {
        let _ = summary;
    }
}

/// A [`BatchProgress`] that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl BatchProgress for NoProgress {}

/// Scan `config.source_dir` and convert every image found.
///
/// Only scan-level failures (and failing to create the output directory)
/// are returned as errors; per-file failures are recorded in the summary.
#[instrument(skip_all, fields(dir = %config.source_dir.display()))]
pub fn run_batch(
    converter: &Converter,
    config: &BatchConfig,
    progress: &dyn BatchProgress,
) -> Result<BatchSummary> {
    let start = Instant::now();
    let files = scan_directory(&config.source_dir, converter.registry())?;
    let total = files.len();
    let passes = config.passes.max(1);

    let mut summary = BatchSummary {
        found: total,
        passes,
        converted: 0,
        failed: 0,
        elapsed: Duration::ZERO,
        reports: Vec::with_capacity(total * passes as usize),
    };

    if files.is_empty() {
        info!("No image files found");
        summary.elapsed = start.elapsed();
        progress.on_batch_complete(&summary);
        return Ok(summary);
    }

    fs::create_dir_all(&config.output_dir)
        .map_err(|e| ConvertError::io(&config.output_dir, e))?;
    warn_on_shared_stems(&files);

    info!("Converting {} image files", total);
    progress.on_batch_start(total, passes);

    for pass in 1..=passes {
        progress.on_pass_start(pass, passes);

        for (i, file) in files.iter().enumerate() {
            let index = i + 1;
            progress.on_file_start(index, total, file);

            let outcome = converter.convert(file, &config.output_dir);
            match &outcome {
                Ok(output) => {
                    summary.converted += 1;
                    progress.on_file_converted(index, total, file, output);
                }
                Err(err) => {
                    summary.failed += 1;
                    warn!(file = %file.file_name, kind = %err.kind(), "Conversion failed: {err}");
                    progress.on_file_failed(index, total, file, err);
                }
            }

            summary.reports.push(ConversionReport {
                source: file.clone(),
                pass,
                outcome,
            });
        }
    }

    summary.elapsed = start.elapsed();
    info!(
        "Batch finished: {} converted, {} failed in {:?}",
        summary.converted, summary.failed, summary.elapsed
    );
    progress.on_batch_complete(&summary);

    Ok(summary)
}

/// `a.jpg` and `a.png` both become `a.pdf`; the later one wins
fn warn_on_shared_stems(files: &[ImageFileRef]) {
    let mut seen: HashMap<&str, &str> = HashMap::new();
    for file in files {
        if let Some(first) = seen.insert(file.stem(), &file.file_name) {
            warn!(
                "{} and {} share the output name {}.pdf; the latter overwrites the former",
                first,
                file.file_name,
                file.stem()
            );
        }
    }
}
