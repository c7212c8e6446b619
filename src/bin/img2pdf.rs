//! CLI binary for img2pdf.
//!
//! Maps flags to `ConvertOptions` / `BatchConfig`, runs the batch and prints
//! per-file progress plus a final summary.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use img2pdf::{
    BatchConfig, BatchProgress, BatchSummary, CodecRegistry, ConvertError, ConvertOptions,
    Converter, FitMode, ImageFileRef, ImageFormat, PageSize, VerticalPlacement, run_batch,
};
use tracing_subscriber::EnvFilter;

/// Convert every JPEG, PNG and WebP image in a directory into a one-page PDF.
#[derive(Parser, Debug)]
#[command(name = "img2pdf", version, about)]
struct Cli {
    /// Directory to scan for images.
    #[arg(long, env = "IMG2PDF_DIR", default_value = ".")]
    dir: PathBuf,

    /// Directory for the generated PDFs [default: <DIR>/pdf].
    #[arg(short, long, env = "IMG2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Start without waiting for ENTER.
    #[arg(short, long)]
    yes: bool,

    /// Page margin in millimetres.
    #[arg(long, default_value_t = 10.0)]
    margin: f32,

    /// Page size.
    #[arg(long, value_enum, default_value = "a4")]
    page: PageArg,

    /// Vertical placement of the image.
    #[arg(long, value_enum, default_value = "top")]
    align: AlignArg,

    /// Scale to the printable width, or shrink to keep the whole image on the page.
    #[arg(long, value_enum, default_value = "width")]
    fit: FitArg,

    /// Author written into the document metadata.
    #[arg(long, default_value = img2pdf::constants::DEFAULT_AUTHOR)]
    author: String,

    /// Only convert JPEG and PNG files.
    #[arg(long)]
    no_webp: bool,

    /// Convert the whole set this many times (timing runs).
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=100))]
    passes: u32,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageArg {
    A4,
    Letter,
}

impl From<PageArg> for PageSize {
    fn from(v: PageArg) -> Self {
        match v {
            PageArg::A4 => PageSize::a4(),
            PageArg::Letter => PageSize::letter(),
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum AlignArg {
    Top,
    Center,
}

impl From<AlignArg> for VerticalPlacement {
    fn from(v: AlignArg) -> Self {
        match v {
            AlignArg::Top => VerticalPlacement::Top,
            AlignArg::Center => VerticalPlacement::Center,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FitArg {
    Width,
    Page,
}

impl From<FitArg> for FitMode {
    fn from(v: FitArg) -> Self {
        match v {
            FitArg::Width => FitMode::Width,
            FitArg::Page => FitMode::Page,
        }
    }
}

/// Prints one line per file to stdout, failures to stderr
struct ConsoleProgress {
    quiet: bool,
    output_dir: PathBuf,
}

impl ConsoleProgress {
    fn display_output(&self, output: &Path) -> String {
        output
            .strip_prefix(&self.output_dir)
            .map(|rel| {
                let dir = self
                    .output_dir
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Path::new(&dir).join(rel).display().to_string()
            })
            .unwrap_or_else(|_| output.display().to_string())
    }
}

impl BatchProgress for ConsoleProgress {
    fn on_batch_start(&self, total_files: usize, _passes: u32) {
        if !self.quiet {
            println!("Found {total_files} image file(s)");
        }
    }

    fn on_pass_start(&self, pass: u32, passes: u32) {
        if !self.quiet && passes > 1 {
            println!("\nPass {pass}/{passes}");
        }
    }

    fn on_file_converted(&self, index: usize, total: usize, file: &ImageFileRef, output: &Path) {
        if !self.quiet {
            println!(
                "  [{index}/{total}] {} -> {}",
                file.file_name,
                self.display_output(output)
            );
        }
    }

    fn on_file_failed(&self, index: usize, total: usize, file: &ImageFileRef, error: &ConvertError) {
        eprintln!(
            "  [{index}/{total}] {} FAILED ({}): {error}",
            file.file_name,
            error.kind()
        );
    }

    fn on_batch_complete(&self, summary: &BatchSummary) {
        if self.quiet || summary.found == 0 {
            return;
        }
        println!(
            "\nDone: {} converted, {} failed in {:.1} seconds",
            summary.converted,
            summary.failed,
            summary.elapsed.as_secs_f64()
        );
    }
}

fn wait_for_enter(message: &str) -> Result<()> {
    print!("\nPress ENTER {message}...");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // per-file failures are printed by ConsoleProgress
    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(io::stderr)
        .init();

    let mut registry = CodecRegistry::with_defaults();
    if cli.no_webp {
        registry.unregister(ImageFormat::WebP);
    }

    let options = ConvertOptions::new()
        .with_page_size(cli.page.into())
        .with_margin(cli.margin)
        .with_placement(cli.align.into())
        .with_fit(cli.fit.into())
        .with_author(cli.author.clone());

    let extensions = registry.extensions().join(", ");
    let converter = Converter::new(registry, options).context("invalid page options")?;

    let mut config = BatchConfig::new(&cli.dir).with_passes(cli.passes);
    if let Some(output) = &cli.output {
        config = config.with_output_dir(output);
    }

    if !cli.quiet {
        println!();
        println!(
            "This program converts every image ({extensions}) in {} into a one-page PDF.",
            cli.dir.display()
        );
        println!("Output directory: {}", config.output_dir.display());
    }

    if !cli.yes && io::stdin().is_terminal() {
        wait_for_enter("to START")?;
    }

    let progress = ConsoleProgress {
        quiet: cli.quiet,
        output_dir: config.output_dir.clone(),
    };
    let summary = run_batch(&converter, &config, &progress)
        .with_context(|| format!("cannot read images from {}", cli.dir.display()))?;

    if summary.found == 0 && !cli.quiet {
        println!("No image files found");
    }

    Ok(())
}
