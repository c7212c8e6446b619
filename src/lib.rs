//! Batch conversion of images into single-page PDFs built on lopdf
//!
//! Each JPEG, PNG or WebP image in a directory becomes one PDF with a single
//! A4 page. The image spans the width between the margins with its aspect
//! ratio preserved. JPEG data is embedded unchanged; PNG and WebP pixels are
//! stored losslessly.
//!
//! ```rust,no_run
//! use img2pdf::{BatchConfig, CodecRegistry, ConvertOptions, Converter, NoProgress, run_batch};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let converter = Converter::new(CodecRegistry::with_defaults(), ConvertOptions::default())?;
//!     let summary = run_batch(&converter, &BatchConfig::new("."), &NoProgress)?;
//!     println!("{} converted, {} failed", summary.converted, summary.failed);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod codec;
pub mod constants;
pub mod convert;
pub mod drawing;
pub mod error;
pub mod layout;
pub mod options;
pub mod scan;

pub use batch::{BatchConfig, BatchProgress, BatchSummary, ConversionReport, NoProgress, run_batch};
pub use codec::{CodecRegistry, ImageCodec, ImageFormat, ImageInfo, ImageXObject};
pub use convert::Converter;
pub use drawing::ImagePageDrawing;
pub use error::{ConvertError, ErrorKind, Result};
pub use layout::{LayoutError, PageLayout, PdfRect, calculate_layout};
pub use options::{ConvertOptions, FitMode, PageSize, VerticalPlacement};
pub use scan::{ImageFileRef, scan_directory};
