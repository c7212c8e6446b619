//! Directory scanning for convertible images

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument, trace, warn};

use crate::Result;
use crate::codec::{CodecRegistry, ImageFormat};
use crate::error::ConvertError;

/// An image found by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFileRef {
    pub path: PathBuf,
    pub file_name: String,
    /// Format implied by the file extension
    pub format: ImageFormat,
}

impl ImageFileRef {
    /// File name without its final extension
    pub fn stem(&self) -> &str {
        split_extension(&self.file_name).0
    }
}

/// Split at the last dot. Unlike `Path::extension`, a leading dot counts,
/// so `.jpg` is an empty stem with a `jpg` extension.
fn split_extension(file_name: &str) -> (&str, Option<&str>) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) => (stem, Some(ext)),
        None => (file_name, None),
    }
}

/// List the images in `dir` whose extension has a registered codec.
///
/// The listing is not recursive, skips directories, and is sorted by file
/// name. A directory with no matching files gives an empty list.
#[instrument(skip_all, fields(dir = %dir.display()))]
pub fn scan_directory(dir: &Path, registry: &CodecRegistry) -> Result<Vec<ImageFileRef>> {
    let entries = fs::read_dir(dir).map_err(|e| ConvertError::io(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConvertError::io(dir, e))?;
        let path = entry.path();

        // follows symlinks, so a link to a directory counts as a directory
        if path.is_dir() {
            trace!("Skipping directory {}", path.display());
            continue;
        }

        let Some(file_name) = entry.file_name().to_str().map(str::to_owned) else {
            warn!("Skipping file with non UTF-8 name: {}", path.display());
            continue;
        };

        let format =
            split_extension(&file_name).1.and_then(|ext| registry.format_for_extension(ext));

        match format {
            Some(format) => files.push(ImageFileRef {
                path,
                file_name,
                format,
            }),
            None => trace!("Ignoring {}", file_name),
        }
    }

    files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    debug!("Found {} image files", files.len());

    Ok(files)
}
