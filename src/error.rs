//! Error types for the img2pdf library
//!
//! [`ConvertError`] covers both scan-level failures (the source directory
//! cannot be listed, which aborts a batch) and per-file failures (which the
//! batch runner logs and skips). [`ErrorKind`] is the coarse classification
//! printed next to every failed file.

use std::fmt;
use std::path::{Path, PathBuf};

use image::ImageError;
use thiserror::Error;

/// Result type alias using ConvertError
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Errors that can occur while scanning for or converting images
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Reading a directory or file, or writing a document, failed
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The image header was readable but describes something we cannot embed
    #[error("unsupported image '{}': {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    /// The image is empty, truncated, corrupt or has a degenerate size
    #[error("invalid image '{}': {reason}", path.display())]
    InvalidImage { path: PathBuf, reason: String },

    /// Error from the underlying lopdf library
    #[error("PDF operation failed: {0}")]
    PdfError(#[from] lopdf::Error),

    /// Conversion options that cannot produce a usable page
    #[error("Invalid options: {0}")]
    InvalidOptions(String),
}

/// Coarse classification of a [`ConvertError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    UnsupportedFormat,
    InvalidImage,
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Io => "IOError",
            Self::UnsupportedFormat => "UnsupportedFormatError",
            Self::InvalidImage => "InvalidImageError",
            Self::Config => "ConfigError",
        };
        f.write_str(name)
    }
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalid_image(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn unsupported(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Classify a decoder error for the file at `path`.
    ///
    /// Anything the decoder explicitly refuses (unknown colour type, bit
    /// depth, size limits) is unsupported; everything else, including an
    /// unexpected end of file, means the data itself is bad.
    pub fn from_image(path: &Path, err: ImageError) -> Self {
        match err {
            ImageError::Unsupported(e) => Self::unsupported(path, e.to_string()),
            ImageError::Limits(e) => Self::unsupported(path, e.to_string()),
            other => Self::invalid_image(path, other.to_string()),
        }
    }

    /// The classification reported to the user
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io { .. } | Self::PdfError(_) => ErrorKind::Io,
            Self::UnsupportedFormat { .. } => ErrorKind::UnsupportedFormat,
            Self::InvalidImage { .. } => ErrorKind::InvalidImage,
            Self::InvalidOptions(_) => ErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::error::{
        DecodingError, ImageFormatHint, UnsupportedError, UnsupportedErrorKind,
    };

    #[test]
    fn test_image_error_classification() {
        let path = Path::new("x.png");

        let unsupported = ImageError::Unsupported(UnsupportedError::from_format_and_kind(
            ImageFormatHint::Exact(image::ImageFormat::Png),
            UnsupportedErrorKind::GenericFeature("interlacing".into()),
        ));
        assert_eq!(
            ConvertError::from_image(path, unsupported).kind(),
            ErrorKind::UnsupportedFormat
        );

        let corrupt = ImageError::Decoding(DecodingError::new(
            ImageFormatHint::Exact(image::ImageFormat::Png),
            "bad checksum",
        ));
        assert_eq!(
            ConvertError::from_image(path, corrupt).kind(),
            ErrorKind::InvalidImage
        );

        let truncated = ImageError::IoError(std::io::ErrorKind::UnexpectedEof.into());
        assert_eq!(
            ConvertError::from_image(path, truncated).kind(),
            ErrorKind::InvalidImage
        );
    }

    #[test]
    fn test_messages_name_the_file() {
        let err = ConvertError::invalid_image("photos/a.jpg", "zero height");
        assert_eq!(err.to_string(), "invalid image 'photos/a.jpg': zero height");
        assert_eq!(err.kind().to_string(), "InvalidImageError");
    }
}
