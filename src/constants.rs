//! Constants for page geometry, PDF output and document metadata

/// Standard A4 page width in millimetres
pub const A4_WIDTH_MM: f32 = 210.0;

/// Standard A4 page height in millimetres
pub const A4_HEIGHT_MM: f32 = 297.0;

/// US Letter page width in millimetres
pub const LETTER_WIDTH_MM: f32 = 215.9;

/// US Letter page height in millimetres
pub const LETTER_HEIGHT_MM: f32 = 279.4;

/// Default page margin in millimetres
pub const DEFAULT_MARGIN_MM: f32 = 10.0;

/// PDF points per millimetre (72 points per inch, 25.4 mm per inch)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// PDF version written into the file header
pub const PDF_VERSION: &str = "1.5";

/// Resource name under which the page's image XObject is registered
pub const IMAGE_RESOURCE_NAME: &str = "Im1";

/// Prefix of the document title; the source file name is appended
pub const TITLE_PREFIX: &str = "Converted image: ";

/// Default value of the document's Author entry
pub const DEFAULT_AUTHOR: &str = "Image to PDF Converter";

/// Name of the output directory created next to the scanned images
pub const DEFAULT_OUTPUT_DIR: &str = "pdf";

/// Extension given to every generated document
pub const PDF_EXTENSION: &str = "pdf";
