//! Image codecs and the registry that maps formats to them
//!
//! A codec knows how to read an image header without decoding pixels and how
//! to turn the encoded bytes into a PDF image XObject. The set of formats the
//! tool accepts is exactly the set of codecs registered in a
//! [`CodecRegistry`]; the scanner asks the registry which extensions to keep.

use std::fmt;
use std::io::Cursor;

use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
use image::{ExtendedColorType, ImageDecoder, ImageError, ImageResult};
use lopdf::{Object, Stream, dictionary};
use tracing::{debug, trace};

/// Image formats the converter can embed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageFormat {
    Jpeg,
    Png,
    WebP,
}

impl ImageFormat {
    /// File extensions (lowercase, without the dot) for this format
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Jpeg => &["jpg", "jpeg"],
            Self::Png => &["png"],
            Self::WebP => &["webp"],
        }
    }

    /// Look up a format by file extension, ignoring case
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.to_ascii_lowercase();
        [Self::Jpeg, Self::Png, Self::WebP]
            .into_iter()
            .find(|format| format.extensions().contains(&ext.as_str()))
    }

    /// Identify the format from the leading magic bytes
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        match image::guess_format(bytes).ok()? {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    fn as_image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::WebP => image::ImageFormat::WebP,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
            Self::WebP => "WEBP",
        };
        f.write_str(name)
    }
}

/// What a header-only decode reveals about an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageInfo {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    pub color: ExtendedColorType,
}

/// Image XObject streams ready to be added to a document
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub image: Stream,
    /// Alpha channel as a separate greyscale image, if the source had one
    pub soft_mask: Option<Stream>,
}

/// Decoder capability for one image format.
///
/// Implementations must be `Send + Sync` so a registry can be shared.
pub trait ImageCodec: Send + Sync {
    /// The format this codec handles
    fn format(&self) -> ImageFormat;

    /// Read dimensions and colour type from the header only
    fn probe(&self, bytes: &[u8]) -> ImageResult<ImageInfo>;

    /// Build the image XObject for the encoded `bytes`
    fn to_xobject(&self, bytes: &[u8], info: &ImageInfo) -> ImageResult<ImageXObject>;
}

/// JPEG codec: the DCT data is embedded as-is
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegCodec;

impl JpegCodec {
    fn color_space(color: ExtendedColorType) -> ImageResult<&'static str> {
        match color {
            ExtendedColorType::L8 => Ok("DeviceGray"),
            ExtendedColorType::Rgb8 => Ok("DeviceRGB"),
            ExtendedColorType::Cmyk8 => Ok("DeviceCMYK"),
            other => Err(unsupported_color(ImageFormat::Jpeg, other)),
        }
    }
}

impl ImageCodec for JpegCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Jpeg
    }

    fn probe(&self, bytes: &[u8]) -> ImageResult<ImageInfo> {
        let decoder = image::codecs::jpeg::JpegDecoder::new(Cursor::new(bytes))?;
        let (width, height) = decoder.dimensions();
        let color = decoder.original_color_type();
        Self::color_space(color)?;

        Ok(ImageInfo {
            format: ImageFormat::Jpeg,
            width,
            height,
            color,
        })
    }

    fn to_xobject(&self, bytes: &[u8], info: &ImageInfo) -> ImageResult<ImageXObject> {
        let color_space = Self::color_space(info.color)?;
        let mut image = image_stream(info.width, info.height, color_space, bytes.to_vec());
        image.dict.set("Filter", "DCTDecode");

        // Adobe CMYK JPEGs store inverted components
        if info.color == ExtendedColorType::Cmyk8 && has_adobe_marker(bytes) {
            let decode: Vec<Object> = [1, 0, 1, 0, 1, 0, 1, 0]
                .into_iter()
                .map(Object::Integer)
                .collect();
            image.dict.set("Decode", decode);
        }

        trace!("Passing through {} bytes of DCT data", bytes.len());
        Ok(ImageXObject {
            image,
            soft_mask: None,
        })
    }
}

/// PNG codec: pixels are decoded and stored losslessly
#[derive(Debug, Default, Clone, Copy)]
pub struct PngCodec;

impl ImageCodec for PngCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::Png
    }

    fn probe(&self, bytes: &[u8]) -> ImageResult<ImageInfo> {
        let decoder = image::codecs::png::PngDecoder::new(Cursor::new(bytes))?;
        let (width, height) = decoder.dimensions();

        Ok(ImageInfo {
            format: ImageFormat::Png,
            width,
            height,
            color: decoder.original_color_type(),
        })
    }

    fn to_xobject(&self, bytes: &[u8], _info: &ImageInfo) -> ImageResult<ImageXObject> {
        raster_xobject(ImageFormat::Png, bytes)
    }
}

/// WebP codec: pixels are decoded and stored losslessly
#[cfg(feature = "webp")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WebPCodec;

#[cfg(feature = "webp")]
impl ImageCodec for WebPCodec {
    fn format(&self) -> ImageFormat {
        ImageFormat::WebP
    }

    fn probe(&self, bytes: &[u8]) -> ImageResult<ImageInfo> {
        let decoder = image::codecs::webp::WebPDecoder::new(Cursor::new(bytes))?;
        let (width, height) = decoder.dimensions();

        Ok(ImageInfo {
            format: ImageFormat::WebP,
            width,
            height,
            color: decoder.original_color_type(),
        })
    }

    fn to_xobject(&self, bytes: &[u8], _info: &ImageInfo) -> ImageResult<ImageXObject> {
        raster_xobject(ImageFormat::WebP, bytes)
    }
}

/// Whether the JPEG carries an Adobe APP14 segment before its scan data
fn has_adobe_marker(bytes: &[u8]) -> bool {
    if !bytes.starts_with(&[0xFF, 0xD8]) {
        return false;
    }

    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return false;
        }
        let marker = bytes[pos + 1];
        match marker {
            // fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            // standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // start of scan: headers are over
            0xDA | 0xD9 => return false,
            _ => {}
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        if length < 2 {
            return false;
        }
        let segment = &bytes[(pos + 4).min(bytes.len())..(pos + 2 + length).min(bytes.len())];
        if marker == 0xEE && segment.starts_with(b"Adobe") {
            return true;
        }
        pos += 2 + length;
    }

    false
}

fn image_stream(width: u32, height: u32, color_space: &str, content: Vec<u8>) -> Stream {
    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => color_space,
            "BitsPerComponent" => 8,
        },
        content,
    )
}

/// Decode to 8-bit samples; PDF has no native PNG or WebP container
fn raster_xobject(format: ImageFormat, bytes: &[u8]) -> ImageResult<ImageXObject> {
    let img = image::load_from_memory_with_format(bytes, format.as_image_format())?;
    let (width, height) = (img.width(), img.height());
    let color = img.color();

    debug!("Decoded {} image {}x{} ({:?})", format, width, height, color);

    let image = if color.has_color() {
        image_stream(width, height, "DeviceRGB", img.to_rgb8().into_raw())
    } else {
        image_stream(width, height, "DeviceGray", img.to_luma8().into_raw())
    };

    let soft_mask = color.has_alpha().then(|| {
        let alpha: Vec<u8> = img.to_rgba8().pixels().map(|p| p[3]).collect();
        image_stream(width, height, "DeviceGray", alpha)
    });

    Ok(ImageXObject { image, soft_mask })
}

fn unsupported_color(format: ImageFormat, color: ExtendedColorType) -> ImageError {
    ImageError::Unsupported(UnsupportedError::from_format_and_kind(
        ImageFormatHint::Exact(format.as_image_format()),
        UnsupportedErrorKind::Color(color),
    ))
}

/// Mapping from image format to the codec that handles it
pub struct CodecRegistry {
    codecs: Vec<Box<dyn ImageCodec>>,
}

impl CodecRegistry {
    /// Create an empty registry that accepts no formats
    pub fn new() -> Self {
        Self { codecs: Vec::new() }
    }

    /// Registry with every codec compiled into this build
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(JpegCodec));
        registry.register(Box::new(PngCodec));
        #[cfg(feature = "webp")]
        registry.register(Box::new(WebPCodec));
        registry
    }

    /// Register a codec, replacing any codec already registered for its format
    pub fn register(&mut self, codec: Box<dyn ImageCodec>) {
        let format = codec.format();
        self.codecs.retain(|c| c.format() != format);
        self.codecs.push(codec);
    }

    /// Remove the codec for `format`; returns whether one was registered
    pub fn unregister(&mut self, format: ImageFormat) -> bool {
        let before = self.codecs.len();
        self.codecs.retain(|c| c.format() != format);
        self.codecs.len() != before
    }

    /// Builder-style [`CodecRegistry::unregister`]
    pub fn without(mut self, format: ImageFormat) -> Self {
        self.unregister(format);
        self
    }

    pub fn get(&self, format: ImageFormat) -> Option<&dyn ImageCodec> {
        self.codecs
            .iter()
            .find(|c| c.format() == format)
            .map(|c| c.as_ref())
    }

    pub fn supports(&self, format: ImageFormat) -> bool {
        self.get(format).is_some()
    }

    /// Registered format for a file extension, ignoring case
    pub fn format_for_extension(&self, ext: &str) -> Option<ImageFormat> {
        ImageFormat::from_extension(ext).filter(|format| self.supports(*format))
    }

    /// Registered formats in a stable order
    pub fn formats(&self) -> Vec<ImageFormat> {
        let mut formats: Vec<_> = self.codecs.iter().map(|c| c.format()).collect();
        formats.sort();
        formats
    }

    /// Every accepted extension, lowercase, without the dot
    pub fn extensions(&self) -> Vec<&'static str> {
        self.formats()
            .into_iter()
            .flat_map(|format| format.extensions().iter().copied())
            .collect()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("formats", &self.formats())
            .finish()
    }
}
