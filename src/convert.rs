//! Conversion of a single image file into a one-page PDF

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::{Document, Object, dictionary};
use tracing::{debug, instrument, trace, warn};

use crate::Result;
use crate::codec::{CodecRegistry, ImageCodec, ImageInfo};
use crate::constants::*;
use crate::drawing::ImagePageDrawing;
use crate::error::ConvertError;
use crate::layout::{PageLayout, calculate_layout};
use crate::options::ConvertOptions;
use crate::scan::ImageFileRef;

/// Turns image files into single-page PDF documents
#[derive(Debug)]
pub struct Converter {
    registry: CodecRegistry,
    options: ConvertOptions,
}

impl Converter {
    /// Create a converter, rejecting options that leave no printable area
    pub fn new(registry: CodecRegistry, options: ConvertOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self { registry, options })
    }

    pub fn registry(&self) -> &CodecRegistry {
        &self.registry
    }

    pub fn options(&self) -> &ConvertOptions {
        &self.options
    }

    /// Where the document for `file` is written inside `output_dir`
    pub fn output_path(file: &ImageFileRef, output_dir: &Path) -> PathBuf {
        output_dir.join(format!("{}.{}", file.stem(), PDF_EXTENSION))
    }

    /// Convert one image and write `<output_dir>/<stem>.pdf`.
    ///
    /// `output_dir` is created when missing. Returns the path written.
    #[instrument(skip(self, file, output_dir), fields(file = %file.file_name))]
    pub fn convert(&self, file: &ImageFileRef, output_dir: &Path) -> Result<PathBuf> {
        let bytes = fs::read(&file.path).map_err(|e| ConvertError::io(&file.path, e))?;
        trace!("Read {} bytes", bytes.len());

        let mut doc = self.build_document(file, &bytes)?;

        fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;
        let pdf_path = Self::output_path(file, output_dir);
        write_document(&mut doc, &pdf_path)?;

        debug!("Wrote {}", pdf_path.display());
        Ok(pdf_path)
    }

    /// Build the in-memory document for an image without touching the disk
    pub fn build_document(&self, file: &ImageFileRef, bytes: &[u8]) -> Result<Document> {
        let (codec, info) = self.probe(file, bytes)?;

        let layout = self.layout_for(file, &info)?;
        let xobject = codec
            .to_xobject(bytes, &info)
            .map_err(|e| ConvertError::from_image(&file.path, e))?;

        let mut doc = Document::with_version(PDF_VERSION);
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => Vec::<Object>::new(),
            "Count" => 0,
        });
        doc.add_image_page(pages_id, xobject, &layout)?;

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let info_id = doc.add_object(dictionary! {
            "Title" => lopdf::text_string(&format!("{TITLE_PREFIX}{}", file.file_name)),
            "Author" => lopdf::text_string(&self.options.author),
            "Producer" => lopdf::text_string(concat!("img2pdf ", env!("CARGO_PKG_VERSION"))),
        });
        doc.trailer.set("Info", info_id);

        Ok(doc)
    }

    /// Header-only decode, using the format found in the file's magic bytes
    /// when it disagrees with the extension
    fn probe(&self, file: &ImageFileRef, bytes: &[u8]) -> Result<(&dyn ImageCodec, ImageInfo)> {
        if bytes.is_empty() {
            return Err(ConvertError::invalid_image(&file.path, "file is empty"));
        }

        let format = match crate::codec::ImageFormat::sniff(bytes) {
            Some(sniffed) if sniffed != file.format => {
                warn!(
                    "{} has a {} extension but contains {} data",
                    file.file_name, file.format, sniffed
                );
                sniffed
            }
            _ => file.format,
        };

        let codec = self.registry.get(format).ok_or_else(|| {
            ConvertError::unsupported(&file.path, format!("no codec registered for {format}"))
        })?;

        let info = codec
            .probe(bytes)
            .map_err(|e| ConvertError::from_image(&file.path, e))?;
        debug!(
            "{} header: {}x{} {:?}",
            info.format, info.width, info.height, info.color
        );

        Ok((codec, info))
    }

    fn layout_for(&self, file: &ImageFileRef, info: &ImageInfo) -> Result<PageLayout> {
        calculate_layout(info.width, info.height, &self.options)
            .map_err(|e| ConvertError::invalid_image(&file.path, e.to_string()))
    }
}

/// Serialize `doc` to `path`; the file handle is closed on every path
fn write_document(doc: &mut Document, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| ConvertError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    doc.save_to(&mut writer)
        .and_then(|_| writer.flush())
        .map_err(|e| ConvertError::io(path, e))
}
