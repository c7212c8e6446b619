//! PDF drawing operations for image pages

use crate::Result;
use crate::codec::ImageXObject;
use crate::constants::IMAGE_RESOURCE_NAME;
use crate::layout::{PageLayout, PdfRect};
use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tracing::{debug, instrument, trace};

/// Extension trait for lopdf::Document to add pages holding a single image
pub trait ImagePageDrawing {
    /// Add a page showing `image` at the rectangle described by `layout`
    ///
    /// # Arguments
    /// * `pages_id` - The object ID of the page tree node the page joins
    /// * `image` - The image XObject (and optional soft mask) to embed
    /// * `layout` - Page size and image placement
    ///
    /// # Returns
    /// The object ID of the new page
    fn add_image_page(
        &mut self,
        pages_id: ObjectId,
        image: ImageXObject,
        layout: &PageLayout,
    ) -> Result<ObjectId>;
}

impl ImagePageDrawing for Document {
    #[instrument(skip(self, image, layout))]
    fn add_image_page(
        &mut self,
        pages_id: ObjectId,
        image: ImageXObject,
        layout: &PageLayout,
    ) -> Result<ObjectId> {
        let ImageXObject {
            image: mut image_stream,
            soft_mask,
        } = image;

        if let Some(mut mask) = soft_mask {
            mask.compress()?;
            let mask_id = self.add_object(mask);
            image_stream.dict.set("SMask", mask_id);
        }

        // a no-op for streams that already carry a filter, such as DCT data
        image_stream.compress()?;
        let image_id = self.add_object(image_stream);

        let rect = layout.to_pdf_rect();
        debug!("Placing image at {:?}", rect);

        let content = Content {
            operations: image_operations(IMAGE_RESOURCE_NAME, rect),
        };
        let content_id = self.add_object(Stream::new(dictionary! {}, content.encode()?));

        let media_box: Vec<Object> = vec![
            Object::Integer(0),
            Object::Integer(0),
            Object::Real(layout.page.width_pt()),
            Object::Real(layout.page.height_pt()),
        ];

        let page_id = self.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => media_box,
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! {
                    IMAGE_RESOURCE_NAME => image_id,
                },
            },
        });

        // Add page to pages
        if let Ok(Object::Dictionary(pages)) = self.get_object_mut(pages_id) {
            let count = match pages.get_mut(b"Kids") {
                Ok(Object::Array(kids)) => {
                    kids.push(page_id.into());
                    kids.len()
                }
                _ => {
                    pages.set("Kids", vec![Object::from(page_id)]);
                    1
                }
            };
            pages.set("Count", Object::Integer(count as i64));
        }

        trace!("Added page {:?} with image {:?}", page_id, image_id);
        Ok(page_id)
    }
}

/// Content stream operations that paint the named XObject into `rect`
pub fn image_operations(resource_name: &str, rect: PdfRect) -> Vec<Operation> {
    vec![
        Operation::new("q", vec![]),
        Operation::new(
            "cm",
            vec![
                rect.width.into(),
                Object::Real(0.0),
                Object::Real(0.0),
                rect.height.into(),
                rect.x.into(),
                rect.y.into(),
            ],
        ),
        Operation::new(
            "Do",
            vec![Object::Name(resource_name.as_bytes().to_vec())],
        ),
        Operation::new("Q", vec![]),
    ]
}
