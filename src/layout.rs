//! Layout calculation for placing an image on a page

use crate::constants::POINTS_PER_MM;
use crate::options::{ConvertOptions, FitMode, PageSize, VerticalPlacement};
use thiserror::Error;
use tracing::{debug, trace};

/// Placement of the image on the page.
///
/// All values are millimetres measured from the top-left corner of the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageLayout {
    pub page: PageSize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

/// A rectangle in PDF user space (points, origin at the bottom-left)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Reasons an image size cannot be laid out
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("image has zero {0}")]
    ZeroDimension(&'static str),

    #[error("margin {margin}mm leaves no printable width on a {page_width}mm page")]
    NoPrintableArea { margin: f32, page_width: f32 },
}

impl PageLayout {
    /// Ratio of the placed rectangle, equal to the source image's ratio
    pub fn aspect_ratio(&self) -> f32 {
        self.width / self.height
    }

    /// Convert to PDF coordinates for the `cm` operator
    pub fn to_pdf_rect(&self) -> PdfRect {
        PdfRect {
            x: self.x * POINTS_PER_MM,
            y: (self.page.height - self.y - self.height) * POINTS_PER_MM,
            width: self.width * POINTS_PER_MM,
            height: self.height * POINTS_PER_MM,
        }
    }
}

/// Calculate where an image of `width` x `height` pixels goes on the page
pub fn calculate_layout(
    width: u32,
    height: u32,
    options: &ConvertOptions,
) -> Result<PageLayout, LayoutError> {
    if width == 0 {
        return Err(LayoutError::ZeroDimension("width"));
    }
    if height == 0 {
        return Err(LayoutError::ZeroDimension("height"));
    }

    let page = options.page_size;
    let margin = options.margin;
    let ratio = width as f32 / height as f32;

    debug!("Laying out {}x{} px image (ratio {:.4})", width, height, ratio);

    let printable_width = page.width - 2.0 * margin;
    if printable_width <= 0.0 {
        return Err(LayoutError::NoPrintableArea {
            margin,
            page_width: page.width,
        });
    }

    let mut content_width = printable_width;
    let mut content_height = content_width / ratio;
    let mut x = margin;

    if options.fit == FitMode::Page {
        let printable_height = page.height - 2.0 * margin;
        if content_height > printable_height {
            content_height = printable_height;
            content_width = content_height * ratio;
            x = (page.width - content_width) / 2.0;
        }
    }

    let y = match options.placement {
        VerticalPlacement::Top => margin,
        VerticalPlacement::Center => (page.height - content_height) / 2.0,
    };

    trace!(
        "Layout calculated: {}x{}mm at ({}, {})",
        content_width, content_height, x, y
    );

    Ok(PageLayout {
        page,
        x,
        y,
        width: content_width,
        height: content_height,
        margin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn test_layout_spans_printable_width() {
        let layout = calculate_layout(100, 50, &ConvertOptions::default()).unwrap();

        assert!((layout.width - 190.0).abs() < EPSILON);
        assert!((layout.height - 95.0).abs() < EPSILON);
        assert_eq!(layout.x, 10.0);
        assert_eq!(layout.y, 10.0);
        assert_eq!(layout.margin, 10.0);
    }

    #[test]
    fn test_aspect_ratio_preserved() {
        let sizes = [(1, 1), (100, 50), (50, 100), (4000, 3000), (7, 1900), (1920, 1)];
        for fit in [FitMode::Width, FitMode::Page] {
            let options = ConvertOptions::default().with_fit(fit);
            for (w, h) in sizes {
                let layout = calculate_layout(w, h, &options).unwrap();
                let expected = w as f32 / h as f32;
                let relative = (layout.aspect_ratio() - expected).abs() / expected;
                assert!(relative < 1e-4, "{w}x{h} with {fit:?}: {layout:?}");
            }
        }
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let options = ConvertOptions::default();
        assert_eq!(
            calculate_layout(10, 0, &options),
            Err(LayoutError::ZeroDimension("height"))
        );
        assert_eq!(
            calculate_layout(0, 10, &options),
            Err(LayoutError::ZeroDimension("width"))
        );
    }

    #[test]
    fn test_centered_placement() {
        let options = ConvertOptions::default().with_placement(VerticalPlacement::Center);
        let layout = calculate_layout(100, 50, &options).unwrap();

        let above = layout.y;
        let below = layout.page.height - layout.y - layout.height;
        assert!((above - below).abs() < EPSILON);
        assert!((above - 101.0).abs() < EPSILON);
    }

    #[test]
    fn test_fit_page_keeps_tall_images_inside_margins() {
        let options = ConvertOptions::default().with_fit(FitMode::Page);
        let layout = calculate_layout(50, 100, &options).unwrap();

        assert!((layout.height - 277.0).abs() < EPSILON);
        assert!((layout.width - 138.5).abs() < EPSILON);
        assert!((layout.x - 35.75).abs() < EPSILON);
        assert!(layout.y + layout.height <= layout.page.height - layout.margin + EPSILON);
    }

    #[test]
    fn test_fit_width_lets_tall_images_overflow() {
        let layout = calculate_layout(50, 100, &ConvertOptions::default()).unwrap();
        assert!((layout.width - 190.0).abs() < EPSILON);
        assert!((layout.height - 380.0).abs() < EPSILON);
    }

    #[test]
    fn test_pdf_rect_flips_vertical_axis() {
        let layout = calculate_layout(100, 50, &ConvertOptions::default()).unwrap();
        let rect = layout.to_pdf_rect();

        // top margin of 10mm, 95mm tall: bottom edge sits 192mm above the page bottom
        assert!((rect.y - 192.0 * POINTS_PER_MM).abs() < 0.01);
        assert!((rect.x - 10.0 * POINTS_PER_MM).abs() < 0.01);
        assert!((rect.width - 190.0 * POINTS_PER_MM).abs() < 0.01);
    }
}
