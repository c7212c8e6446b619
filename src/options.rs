//! Page setup and document options for a conversion

use crate::Result;
use crate::constants::*;
use crate::error::ConvertError;

/// Page dimensions in millimetres, portrait orientation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

impl PageSize {
    /// Create a page size from millimetre dimensions
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// ISO A4, 210 x 297 mm
    pub fn a4() -> Self {
        Self::new(A4_WIDTH_MM, A4_HEIGHT_MM)
    }

    /// US Letter, 8.5 x 11 in
    pub fn letter() -> Self {
        Self::new(LETTER_WIDTH_MM, LETTER_HEIGHT_MM)
    }

    /// Width in PDF points
    pub fn width_pt(&self) -> f32 {
        self.width * POINTS_PER_MM
    }

    /// Height in PDF points
    pub fn height_pt(&self) -> f32 {
        self.height * POINTS_PER_MM
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::a4()
    }
}

/// Where the image sits vertically on the page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalPlacement {
    /// Top edge on the top margin
    Top,
    /// Equal space above and below
    Center,
}

impl Default for VerticalPlacement {
    fn default() -> Self {
        Self::Top
    }
}

/// How the image is scaled into the printable area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMode {
    /// Span the full width between the margins; tall images may run off the page
    Width,
    /// Shrink further when needed so the whole image stays inside the margins
    Page,
}

impl Default for FitMode {
    fn default() -> Self {
        Self::Width
    }
}

/// Options applied to every generated document
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    pub page_size: PageSize,
    /// Margin on every side, in millimetres
    pub margin: f32,
    pub placement: VerticalPlacement,
    pub fit: FitMode,
    /// Value of the document's Author entry
    pub author: String,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            page_size: PageSize::a4(),
            margin: DEFAULT_MARGIN_MM,
            placement: VerticalPlacement::Top,
            fit: FitMode::Width,
            author: DEFAULT_AUTHOR.to_string(),
        }
    }
}

impl ConvertOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page_size(mut self, page_size: PageSize) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn with_margin(mut self, margin: f32) -> Self {
        self.margin = margin;
        self
    }

    pub fn with_placement(mut self, placement: VerticalPlacement) -> Self {
        self.placement = placement;
        self
    }

    pub fn with_fit(mut self, fit: FitMode) -> Self {
        self.fit = fit;
        self
    }

    pub fn with_author<S: Into<String>>(mut self, author: S) -> Self {
        self.author = author.into();
        self
    }

    /// Check that the margins leave a printable area on the page
    pub fn validate(&self) -> Result<()> {
        let PageSize { width, height } = self.page_size;
        if !(width > 0.0 && height > 0.0) {
            return Err(ConvertError::InvalidOptions(format!(
                "page size {width}x{height}mm is not positive"
            )));
        }

        if !(self.margin >= 0.0) {
            return Err(ConvertError::InvalidOptions(format!(
                "margin {}mm must not be negative",
                self.margin
            )));
        }

        if 2.0 * self.margin >= width.min(height) {
            return Err(ConvertError::InvalidOptions(format!(
                "margin {}mm leaves no printable area on a {width}x{height}mm page",
                self.margin
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_a4_with_ten_mm_margin() {
        let options = ConvertOptions::default();
        assert_eq!(options.page_size, PageSize::a4());
        assert_eq!(options.margin, 10.0);
        assert_eq!(options.placement, VerticalPlacement::Top);
        assert_eq!(options.fit, FitMode::Width);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_a4_in_points() {
        let a4 = PageSize::a4();
        assert!((a4.width_pt() - 595.28).abs() < 0.01);
        assert!((a4.height_pt() - 841.89).abs() < 0.01);
    }

    #[test]
    fn test_validation_rejects_oversized_margin() {
        assert!(ConvertOptions::new().with_margin(105.0).validate().is_err());
        assert!(ConvertOptions::new().with_margin(-1.0).validate().is_err());
        assert!(ConvertOptions::new().with_margin(f32::NAN).validate().is_err());
        assert!(ConvertOptions::new().with_margin(0.0).validate().is_ok());
    }
}
