/// Represents a card aspect ratio (horizontal:vertical)
/// For a portrait ISO/IEC 7810 ID-1 card this is 54:85 (millimetres)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardRatio {
    pub horizontal: f64,
    pub vertical: f64,
}

impl CardRatio {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self { horizontal, vertical }
    }

    /// Width divided by height
    pub fn value(&self) -> f64 {
        self.horizontal / self.vertical
    }

    /// Largest extent with this ratio that fits inside `width` x `height`.
    ///
    /// A region wider than the ratio loses width, a taller one loses height.
    pub fn constrain(&self, width: f64, height: f64) -> (f64, f64) {
        let ratio = self.value();
        if width / height > ratio {
            (height * ratio, height)
        } else {
            (width, width / ratio)
        }
    }
}

impl Default for CardRatio {
    fn default() -> Self {
        Self::new(54.0, 85.0)
    }
}

/// How the located box is mapped onto the output canvas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CropPolicy {
    /// Stretch the whole box to fill the canvas
    #[default]
    Stretch,
    /// Shrink the box about its centre to the card ratio first
    ConstrainAspect,
}

/// Axis-aligned crop region over a raster.
///
/// Covers the half-open ranges `[min_x, max_x)` and `[min_y, max_y)`. A box
/// with `max_x <= min_x` or `max_y <= min_y` is degenerate and must not be
/// cropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

impl BoundingBox {
    pub fn new(min_x: u32, min_y: u32, max_x: u32, max_y: u32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The box covering a whole `width` x `height` raster
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// The inverted box a scan starts from before any edge is seen
    pub fn inverted(width: u32, height: u32) -> Self {
        Self::new(width, height, 0, 0)
    }

    pub fn width(&self) -> u32 {
        self.max_x.saturating_sub(self.min_x)
    }

    pub fn height(&self) -> u32 {
        self.max_y.saturating_sub(self.min_y)
    }

    /// True only for the box left by a scan that saw no edge at all
    pub fn is_inverted(&self) -> bool {
        self.max_x < self.min_x && self.max_y < self.min_y
    }

    pub fn is_degenerate(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    /// Whether the box lies inside a `width` x `height` raster
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.max_x <= width && self.max_y <= height
    }

    /// Grow the box by `padding` on every side, clamped to the raster extents
    pub fn pad_and_clamp(&self, padding: u32, width: u32, height: u32) -> Self {
        Self {
            min_x: self.min_x.saturating_sub(padding),
            min_y: self.min_y.saturating_sub(padding),
            max_x: self.max_x.saturating_add(padding).min(width),
            max_y: self.max_y.saturating_add(padding).min(height),
        }
    }

    /// Shrink the box about its centre so its extent matches `ratio`
    pub fn constrain_to(&self, ratio: &CardRatio) -> Self {
        if self.is_degenerate() {
            return *self;
        }

        let (width, height) = (self.width() as f64, self.height() as f64);
        let (new_width, new_height) = ratio.constrain(width, height);
        let new_width = (new_width.round() as u32).clamp(1, self.width());
        let new_height = (new_height.round() as u32).clamp(1, self.height());

        let min_x = self.min_x + (self.width() - new_width) / 2;
        let min_y = self.min_y + (self.height() - new_height) / 2;

        Self::new(min_x, min_y, min_x + new_width, min_y + new_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_ratio_value() {
        let ratio = CardRatio::default();
        assert!((ratio.value() - 0.6353).abs() < 0.001);
    }

    #[test]
    fn test_constrain_wide_region() {
        let ratio = CardRatio::new(1.0, 2.0);
        let (w, h) = ratio.constrain(400.0, 100.0);
        assert!((w - 50.0).abs() < 1e-9);
        assert!((h - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_constrain_tall_region() {
        let ratio = CardRatio::new(1.0, 2.0);
        let (w, h) = ratio.constrain(100.0, 400.0);
        assert!((w - 100.0).abs() < 1e-9);
        assert!((h - 200.0).abs() < 1e-9);
    }

    #[test]
    fn test_inverted_box_is_degenerate() {
        let bounds = BoundingBox::inverted(100, 80);
        assert!(bounds.is_degenerate());
        assert_eq!(bounds.width(), 0);
        assert!(bounds.is_inverted());
        assert!(!BoundingBox::full_frame(100, 80).is_degenerate());
    }

    #[test]
    fn test_unpadded_single_column_is_empty_not_inverted() {
        // Edges only in column 7, rows 3..=9, with no padding
        let bounds = BoundingBox::new(7, 3, 7, 9).pad_and_clamp(0, 20, 20);
        assert_eq!(bounds.width(), 0);
        assert!(bounds.is_degenerate());
        assert!(!bounds.is_inverted());
    }

    #[test]
    fn test_pad_and_clamp_small_raster() {
        let bounds = BoundingBox::new(2, 2, 2, 2).pad_and_clamp(10, 5, 5);
        assert_eq!(bounds, BoundingBox::full_frame(5, 5));
    }

    #[test]
    fn test_constrain_box_centres_region() {
        let bounds = BoundingBox::new(0, 0, 200, 100).constrain_to(&CardRatio::new(1.0, 1.0));
        assert_eq!(bounds, BoundingBox::new(50, 0, 150, 100));
    }
}
