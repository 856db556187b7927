//! Glyph rasterizer seam between textured fonts and a font backend.

/// Vertical metrics of one face at its configured size.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FaceMetrics {
    /// Baseline distance from the top of a line.
    pub ascender: f32,
    /// Baseline-to-baseline distance.
    pub line_spacing: f32,
}

/// A rasterized glyph bitmap positioned relative to its origin.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RasterGlyph {
    pub width: u32,
    pub height: u32,
    /// Offset from the pen to the bitmap's left edge.
    pub left: i32,
    /// Offset from the baseline up to the bitmap's top edge.
    pub top: i32,
    /// Alpha (1 byte/pixel) or RGBA (4 bytes/pixel), rows top to bottom.
    pub data: Vec<u8>,
}

impl RasterGlyph {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Produces metrics and bitmaps for a single face (family + style).
pub trait GlyphRasterizer {
    fn metrics(&self) -> FaceMetrics;

    /// Pen advance for `ch`, kerned against `next` when given.
    fn advance(&mut self, ch: char, next: Option<char>) -> f32;

    /// Bitmap for `ch`, or `None` when the face cannot render it.
    fn rasterize(&mut self, ch: char) -> Option<RasterGlyph>;
}

impl<R: GlyphRasterizer + ?Sized> GlyphRasterizer for Box<R> {
    fn metrics(&self) -> FaceMetrics {
        (**self).metrics()
    }

    fn advance(&mut self, ch: char, next: Option<char>) -> f32 {
        (**self).advance(ch, next)
    }

    fn rasterize(&mut self, ch: char) -> Option<RasterGlyph> {
        (**self).rasterize(ch)
    }
}
