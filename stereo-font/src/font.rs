//! Textured font: a [`GlyphSource`] backed by per-style rasterizers and
//! a shared glyph atlas.

use std::cell::{BorrowMutError, RefCell};
use std::rc::Rc;

use rustc_hash::FxHashMap;
use stereo_text::{FontStyle, GlyphSource, Rect, TextureId, Tile, Vec2};

use crate::atlas::GlyphAtlas;
use crate::raster::GlyphRasterizer;

/// Atlas shared by every font of one owner thread.
pub type SharedAtlas = Rc<RefCell<GlyphAtlas>>;

/// A glyph already packed into the atlas.
#[derive(Clone, Copy, Debug)]
struct CachedGlyph {
    /// Bitmap rectangle relative to the pen on the baseline.
    rect: Rect,
    uv: Rect,
    texture: TextureId,
}

/// Font serving tiles from a [`GlyphAtlas`].
///
/// The regular face is mandatory; bold, italic and bold-italic fall back
/// to it when absent. Each (style, character) is rasterized at most once.
pub struct TexturedFont<R> {
    regular: R,
    styled: [Option<R>; FontStyle::COUNT],
    atlas: SharedAtlas,
    /// `None` entries remember glyphs that could not be produced.
    cache: FxHashMap<(FontStyle, char), Option<CachedGlyph>>,
}

impl<R: GlyphRasterizer> TexturedFont<R> {
    pub fn new(regular: R, atlas: SharedAtlas) -> Self {
        Self {
            regular,
            styled: std::array::from_fn(|_| None),
            atlas,
            cache: FxHashMap::default(),
        }
    }

    /// Install the face for a non-regular style.
    pub fn with_style(mut self, style: FontStyle, face: R) -> Self {
        self.set_style(style, face);
        self
    }

    pub fn set_style(&mut self, style: FontStyle, face: R) {
        match style {
            FontStyle::Regular => self.regular = face,
            other => self.styled[other.index()] = Some(face),
        }
        self.cache.retain(|(cached, _), _| *cached != style);
    }

    /// Style whose face actually serves `style`.
    pub fn resolve(&self, style: FontStyle) -> FontStyle {
        match self.styled[style.index()] {
            Some(_) => style,
            None => FontStyle::Regular,
        }
    }

    fn face(&self, style: FontStyle) -> &R {
        self.styled[style.index()].as_ref().unwrap_or(&self.regular)
    }

    fn face_mut(&mut self, style: FontStyle) -> &mut R {
        match style {
            FontStyle::Regular => &mut self.regular,
            other => self.styled[other.index()]
                .as_mut()
                .unwrap_or(&mut self.regular),
        }
    }

    pub fn atlas(&self) -> &SharedAtlas {
        &self.atlas
    }

    /// Number of cached (style, character) entries, missing ones included.
    pub fn cached_glyphs(&self) -> usize {
        self.cache.len()
    }

    /// Forget cached glyphs, e.g. after the atlas was cleared.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    /// Rasterize and pack one glyph.
    ///
    /// `Ok(None)` is a glyph that can never be produced. An atlas borrowed
    /// elsewhere is reported as an error so the glyph is retried later.
    fn load(
        &mut self,
        style: FontStyle,
        ch: char,
    ) -> Result<Option<CachedGlyph>, BorrowMutError> {
        let Some(glyph) = self.face_mut(style).rasterize(ch) else {
            log::trace!("rasterizer has no glyph for {ch:?} ({style:?})");
            return Ok(None);
        };
        let mut atlas = self.atlas.try_borrow_mut()?;

        let left = glyph.left as f32;
        let top = glyph.top as f32;
        if glyph.is_empty() {
            return Ok(Some(CachedGlyph {
                rect: Rect::new(left, left, top, top),
                uv: Rect::default(),
                texture: atlas.current_texture(),
            }));
        }

        let Some(slot) = atlas.insert(glyph.width, glyph.height, &glyph.data) else {
            log::warn!("atlas rejected {ch:?} ({}x{})", glyph.width, glyph.height);
            return Ok(None);
        };
        Ok(Some(CachedGlyph {
            rect: Rect::new(
                left,
                left + glyph.width as f32,
                top,
                top - glyph.height as f32,
            ),
            uv: slot.uv,
            texture: slot.texture,
        }))
    }
}

impl<R: GlyphRasterizer> GlyphSource for TexturedFont<R> {
    fn advance(&mut self, ch: char, next: Option<char>, style: FontStyle) -> f32 {
        self.face_mut(style).advance(ch, next)
    }

    fn ascent(&self, style: FontStyle) -> f32 {
        self.face(style).metrics().ascender
    }

    fn line_spacing(&self, style: FontStyle) -> f32 {
        self.face(style).metrics().line_spacing
    }

    fn render_tile(&mut self, ch: char, style: FontStyle, pen: Vec2) -> Option<Tile> {
        let key = (self.resolve(style), ch);
        if !self.cache.contains_key(&key) {
            match self.load(key.0, ch) {
                Ok(glyph) => {
                    self.cache.insert(key, glyph);
                }
                Err(_) => {
                    log::warn!("glyph atlas already borrowed, skipping {ch:?}");
                    return None;
                }
            }
        }

        let glyph = self.cache.get(&key).copied().flatten()?;
        Some(Tile {
            rect: glyph.rect.translated(pen),
            uv: glyph.uv,
            texture: glyph.texture,
        })
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{FaceMetrics, RasterGlyph};

    /// Square glyphs whose size encodes the style, plus a rasterize counter.
    struct Boxes {
        size: u32,
        calls: usize,
    }

    impl Boxes {
        fn new(size: u32) -> Self {
            Self { size, calls: 0 }
        }
    }

    impl GlyphRasterizer for Boxes {
        fn metrics(&self) -> FaceMetrics {
            FaceMetrics {
                ascender: self.size as f32,
                line_spacing: self.size as f32 * 1.5,
            }
        }

        fn advance(&mut self, _ch: char, _next: Option<char>) -> f32 {
            self.size as f32 + 1.0
        }

        fn rasterize(&mut self, ch: char) -> Option<RasterGlyph> {
            self.calls += 1;
            match ch {
                '?' => None,
                '\u{200B}' => Some(RasterGlyph::default()),
                _ => Some(RasterGlyph {
                    width: self.size,
                    height: self.size,
                    left: 1,
                    top: self.size as i32,
                    data: vec![255; (self.size * self.size) as usize],
                }),
            }
        }
    }

    fn shared(page: u32) -> SharedAtlas {
        Rc::new(RefCell::new(GlyphAtlas::new(page)))
    }

    #[test]
    fn test_tile_positioned_at_pen() {
        let mut font = TexturedFont::new(Boxes::new(8), shared(64));
        let tile = font
            .render_tile('a', FontStyle::Regular, Vec2::new(10.0, 0.0))
            .unwrap();
        assert_eq!(tile.rect, Rect::new(11.0, 19.0, 8.0, 0.0));
        assert_eq!(tile.texture, TextureId(1));
    }

    #[test]
    fn test_glyph_cached_once() {
        let mut font = TexturedFont::new(Boxes::new(8), shared(64));
        let a = font.render_tile('a', FontStyle::Regular, Vec2::ZERO).unwrap();
        let b = font.render_tile('a', FontStyle::Regular, Vec2::new(20.0, 0.0)).unwrap();
        assert_eq!(font.regular.calls, 1);
        assert_eq!(a.uv, b.uv);
        assert_eq!(b.rect.left - a.rect.left, 20.0);
        assert_eq!(font.atlas().borrow().glyph_count(), 1);
    }

    #[test]
    fn test_missing_style_falls_back_to_regular() {
        let mut font = TexturedFont::new(Boxes::new(8), shared(64));
        assert_eq!(font.resolve(FontStyle::Bold), FontStyle::Regular);
        font.render_tile('a', FontStyle::Regular, Vec2::ZERO);
        font.render_tile('a', FontStyle::Bold, Vec2::ZERO);
        // bold is served by the cached regular glyph
        assert_eq!(font.regular.calls, 1);
        assert_eq!(font.ascent(FontStyle::Italic), 8.0);
    }

    #[test]
    fn test_styled_face_used() {
        let mut font = TexturedFont::new(Boxes::new(8), shared(64)).with_style(FontStyle::Bold, Boxes::new(10));
        assert_eq!(font.resolve(FontStyle::Bold), FontStyle::Bold);
        assert_eq!(font.advance('a', None, FontStyle::Bold), 11.0);
        assert_eq!(font.line_spacing(FontStyle::Bold), 15.0);
        let tile = font.render_tile('a', FontStyle::Bold, Vec2::ZERO).unwrap();
        assert_eq!(tile.rect.width(), 10.0);
    }

    #[test]
    fn test_unrenderable_glyph_cached_as_missing() {
        let mut font = TexturedFont::new(Boxes::new(8), shared(64));
        assert!(font.render_tile('?', FontStyle::Regular, Vec2::ZERO).is_none());
        assert!(font.render_tile('?', FontStyle::Regular, Vec2::ZERO).is_none());
        assert_eq!(font.regular.calls, 1);
        assert_eq!(font.cached_glyphs(), 1);
    }

    #[test]
    fn test_busy_atlas_retried_later() {
        let atlas = shared(64);
        let mut font = TexturedFont::new(Boxes::new(8), atlas.clone());
        {
            let _pages = atlas.borrow();
            assert!(font.render_tile('a', FontStyle::Regular, Vec2::ZERO).is_none());
            assert_eq!(font.cached_glyphs(), 0);
        }
        let tile = font.render_tile('a', FontStyle::Regular, Vec2::ZERO);
        assert!(tile.is_some());
        assert_eq!(font.cached_glyphs(), 1);
        assert_eq!(atlas.borrow().glyph_count(), 1);
    }

    #[test]
    fn test_zero_area_glyph_yields_zero_tile() {
        let mut font = TexturedFont::new(Boxes::new(8), shared(64));
        let tile = font
            .render_tile('\u{200B}', FontStyle::Regular, Vec2::new(5.0, 0.0))
            .unwrap();
        assert_eq!(tile.rect.width(), 0.0);
        assert_eq!(tile.rect.height(), 0.0);
        assert_eq!(font.atlas().borrow().glyph_count(), 0);
    }

    #[test]
    fn test_glyph_too_large_for_atlas() {
        let mut font = TexturedFont::new(Boxes::new(40), shared(32));
        assert!(font.render_tile('a', FontStyle::Regular, Vec2::ZERO).is_none());
    }

    #[test]
    fn test_fonts_share_atlas_pages() {
        let atlas = shared(32);
        let mut first = TexturedFont::new(Boxes::new(20), atlas.clone());
        let mut second = TexturedFont::new(Boxes::new(20), atlas.clone());
        let a = first.render_tile('a', FontStyle::Regular, Vec2::ZERO).unwrap();
        let b = second.render_tile('b', FontStyle::Regular, Vec2::ZERO).unwrap();
        // 20px glyphs: one per 32px page
        assert_eq!(a.texture, TextureId(1));
        assert_eq!(b.texture, TextureId(2));
        assert_eq!(atlas.borrow().pages().len(), 2);
    }
}
