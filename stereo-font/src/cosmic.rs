//! `cosmic-text` backend: shapes and rasterizes glyphs for one face.
//!
//! All rasterizers of an owner thread share one [`CosmicContext`]
//! (`FontSystem` for discovery and shaping, `SwashCache` for bitmaps).
//! Advances are measured by shaping the character together with its
//! successor so kerning is included, and are kept in an LRU cache.

use std::cell::RefCell;
use std::num::NonZeroUsize;
use std::rc::Rc;

use cosmic_text::{
    Attrs, Buffer, Family, FontSystem, Metrics, Shaping, Style as CStyle, SwashCache, Weight,
};
use lru::LruCache;
use stereo_text::{FontSet, FontStyle, Subset};

use crate::config::{FontConfig, FontError};
use crate::font::{SharedAtlas, TexturedFont};
use crate::raster::{FaceMetrics, GlyphRasterizer, RasterGlyph};

const ADVANCE_CACHE_SIZE: usize = 2048;

/// Font discovery and glyph cache shared by every face.
pub struct CosmicContext {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
}

pub type SharedContext = Rc<RefCell<CosmicContext>>;

impl Default for CosmicContext {
    fn default() -> Self {
        Self::new()
    }
}

impl CosmicContext {
    /// Context with system font discovery.
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    pub fn shared() -> SharedContext {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Whether `family` names a generic family or an installed face.
    pub fn has_family(&self, family: &str) -> bool {
        if generic_family(family).is_some() {
            return true;
        }
        self.font_system.db().faces().any(|face| {
            face.families
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(family))
        })
    }
}

fn generic_family(name: &str) -> Option<Family<'static>> {
    match name.trim() {
        "sans-serif" => Some(Family::SansSerif),
        "serif" => Some(Family::Serif),
        "monospace" => Some(Family::Monospace),
        _ => None,
    }
}

/// Rasterizer for one family in one style.
pub struct CosmicRasterizer {
    context: SharedContext,
    family: String,
    style: FontStyle,
    metrics: Metrics,
    face: FaceMetrics,
    /// False when the family is not installed: zero metrics, no glyphs.
    available: bool,
    advances: LruCache<(char, Option<char>), f32>,
}

impl CosmicRasterizer {
    pub fn new(
        context: SharedContext,
        family: &str,
        style: FontStyle,
        font_size: f32,
        line_height: f32,
    ) -> Self {
        let capacity = NonZeroUsize::new(ADVANCE_CACHE_SIZE).unwrap_or(NonZeroUsize::MIN);
        let mut rasterizer = Self {
            context,
            family: family.trim().to_string(),
            style,
            metrics: Metrics::new(font_size, line_height),
            face: FaceMetrics::default(),
            available: false,
            advances: LruCache::new(capacity),
        };

        let available = match rasterizer.context.try_borrow() {
            Ok(ctx) => ctx.has_family(&rasterizer.family),
            Err(_) => false,
        };
        if available {
            rasterizer.available = true;
            rasterizer.face = rasterizer.measure_face();
        } else {
            log::warn!("font family '{}' not available, glyphs will be skipped", rasterizer.family);
        }
        rasterizer
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn style(&self) -> FontStyle {
        self.style
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn attrs(&self) -> Attrs<'_> {
        let family = generic_family(&self.family).unwrap_or(Family::Name(&self.family));
        let weight = if self.style.is_bold() {
            Weight::BOLD
        } else {
            Weight::NORMAL
        };
        let style = if self.style.is_italic() {
            CStyle::Italic
        } else {
            CStyle::Normal
        };
        Attrs::new().family(family).weight(weight).style(style)
    }

    fn shape(&self, ctx: &mut CosmicContext, text: &str) -> Buffer {
        let mut buffer = Buffer::new(&mut ctx.font_system, self.metrics);
        buffer.set_size(&mut ctx.font_system, None, None);
        buffer.set_text(&mut ctx.font_system, text, self.attrs(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut ctx.font_system, false);
        buffer
    }

    fn measure_face(&self) -> FaceMetrics {
        let Ok(mut ctx) = self.context.try_borrow_mut() else {
            return FaceMetrics::default();
        };
        let buffer = self.shape(&mut ctx, "Ag");
        let ascender = buffer.layout_runs().next().map(|run| run.line_y).unwrap_or(0.0);
        log::debug!(
            "face '{}' {:?}: ascender {ascender}, line height {}",
            self.family,
            self.style,
            self.metrics.line_height
        );
        FaceMetrics {
            ascender,
            line_spacing: self.metrics.line_height,
        }
    }

    /// Advance of the glyph starting at byte 0 of `text`, or `None` when
    /// that glyph also covers bytes past `len` (a ligature).
    fn leading_advance(&self, text: &str, len: usize) -> Option<f32> {
        let mut ctx = self.context.try_borrow_mut().ok()?;
        let buffer = self.shape(&mut ctx, text);
        let run = buffer.layout_runs().next()?;
        let glyph = run.glyphs.iter().find(|g| g.start == 0)?;
        (glyph.end <= len).then_some(glyph.w)
    }

    fn measure_advance(&self, ch: char, next: Option<char>) -> f32 {
        let mut buf = [0u8; 4];
        let len = ch.len_utf8();
        let single: &str = ch.encode_utf8(&mut buf);
        let paired = match next {
            Some(next) => {
                let mut pair = String::with_capacity(8);
                pair.push(ch);
                pair.push(next);
                self.leading_advance(&pair, len)
            }
            None => None,
        };
        paired
            .or_else(|| self.leading_advance(single, len))
            .unwrap_or(0.0)
    }
}

impl GlyphRasterizer for CosmicRasterizer {
    fn metrics(&self) -> FaceMetrics {
        self.face
    }

    fn advance(&mut self, ch: char, next: Option<char>) -> f32 {
        if !self.available {
            return 0.0;
        }
        let key = (ch, next);
        if let Some(&advance) = self.advances.get(&key) {
            return advance;
        }
        let advance = self.measure_advance(ch, next);
        self.advances.put(key, advance);
        advance
    }

    fn rasterize(&mut self, ch: char) -> Option<RasterGlyph> {
        if !self.available {
            return None;
        }
        let mut ctx = self.context.try_borrow_mut().ok()?;
        let ctx = &mut *ctx;
        let mut buf = [0u8; 4];
        let buffer = self.shape(ctx, ch.encode_utf8(&mut buf));
        let run = buffer.layout_runs().next()?;
        let glyph = run.glyphs.iter().find(|g| g.start == 0)?;
        let physical = glyph.physical((0.0, 0.0), 1.0);

        let image = ctx
            .swash_cache
            .get_image(&mut ctx.font_system, physical.cache_key)
            .as_ref()?;
        Some(RasterGlyph {
            width: image.placement.width,
            height: image.placement.height,
            left: physical.x + image.placement.left,
            top: image.placement.top - physical.y,
            data: image.data.clone(),
        })
    }
}

/// Build a font set from `config`: the general family plus every
/// configured subset family that is installed.
///
/// A missing general family is an error; a missing subset family is
/// skipped so that subset falls back to the general font.
pub fn load_fonts(
    config: &FontConfig,
    context: &SharedContext,
    atlas: &SharedAtlas,
) -> Result<FontSet<TexturedFont<CosmicRasterizer>>, FontError> {
    config.validate()?;

    let has_family = |family: &str| {
        context
            .try_borrow()
            .map(|ctx| ctx.has_family(family))
            .unwrap_or(false)
    };
    if !has_family(&config.family) {
        return Err(FontError::MissingFamily(config.family.clone()));
    }

    let load = |family: &str| {
        let face = |style| {
            CosmicRasterizer::new(
                context.clone(),
                family,
                style,
                config.font_size,
                config.effective_line_height(),
            )
        };
        let mut font = TexturedFont::new(face(FontStyle::Regular), atlas.clone());
        if config.styles {
            for style in [FontStyle::Bold, FontStyle::Italic, FontStyle::BoldItalic] {
                font.set_style(style, face(style));
            }
        }
        font
    };

    let mut fonts = FontSet::new(load(&config.family));
    for subset in Subset::ALL {
        if subset == Subset::General {
            continue;
        }
        let Some(family) = config.family_for(subset) else {
            continue;
        };
        if has_family(family) {
            fonts.set(subset, load(family));
        } else {
            log::warn!("{subset:?} font '{family}' not found, using '{}'", config.family);
        }
    }
    log::debug!(
        "loaded {} font(s) at {}px",
        fonts.iter().count(),
        config.font_size
    );
    Ok(fonts)
}

// ===================================================================
// Tests
// ===================================================================
