//! Glyph sources and subset-keyed font sets.
//!
//! A [`GlyphSource`] is whatever can measure and render a code point in a
//! given style (normally a textured font backed by an atlas). A
//! [`FontSet`] holds one source per Unicode [`Subset`] and picks the one
//! to use for each character, falling back to the general source.

use crate::geometry::{Tile, Vec2};

// ── Font style ──────────────────────────────────────────────────────

/// The four styles reachable through markup.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FontStyle {
    #[default]
    Regular,
    Bold,
    Italic,
    BoldItalic,
}

impl FontStyle {
    pub const COUNT: usize = 4;

    pub const ALL: [FontStyle; FontStyle::COUNT] = [
        FontStyle::Regular,
        FontStyle::Bold,
        FontStyle::Italic,
        FontStyle::BoldItalic,
    ];

    pub fn from_flags(bold: bool, italic: bool) -> Self {
        match (bold, italic) {
            (false, false) => FontStyle::Regular,
            (true, false) => FontStyle::Bold,
            (false, true) => FontStyle::Italic,
            (true, true) => FontStyle::BoldItalic,
        }
    }

    pub fn is_bold(self) -> bool {
        matches!(self, FontStyle::Bold | FontStyle::BoldItalic)
    }

    pub fn is_italic(self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::BoldItalic)
    }

    /// Slot index for style-keyed tables.
    pub fn index(self) -> usize {
        self as usize
    }
}

// ── Unicode subset ──────────────────────────────────────────────────

/// Script groups that may be served by dedicated fonts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Subset {
    General,
    Korean,
    Cjk,
    Arabic,
    Misc,
}

impl Subset {
    pub const COUNT: usize = 5;

    pub const ALL: [Subset; Subset::COUNT] = [
        Subset::General,
        Subset::Korean,
        Subset::Cjk,
        Subset::Arabic,
        Subset::Misc,
    ];

    /// Classify a code point.
    pub fn of(ch: char) -> Subset {
        match u32::from(ch) {
            0x1100..=0x11FF | 0x3130..=0x318F | 0xA960..=0xA97F | 0xAC00..=0xD7AF
            | 0xD7B0..=0xD7FF => Subset::Korean,
            0x2E80..=0x2FDF
            | 0x3000..=0x303F
            | 0x3040..=0x30FF
            | 0x31F0..=0x31FF
            | 0x3400..=0x4DBF
            | 0x4E00..=0x9FFF
            | 0xF900..=0xFAFF
            | 0xFF00..=0xFFEF
            | 0x20000..=0x2FA1F => Subset::Cjk,
            0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF | 0xFB50..=0xFDFF
            | 0xFE70..=0xFEFF => Subset::Arabic,
            0x2190..=0x21FF
            | 0x2200..=0x22FF
            | 0x2300..=0x23FF
            | 0x25A0..=0x25FF
            | 0x2600..=0x26FF
            | 0x2700..=0x27BF => Subset::Misc,
            _ => Subset::General,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

// ── Glyph source ────────────────────────────────────────────────────

/// Measures and renders glyphs for the formatter.
///
/// Implementations own their own caching and atlas placement. Metric
/// methods must not fail: a source without data returns `0.0`.
pub trait GlyphSource {
    /// Horizontal pen advance for `ch`, kerned against `next` when known.
    fn advance(&mut self, ch: char, next: Option<char>, style: FontStyle) -> f32;

    /// Distance from the baseline to the highest glyph coordinate.
    fn ascent(&self, style: FontStyle) -> f32;

    /// Baseline-to-baseline distance.
    fn line_spacing(&self, style: FontStyle) -> f32;

    /// Render `ch` with its origin at `pen`.
    ///
    /// Returns `None` when the glyph cannot be produced; the caller still
    /// advances the pen.
    fn render_tile(&mut self, ch: char, style: FontStyle, pen: Vec2) -> Option<Tile>;
}

impl<S: GlyphSource + ?Sized> GlyphSource for &mut S {
    fn advance(&mut self, ch: char, next: Option<char>, style: FontStyle) -> f32 {
        (**self).advance(ch, next, style)
    }

    fn ascent(&self, style: FontStyle) -> f32 {
        (**self).ascent(style)
    }

    fn line_spacing(&self, style: FontStyle) -> f32 {
        (**self).line_spacing(style)
    }

    fn render_tile(&mut self, ch: char, style: FontStyle, pen: Vec2) -> Option<Tile> {
        (**self).render_tile(ch, style, pen)
    }
}

// ── Font set ────────────────────────────────────────────────────────

/// Subset → glyph source table. The general source serves every subset
/// without a dedicated one.
pub struct FontSet<S> {
    general: S,
    dedicated: [Option<S>; Subset::COUNT],
}

impl<S: GlyphSource> FontSet<S> {
    /// Create a set where every subset falls back to `general`.
    pub fn new(general: S) -> Self {
        Self {
            general,
            dedicated: std::array::from_fn(|_| None),
        }
    }

    /// Builder form of [`FontSet::set`].
    pub fn with(mut self, subset: Subset, source: S) -> Self {
        self.set(subset, source);
        self
    }

    /// Install a dedicated source for `subset`, returning the previous one.
    ///
    /// Setting [`Subset::General`] replaces the general source.
    pub fn set(&mut self, subset: Subset, source: S) -> Option<S> {
        match subset {
            Subset::General => Some(std::mem::replace(&mut self.general, source)),
            other => self.dedicated[other.index()].replace(source),
        }
    }

    /// Whether `subset` has its own source.
    pub fn has(&self, subset: Subset) -> bool {
        subset == Subset::General || self.dedicated[subset.index()].is_some()
    }

    pub fn general(&self) -> &S {
        &self.general
    }

    /// The subset actually serving `ch` (general when no dedicated source).
    pub fn resolve(&self, ch: char) -> Subset {
        let subset = Subset::of(ch);
        if self.has(subset) {
            subset
        } else {
            Subset::General
        }
    }

    /// Source serving `ch`.
    pub fn select(&mut self, ch: char) -> &mut S {
        match Subset::of(ch) {
            Subset::General => &mut self.general,
            subset => self.dedicated[subset.index()]
                .as_mut()
                .unwrap_or(&mut self.general),
        }
    }

    /// Iterate populated slots, general first.
    pub fn iter(&self) -> impl Iterator<Item = (Subset, &S)> {
        std::iter::once((Subset::General, &self.general)).chain(
            Subset::ALL
                .iter()
                .filter_map(|&subset| self.dedicated[subset.index()].as_ref().map(|s| (subset, s))),
        )
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, TextureId};

    struct Named(u32);

    impl GlyphSource for Named {
        fn advance(&mut self, _ch: char, _next: Option<char>, _style: FontStyle) -> f32 {
            self.0 as f32
        }
        fn ascent(&self, _style: FontStyle) -> f32 {
            0.0
        }
        fn line_spacing(&self, _style: FontStyle) -> f32 {
            0.0
        }
        fn render_tile(&mut self, _ch: char, _style: FontStyle, _pen: Vec2) -> Option<Tile> {
            Some(Tile {
                rect: Rect::default(),
                uv: Rect::default(),
                texture: TextureId(self.0),
            })
        }
    }

    #[test]
    fn test_style_from_flags() {
        assert_eq!(FontStyle::from_flags(false, false), FontStyle::Regular);
        assert_eq!(FontStyle::from_flags(true, false), FontStyle::Bold);
        assert_eq!(FontStyle::from_flags(false, true), FontStyle::Italic);
        assert_eq!(FontStyle::from_flags(true, true), FontStyle::BoldItalic);
        for style in FontStyle::ALL {
            assert_eq!(FontStyle::from_flags(style.is_bold(), style.is_italic()), style);
        }
    }

    #[test]
    fn test_subset_classification() {
        assert_eq!(Subset::of('A'), Subset::General);
        assert_eq!(Subset::of('é'), Subset::General);
        assert_eq!(Subset::of('한'), Subset::Korean);
        assert_eq!(Subset::of('漢'), Subset::Cjk);
        assert_eq!(Subset::of('か'), Subset::Cjk);
        assert_eq!(Subset::of('ب'), Subset::Arabic);
        assert_eq!(Subset::of('\u{FEFB}'), Subset::Arabic);
        assert_eq!(Subset::of('☺'), Subset::Misc);
    }

    #[test]
    fn test_font_set_fallback_to_general() {
        let mut fonts = FontSet::new(Named(1));
        assert_eq!(fonts.resolve('한'), Subset::General);
        assert_eq!(fonts.select('한').advance('한', None, FontStyle::Regular), 1.0);
    }

    #[test]
    fn test_font_set_dedicated_subset() {
        let mut fonts = FontSet::new(Named(1)).with(Subset::Korean, Named(2));
        assert!(fonts.has(Subset::Korean));
        assert!(!fonts.has(Subset::Cjk));
        assert_eq!(fonts.resolve('한'), Subset::Korean);
        assert_eq!(fonts.select('한').0, 2);
        assert_eq!(fonts.select('a').0, 1);
        assert_eq!(fonts.iter().count(), 2);
    }

    #[test]
    fn test_font_set_replace() {
        let mut fonts = FontSet::new(Named(1));
        assert!(fonts.set(Subset::Cjk, Named(3)).is_none());
        let previous = fonts.set(Subset::Cjk, Named(4));
        assert_eq!(previous.map(|s| s.0), Some(3));
        assert_eq!(fonts.select('漢').0, 4);
    }
}
