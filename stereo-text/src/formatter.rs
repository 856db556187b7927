//! Text formatter: turns appended text into positioned, texture-mapped
//! glyph quads.
//!
//! ## Pipeline
//!
//! ```text
//! append(text, style, fonts) ──► glyph arena on a single baseline (y = 0)
//!     │
//!     ▼
//! format(width, height) ──► LineBreaker (wrap, align, RTL) ──► vertical shift
//!     │
//!     ▼
//! result() ──► FormattedText { per-texture vertex / UV arrays }
//! ```
//!
//! The formatter keeps the append-time rectangles untouched; `format()`
//! lays out a fresh copy, so appending more text after a format and
//! formatting again re-lays the whole block.

use serde::{Deserialize, Serialize};

use crate::batch::{self, FormattedText};
use crate::config::LayoutConfig;
use crate::geometry::{Rect, Tile, Vec2};
use crate::lines::LineBreaker;
use crate::markup::parse_markup;
use crate::source::{FontSet, FontStyle, GlyphSource};

// ── Alignment ───────────────────────────────────────────────────────

/// Horizontal alignment of each line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignX {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical alignment of the whole block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignY {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Last character of an append, advanced without knowing its successor.
#[derive(Clone, Copy, Debug)]
struct PendingKern {
    ch: char,
    style: FontStyle,
    advance: f32,
}

/// Metrics coming from a glyph source are trusted only when finite and
/// non-negative.
fn sane(value: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Builds formatted text from styled runs.
///
/// Intended call sequence: [`reset`](Self::reset) → one or more
/// [`append`](Self::append) → [`format`](Self::format) →
/// [`result`](Self::result).
#[derive(Debug, Default)]
pub struct TextFormatter {
    align_x: AlignX,
    align_y: AlignY,

    /// Line feeds, spaces and one character per glyph, in input order.
    text: Vec<char>,
    pen: Vec2,
    glyphs: Vec<Tile>,
    line_spacing: f32,
    ascender: f32,
    pending_kern: Option<PendingKern>,
    is_formatted: bool,

    /// Laid-out rectangles, indexed like `glyphs`.
    placed: Vec<Rect>,
    /// Visual position → glyph index.
    order: Vec<usize>,
    lines_nb: usize,
    align_width: f32,
    text_width: f32,
    bnd_top: f32,
}

impl TextFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Formatter with the alignment taken from `config`.
    pub fn from_config(config: &LayoutConfig) -> Self {
        let mut formatter = Self::new();
        formatter.set_alignment(config.align_x, config.align_y);
        formatter
    }

    pub fn set_alignment(&mut self, align_x: AlignX, align_y: AlignY) {
        self.align_x = align_x;
        self.align_y = align_y;
    }

    pub fn alignment(&self) -> (AlignX, AlignY) {
        (self.align_x, self.align_y)
    }

    /// Drop all appended text. Alignment is kept.
    pub fn reset(&mut self) {
        self.text.clear();
        self.pen = Vec2::ZERO;
        self.glyphs.clear();
        self.line_spacing = 0.0;
        self.ascender = 0.0;
        self.pending_kern = None;
        self.is_formatted = false;

        self.placed.clear();
        self.order.clear();
        self.lines_nb = 0;
        self.align_width = 0.0;
        self.text_width = 0.0;
        self.bnd_top = 0.0;
    }

    fn absorb_metrics<S: GlyphSource>(&mut self, source: &S, style: FontStyle) {
        self.ascender = self.ascender.max(sane(source.ascent(style)));
        self.line_spacing = self.line_spacing.max(sane(source.line_spacing(style)));
    }

    /// Render `text` in `style` onto the current baseline.
    ///
    /// Carriage returns are ignored, line feeds and spaces produce no
    /// tile. Every other character is served by the font of its subset.
    pub fn append<S: GlyphSource>(&mut self, text: &str, style: FontStyle, fonts: &mut FontSet<S>) {
        self.absorb_metrics(fonts.general(), style);
        if text.is_empty() {
            return;
        }
        self.is_formatted = false;

        let mut chars = text.chars().peekable();
        if let (Some(pending), Some(&first)) = (self.pending_kern.take(), chars.peek()) {
            if pending.style == style {
                let kerned = sane_advance(fonts.select(pending.ch).advance(pending.ch, Some(first), style));
                self.pen.x += kerned - pending.advance;
            }
        }

        while let Some(ch) = chars.next() {
            let next = chars.peek().copied();
            match ch {
                '\r' => continue,
                '\n' => {
                    self.text.push('\n');
                    continue;
                }
                _ => {}
            }

            let source = fonts.select(ch);
            let advance = sane_advance(source.advance(ch, next, style));
            if ch == ' ' {
                self.text.push(' ');
            } else {
                self.absorb_metrics(&*source, style);
                match source.render_tile(ch, style, self.pen) {
                    Some(tile) => {
                        self.order.push(self.glyphs.len());
                        self.placed.push(tile.rect);
                        self.glyphs.push(tile);
                        self.text.push(ch);
                    }
                    None => log::trace!("no glyph for {ch:?} ({style:?})"),
                }
            }
            self.pen.x += advance;

            if next.is_none() {
                self.pending_kern = Some(PendingKern { ch, style, advance });
            }
        }
    }

    /// Append text containing `<b>`/`<i>` markup.
    pub fn append_markup<S: GlyphSource>(&mut self, text: &str, fonts: &mut FontSet<S>) {
        self.absorb_metrics(fonts.general(), FontStyle::Regular);
        for run in parse_markup(text) {
            self.append(run.text, run.style, fonts);
        }
    }

    /// Lay out the appended text.
    ///
    /// `max_width <= 0` disables wrapping; alignment then uses the width
    /// of the longest line. `max_height <= 0` disables vertical alignment.
    /// Calling this twice without appending or resetting in between does
    /// nothing.
    pub fn format(&mut self, max_width: f32, max_height: f32) {
        if self.glyphs.is_empty() || self.is_formatted {
            return;
        }
        self.is_formatted = true;

        self.placed.clear();
        self.placed.extend(self.glyphs.iter().map(|tile| tile.rect));
        self.order.clear();
        self.order.extend(0..self.glyphs.len());

        let metrics = LineBreaker::new(
            &mut self.placed,
            &mut self.order,
            self.align_x,
            max_width,
            self.ascender,
            self.line_spacing,
        )
        .run(&self.text);

        self.lines_nb = metrics.lines;
        self.align_width = metrics.align_width;
        self.text_width = metrics.text_width;
        self.bnd_top = self.vertical_shift(max_height, metrics.pen_line);
        if self.bnd_top != 0.0 {
            for rect in &mut self.placed {
                rect.move_y(self.bnd_top);
            }
        }

        log::debug!(
            "formatted {} glyphs into {} lines ({}x{})",
            self.glyphs.len(),
            self.lines_nb,
            self.align_width,
            self.result_height(),
        );
    }

    /// Format using the limits from `config`.
    pub fn format_with(&mut self, config: &LayoutConfig) {
        self.set_alignment(config.align_x, config.align_y);
        self.format(config.max_width, config.max_height);
    }

    /// Block shift for the vertical alignment, given the pen line after
    /// the last line.
    fn vertical_shift(&self, height: f32, pen_line: f32) -> f32 {
        if height <= 0.0 {
            return 0.0;
        }
        match self.align_y {
            AlignY::Top => 0.0,
            AlignY::Bottom => -self.ascender - height - pen_line,
            AlignY::Center => 0.5 * (self.line_spacing * self.lines_nb as f32 - height),
        }
    }

    /// Tiles in visual order, at their current positions.
    pub fn tiles(&self) -> impl Iterator<Item = Tile> + '_ {
        self.order.iter().map(move |&id| Tile {
            rect: self.placed[id],
            ..self.glyphs[id]
        })
    }

    /// Per-texture vertex and UV arrays.
    pub fn result(&self) -> FormattedText {
        batch::emit(self.tiles())
    }

    pub fn is_formatted(&self) -> bool {
        self.is_formatted
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines_nb
    }

    pub fn ascender(&self) -> f32 {
        self.ascender
    }

    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    /// Current pen position on the append baseline.
    pub fn pen(&self) -> Vec2 {
        self.pen
    }

    /// Width lines were aligned against.
    pub fn result_width(&self) -> f32 {
        self.align_width
    }

    /// Width of the longest line.
    pub fn text_width(&self) -> f32 {
        self.text_width
    }

    pub fn result_height(&self) -> f32 {
        self.line_spacing * self.lines_nb as f32
    }

    /// Block rectangle: `x` in `[0, width]`, `y` from the vertical shift
    /// down by one line spacing per line.
    pub fn bounding_box(&self) -> Rect {
        Rect::new(
            0.0,
            self.align_width,
            self.bnd_top,
            self.bnd_top - self.result_height(),
        )
    }
}

fn sane_advance(advance: f32) -> f32 {
    if advance.is_finite() {
        advance
    } else {
        0.0
    }
}

// ===================================================================
// Tests
// ===================================================================
