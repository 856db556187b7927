//! Line breaking, horizontal alignment and right-to-left reordering.
//!
//! The breaker walks the logical text once. Tiles live in an append-only
//! arena; `order` maps visual positions to arena indices and is the only
//! thing an RTL flip permutes. Every index held by the breaker
//! (`line_start`, `word_start`, run starts) is a visual position.

use crate::formatter::AlignX;
use crate::geometry::{Rect, Vec2};

/// Arabic block, the only range reordered right-to-left.
pub fn is_rtl_char(ch: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&ch)
}

/// Summary handed back to the formatter once all lines are closed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct LineMetrics {
    /// Number of lines, empty ones included.
    pub lines: usize,
    /// Baseline offset the next line would have used.
    pub pen_line: f32,
    /// Width lines were aligned against.
    pub align_width: f32,
    /// Width of the longest line.
    pub text_width: f32,
}

/// Line left-aligned during the scan, realigned once the width is known.
#[derive(Clone, Copy, Debug)]
struct DeferredLine {
    first: usize,
    last: usize,
    width: f32,
}

pub(crate) struct LineBreaker<'a> {
    placed: &'a mut [Rect],
    order: &'a mut [usize],
    align: AlignX,
    /// Maximum line width, `<= 0` for unlimited.
    limit: f32,
    align_width: f32,
    line_spacing: f32,

    lines: usize,
    line_start: usize,
    word_start: usize,
    pen_line: f32,
    line_left: f32,
    text_width: f32,
    rtl_start: Option<usize>,
    digits_start: Option<usize>,
    deferred: Vec<DeferredLine>,
}

impl<'a> LineBreaker<'a> {
    pub fn new(
        placed: &'a mut [Rect],
        order: &'a mut [usize],
        align: AlignX,
        limit: f32,
        ascender: f32,
        line_spacing: f32,
    ) -> Self {
        let line_left = order.first().map(|&id| placed[id].left).unwrap_or(0.0);
        Self {
            placed,
            order,
            align,
            limit,
            align_width: limit,
            line_spacing,
            lines: 0,
            line_start: 0,
            word_start: 0,
            pen_line: -ascender,
            line_left,
            text_width: 0.0,
            rtl_start: None,
            digits_start: None,
            deferred: Vec::new(),
        }
    }

    fn unlimited(&self) -> bool {
        self.limit <= 0.0
    }

    fn rect(&self, visual: usize) -> &Rect {
        &self.placed[self.order[visual]]
    }

    /// Break `text` into lines, translating every tile into place.
    ///
    /// `text` holds the line feeds and spaces plus one character per tile.
    pub fn run(mut self, text: &[char]) -> LineMetrics {
        let count = self.order.len();
        let mut next = 0usize;
        for &ch in text {
            match ch {
                '\r' => continue,
                '\n' => {
                    self.close_runs(next);
                    self.new_line(next.checked_sub(1));
                    continue;
                }
                ' ' => {
                    // a space ends a number, not the surrounding RTL run
                    if let Some(from) = self.digits_start.take() {
                        self.flip(from, next);
                    }
                    self.word_start = next;
                    continue;
                }
                _ => {}
            }
            if next >= count {
                log::warn!("logical text has more glyphs than tiles ({count})");
                break;
            }

            // break first so no flip reaches past the new line start
            self.check_width(next);
            self.track_direction(ch, next);
            next += 1;
        }

        self.close_runs(count);
        self.new_line(count.checked_sub(1));
        self.finish()
    }

    /// Open, extend or close RTL runs and their embedded numerals.
    fn track_direction(&mut self, ch: char, visual: usize) {
        if is_rtl_char(ch) {
            if let Some(from) = self.digits_start.take() {
                self.flip(from, visual);
            }
            if self.rtl_start.is_none() {
                self.rtl_start = Some(visual);
            }
            return;
        }

        if self.rtl_start.is_none() {
            return;
        }
        let numeric = ch.is_ascii_digit()
            || (self.digits_start.is_some() && matches!(ch, '.' | ','));
        if numeric {
            if self.digits_start.is_none() {
                self.digits_start = Some(visual);
            }
        } else {
            self.close_runs(visual);
        }
    }

    /// Force a break at the last word boundary when `visual` reaches the limit.
    fn check_width(&mut self, visual: usize) {
        if self.unlimited() {
            return;
        }
        let width = self.rect(visual).right - self.line_left;
        if width < self.limit {
            return;
        }
        if self.word_start <= self.line_start {
            // single word wider than the limit: let it overflow
            return;
        }

        let rtl = self.rtl_start.take();
        let digits = self.digits_start.take();
        if let Some(from) = digits {
            self.flip(from, self.word_start);
        }
        if let Some(from) = rtl {
            self.flip(from, self.word_start);
        }

        self.new_line(Some(self.word_start - 1));

        self.rtl_start = rtl.map(|from| from.max(self.line_start));
        self.digits_start = digits.map(|from| from.max(self.line_start));
    }

    /// Flip and forget any open runs ending before `end`.
    fn close_runs(&mut self, end: usize) {
        if let Some(from) = self.digits_start.take() {
            self.flip(from, end);
        }
        if let Some(from) = self.rtl_start.take() {
            self.flip(from, end);
        }
    }

    /// Mirror the visual range `[from, end)` inside its own extent.
    ///
    /// Every tile is reflected about the middle of the range, so the gaps
    /// left by spaces move with their neighbours and a range flipped twice
    /// (a number inside an Arabic run) reads left to right again.
    fn flip(&mut self, from: usize, end: usize) {
        if end <= from + 1 {
            return;
        }

        let (left, right) = (from..end)
            .map(|visual| self.rect(visual))
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(l, r), rect| {
                (l.min(rect.left), r.max(rect.right))
            });
        for visual in from..end {
            let id = self.order[visual];
            let rect = &mut self.placed[id];
            let dx = left + right - rect.right - rect.left;
            rect.move_x(dx);
        }
        self.order[from..end].reverse();
    }

    fn translate(&mut self, first: usize, last: usize, delta: Vec2) {
        for visual in first..=last {
            let id = self.order[visual];
            self.placed[id].move_by(delta);
        }
    }

    /// Close the line ending at visual position `last`.
    fn new_line(&mut self, last: Option<usize>) {
        let first = self.line_start;
        let last = match last {
            Some(last) if last >= first && first < self.order.len() => last,
            _ => {
                // nothing on this line
                self.lines += 1;
                self.pen_line -= self.line_spacing;
                return;
            }
        };

        let first_left = self.rect(first).left;
        let last_right = self.rect(last).right;
        let line_width = last_right - first_left;
        self.text_width = self.text_width.max(line_width);

        let dx = if self.unlimited() {
            if self.align != AlignX::Left {
                self.deferred.push(DeferredLine {
                    first,
                    last,
                    width: line_width,
                });
            }
            -first_left
        } else {
            match self.align {
                AlignX::Left => -first_left,
                AlignX::Right => self.align_width - last_right,
                AlignX::Center => -first_left + 0.5 * (self.align_width - line_width),
            }
        };
        self.translate(first, last, Vec2::new(dx, self.pen_line));

        self.lines += 1;
        self.pen_line -= self.line_spacing;
        self.line_start = last + 1;
        self.word_start = last + 1;
        if self.line_start < self.order.len() {
            self.line_left = self.rect(self.line_start).left;
        }
    }

    fn finish(mut self) -> LineMetrics {
        if self.unlimited() {
            self.align_width = self.text_width;
            let deferred = std::mem::take(&mut self.deferred);
            for line in deferred {
                let dx = match self.align {
                    AlignX::Left => 0.0,
                    AlignX::Right => self.align_width - line.width,
                    AlignX::Center => 0.5 * (self.align_width - line.width),
                };
                self.translate(line.first, line.last, Vec2::new(dx, 0.0));
            }
        }

        LineMetrics {
            lines: self.lines,
            pen_line: self.pen_line,
            align_width: self.align_width,
            text_width: self.text_width,
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
