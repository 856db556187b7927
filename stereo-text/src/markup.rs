//! Minimal bold/italic markup.
//!
//! Only `<b>`, `</b>`, `<i>` and `</i>` are understood (case-insensitive).
//! Anything else between `<` and `>` is swallowed, as is an unterminated
//! `<` and the rest of the string after it. Tags never reach the output.

use crate::source::FontStyle;

/// A slice of text sharing one style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyledRun<'a> {
    pub style: FontStyle,
    pub text: &'a str,
}

/// Iterator over the styled runs of a markup string.
///
/// Empty runs (e.g. between two adjacent tags) are skipped.
#[derive(Clone, Debug)]
pub struct MarkupRuns<'a> {
    rest: &'a str,
    bold: bool,
    italic: bool,
}

impl<'a> MarkupRuns<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            rest: text,
            bold: false,
            italic: false,
        }
    }

    /// Style currently in effect.
    pub fn style(&self) -> FontStyle {
        FontStyle::from_flags(self.bold, self.italic)
    }

    fn apply_tag(&mut self, tag: &str) {
        if tag.eq_ignore_ascii_case("b") {
            self.bold = true;
        } else if tag.eq_ignore_ascii_case("/b") {
            self.bold = false;
        } else if tag.eq_ignore_ascii_case("i") {
            self.italic = true;
        } else if tag.eq_ignore_ascii_case("/i") {
            self.italic = false;
        } else {
            log::trace!("dropping unknown markup tag <{tag}>");
        }
    }
}

impl<'a> Iterator for MarkupRuns<'a> {
    type Item = StyledRun<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.rest.is_empty() {
            let style = self.style();
            match self.rest.find('<') {
                None => {
                    let text = std::mem::take(&mut self.rest);
                    return Some(StyledRun { style, text });
                }
                Some(open) => {
                    let text = &self.rest[..open];
                    let after = &self.rest[open + 1..];
                    match after.find('>') {
                        Some(close) => {
                            self.apply_tag(&after[..close]);
                            self.rest = &after[close + 1..];
                        }
                        None => {
                            log::trace!("dropping unterminated markup tag");
                            self.rest = "";
                        }
                    }
                    if !text.is_empty() {
                        return Some(StyledRun { style, text });
                    }
                }
            }
        }
        None
    }
}

/// Convenience wrapper around [`MarkupRuns`].
pub fn parse_markup(text: &str) -> MarkupRuns<'_> {
    MarkupRuns::new(text)
}

// ===================================================================
// Tests
// ===================================================================
