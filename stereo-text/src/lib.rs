//! # stereo-text
//!
//! Text layout for the player's on-screen display. Glyph tiles produced
//! by a [`GlyphSource`] are broken into lines, aligned, reordered for
//! Arabic runs and emitted as per-texture triangle lists.
//!
//! ## Architecture
//!
//! ```text
//! FontSet<S: GlyphSource>  (one source per Unicode subset)
//!     │
//!     ▼
//! TextFormatter::append / append_markup ──► glyph arena on one baseline
//!     │
//!     ▼
//! TextFormatter::format(width, height) ──► lines, alignment, RTL order
//!     │
//!     ▼
//! TextFormatter::result() ──► FormattedText { TextureBatch per texture }
//! ```
//!
//! - **`source`**: Glyph source trait, font styles, Unicode subsets.
//! - **`markup`**: `<b>` / `<i>` run splitting.
//! - **`lines`**: Line breaking, alignment and right-to-left reordering.
//! - **`formatter`**: The stateful formatter tying it all together.
//! - **`batch`**: Per-texture vertex / UV emission.
//! - **`config`**: JSON layout configuration.

pub mod batch;
pub mod config;
pub mod formatter;
pub mod geometry;
pub mod lines;
pub mod markup;
pub mod source;

// Re-exports for ergonomic use.
pub use batch::{FormattedText, TextureBatch};
pub use config::{ConfigError, LayoutConfig};
pub use formatter::{AlignX, AlignY, TextFormatter};
pub use geometry::{Rect, TextureId, Tile, Vec2};
pub use lines::is_rtl_char;
pub use markup::{parse_markup, StyledRun};
pub use source::{FontSet, FontStyle, GlyphSource, Subset};
