//! # stereo-font
//!
//! Glyph sources for `stereo-text`: textured fonts that rasterize glyphs
//! once and pack them into a shared multi-page atlas.
//!
//! ## Architecture
//!
//! ```text
//! CosmicContext (cosmic-text FontSystem + SwashCache)
//!     │
//!     ▼
//! CosmicRasterizer (family × style) ──► RasterGlyph bitmaps
//!     │
//!     ▼
//! TexturedFont ──► GlyphAtlas pages ◄── renderer upload (dirty pages)
//!     │
//!     ▼
//! FontSet<TexturedFont> ──► stereo_text::TextFormatter
//! ```
//!
//! - **`raster`**: Rasterizer trait and bitmap types.
//! - **`atlas`**: Multi-page shelf-packed RGBA atlas.
//! - **`font`**: `GlyphSource` implementation with a per-glyph cache.
//! - **`cosmic`**: `cosmic-text` rasterizer and font set loading.
//! - **`config`**: JSON font configuration.

pub mod atlas;
pub mod config;
pub mod cosmic;
pub mod font;
pub mod raster;

// Re-exports for ergonomic use.
pub use atlas::{AtlasPage, AtlasSlot, GlyphAtlas};
pub use config::{FontConfig, FontError};
pub use cosmic::{load_fonts, CosmicContext, CosmicRasterizer, SharedContext};
pub use font::{SharedAtlas, TexturedFont};
pub use raster::{FaceMetrics, GlyphRasterizer, RasterGlyph};
