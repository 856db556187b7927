//! Font configuration and font-loading errors.

use serde::{Deserialize, Serialize};
use stereo_text::Subset;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FontError {
    #[error("Malformed font config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: f32 },

    #[error("Atlas page size must be between 16 and 8192, got {0}")]
    InvalidPageSize(u32),

    #[error("Font family not found: {0}")]
    MissingFamily(String),
}

/// Families, size and atlas geometry for one font set.
///
/// Only the general family is required. A subset without a family of
/// its own is served by the general one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    /// Font size in pixels.
    pub font_size: f32,
    /// Line height in pixels, `0` for `1.25 × font_size`.
    pub line_height: f32,
    /// Atlas page width and height in pixels.
    pub atlas_page_size: u32,
    /// Load bold, italic and bold-italic faces next to the regular one.
    pub styles: bool,
    pub family: String,
    pub korean: Option<String>,
    pub cjk: Option<String>,
    pub arabic: Option<String>,
    pub misc: Option<String>,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            font_size: 24.0,
            line_height: 0.0,
            atlas_page_size: 1024,
            styles: true,
            family: String::from("sans-serif"),
            korean: None,
            cjk: None,
            arabic: None,
            misc: None,
        }
    }
}

impl FontConfig {
    pub fn from_json(json: &str) -> Result<Self, FontError> {
        let config: FontConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), FontError> {
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(FontError::InvalidValue {
                field: "font_size",
                value: self.font_size,
            });
        }
        if !self.line_height.is_finite() || self.line_height < 0.0 {
            return Err(FontError::InvalidValue {
                field: "line_height",
                value: self.line_height,
            });
        }
        if !(16..=8192).contains(&self.atlas_page_size) {
            return Err(FontError::InvalidPageSize(self.atlas_page_size));
        }
        Ok(())
    }

    pub fn effective_line_height(&self) -> f32 {
        if self.line_height > 0.0 {
            self.line_height
        } else {
            (self.font_size * 1.25).round()
        }
    }

    /// Family configured for `subset`.
    pub fn family_for(&self, subset: Subset) -> Option<&str> {
        match subset {
            Subset::General => Some(self.family.as_str()),
            Subset::Korean => self.korean.as_deref(),
            Subset::Cjk => self.cjk.as_deref(),
            Subset::Arabic => self.arabic.as_deref(),
            Subset::Misc => self.misc.as_deref(),
        }
    }
}

// ===================================================================
// Tests
// ===================================================================
