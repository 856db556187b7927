//! Layout configuration loaded from JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::formatter::{AlignX, AlignY};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Malformed layout config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid value for '{field}': {value}")]
    InvalidValue { field: &'static str, value: f32 },
}

/// Box and alignment a text block is laid out in.
///
/// Missing fields take their defaults: left/top alignment, no wrapping
/// and no vertical alignment.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub align_x: AlignX,
    pub align_y: AlignY,
    /// Wrap width, `<= 0` for unlimited.
    pub max_width: f32,
    /// Box height for vertical alignment, `<= 0` to disable it.
    pub max_height: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            align_x: AlignX::Left,
            align_y: AlignY::Top,
            max_width: -1.0,
            max_height: 0.0,
        }
    }
}

impl LayoutConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: LayoutConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject NaN and infinite limits.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("max_width", self.max_width), ("max_height", self.max_height)] {
            if !value.is_finite() {
                return Err(ConfigError::InvalidValue { field, value });
            }
        }
        Ok(())
    }

    pub fn is_wrapping(&self) -> bool {
        self.max_width > 0.0
    }
}

// ===================================================================
// Tests
// ===================================================================
