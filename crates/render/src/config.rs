use std::path::Path;

use serde::Deserialize;

use crate::device::TextureId;

/// Texture the host registers for the marker quad.
pub const MARKER_TEXTURE: TextureId = TextureId::from_static("simplewaypoints:textures/marker.png");

/// Where the marker translation is measured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderOrigin {
    /// View matrix is in world space: translate to camera position + offset.
    #[default]
    World,
    /// View matrix is already camera-relative: translate by the offset only.
    Camera,
}

/// Errors from loading or validating a [`MarkerConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fade_range must be positive, got {0}")]
    InvalidFadeRange(f32),
    #[error("{field} must lie in [0, 1], got {value}")]
    InvalidAlpha { field: &'static str, value: f32 },
    #[error("label_scale must be positive, got {0}")]
    InvalidLabelScale(f32),
}

/// Marker rendering parameters. Defaults reproduce the stock look.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Distance at which the marker stops following the waypoint and the fade begins.
    pub fade_distance: f32,
    /// Distance past `fade_distance` over which alpha reaches `far_alpha`.
    pub fade_range: f32,
    /// Depth-tested alpha once fully faded.
    pub far_alpha: f32,
    /// Alpha of the pass drawn through geometry.
    pub occluded_alpha: f32,
    /// Added to the marker's height. Empirical.
    pub vertical_bias: f32,
    /// Label glyph scale relative to the unit marker quad.
    pub label_scale: f32,
    /// Label y position in label space.
    pub label_baseline: f32,
    pub origin: RenderOrigin,
    pub texture: TextureId,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            fade_distance: 10.0,
            fade_range: 64.0,
            far_alpha: 0.5,
            occluded_alpha: 0.5,
            vertical_bias: 1.5,
            label_scale: 1.0 / 16.0,
            label_baseline: -16.0,
            origin: RenderOrigin::World,
            texture: MARKER_TEXTURE,
        }
    }
}

impl MarkerConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "loaded marker config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fade_range.is_nan() || self.fade_range <= 0.0 {
            return Err(ConfigError::InvalidFadeRange(self.fade_range));
        }
        for (field, value) in [
            ("far_alpha", self.far_alpha),
            ("occluded_alpha", self.occluded_alpha),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidAlpha { field, value });
            }
        }
        if self.label_scale.is_nan() || self.label_scale <= 0.0 {
            return Err(ConfigError::InvalidLabelScale(self.label_scale));
        }
        Ok(())
    }
}
