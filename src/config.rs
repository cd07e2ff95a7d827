use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::assets::AssetSources;
use crate::error::ConfigError;
use crate::texture::TextureRole;

/// Upper bound on the drawing surface edge, in pixels.
pub const MAX_CANVAS_DIMENSION: u32 = 512;
/// Space left around the canvas when sizing it from the window.
pub const CANVAS_MARGIN: u32 = 100;
/// Pattern width rendered by the first draw.
pub const DEFAULT_BLEND: f32 = 0.3;

/// Names the core looks up in the supplied shader sources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ShaderBindings {
    pub position_attribute: String,
    pub base_a_sampler: String,
    pub base_b_sampler: String,
    pub pattern_sampler: String,
    pub pattern_width: String,
}

impl Default for ShaderBindings {
    fn default() -> Self {
        Self {
            position_attribute: "a_position".into(),
            base_a_sampler: "u_image0".into(),
            base_b_sampler: "u_image1".into(),
            pattern_sampler: "u_pattern".into(),
            pattern_width: "u_patternWidth".into(),
        }
    }
}

impl ShaderBindings {
    pub fn sampler(&self, role: TextureRole) -> &str {
        match role {
            TextureRole::BaseA => &self.base_a_sampler,
            TextureRole::BaseB => &self.base_b_sampler,
            TextureRole::Pattern => &self.pattern_sampler,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub max_canvas_dimension: u32,
    pub canvas_margin: u32,
    pub initial_blend: f32,
    pub log_level: String,
    pub assets: AssetSources,
    pub bindings: ShaderBindings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_canvas_dimension: MAX_CANVAS_DIMENSION,
            canvas_margin: CANVAS_MARGIN,
            initial_blend: DEFAULT_BLEND,
            log_level: "info".into(),
            assets: AssetSources::default(),
            bindings: ShaderBindings::default(),
        }
    }
}

impl Config {
    /// Parses a JSON document; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_canvas_dimension == 0 {
            return Err(ConfigError::Invalid(
                "maxCanvasDimension must be positive".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.initial_blend) {
            return Err(ConfigError::Invalid(format!(
                "initialBlend {} is outside [0, 1]",
                self.initial_blend
            )));
        }
        Ok(())
    }

    /// Edge length of the square surface for a desired size.
    pub fn surface_size(&self, desired: u32) -> u32 {
        desired.min(self.max_canvas_dimension)
    }

    /// Desired surface edge for a window of the given inner size.
    pub fn desired_size(&self, inner_width: u32, inner_height: u32) -> u32 {
        inner_width
            .min(inner_height)
            .saturating_sub(self.canvas_margin)
    }

    /// Falls back to `Info` for unrecognized names.
    pub fn log_level(&self) -> log::Level {
        log::Level::from_str(&self.log_level).unwrap_or(log::Level::Info)
    }
}
