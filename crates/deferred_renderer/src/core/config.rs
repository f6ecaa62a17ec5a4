//! # Pipeline Configuration
//!
//! Serializable settings for the deferred pipeline: clear color, shadow map
//! sizing, which optional passes run, and logging. Loadable from TOML or RON
//! through the [`Config`] trait.

use serde::{Serialize, Deserialize};

use crate::config::{Config, ConfigError};

/// Which optional passes the orchestrator runs
///
/// Disabled passes are still opened and closed on the pass tracker so the
/// frame keeps its fixed sequence; they simply issue no GPU work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PassToggles {
    /// Screen-space effects on the lit image
    pub post_process: bool,
    /// Background fill from the skybox texture
    pub skybox: bool,
    /// Auxiliary line geometry
    pub debug: bool,
    /// Screen-space overlay components
    pub ui: bool,
}

impl Default for PassToggles {
    fn default() -> Self {
        Self {
            post_process: true,
            skybox: true,
            debug: cfg!(debug_assertions),
            ui: true,
        }
    }
}

/// # Pipeline Configuration
///
/// Settings that shape GPU resource creation and per-frame behavior of the
/// [`RenderingSystem`](crate::render::RenderingSystem).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Color the G-buffer color targets are cleared to each frame
    pub clear_color: [f32; 4],
    /// Width and height of each shadow map slice in texels
    pub shadow_map_resolution: u32,
    /// Half-extent of the orthographic volume used for directional light shadows
    pub shadow_extent: f32,
    /// Depth bias applied while rasterizing shadow maps
    pub shadow_depth_bias: i32,
    /// Number of line vertices the debug buffer is first created with
    pub initial_debug_line_capacity: u32,
    /// Technique used for components that do not name their own
    pub default_technique: String,
    /// Log level filter passed to the logger
    pub log_level: String,
    /// Optional pass switches
    pub passes: PassToggles,
}

impl PipelineConfig {
    /// Create a configuration with default values
    pub fn new() -> Self {
        Self {
            clear_color: [0.0, 0.0, 0.0, 0.0],
            shadow_map_resolution: 2048,
            shadow_extent: 50.0,
            shadow_depth_bias: 100,
            initial_debug_line_capacity: 1024,
            default_technique: "Deferred".to_string(),
            log_level: "info".to_string(),
            passes: PassToggles::default(),
        }
    }

    /// Set the G-buffer clear color
    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Set the shadow map slice resolution
    pub fn with_shadow_map_resolution(mut self, resolution: u32) -> Self {
        self.shadow_map_resolution = resolution;
        self
    }

    /// Set the default technique name
    pub fn with_default_technique(mut self, name: impl Into<String>) -> Self {
        self.default_technique = name.into();
        self
    }

    /// Replace the optional pass switches
    pub fn with_passes(mut self, passes: PassToggles) -> Self {
        self.passes = passes;
        self
    }

    /// Enable or disable the debug line pass
    pub fn with_debug_pass(mut self, enabled: bool) -> Self {
        self.passes.debug = enabled;
        self
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.shadow_map_resolution == 0 {
            return Err(ConfigError::Invalid("shadow map resolution must be non-zero".to_string()));
        }

        if !self.shadow_map_resolution.is_power_of_two() {
            return Err(ConfigError::Invalid(format!(
                "shadow map resolution {} is not a power of two",
                self.shadow_map_resolution
            )));
        }

        if self.shadow_extent <= 0.0 {
            return Err(ConfigError::Invalid("shadow extent must be positive".to_string()));
        }

        if self.initial_debug_line_capacity == 0 {
            return Err(ConfigError::Invalid("debug line capacity must be non-zero".to_string()));
        }

        if self.default_technique.is_empty() {
            return Err(ConfigError::Invalid("default technique name cannot be empty".to_string()));
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PipelineConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_power_of_two_shadow_maps() {
        let config = PipelineConfig::new().with_shadow_map_resolution(1000);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_empty_technique() {
        let config = PipelineConfig::new().with_default_technique("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip_through_file() {
        let path = std::env::temp_dir().join("deferred_renderer_config_test.toml");
        let config = PipelineConfig::new()
            .with_clear_color([0.1, 0.2, 0.3, 1.0])
            .with_debug_pass(true);

        config.save_to_file(&path).unwrap();
        let loaded = PipelineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let parsed: PipelineConfig = ron::from_str("(shadow_map_resolution: 512)").unwrap();
        assert_eq!(parsed.shadow_map_resolution, 512);
        assert_eq!(parsed.default_technique, "Deferred");
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = PipelineConfig::load_from_file("pipeline.yaml");
        assert!(result.is_err());
    }
}
