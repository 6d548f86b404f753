//! Configuration file support for regioncap.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/regioncap/config.toml`. Settings cover selection limits,
//! window snapping heuristics, toolbar placement and annotation defaults.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
pub mod types;

// Re-export commonly used types at module level
pub use enums::ColorSpec;
pub use types::{AnnotationConfig, SelectionConfig, SnapConfig, ToolbarConfig};

use anyhow::{Context, Result};
use log::{debug, info};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// # Example TOML
/// ```toml
/// [selection]
/// min_selection_size = 6.0
///
/// [snap]
/// edge_tolerance = 12.0
/// coverage_threshold = 0.9
///
/// [toolbar]
/// margin = 12.0
///
/// [annotation]
/// default_color = "red"
/// mosaic_size = 24.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    /// Selection rectangle limits
    #[serde(default)]
    pub selection: SelectionConfig,

    /// Window snapping heuristics
    #[serde(default)]
    pub snap: SnapConfig,

    /// Toolbar placement
    #[serde(default)]
    pub toolbar: ToolbarConfig,

    /// Annotation editor defaults
    #[serde(default)]
    pub annotation: AnnotationConfig,
}

/// Clamps `value` into `range`, logging a warning when it was out of bounds.
fn clamp_setting(name: &str, value: &mut f64, min: f64, max: f64) {
    if !(min..=max).contains(value) {
        log::warn!("Invalid {name} {value:.2}, clamping to {min:.1}-{max:.1} range");
        *value = if value.is_nan() { min } else { value.clamp(min, max) };
    }
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    pub fn validate_and_clamp(&mut self) {
        let selection = &mut self.selection;
        clamp_setting("min_selection_size", &mut selection.min_selection_size, 1.0, 64.0);
        clamp_setting("handle_hit_size", &mut selection.handle_hit_size, 4.0, 40.0);

        let snap = &mut self.snap;
        clamp_setting("snap edge_tolerance", &mut snap.edge_tolerance, 0.0, 100.0);
        clamp_setting("snap coverage_threshold", &mut snap.coverage_threshold, 0.1, 1.0);
        clamp_setting(
            "snap pointer_tolerance_multiplier",
            &mut snap.pointer_tolerance_multiplier,
            1.0,
            4.0,
        );
        clamp_setting("snap hover_move_threshold", &mut snap.hover_move_threshold, 0.0, 20.0);
        clamp_setting("snap min_target_size", &mut snap.min_target_size, 0.0, 400.0);
        if !(200..=10_000).contains(&snap.refresh_interval_ms) {
            log::warn!(
                "Invalid snap refresh_interval_ms {}, clamping to 200-10000 range",
                snap.refresh_interval_ms
            );
            snap.refresh_interval_ms = snap.refresh_interval_ms.clamp(200, 10_000);
        }

        let toolbar = &mut self.toolbar;
        clamp_setting("toolbar margin", &mut toolbar.margin, 0.0, 64.0);
        clamp_setting("toolbar estimated_width", &mut toolbar.estimated_width, 1.0, 4096.0);
        clamp_setting("toolbar estimated_height", &mut toolbar.estimated_height, 1.0, 1024.0);
        clamp_setting("toolbar dock_inset", &mut toolbar.dock_inset, 0.0, 512.0);

        let annotation = &mut self.annotation;
        clamp_setting("annotation default_width", &mut annotation.default_width, 1.0, 40.0);
        clamp_setting("annotation font_size", &mut annotation.font_size, 8.0, 96.0);
        clamp_setting("annotation pen_min_distance", &mut annotation.pen_min_distance, 0.0, 20.0);
        clamp_setting("annotation mosaic_size", &mut annotation.mosaic_size, 6.0, 120.0);

        if annotation.font_family.trim().is_empty() {
            log::warn!("Empty font_family, falling back to 'Sans'");
            annotation.font_family = "Sans".to_string();
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/regioncap/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("regioncap");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default location, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if the file is absent.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or is not valid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// Saves the configuration to `~/.config/regioncap/config.toml`.
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let config_str = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, config_str)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;

        info!("Saved config to {}", config_path.display());
        Ok(())
    }

    /// Writes the documented example config to the user's config directory.
    ///
    /// # Errors
    /// Returns an error if a config file already exists or the file cannot be written.
    pub fn create_default_file() -> Result<PathBuf> {
        let config_path = Self::get_config_path()?;

        if config_path.exists() {
            return Err(anyhow::anyhow!(
                "Config file already exists at {}",
                config_path.display()
            ));
        }

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(&config_path, include_str!("../../config.example.toml"))?;

        info!("Created default config at {}", config_path.display());
        Ok(config_path)
    }

    /// JSON schema describing the config file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}
