//! Printer, material and process configuration.
//!
//! One flat set of sections persisted as TOML (or JSON) in the platform
//! config directory. Defaults describe a common 0.4 mm-nozzle FDM printer so
//! a missing config file still produces sensible g-code.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Machine geometry and priming.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineSettings {
    /// Usable bed width (X), millimetres.
    pub bed_width: f64,
    /// Usable bed depth (Y), millimetres.
    pub bed_depth: f64,
    /// Whether to prime the nozzle with a blob before the print.
    pub prime_blob: bool,
    /// Prime blob position, millimetres.
    pub prime_x: f64,
    pub prime_y: f64,
}

impl Default for MachineSettings {
    fn default() -> Self {
        Self {
            bed_width: 223.0,
            bed_depth: 223.0,
            prime_blob: false,
            prime_x: 9.0,
            prime_y: 6.0,
        }
    }
}

/// Filament properties and temperatures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialSettings {
    /// Filament diameter, millimetres.
    pub diameter: f64,
    /// Extrusion multiplier, 1.0 = 100%.
    pub flow: f64,
    /// Extrusion multiplier for the first layer.
    pub flow_layer_0: f64,
    pub print_temperature: f64,
    /// Hotend temperature while the first layer prints.
    pub print_temperature_layer_0: f64,
    pub bed_temperature: f64,
    pub bed_temperature_layer_0: f64,
}

impl Default for MaterialSettings {
    fn default() -> Self {
        Self {
            diameter: 2.85,
            flow: 1.0,
            flow_layer_0: 1.0,
            print_temperature: 210.0,
            print_temperature_layer_0: 215.0,
            bed_temperature: 60.0,
            bed_temperature_layer_0: 60.0,
        }
    }
}

/// Layering, speeds and motion planner limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessSettings {
    /// Layer height, millimetres.
    pub layer_height: f64,
    /// Height of the first layer, millimetres.
    pub initial_layer_height: f64,
    /// Line width used when a stroke does not specify one, millimetres.
    pub default_line_width: f64,
    /// Maximum chordal deviation when flattening curves, millimetres.
    pub max_resolution: f64,
    /// Print speed, mm/s.
    pub print_speed: f64,
    pub print_speed_layer_0: f64,
    /// Travel speed, mm/s.
    pub travel_speed: f64,
    pub travel_speed_layer_0: f64,
    /// Print acceleration for M204, mm/s².
    pub acceleration: f64,
    /// Planner jerk for M205, mm/s.
    pub jerk: f64,
}

impl Default for ProcessSettings {
    fn default() -> Self {
        Self {
            layer_height: 0.1,
            initial_layer_height: 0.27,
            default_line_width: 0.35,
            max_resolution: 0.1,
            print_speed: 35.0,
            print_speed_layer_0: 20.0,
            travel_speed: 150.0,
            travel_speed_layer_0: 75.0,
            acceleration: 500.0,
            jerk: 10.0,
        }
    }
}

/// Retraction behaviour between strokes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetractionSettings {
    pub enabled: bool,
    /// Filament pulled back, millimetres.
    pub distance: f64,
    /// Retract speed, mm/s.
    pub retract_speed: f64,
    /// Unretract (prime) speed, mm/s.
    pub prime_speed: f64,
}

impl Default for RetractionSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            distance: 6.5,
            retract_speed: 25.0,
            prime_speed: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PrintConfig {
    #[serde(default)]
    pub machine: MachineSettings,
    #[serde(default)]
    pub material: MaterialSettings,
    #[serde(default)]
    pub process: ProcessSettings,
    #[serde(default)]
    pub retraction: RetractionSettings,
}

impl PrintConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// The per-user config path, `<config dir>/pathprint/config.toml`.
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        let base = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
        Ok(base.join("pathprint").join("config.toml"))
    }

    /// Loads the per-user config, falling back to defaults when the file
    /// does not exist yet.
    pub fn load_default() -> Result<Self, SettingsError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from_file(&path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            return Err(SettingsError::UnknownFormat(path.to_path_buf()));
        };
        config.validate()?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        self.validate()?;
        let content = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::to_string_pretty(self)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::to_string_pretty(self)?
        } else {
            return Err(SettingsError::UnknownFormat(path.to_path_buf()));
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(path, content).map_err(|source| SettingsError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.machine.bed_width <= 0.0 || self.machine.bed_depth <= 0.0 {
            return Err(SettingsError::Invalid(
                "bed dimensions must be > 0".to_string(),
            ));
        }
        if self.process.layer_height <= 0.0 || self.process.initial_layer_height <= 0.0 {
            return Err(SettingsError::Invalid(
                "layer heights must be > 0".to_string(),
            ));
        }
        if self.process.default_line_width <= 0.0 {
            return Err(SettingsError::Invalid(
                "default line width must be > 0".to_string(),
            ));
        }
        if self.process.max_resolution <= 0.0 {
            return Err(SettingsError::Invalid(
                "max resolution must be > 0".to_string(),
            ));
        }
        if self.material.diameter <= 0.0 {
            return Err(SettingsError::Invalid(
                "material diameter must be > 0".to_string(),
            ));
        }
        if self.material.flow <= 0.0 || self.material.flow_layer_0 <= 0.0 {
            return Err(SettingsError::Invalid("flow must be > 0".to_string()));
        }
        if self.process.print_speed <= 0.0
            || self.process.print_speed_layer_0 <= 0.0
            || self.process.travel_speed <= 0.0
            || self.process.travel_speed_layer_0 <= 0.0
        {
            return Err(SettingsError::Invalid("speeds must be > 0".to_string()));
        }
        if self.retraction.enabled
            && (self.retraction.distance <= 0.0
                || self.retraction.retract_speed <= 0.0
                || self.retraction.prime_speed <= 0.0)
        {
            return Err(SettingsError::Invalid(
                "retraction distance and speeds must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}
