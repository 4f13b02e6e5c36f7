//! Configuration for pathprint: persistent printer/material settings and
//! per-job options.

pub mod config;
pub mod error;
pub mod job;

pub use config::{MachineSettings, MaterialSettings, PrintConfig, ProcessSettings, RetractionSettings};
pub use error::SettingsError;
pub use job::JobOptions;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        PrintConfig::default().validate().unwrap();
        JobOptions::default().validate().unwrap();
    }

    #[test]
    fn toml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = PrintConfig::default();
        config.process.layer_height = 0.2;
        config.machine.bed_width = 300.0;
        config.save_to_file(&path).unwrap();

        let loaded = PrintConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn missing_sections_fall_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let loaded = PrintConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, PrintConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut config = PrintConfig::default();
        config.process.layer_height = 0.0;
        assert!(config.validate().is_err());

        let job = JobOptions {
            target_height: -1.0,
            center_on_bed: false,
        };
        assert!(job.validate().is_err());
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        assert!(matches!(
            PrintConfig::default().save_to_file(&path),
            Err(SettingsError::UnknownFormat(_))
        ));
    }
}
