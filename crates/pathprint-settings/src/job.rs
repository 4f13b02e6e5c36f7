//! Per-print options supplied by the user at job time rather than stored in
//! the config file.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JobOptions {
    /// Total height of the extruded object, millimetres. The layer plan
    /// always prints at least one layer, so zero is a valid request.
    pub target_height: f64,
    /// Shift the whole toolpath so its bounding box is centred on the bed.
    pub center_on_bed: bool,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self {
            target_height: 0.0,
            center_on_bed: true,
        }
    }
}

impl JobOptions {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !self.target_height.is_finite() || self.target_height < 0.0 {
            return Err(SettingsError::Invalid(
                "target height must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}
