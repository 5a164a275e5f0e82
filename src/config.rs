use crate::duration::DurationUnits;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Options for one analysis run. Every field has a default, so a partial JSON
/// document is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisConfig {
    pub duration_units: DurationUnits,
    pub include_dependency_matrix: bool,
    pub include_resource_allocation: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            duration_units: DurationUnits::default(),
            include_dependency_matrix: true,
            include_resource_allocation: true,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(file)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let units = &self.duration_units;
        if units.hours_per_day == 0 || units.hours_per_week == 0 {
            return Err(ConfigError::Invalid(
                "durationUnits hours must be greater than zero".into(),
            ));
        }
        if units.hours_per_day > units.hours_per_week {
            return Err(ConfigError::Invalid(format!(
                "hoursPerDay {} exceeds hoursPerWeek {}",
                units.hours_per_day, units.hours_per_week
            )));
        }
        Ok(())
    }
}
