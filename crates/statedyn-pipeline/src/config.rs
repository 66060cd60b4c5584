use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::PipelineError;

pub const DEFAULT_A_FIXED: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Autoregressive coefficient held fixed during the fit.
    pub a_fixed: f64,
    pub state_column: String,
    pub timestamp_column: String,
    /// Columns fed through the feature factory.
    pub transform_columns: Vec<String>,
    /// Transformation names to apply; every registered one when absent.
    pub transformations: Option<Vec<String>>,
    pub suffix: bool,
    /// Explicit input columns; every non-state column when absent.
    pub input_columns: Option<Vec<String>>,
    pub rcond: Option<f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            a_fixed: DEFAULT_A_FIXED,
            state_column: "bpm".to_string(),
            timestamp_column: "timestamp".to_string(),
            transform_columns: vec!["bpm".to_string()],
            transformations: None,
            suffix: true,
            input_columns: None,
            rcond: None,
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self, PipelineError> {
        let raw = fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, PipelineError> {
        let cfg: PipelineConfig = toml::from_str(raw)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        if !self.a_fixed.is_finite() {
            return Err(PipelineError::InvalidConfig(
                "a_fixed must be finite".to_string(),
            ));
        }

        if self.state_column.trim().is_empty() || self.timestamp_column.trim().is_empty() {
            return Err(PipelineError::InvalidConfig(
                "state_column and timestamp_column must be non-empty".to_string(),
            ));
        }

        if self.transform_columns.iter().any(|c| c.trim().is_empty()) {
            return Err(PipelineError::InvalidConfig(
                "transform_columns must not contain empty names".to_string(),
            ));
        }

        if let Some(inputs) = &self.input_columns {
            if inputs.iter().any(|c| c == &self.state_column) {
                return Err(PipelineError::InvalidConfig(format!(
                    "state column '{}' cannot also be an input column",
                    self.state_column
                )));
            }
        }

        if let Some(rcond) = self.rcond {
            if !(rcond.is_finite() && rcond >= 0.0) {
                return Err(PipelineError::InvalidConfig(
                    "rcond must be finite and >= 0".to_string(),
                ));
            }
        }

        Ok(())
    }
}
