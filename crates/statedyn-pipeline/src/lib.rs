//! Measurement pipeline for `statedyn` fits.
//!
//! Turns time-stamped measurement records into the aligned trajectory and
//! input arrays the estimator expects: numeric coercion, timestamp ordering,
//! feature augmentation through a registry of column transformations, and
//! selection of the state column. The `statedyn` binary drives the whole chain
//! from a JSON payload or CSV file.

pub mod config;
pub mod features;
pub mod io;
pub mod pipeline;
pub mod records;
pub mod table;

use statedyn::EstimationError;
use thiserror::Error;

pub use config::PipelineConfig;
pub use features::FeatureFactory;
pub use pipeline::{process_payload, process_records, FitReport};
pub use records::{coerce_records, MeasurementPayload, MeasurementRecord, RawValue};
pub use table::Table;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("row {row}: cannot read {column} value {value:?} as a number")]
    Coercion {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: missing field {column}")]
    MissingField { row: usize, column: String },
    #[error("column '{0}' not found")]
    UnknownColumn(String),
    #[error("transformation '{0}' is not registered")]
    UnknownTransformation(String),
    #[error("payload contains no records")]
    EmptyPayload,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("{context} length mismatch: expected {expected}, got {got}")]
    LengthMismatch {
        context: String,
        expected: usize,
        got: usize,
    },
    #[error("estimation failed: {0}")]
    Estimation(#[from] EstimationError),
}
