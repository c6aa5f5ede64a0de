//! Error type for structural failures
//!
//! Numeric degeneracy (zero rates, zero terms, non-converging IRR) is never an
//! error in this crate; those paths return neutral values. The variants here
//! cover malformed requests: bad field paths, unknown metrics, I/O on scenario
//! files and validation of caller-supplied forms.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown input field: {0}")]
    UnknownField(String),

    #[error("Field {field} does not apply to {mode} operations")]
    FieldNotApplicable { field: String, mode: String },

    #[error("Value {value} is out of range for {field}")]
    OutOfRange { field: String, value: f64 },

    #[error("Unknown property template: {0}")]
    UnknownTemplate(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Metric {metric} is not finite ({value})")]
    NonFiniteMetric { metric: String, value: f64 },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
