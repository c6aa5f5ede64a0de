//! Pro forma engine - deterministic real-estate investment forecasting
//!
//! This library provides:
//! - Level-payment loan math and amortization schedules
//! - Multi-year operating forecasts for simple and commercial (NNN) properties
//! - Exit valuation with depreciation recapture, 1031 exchange and cost segregation
//! - IRR, NPV, cash-on-cash and equity-multiple metrics
//! - Two-variable sensitivity grids and scenario comparison
//! - Weighted deal scoring

pub mod error;
pub mod inputs;
pub mod projection;
pub mod scenario;
pub mod scoring;

// Re-export commonly used types
pub use error::{EngineError, Result};
pub use inputs::{DealInputs, InputField, Scenario, ScenarioPatch};
pub use projection::{
    project, ForecastYear, MetricName, Metrics, ProjectionConfig, ProjectionEngine, ProjectionResult,
};
pub use scenario::ScenarioRunner;
pub use scoring::{score, DealScore, Grade};
