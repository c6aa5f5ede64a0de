//! Pro forma projection: loan math, annual forecast, exit valuation and return metrics

mod cashflows;
mod engine;
mod exit;
pub mod guard;
pub mod irr;
pub mod loan;
mod metrics;
mod state;

pub use cashflows::{AmortizationEntry, ForecastYear, ProjectionResult, ProjectionSummary};
pub use engine::{project, ProjectionConfig, ProjectionEngine};
pub use exit::{
    evaluate_exit, sale_value, CostSegregationSummary, ExchangeSummary, ExitAnalysis, ExitOutcome,
    HoldingPosition,
};
pub use irr::{calculate_irr, calculate_npv, IrrSolver};
pub use loan::{compare_loans, LoanComparison, LoanOption};
pub use metrics::{equity_cashflows, MetricName, Metrics};
pub use state::ProjectionState;
