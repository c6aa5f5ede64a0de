//! Scenario runner for sensitivity grids and side-by-side comparisons
//!
//! Holds a base input bundle once, then re-runs the full projection pipeline
//! across perturbed copies of it.

use log::debug;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::inputs::{DealInputs, InputField, InputMode, Scenario};
use crate::projection::{MetricName, ProjectionConfig, ProjectionEngine, ProjectionResult};
use crate::scoring::{self, Grade};

/// Metric values indexed `[y][x]`; `None` where a cell could not be evaluated
pub type Matrix = Vec<Vec<Option<f64>>>;

/// Percent offsets used by the purchase-price and base-rent axes
pub const RELATIVE_STEPS: [f64; 5] = [-10.0, -5.0, 0.0, 5.0, 10.0];

/// Offsets (in rate points) around the current exit cap rate
pub const EXIT_CAP_OFFSETS: [f64; 5] = [-1.0, -0.5, 0.0, 0.5, 1.0];

/// Vacancy axis for the cash-on-cash grid
pub const VACANCY_STEPS: [f64; 5] = [0.0, 2.5, 5.0, 7.5, 10.0];

/// A selectable sensitivity axis with its default sweep
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensitivityVariable {
    pub field: InputField,
    pub label: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl SensitivityVariable {
    pub fn values(&self) -> Vec<f64> {
        stepped_range(self.min, self.max, self.step)
    }
}

/// Axes offered for the dynamic IRR grid
pub const SENSITIVITY_VARIABLES: [SensitivityVariable; 4] = [
    SensitivityVariable {
        field: InputField::ExitCapRate,
        label: "Exit Cap Rate (%)",
        min: 4.0,
        max: 10.0,
        step: 0.5,
    },
    SensitivityVariable {
        field: InputField::AnnualRentGrowth,
        label: "Rent Growth (%)",
        min: 0.0,
        max: 8.0,
        step: 0.5,
    },
    SensitivityVariable {
        field: InputField::VacancyRate,
        label: "Vacancy Rate (%)",
        min: 0.0,
        max: 20.0,
        step: 2.0,
    },
    SensitivityVariable {
        field: InputField::InterestRate,
        label: "Interest Rate (%)",
        min: 3.0,
        max: 10.0,
        step: 0.5,
    },
];

impl SensitivityVariable {
    /// Look up one of [`SENSITIVITY_VARIABLES`] by field
    pub fn for_field(field: InputField) -> Option<Self> {
        SENSITIVITY_VARIABLES.into_iter().find(|v| v.field == field)
    }
}

/// Inclusive `min..=max` in `step` increments, rounded to 2 decimals
pub fn stepped_range(min: f64, max: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || !step.is_finite() || max < min {
        return Vec::new();
    }

    let count = ((max - min) / step + 1e-9).floor() as usize + 1;
    (0..count)
        .map(|i| ((min + i as f64 * step) * 100.0).round() / 100.0)
        .collect()
}

/// `base` scaled by each percent offset
pub fn relative_range(base: f64, percent_steps: &[f64]) -> Vec<f64> {
    percent_steps.iter().map(|p| base * (1.0 + p / 100.0)).collect()
}

/// A labelled grid: axes plus the evaluated matrix
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SensitivityGrid {
    pub x_field: String,
    pub x_values: Vec<f64>,
    pub y_field: String,
    pub y_values: Vec<f64>,
    pub metric: String,
    pub values: Matrix,
}

/// Key metrics of one scenario for side-by-side review
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioComparison {
    pub name: String,
    pub total_initial_investment: f64,
    pub irr: f64,
    pub irr_after_tax: f64,
    pub average_cash_on_cash: f64,
    pub equity_multiple: f64,
    pub cap_rate: f64,
    pub total_profit: f64,
    pub grade: Grade,
    pub score: u32,
}

impl ScenarioComparison {
    pub fn from_result(name: impl Into<String>, result: &ProjectionResult) -> Self {
        let m = &result.metrics;
        let deal_score = scoring::score(m);

        Self {
            name: name.into(),
            total_initial_investment: m.total_initial_investment,
            irr: m.irr,
            irr_after_tax: m.irr_after_tax,
            average_cash_on_cash: m.average_cash_on_cash,
            equity_multiple: m.equity_multiple,
            cap_rate: m.cap_rate,
            total_profit: m.total_profit,
            grade: deal_score.grade,
            score: deal_score.score,
        }
    }
}

/// Pre-loaded scenario runner for sensitivity analysis
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::new(DealInputs::default());
/// let grid = runner.sensitivity_grid_by_name(
///     "exitCapRate", &[5.5, 6.5, 7.5],
///     "operations.vacancyRate", &[10.0, 5.0, 0.0],
///     "irr",
/// )?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    base: DealInputs,
    engine: ProjectionEngine,
    /// Evaluate grid rows and comparisons on the rayon pool
    parallel: bool,
}

impl ScenarioRunner {
    /// Create runner with the default projection config
    pub fn new(base: DealInputs) -> Self {
        Self::with_config(base, ProjectionConfig::default())
    }

    pub fn with_config(base: DealInputs, config: ProjectionConfig) -> Self {
        Self {
            base,
            engine: ProjectionEngine::new(config),
            parallel: true,
        }
    }

    /// Switch between parallel and sequential evaluation
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn base(&self) -> &DealInputs {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut DealInputs {
        &mut self.base
    }

    /// Project the unperturbed base inputs
    pub fn run(&self) -> ProjectionResult {
        self.engine.project(&self.base)
    }

    /// Evaluate `metric` with two fields overwritten
    pub fn evaluate_cell(
        &self,
        x_field: InputField,
        x: f64,
        y_field: InputField,
        y: f64,
        metric: MetricName,
    ) -> Result<f64> {
        let inputs = self.base.with_field(x_field, x)?.with_field(y_field, y)?;
        let value = metric.value(&self.engine.project(&inputs).metrics);

        if value.is_finite() {
            Ok(value)
        } else {
            Err(EngineError::NonFiniteMetric {
                metric: metric.to_string(),
                value,
            })
        }
    }

    fn cell(&self, x_field: InputField, x: f64, y_field: InputField, y: f64, metric: MetricName) -> Option<f64> {
        match self.evaluate_cell(x_field, x, y_field, y, metric) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!("Grid cell {}={} / {}={} -> None: {}", x_field, x, y_field, y, e);
                None
            }
        }
    }

    /// `|ys| × |xs|` matrix of `metric`, rows in `ys` order and columns in `xs` order
    pub fn sensitivity_grid(
        &self,
        x_field: InputField,
        xs: &[f64],
        y_field: InputField,
        ys: &[f64],
        metric: MetricName,
    ) -> Matrix {
        debug!(
            "Sensitivity grid {} x {} ({} cells) for {}",
            y_field,
            x_field,
            xs.len() * ys.len(),
            metric
        );

        let row = |&y: &f64| -> Vec<Option<f64>> {
            xs.iter()
                .map(|&x| self.cell(x_field, x, y_field, y, metric))
                .collect()
        };

        if self.parallel {
            ys.par_iter().map(row).collect()
        } else {
            ys.iter().map(row).collect()
        }
    }

    /// As [`Self::sensitivity_grid`], with field paths and metric given by name
    pub fn sensitivity_grid_by_name(
        &self,
        x_field: &str,
        xs: &[f64],
        y_field: &str,
        ys: &[f64],
        metric: &str,
    ) -> Result<Matrix> {
        let x_field: InputField = x_field.parse()?;
        let y_field: InputField = y_field.parse()?;
        let metric: MetricName = metric.parse()?;
        Ok(self.sensitivity_grid(x_field, xs, y_field, ys, metric))
    }

    fn labelled_grid(
        &self,
        x_field: InputField,
        x_values: Vec<f64>,
        y_field: InputField,
        y_values: Vec<f64>,
        metric: MetricName,
    ) -> SensitivityGrid {
        let values = self.sensitivity_grid(x_field, &x_values, y_field, &y_values, metric);
        SensitivityGrid {
            x_field: x_field.to_string(),
            x_values,
            y_field: y_field.to_string(),
            y_values,
            metric: metric.to_string(),
            values,
        }
    }

    /// IRR over two sweep variables; the y axis runs high to low for display
    pub fn dynamic_irr_grid(&self, x: &SensitivityVariable, y: &SensitivityVariable) -> SensitivityGrid {
        let mut y_values = y.values();
        y_values.reverse();
        self.labelled_grid(x.field, x.values(), y.field, y_values, MetricName::Irr)
    }

    /// IRR by purchase price (±10%) against exit cap rate (±1 point, descending)
    pub fn price_exit_cap_grid(&self) -> SensitivityGrid {
        let prices = relative_range(self.base.property.purchase_price, &RELATIVE_STEPS);
        let base_cap = self.base.tax_market.exit_cap_rate;
        let caps: Vec<f64> = EXIT_CAP_OFFSETS.iter().rev().map(|d| base_cap + d).collect();

        self.labelled_grid(InputField::PurchasePrice, prices, InputField::ExitCapRate, caps, MetricName::Irr)
    }

    /// Average cash-on-cash by base rent (±10%) against vacancy
    pub fn rent_vacancy_grid(&self) -> SensitivityGrid {
        let rent_field = match self.base.input_mode() {
            InputMode::Commercial => InputField::AnnualBaseRentPerSqFt,
            InputMode::Simple => InputField::GrossRentMonthly,
        };
        // The rent field always matches the active mode
        let base_rent = self.base.field(rent_field).unwrap_or(0.0);

        self.labelled_grid(
            rent_field,
            relative_range(base_rent, &RELATIVE_STEPS),
            InputField::VacancyRate,
            VACANCY_STEPS.to_vec(),
            MetricName::AverageCashOnCash,
        )
    }

    /// Project each scenario and collect its key metrics
    pub fn compare(&self, scenarios: &[Scenario]) -> Vec<ScenarioComparison> {
        let evaluate = |s: &Scenario| ScenarioComparison::from_result(s.name.clone(), &self.engine.project(&s.inputs));

        if self.parallel {
            scenarios.par_iter().map(evaluate).collect()
        } else {
            scenarios.iter().map(evaluate).collect()
        }
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new(DealInputs::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::{OperatingMode, SimpleOperations};
    use approx::assert_relative_eq;

    #[test]
    fn test_stepped_range() {
        assert_eq!(stepped_range(4.0, 6.0, 0.5), vec![4.0, 4.5, 5.0, 5.5, 6.0]);
        assert_eq!(stepped_range(0.0, 0.3, 0.1), vec![0.0, 0.1, 0.2, 0.3]);
        assert_eq!(stepped_range(0.0, 20.0, 2.0).len(), 11);
        assert!(stepped_range(1.0, 0.0, 0.5).is_empty());
        assert!(stepped_range(0.0, 1.0, 0.0).is_empty());
    }

    #[test]
    fn test_relative_range() {
        let prices = relative_range(1_000_000.0, &RELATIVE_STEPS);
        assert_eq!(prices.len(), 5);
        assert_relative_eq!(prices[0], 900_000.0);
        assert_relative_eq!(prices[4], 1_100_000.0);
    }

    #[test]
    fn test_grid_shape() {
        let runner = ScenarioRunner::default();
        let xs = [5.5, 6.0, 6.5, 7.0];
        let ys = [7.0, 5.0, 3.0];

        let grid = runner.sensitivity_grid(InputField::ExitCapRate, &xs, InputField::VacancyRate, &ys, MetricName::Irr);
        assert_eq!(grid.len(), ys.len());
        assert!(grid.iter().all(|row| row.len() == xs.len()));
    }

    #[test]
    fn test_grid_cell_matches_single_run() {
        let runner = ScenarioRunner::default();
        let base = runner.base();
        let x = base.tax_market.exit_cap_rate;
        let y = base.operations.vacancy_rate;

        let grid = runner
            .sensitivity_grid_by_name("exitCapRate", &[x], "operations.vacancyRate", &[y], "irr")
            .unwrap();
        assert_eq!(grid[0][0], Some(runner.run().metrics.irr));
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let parallel = ScenarioRunner::default();
        let sequential = ScenarioRunner::default().parallel(false);
        let xs = [2.0, 3.0];
        let ys = [6.0, 7.0];

        assert_eq!(
            parallel.sensitivity_grid(InputField::AnnualRentGrowth, &xs, InputField::InterestRate, &ys, MetricName::IrrAfterTax),
            sequential.sensitivity_grid(InputField::AnnualRentGrowth, &xs, InputField::InterestRate, &ys, MetricName::IrrAfterTax),
        );
    }

    #[test]
    fn test_lower_exit_cap_raises_irr() {
        let runner = ScenarioRunner::default();
        let grid = runner.sensitivity_grid(
            InputField::ExitCapRate,
            &[5.5, 7.5],
            InputField::VacancyRate,
            &[5.0],
            MetricName::Irr,
        );
        assert!(grid[0][0].unwrap() > grid[0][1].unwrap());
    }

    #[test]
    fn test_failed_cells_are_none() {
        let runner = ScenarioRunner::default();

        // Simple-mode field against a commercial base
        let grid = runner.sensitivity_grid(
            InputField::GrossRentMonthly,
            &[4_000.0],
            InputField::VacancyRate,
            &[5.0],
            MetricName::Irr,
        );
        assert_eq!(grid, vec![vec![None]]);

        // All-cash purchase has no finite DSCR
        let grid = runner.sensitivity_grid(
            InputField::DownPaymentPercent,
            &[50.0, 100.0],
            InputField::VacancyRate,
            &[5.0],
            MetricName::Dscr,
        );
        assert!(grid[0][0].is_some());
        assert!(grid[0][1].is_none());
    }

    #[test]
    fn test_absurd_year_cells_are_none() {
        let runner = ScenarioRunner::default();

        let grid = runner.sensitivity_grid(
            InputField::LoanTermYears,
            &[25.0, 4e8],
            InputField::VacancyRate,
            &[5.0],
            MetricName::Irr,
        );
        assert!(grid[0][0].is_some());
        assert!(grid[0][1].is_none());

        let grid = runner.sensitivity_grid(
            InputField::HoldPeriod,
            &[10.0, f64::INFINITY],
            InputField::VacancyRate,
            &[5.0],
            MetricName::Irr,
        );
        assert_eq!(grid[0][0], Some(runner.run().metrics.irr));
        assert!(grid[0][1].is_none());
    }

    #[test]
    fn test_unknown_names_fail_up_front() {
        let runner = ScenarioRunner::default();
        assert!(matches!(
            runner.sensitivity_grid_by_name("operations.bogus", &[1.0], "exitCapRate", &[1.0], "irr"),
            Err(EngineError::UnknownField(_))
        ));
        assert!(matches!(
            runner.sensitivity_grid_by_name("exitCapRate", &[1.0], "exitCapRate", &[1.0], "moic"),
            Err(EngineError::UnknownMetric(_))
        ));
    }

    #[test]
    fn test_preset_grids() {
        let runner = ScenarioRunner::default();

        let price = runner.price_exit_cap_grid();
        assert_eq!(price.y_values, vec![7.5, 7.0, 6.5, 6.0, 5.5]);
        assert_eq!(price.values.len(), 5);
        // Centre cell is the base case
        assert_eq!(price.values[2][2], Some(runner.run().metrics.irr));

        let coc = runner.rent_vacancy_grid();
        assert_eq!(coc.x_field, "operations.annualBaseRentPerSqFt");
        assert_eq!(coc.metric, "averageCashOnCash");
        assert!(coc.values.iter().flatten().all(Option::is_some));

        let x = SensitivityVariable::for_field(InputField::ExitCapRate).unwrap();
        let y = SensitivityVariable::for_field(InputField::AnnualRentGrowth).unwrap();
        let dynamic = runner.dynamic_irr_grid(&x, &y);
        assert_eq!(dynamic.x_values.len(), 13);
        assert_eq!(dynamic.y_values.first(), Some(&8.0));
        assert_eq!(dynamic.values.len(), 17);
    }

    #[test]
    fn test_rent_grid_follows_simple_mode() {
        let mut inputs = DealInputs::default();
        inputs.operations.mode = OperatingMode::Simple(SimpleOperations::default());
        let grid = ScenarioRunner::new(inputs).rent_vacancy_grid();

        assert_eq!(grid.x_field, "operations.grossRentMonthly");
        assert_relative_eq!(grid.x_values[2], 4_000.0);
    }

    #[test]
    fn test_compare_scenarios() {
        let runner = ScenarioRunner::default();
        let mut cheaper = DealInputs::default();
        cheaper.property.purchase_price = 1_800_000.0;

        let rows = runner.compare(&[
            Scenario::new("Base", DealInputs::default()),
            Scenario::new("Discounted", cheaper),
        ]);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Base");
        assert!(rows[1].irr > rows[0].irr);
        assert!(rows[1].cap_rate > rows[0].cap_rate);
    }
}
