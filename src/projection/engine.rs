//! Core projection engine for annual pro forma cashflows

use log::debug;

use crate::inputs::{
    CommercialOperations, DealInputs, OperatingMode, SimpleOperations, DEFAULT_HOLD_PERIOD, MAX_TERM_YEARS,
};
use super::cashflows::{ForecastYear, ProjectionResult};
use super::exit::{evaluate_exit, HoldingPosition};
use super::guard::{pct, percent_of, safe_div};
use super::irr::IrrSolver;
use super::loan::{amortization_schedule, annual_interest_split, monthly_payment};
use super::metrics::Metrics;
use super::state::ProjectionState;

/// Configuration for a projection run
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Years projected when the inputs carry a zero hold period
    pub default_hold_period: u32,

    /// IRR root-finder settings
    pub irr: IrrSolver,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            default_hold_period: DEFAULT_HOLD_PERIOD,
            irr: IrrSolver::default(),
        }
    }
}

/// Quantities fixed at acquisition and shared by every forecast year
#[derive(Debug, Clone, Copy)]
struct Acquisition {
    loan_amount: f64,
    monthly_debt_service: f64,
    annual_debt_service: f64,
    annual_depreciation: f64,
    total_initial_investment: f64,
}

/// Main projection engine
#[derive(Debug, Clone, Default)]
pub struct ProjectionEngine {
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine with the given config
    pub fn new(config: ProjectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Number of forecast years for these inputs, capped at [`MAX_TERM_YEARS`]
    pub fn hold_years(&self, inputs: &DealInputs) -> u32 {
        match inputs.tax_market.hold_period {
            0 => self.config.default_hold_period,
            years => years.min(MAX_TERM_YEARS),
        }
    }

    /// Run the full pipeline: forecast, exit valuation and metrics
    pub fn project(&self, inputs: &DealInputs) -> ProjectionResult {
        let years = self.hold_years(inputs);
        let property = &inputs.property;
        let financing = &inputs.financing;

        debug!(
            "Projecting {} years, {} mode, price {:.0}",
            years,
            inputs.input_mode(),
            property.purchase_price
        );

        let closing_costs = inputs
            .closing_costs
            .breakdown(property.purchase_price, financing.is_all_cash());
        let acquisition = self.acquisition(inputs, closing_costs.total);

        let mut forecast = Vec::with_capacity(years as usize);
        let mut state = ProjectionState::from_inputs(inputs, acquisition.loan_amount);

        for _year in 1..=years {
            let row = self.calculate_year(inputs, &acquisition, &state);
            state.advance_year(inputs, row.principal_payment);
            forecast.push(row);
        }

        let (final_noi, final_loan_balance) = forecast
            .last()
            .map_or((0.0, acquisition.loan_amount), |f| (f.noi, f.loan_balance_end));

        let exit = evaluate_exit(
            inputs,
            &HoldingPosition {
                years,
                final_noi,
                final_loan_balance,
                annual_depreciation: acquisition.annual_depreciation,
                closing_costs: closing_costs.total,
            },
        );

        let metrics = Metrics::aggregate(
            inputs,
            &forecast,
            acquisition.total_initial_investment,
            closing_costs,
            exit,
            &self.config.irr,
        );

        debug!(
            "Projection complete: IRR {:.2}%, after-tax {:.2}%, equity multiple {:.2}x",
            metrics.irr, metrics.irr_after_tax, metrics.equity_multiple
        );

        ProjectionResult {
            forecast,
            amortization_schedule: amortization_schedule(
                acquisition.loan_amount,
                financing.interest_rate,
                financing.loan_term_years,
            ),
            metrics,
        }
    }

    fn acquisition(&self, inputs: &DealInputs, closing_costs: f64) -> Acquisition {
        let property = &inputs.property;
        let financing = &inputs.financing;
        let initial_capex = inputs.operations.initial_capex;

        let loan_amount = financing.loan_amount(property.purchase_price);
        let monthly_debt_service = monthly_payment(
            loan_amount,
            financing.interest_rate,
            financing.loan_term_years as f64,
        );

        let depreciable_basis =
            property.purchase_price - property.land_value() + property.rehab_costs + initial_capex;

        Acquisition {
            loan_amount,
            monthly_debt_service,
            annual_debt_service: monthly_debt_service * 12.0,
            annual_depreciation: safe_div(depreciable_basis, inputs.tax_market.depreciation_years),
            total_initial_investment: financing.down_payment(property.purchase_price)
                + closing_costs
                + property.rehab_costs
                + initial_capex,
        }
    }

    /// Calculate one forecast year from the running state
    fn calculate_year(&self, inputs: &DealInputs, acq: &Acquisition, state: &ProjectionState) -> ForecastYear {
        let mut row = ForecastYear::new(state.year);
        let vacancy_rate = pct(inputs.operations.vacancy_rate);

        // Income and operating expenses
        match &inputs.operations.mode {
            OperatingMode::Commercial(c) => {
                row.potential_gross_income = state.base_rent + state.reimbursables + state.other_income;
                row.vacancy_loss = row.potential_gross_income * vacancy_rate;
                row.effective_gross_income = row.potential_gross_income - row.vacancy_loss;
                row.total_expenses = self.commercial_expenses(inputs, c, state, row.effective_gross_income);
            }
            OperatingMode::Simple(s) => {
                row.potential_gross_income = state.base_rent + state.other_income;
                row.vacancy_loss = row.potential_gross_income * vacancy_rate;
                row.effective_gross_income = row.potential_gross_income - row.vacancy_loss;
                row.total_expenses = self.simple_expenses(s, state, row.effective_gross_income);
            }
        }
        row.noi = row.effective_gross_income - row.total_expenses;

        // Debt service
        let split = annual_interest_split(
            state.loan_balance,
            inputs.financing.interest_rate,
            acq.monthly_debt_service,
        );
        row.debt_service = acq.annual_debt_service;
        row.interest_payment = split.interest;
        row.principal_payment = split.principal;
        row.loan_balance_end = state.loan_balance - split.principal;

        // Cash flow and income tax; a tax loss is a benefit, not floored
        row.cash_flow = row.noi - row.debt_service;
        row.taxable_income = row.noi - row.interest_payment - acq.annual_depreciation;
        row.tax_liability = row.taxable_income * pct(inputs.tax_market.income_tax_rate);
        row.cash_flow_after_tax = row.cash_flow - row.tax_liability;

        row.cash_on_cash = percent_of(row.cash_flow, acq.total_initial_investment);
        row.cash_on_cash_after_tax = percent_of(row.cash_flow_after_tax, acq.total_initial_investment);

        row
    }

    /// NNN expenses: reimbursed tax/insurance/CAM plus landlord-only costs
    fn commercial_expenses(
        &self,
        inputs: &DealInputs,
        ops: &CommercialOperations,
        state: &ProjectionState,
        effective_gross_income: f64,
    ) -> f64 {
        let expenses = &ops.commercial_expenses;
        let management = effective_gross_income * pct(expenses.management_percent);
        let reserves = expenses.annual_capex_reserve_per_sq_ft * inputs.property.building_size;

        state.property_tax
            + state.insurance
            + state.cam
            + management
            + expenses.repairs_maintenance_annual
            + reserves
    }

    fn simple_expenses(&self, ops: &SimpleOperations, state: &ProjectionState, effective_gross_income: f64) -> f64 {
        let variable_rate = pct(ops.management_fee_rate) + pct(ops.maintenance_rate) + pct(ops.capex_rate);
        state.property_tax + state.insurance + effective_gross_income * variable_rate
    }
}

/// Project with the default configuration
pub fn project(inputs: &DealInputs) -> ProjectionResult {
    ProjectionEngine::default().project(inputs)
}
