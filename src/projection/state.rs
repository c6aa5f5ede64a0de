//! Running operating state carried from one forecast year to the next

use crate::inputs::{DealInputs, OperatingMode};
use super::guard::pct;

/// Revenue and expense levels at the start of a forecast year
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Forecast year about to be computed (1-indexed)
    pub year: u32,

    /// Annual base rent
    pub base_rent: f64,

    /// Annual other income
    pub other_income: f64,

    /// Tenant-reimbursed expenses (commercial only)
    pub reimbursables: f64,

    /// Annual property tax
    pub property_tax: f64,

    /// Annual insurance
    pub insurance: f64,

    /// Annual common-area maintenance (commercial only)
    pub cam: f64,

    /// Outstanding loan balance at the start of the year
    pub loan_balance: f64,
}

impl ProjectionState {
    /// Seed year-1 levels from the active operating mode
    pub fn from_inputs(inputs: &DealInputs, loan_amount: f64) -> Self {
        let price = inputs.property.purchase_price;

        let mut state = Self {
            year: 1,
            base_rent: 0.0,
            other_income: 0.0,
            reimbursables: 0.0,
            property_tax: 0.0,
            insurance: 0.0,
            cam: 0.0,
            loan_balance: loan_amount,
        };

        match &inputs.operations.mode {
            OperatingMode::Commercial(c) => {
                let size = inputs.property.building_size;
                let expenses = &c.commercial_expenses;

                state.base_rent = c.annual_base_rent_per_sq_ft * size;
                state.other_income = state.base_rent * pct(c.other_income_percent);
                state.property_tax = expenses.property_tax_per_sq_ft * size;
                state.insurance = expenses.insurance_per_sq_ft * size;
                state.cam = expenses.cam_per_sq_ft * size;
                state.reimbursables = state.property_tax + state.insurance + state.cam;
            }
            OperatingMode::Simple(s) => {
                state.base_rent = s.gross_rent_monthly * 12.0;
                state.other_income = s.other_income_monthly * 12.0;
                state.property_tax = price * pct(s.property_tax_rate);
                state.insurance = s.insurance_annual;
            }
        }

        state
    }

    /// Apply one year of growth and debt paydown
    ///
    /// Reimbursables are re-derived from the grown tax, insurance and CAM so
    /// pass-through income tracks the reimbursed expense.
    pub fn advance_year(&mut self, inputs: &DealInputs, principal_paid: f64) {
        let rent_growth = 1.0 + pct(inputs.operations.annual_rent_growth);
        let expense_growth = 1.0 + pct(inputs.operations.annual_expense_growth);

        self.year += 1;
        self.loan_balance -= principal_paid;

        self.base_rent *= rent_growth;
        self.other_income *= rent_growth;

        self.property_tax *= expense_growth;
        self.insurance *= expense_growth;

        if let OperatingMode::Commercial(_) = inputs.operations.mode {
            self.cam *= expense_growth;
            self.reimbursables = self.property_tax + self.insurance + self.cam;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::SimpleOperations;
    use approx::assert_relative_eq;

    #[test]
    fn test_commercial_seed() {
        let inputs = DealInputs::default();
        let state = ProjectionState::from_inputs(&inputs, 1_500_000.0);

        // 10,000 sf at $18, tax 1.50, insurance 0.75, CAM 1.25
        assert_relative_eq!(state.base_rent, 180_000.0);
        assert_relative_eq!(state.reimbursables, 35_000.0);
        assert_relative_eq!(state.loan_balance, 1_500_000.0);
    }

    #[test]
    fn test_simple_seed() {
        let mut inputs = DealInputs::default();
        inputs.operations.mode = OperatingMode::Simple(SimpleOperations::default());
        let state = ProjectionState::from_inputs(&inputs, 0.0);

        assert_relative_eq!(state.base_rent, 48_000.0);
        assert_relative_eq!(state.property_tax, 30_000.0);
        assert_relative_eq!(state.insurance, 1_200.0);
        assert_eq!(state.reimbursables, 0.0);
    }

    #[test]
    fn test_reimbursables_follow_expenses() {
        let inputs = DealInputs::default();
        let mut state = ProjectionState::from_inputs(&inputs, 0.0);
        state.advance_year(&inputs, 0.0);

        assert_eq!(state.year, 2);
        assert_relative_eq!(state.base_rent, 180_000.0 * 1.03);
        assert_relative_eq!(state.reimbursables, 35_000.0 * 1.02, max_relative = 1e-12);
        assert_relative_eq!(
            state.reimbursables,
            state.property_tax + state.insurance + state.cam
        );
    }
}
