//! Deal inputs: property, financing, operations, tax/market and closing costs

mod data;
mod field;
mod operations;
pub mod loader;
pub mod templates;
pub mod validation;

pub use data::{
    ClosingCosts, ClosingCostsBreakdown, Financing, Property, TaxMarket, DEFAULT_HOLD_PERIOD,
    DEFAULT_RECAPTURE_RATE, MAX_TERM_YEARS,
};
pub use field::InputField;
pub use loader::{Scenario, ScenarioPatch};
pub use operations::{
    CommercialExpenses, CommercialOperations, InputMode, OperatingMode, Operations,
    SimpleOperations,
};
pub use templates::PropertyTemplate;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Complete input bundle for one projection run
///
/// The engine only ever reads from this; perturbations for sensitivity
/// analysis go through [`DealInputs::with_field`], which returns a new bundle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealInputs {
    pub property: Property,
    pub financing: Financing,
    pub operations: Operations,
    pub tax_market: TaxMarket,
    pub closing_costs: ClosingCosts,
}

impl DealInputs {
    pub fn new(
        property: Property,
        financing: Financing,
        operations: Operations,
        tax_market: TaxMarket,
        closing_costs: ClosingCosts,
    ) -> Self {
        Self {
            property,
            financing,
            operations,
            tax_market,
            closing_costs,
        }
    }

    /// Copy of these inputs with a single field overwritten
    pub fn with_field(&self, field: InputField, value: f64) -> Result<Self> {
        let mut inputs = self.clone();
        field.set(&mut inputs, value)?;
        Ok(inputs)
    }

    /// Current value of a field
    pub fn field(&self, field: InputField) -> Result<f64> {
        field.get(self)
    }

    pub fn input_mode(&self) -> InputMode {
        self.operations.mode.input_mode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_field_leaves_original_untouched() {
        let base = DealInputs::default();
        let bumped = base.with_field(InputField::VacancyRate, 12.0).unwrap();

        assert_eq!(bumped.operations.vacancy_rate, 12.0);
        assert_eq!(base.operations.vacancy_rate, 5.0);
        assert_eq!(bumped.property, base.property);
    }

    #[test]
    fn test_full_bundle_serde_round_trip() {
        let inputs = DealInputs::default();
        let json = serde_json::to_string(&inputs).unwrap();
        let back: DealInputs = serde_json::from_str(&json).unwrap();
        assert_eq!(back, inputs);
    }
}
