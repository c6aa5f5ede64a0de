//! Form-level input validation
//!
//! The projection engine itself accepts any structurally valid bundle and
//! degrades to neutral values. These rules are for callers that want to reject
//! out-of-range form input before running a projection.

use super::operations::OperatingMode;
use super::{DealInputs, InputField};
use crate::error::{EngineError, Result};

/// Inclusive bounds for one field
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRule {
    pub field: InputField,
    pub min: f64,
    pub max: f64,
}

const fn rule(field: InputField, min: f64, max: f64) -> FieldRule {
    FieldRule { field, min, max }
}

/// Bounds applied regardless of operating mode
pub const RULES: &[FieldRule] = &[
    rule(InputField::PurchasePrice, 0.0, 1_000_000_000.0),
    rule(InputField::BuildingSize, 0.0, 10_000_000.0),
    rule(InputField::RehabCosts, 0.0, 100_000_000.0),
    rule(InputField::AfterRepairValue, 0.0, 1_000_000_000.0),
    rule(InputField::LandValuePercent, 0.0, 100.0),
    rule(InputField::DownPaymentPercent, 0.0, 100.0),
    rule(InputField::InterestRate, 0.0, 30.0),
    rule(InputField::LoanTermYears, 1.0, 50.0),
    rule(InputField::VacancyRate, 0.0, 100.0),
    rule(InputField::AnnualRentGrowth, -50.0, 50.0),
    rule(InputField::AnnualExpenseGrowth, -50.0, 50.0),
    rule(InputField::IncomeTaxRate, 0.0, 100.0),
    rule(InputField::CapitalGainsTaxRate, 0.0, 100.0),
    rule(InputField::SellingCosts, 0.0, 100.0),
    rule(InputField::DiscountRate, 0.0, 100.0),
    rule(InputField::ExitCapRate, 0.0, 100.0),
    rule(InputField::HoldPeriod, 1.0, 50.0),
    rule(InputField::DepreciationYears, 1.0, 100.0),
    rule(InputField::TitleInsurancePercent, 0.0, 10.0),
    rule(InputField::EscrowFeesPercent, 0.0, 10.0),
    rule(InputField::LenderFeesPercent, 0.0, 10.0),
    rule(InputField::RecordingFeesPercent, 0.0, 5.0),
    rule(InputField::InspectionAppraisalFixed, 0.0, 50_000.0),
];

/// Bounds for simple-mode fields
pub const SIMPLE_RULES: &[FieldRule] = &[
    rule(InputField::GrossRentMonthly, 0.0, 10_000_000.0),
    rule(InputField::ManagementFeeRate, 0.0, 100.0),
    rule(InputField::MaintenanceRate, 0.0, 100.0),
    rule(InputField::CapexRate, 0.0, 100.0),
];

/// Bounds for commercial-mode fields
pub const COMMERCIAL_RULES: &[FieldRule] = &[rule(InputField::AnnualBaseRentPerSqFt, 0.0, 1_000.0)];

impl FieldRule {
    /// Messages for a single value; empty when the value is acceptable
    pub fn check(&self, value: f64) -> Vec<String> {
        if !value.is_finite() {
            return vec!["Must be a valid number".to_string()];
        }

        let mut errors = Vec::new();
        if value < self.min {
            errors.push(format!("Must be at least {}", self.min));
        }
        if value > self.max {
            errors.push(format!("Must be at most {}", self.max));
        }
        errors
    }
}

/// Every rule violation as `section.field: message`
pub fn collect_errors(inputs: &DealInputs) -> Vec<String> {
    let mode_rules = match inputs.operations.mode {
        OperatingMode::Simple(_) => SIMPLE_RULES,
        OperatingMode::Commercial(_) => COMMERCIAL_RULES,
    };

    let mut errors: Vec<String> = RULES
        .iter()
        .chain(mode_rules)
        .filter_map(|rule| rule.field.get(inputs).ok().map(|value| (rule, value)))
        .flat_map(|(rule, value)| {
            rule.check(value)
                .into_iter()
                .map(move |msg| format!("{}: {}", rule.field.path(), msg))
        })
        .collect();

    let p = &inputs.property;
    if p.after_repair_value > 0.0 && p.purchase_price > 0.0 && p.rehab_costs > 0.0 {
        let min_arv = p.purchase_price + p.rehab_costs;
        if p.after_repair_value < min_arv {
            errors.push(format!(
                "{}: Should be at least {:.0} (purchase + rehab)",
                InputField::AfterRepairValue.path(),
                min_arv
            ));
        }
    }

    errors
}

/// Reject the bundle if any rule is violated
pub fn validate(inputs: &DealInputs) -> Result<()> {
    let errors = collect_errors(inputs);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(EngineError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&DealInputs::default()).is_ok());
    }

    #[test]
    fn test_out_of_range_fields() {
        let mut inputs = DealInputs::default();
        inputs.financing.interest_rate = 45.0;
        inputs.tax_market.hold_period = 0;

        let errors = collect_errors(&inputs);
        assert!(errors.contains(&"financing.interestRate: Must be at most 30".to_string()));
        assert!(errors.contains(&"taxMarket.holdPeriod: Must be at least 1".to_string()));
    }

    #[test]
    fn test_after_repair_value_below_cost() {
        let mut inputs = DealInputs::default();
        inputs.property.purchase_price = 300_000.0;
        inputs.property.rehab_costs = 50_000.0;
        inputs.property.after_repair_value = 320_000.0;

        match validate(&inputs) {
            Err(EngineError::Validation(errors)) => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].starts_with("property.afterRepairValue"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_rule_rejects_nan() {
        let r = rule(InputField::VacancyRate, 0.0, 100.0);
        assert_eq!(r.check(f64::NAN), vec!["Must be a valid number".to_string()]);
    }
}
