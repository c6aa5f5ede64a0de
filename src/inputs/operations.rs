//! Operating assumptions: revenue, expenses and their growth
//!
//! Two input modes exist. Simple mode describes a small residential deal with
//! monthly rent and expense ratios. Commercial mode describes a triple-net
//! lease priced per square foot, where tenants reimburse tax, insurance and CAM.

use serde::{Deserialize, Serialize};

/// Operating assumptions shared by both modes, plus the mode-specific payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operations {
    #[serde(flatten)]
    pub mode: OperatingMode,

    /// Percent of potential gross income lost to vacancy and credit loss
    pub vacancy_rate: f64,
    /// Annual revenue growth (percent, may be negative)
    pub annual_rent_growth: f64,
    /// Annual growth of fixed expenses (percent, may be negative)
    pub annual_expense_growth: f64,
    /// Up-front capital expenditure paid at acquisition
    #[serde(rename = "initialCapEx")]
    pub initial_capex: f64,
}

impl Default for Operations {
    fn default() -> Self {
        Self {
            mode: OperatingMode::Commercial(CommercialOperations::default()),
            vacancy_rate: 5.0,
            annual_rent_growth: 3.0,
            annual_expense_growth: 2.0,
            initial_capex: 25_000.0,
        }
    }
}

/// Mode tag without payload, used for reporting and for patches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InputMode {
    Simple,
    Commercial,
}

impl std::fmt::Display for InputMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InputMode::Simple => write!(f, "simple"),
            InputMode::Commercial => write!(f, "commercial"),
        }
    }
}

/// Revenue and expense model for the active input mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "inputMode", rename_all = "camelCase")]
pub enum OperatingMode {
    Simple(SimpleOperations),
    Commercial(CommercialOperations),
}

impl OperatingMode {
    pub fn input_mode(&self) -> InputMode {
        match self {
            OperatingMode::Simple(_) => InputMode::Simple,
            OperatingMode::Commercial(_) => InputMode::Commercial,
        }
    }
}

/// Monthly rent with percentage-based expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleOperations {
    pub gross_rent_monthly: f64,
    pub other_income_monthly: f64,
    /// Property tax as a percent of purchase price
    pub property_tax_rate: f64,
    pub insurance_annual: f64,
    /// Percent of effective gross income
    pub management_fee_rate: f64,
    /// Percent of effective gross income
    pub maintenance_rate: f64,
    /// Percent of effective gross income
    pub capex_rate: f64,
}

impl Default for SimpleOperations {
    fn default() -> Self {
        Self {
            gross_rent_monthly: 4_000.0,
            other_income_monthly: 0.0,
            property_tax_rate: 1.5,
            insurance_annual: 1_200.0,
            management_fee_rate: 8.0,
            maintenance_rate: 5.0,
            capex_rate: 5.0,
        }
    }
}

/// Triple-net commercial lease priced per square foot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialOperations {
    #[serde(rename = "annualBaseRentPerSqFt")]
    pub annual_base_rent_per_sq_ft: f64,
    /// Other income as a percent of base rent
    pub other_income_percent: f64,
    pub commercial_expenses: CommercialExpenses,
}

impl Default for CommercialOperations {
    fn default() -> Self {
        Self {
            annual_base_rent_per_sq_ft: 18.0,
            other_income_percent: 0.0,
            commercial_expenses: CommercialExpenses::default(),
        }
    }
}

/// Commercial expense bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommercialExpenses {
    #[serde(rename = "propertyTaxPerSqFt")]
    pub property_tax_per_sq_ft: f64,
    #[serde(rename = "insurancePerSqFt")]
    pub insurance_per_sq_ft: f64,
    #[serde(rename = "camPerSqFt")]
    pub cam_per_sq_ft: f64,
    /// Percent of effective gross income
    pub management_percent: f64,
    /// Fixed annual amount, not grown
    pub repairs_maintenance_annual: f64,
    /// Replacement reserve per square foot per year, not grown
    #[serde(rename = "annualCapExReservePerSqFt")]
    pub annual_capex_reserve_per_sq_ft: f64,
}

impl Default for CommercialExpenses {
    fn default() -> Self {
        Self {
            property_tax_per_sq_ft: 1.5,
            insurance_per_sq_ft: 0.75,
            cam_per_sq_ft: 1.25,
            management_percent: 4.0,
            repairs_maintenance_annual: 2_500.0,
            annual_capex_reserve_per_sq_ft: 0.15,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_tag_is_flattened() {
        let json = serde_json::to_value(Operations::default()).unwrap();
        assert_eq!(json["inputMode"], "commercial");
        assert_eq!(json["annualBaseRentPerSqFt"], 18.0);
        assert_eq!(json["commercialExpenses"]["camPerSqFt"], 1.25);
        assert_eq!(json["initialCapEx"], 25_000.0);
    }

    #[test]
    fn test_simple_mode_deserializes() {
        let json = r#"{
            "inputMode": "simple",
            "grossRentMonthly": 5000,
            "otherIncomeMonthly": 200,
            "propertyTaxRate": 1.2,
            "insuranceAnnual": 2400,
            "managementFeeRate": 8,
            "maintenanceRate": 5,
            "capexRate": 5,
            "vacancyRate": 5,
            "annualRentGrowth": 3,
            "annualExpenseGrowth": 2,
            "initialCapEx": 0
        }"#;

        let ops: Operations = serde_json::from_str(json).unwrap();
        assert_eq!(ops.mode.input_mode(), InputMode::Simple);
        match ops.mode {
            OperatingMode::Simple(simple) => assert_eq!(simple.gross_rent_monthly, 5_000.0),
            OperatingMode::Commercial(_) => panic!("expected simple mode"),
        }
    }
}
