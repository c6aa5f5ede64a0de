//! Load saved scenarios and resolve missing fields against defaults
//!
//! Saved scenarios are loose JSON documents: any section or field may be
//! absent, and older files put the commercial CapEx reserve at the top level
//! of `operations`. Every optional field is resolved in exactly one place, the
//! `apply` method of its patch type, against the `Default` of the target struct.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::data::{ClosingCosts, Financing, Property, TaxMarket};
use super::operations::{
    CommercialExpenses, CommercialOperations, InputMode, OperatingMode, Operations,
    SimpleOperations,
};
use super::DealInputs;
use crate::error::Result;

/// Name given to scenarios saved without one
pub const UNTITLED_SCENARIO: &str = "Untitled Analysis";

/// A named, fully resolved input bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    #[serde(rename = "scenarioName")]
    pub name: String,
    #[serde(flatten)]
    pub inputs: DealInputs,
}

impl Scenario {
    pub fn new(name: impl Into<String>, inputs: DealInputs) -> Self {
        Self {
            name: name.into(),
            inputs,
        }
    }
}

/// Partially specified scenario as stored on disk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScenarioPatch {
    pub scenario_name: Option<String>,
    pub property: Option<PropertyPatch>,
    pub financing: Option<FinancingPatch>,
    pub operations: Option<OperationsPatch>,
    pub tax_market: Option<TaxMarketPatch>,
    pub closing_costs: Option<ClosingCostsPatch>,
}

impl ScenarioPatch {
    /// Fill every missing field from the defaults
    pub fn merge(self) -> Scenario {
        self.merge_onto(DealInputs::default())
    }

    /// Fill every missing field from `base`
    pub fn merge_onto(self, base: DealInputs) -> Scenario {
        let inputs = DealInputs {
            property: apply_opt(self.property, base.property, PropertyPatch::apply),
            financing: apply_opt(self.financing, base.financing, FinancingPatch::apply),
            operations: apply_opt(self.operations, base.operations, OperationsPatch::apply),
            tax_market: apply_opt(self.tax_market, base.tax_market, TaxMarketPatch::apply),
            closing_costs: apply_opt(self.closing_costs, base.closing_costs, ClosingCostsPatch::apply),
        };

        let name = self
            .scenario_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_SCENARIO.to_string());

        Scenario { name, inputs }
    }
}

fn apply_opt<P, T>(patch: Option<P>, base: T, apply: fn(P, T) -> T) -> T {
    match patch {
        Some(patch) => apply(patch, base),
        None => base,
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PropertyPatch {
    pub purchase_price: Option<f64>,
    pub rehab_costs: Option<f64>,
    pub after_repair_value: Option<f64>,
    pub land_value_percent: Option<f64>,
    pub building_size: Option<f64>,
}

impl PropertyPatch {
    pub fn apply(self, base: Property) -> Property {
        Property {
            purchase_price: self.purchase_price.unwrap_or(base.purchase_price),
            rehab_costs: self.rehab_costs.unwrap_or(base.rehab_costs),
            after_repair_value: self.after_repair_value.unwrap_or(base.after_repair_value),
            land_value_percent: self.land_value_percent.unwrap_or(base.land_value_percent),
            building_size: self.building_size.unwrap_or(base.building_size),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FinancingPatch {
    pub down_payment_percent: Option<f64>,
    pub interest_rate: Option<f64>,
    pub loan_term_years: Option<u32>,
}

impl FinancingPatch {
    pub fn apply(self, base: Financing) -> Financing {
        Financing {
            down_payment_percent: self.down_payment_percent.unwrap_or(base.down_payment_percent),
            interest_rate: self.interest_rate.unwrap_or(base.interest_rate),
            loan_term_years: self.loan_term_years.unwrap_or(base.loan_term_years),
        }
    }
}

/// Flat operations document carrying the fields of both modes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OperationsPatch {
    pub input_mode: Option<InputMode>,
    pub vacancy_rate: Option<f64>,
    pub annual_rent_growth: Option<f64>,
    pub annual_expense_growth: Option<f64>,
    #[serde(rename = "initialCapEx")]
    pub initial_capex: Option<f64>,

    // Simple mode
    pub gross_rent_monthly: Option<f64>,
    pub other_income_monthly: Option<f64>,
    pub property_tax_rate: Option<f64>,
    pub insurance_annual: Option<f64>,
    pub management_fee_rate: Option<f64>,
    pub maintenance_rate: Option<f64>,
    pub capex_rate: Option<f64>,

    // Commercial mode
    #[serde(rename = "annualBaseRentPerSqFt")]
    pub annual_base_rent_per_sq_ft: Option<f64>,
    pub other_income_percent: Option<f64>,
    pub commercial_expenses: Option<CommercialExpensesPatch>,
    /// Legacy location of the CapEx reserve; the nested value wins when both exist
    #[serde(rename = "annualCapExReservePerSqFt")]
    pub annual_capex_reserve_per_sq_ft: Option<f64>,
}

impl OperationsPatch {
    pub fn apply(self, base: Operations) -> Operations {
        let mode = self.input_mode.unwrap_or_else(|| base.mode.input_mode());

        let (base_simple, base_commercial) = match base.mode {
            OperatingMode::Simple(simple) => (simple, CommercialOperations::default()),
            OperatingMode::Commercial(commercial) => (SimpleOperations::default(), commercial),
        };

        let mode = match mode {
            InputMode::Simple => OperatingMode::Simple(SimpleOperations {
                gross_rent_monthly: self.gross_rent_monthly.unwrap_or(base_simple.gross_rent_monthly),
                other_income_monthly: self.other_income_monthly.unwrap_or(base_simple.other_income_monthly),
                property_tax_rate: self.property_tax_rate.unwrap_or(base_simple.property_tax_rate),
                insurance_annual: self.insurance_annual.unwrap_or(base_simple.insurance_annual),
                management_fee_rate: self.management_fee_rate.unwrap_or(base_simple.management_fee_rate),
                maintenance_rate: self.maintenance_rate.unwrap_or(base_simple.maintenance_rate),
                capex_rate: self.capex_rate.unwrap_or(base_simple.capex_rate),
            }),
            InputMode::Commercial => {
                let mut expenses_patch = self.commercial_expenses.unwrap_or_default();
                if expenses_patch.annual_capex_reserve_per_sq_ft.is_none() {
                    expenses_patch.annual_capex_reserve_per_sq_ft = self.annual_capex_reserve_per_sq_ft;
                }

                OperatingMode::Commercial(CommercialOperations {
                    annual_base_rent_per_sq_ft: self
                        .annual_base_rent_per_sq_ft
                        .unwrap_or(base_commercial.annual_base_rent_per_sq_ft),
                    other_income_percent: self
                        .other_income_percent
                        .unwrap_or(base_commercial.other_income_percent),
                    commercial_expenses: expenses_patch.apply(base_commercial.commercial_expenses),
                })
            }
        };

        Operations {
            mode,
            vacancy_rate: self.vacancy_rate.unwrap_or(base.vacancy_rate),
            annual_rent_growth: self.annual_rent_growth.unwrap_or(base.annual_rent_growth),
            annual_expense_growth: self.annual_expense_growth.unwrap_or(base.annual_expense_growth),
            initial_capex: self.initial_capex.unwrap_or(base.initial_capex),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CommercialExpensesPatch {
    #[serde(rename = "propertyTaxPerSqFt")]
    pub property_tax_per_sq_ft: Option<f64>,
    #[serde(rename = "insurancePerSqFt")]
    pub insurance_per_sq_ft: Option<f64>,
    #[serde(rename = "camPerSqFt")]
    pub cam_per_sq_ft: Option<f64>,
    pub management_percent: Option<f64>,
    pub repairs_maintenance_annual: Option<f64>,
    #[serde(rename = "annualCapExReservePerSqFt")]
    pub annual_capex_reserve_per_sq_ft: Option<f64>,
}

impl CommercialExpensesPatch {
    pub fn apply(self, base: CommercialExpenses) -> CommercialExpenses {
        CommercialExpenses {
            property_tax_per_sq_ft: self.property_tax_per_sq_ft.unwrap_or(base.property_tax_per_sq_ft),
            insurance_per_sq_ft: self.insurance_per_sq_ft.unwrap_or(base.insurance_per_sq_ft),
            cam_per_sq_ft: self.cam_per_sq_ft.unwrap_or(base.cam_per_sq_ft),
            management_percent: self.management_percent.unwrap_or(base.management_percent),
            repairs_maintenance_annual: self
                .repairs_maintenance_annual
                .unwrap_or(base.repairs_maintenance_annual),
            annual_capex_reserve_per_sq_ft: self
                .annual_capex_reserve_per_sq_ft
                .unwrap_or(base.annual_capex_reserve_per_sq_ft),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TaxMarketPatch {
    pub income_tax_rate: Option<f64>,
    pub capital_gains_tax_rate: Option<f64>,
    pub depreciation_years: Option<f64>,
    pub depreciation_recapture_rate: Option<f64>,
    pub selling_costs: Option<f64>,
    pub discount_rate: Option<f64>,
    pub exit_cap_rate: Option<f64>,
    pub hold_period: Option<u32>,
    #[serde(rename = "use1031Exchange")]
    pub use_1031_exchange: Option<bool>,
    pub exchange_boot_percent: Option<f64>,
    pub use_cost_segregation: Option<bool>,
    #[serde(rename = "costSegYear1Bonus")]
    pub cost_seg_year1_bonus: Option<f64>,
}

impl TaxMarketPatch {
    pub fn apply(self, base: TaxMarket) -> TaxMarket {
        TaxMarket {
            income_tax_rate: self.income_tax_rate.unwrap_or(base.income_tax_rate),
            capital_gains_tax_rate: self.capital_gains_tax_rate.unwrap_or(base.capital_gains_tax_rate),
            depreciation_years: self.depreciation_years.unwrap_or(base.depreciation_years),
            depreciation_recapture_rate: self
                .depreciation_recapture_rate
                .unwrap_or(base.depreciation_recapture_rate),
            selling_costs: self.selling_costs.unwrap_or(base.selling_costs),
            discount_rate: self.discount_rate.unwrap_or(base.discount_rate),
            exit_cap_rate: self.exit_cap_rate.unwrap_or(base.exit_cap_rate),
            hold_period: self.hold_period.unwrap_or(base.hold_period),
            use_1031_exchange: self.use_1031_exchange.unwrap_or(base.use_1031_exchange),
            exchange_boot_percent: self.exchange_boot_percent.unwrap_or(base.exchange_boot_percent),
            use_cost_segregation: self.use_cost_segregation.unwrap_or(base.use_cost_segregation),
            cost_seg_year1_bonus: self.cost_seg_year1_bonus.unwrap_or(base.cost_seg_year1_bonus),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClosingCostsPatch {
    pub title_insurance_percent: Option<f64>,
    pub escrow_fees_percent: Option<f64>,
    pub lender_fees_percent: Option<f64>,
    pub recording_fees_percent: Option<f64>,
    pub inspection_appraisal_fixed: Option<f64>,
}

impl ClosingCostsPatch {
    pub fn apply(self, base: ClosingCosts) -> ClosingCosts {
        ClosingCosts {
            title_insurance_percent: self.title_insurance_percent.unwrap_or(base.title_insurance_percent),
            escrow_fees_percent: self.escrow_fees_percent.unwrap_or(base.escrow_fees_percent),
            lender_fees_percent: self.lender_fees_percent.unwrap_or(base.lender_fees_percent),
            recording_fees_percent: self.recording_fees_percent.unwrap_or(base.recording_fees_percent),
            inspection_appraisal_fixed: self
                .inspection_appraisal_fixed
                .unwrap_or(base.inspection_appraisal_fixed),
        }
    }
}

/// Load a scenario from a JSON file, filling missing fields from defaults
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<Scenario> {
    let file = File::open(path)?;
    load_scenario_from_reader(BufReader::new(file))
}

/// Load a scenario from any reader (e.g., string buffer, stdin)
pub fn load_scenario_from_reader<R: Read>(reader: R) -> Result<Scenario> {
    let patch: ScenarioPatch = serde_json::from_reader(reader)?;
    Ok(patch.merge())
}

/// Write a fully resolved scenario as pretty-printed JSON
pub fn save_scenario<P: AsRef<Path>>(path: P, scenario: &Scenario) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), scenario)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let scenario = load_scenario_from_reader("{}".as_bytes()).unwrap();
        assert_eq!(scenario.name, UNTITLED_SCENARIO);
        assert_eq!(scenario.inputs, DealInputs::default());
    }

    #[test]
    fn test_partial_nested_expenses_keep_defaults() {
        let json = r#"{
            "scenarioName": "Strip center",
            "property": { "purchasePrice": 500000 },
            "operations": { "commercialExpenses": { "camPerSqFt": 2.0 } }
        }"#;

        let scenario = load_scenario_from_reader(json.as_bytes()).unwrap();
        assert_eq!(scenario.name, "Strip center");
        assert_eq!(scenario.inputs.property.purchase_price, 500_000.0);
        assert_eq!(scenario.inputs.property.land_value_percent, 20.0);

        match &scenario.inputs.operations.mode {
            OperatingMode::Commercial(c) => {
                assert_eq!(c.commercial_expenses.cam_per_sq_ft, 2.0);
                assert_eq!(c.commercial_expenses.insurance_per_sq_ft, 0.75);
            }
            OperatingMode::Simple(_) => panic!("default mode is commercial"),
        }
    }

    #[test]
    fn test_legacy_capex_reserve_location() {
        let json = r#"{ "operations": { "annualCapExReservePerSqFt": 0.4 } }"#;
        let scenario = load_scenario_from_reader(json.as_bytes()).unwrap();

        match &scenario.inputs.operations.mode {
            OperatingMode::Commercial(c) => {
                assert_eq!(c.commercial_expenses.annual_capex_reserve_per_sq_ft, 0.4)
            }
            OperatingMode::Simple(_) => panic!("default mode is commercial"),
        }
    }

    #[test]
    fn test_switch_to_simple_mode() {
        let json = r#"{ "operations": { "inputMode": "simple", "grossRentMonthly": 5000 } }"#;
        let scenario = load_scenario_from_reader(json.as_bytes()).unwrap();

        match &scenario.inputs.operations.mode {
            OperatingMode::Simple(s) => {
                assert_eq!(s.gross_rent_monthly, 5_000.0);
                assert_eq!(s.management_fee_rate, 8.0);
            }
            OperatingMode::Commercial(_) => panic!("expected simple mode"),
        }
    }

    #[test]
    fn test_saved_scenario_reloads_identically() {
        let mut inputs = DealInputs::default();
        inputs.tax_market.use_1031_exchange = true;
        inputs.tax_market.exchange_boot_percent = 15.0;
        let scenario = Scenario::new("Office", inputs);

        let json = serde_json::to_string(&scenario).unwrap();
        let reloaded = load_scenario_from_reader(json.as_bytes()).unwrap();
        assert_eq!(reloaded, scenario);
    }

    #[test]
    fn test_sample_scenarios_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/scenarios");

        let duplex = load_scenario(dir.join("duplex_all_cash.json")).unwrap();
        assert_eq!(duplex.inputs.input_mode(), InputMode::Simple);
        assert!(duplex.inputs.financing.is_all_cash());
        assert_eq!(duplex.inputs.tax_market.hold_period, 7);

        let warehouse = load_scenario(dir.join("warehouse_1031.json")).unwrap();
        assert_eq!(warehouse.inputs.input_mode(), InputMode::Commercial);
        assert!(warehouse.inputs.tax_market.use_1031_exchange);
        // Unspecified expenses fall back to defaults
        assert_eq!(warehouse.inputs.closing_costs, ClosingCosts::default());
    }
}
