//! Addressable numeric input fields
//!
//! The sensitivity grid perturbs inputs by dotted path, e.g.
//! `operations.vacancyRate` or `financing.interestRate`. An unqualified name
//! such as `exitCapRate` refers to the tax/market section.

use std::fmt;
use std::str::FromStr;

use super::operations::{InputMode, OperatingMode};
use super::{DealInputs, MAX_TERM_YEARS};
use crate::error::{EngineError, Result};

/// A numeric input that can be overwritten on a cloned bundle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputField {
    // Property
    PurchasePrice,
    RehabCosts,
    AfterRepairValue,
    LandValuePercent,
    BuildingSize,

    // Financing
    DownPaymentPercent,
    InterestRate,
    LoanTermYears,

    // Operations, shared
    VacancyRate,
    AnnualRentGrowth,
    AnnualExpenseGrowth,
    InitialCapEx,

    // Operations, simple mode
    GrossRentMonthly,
    OtherIncomeMonthly,
    PropertyTaxRate,
    InsuranceAnnual,
    ManagementFeeRate,
    MaintenanceRate,
    CapexRate,

    // Operations, commercial mode
    AnnualBaseRentPerSqFt,
    OtherIncomePercent,
    PropertyTaxPerSqFt,
    InsurancePerSqFt,
    CamPerSqFt,
    ManagementPercent,
    RepairsMaintenanceAnnual,
    AnnualCapExReservePerSqFt,

    // Tax / market
    IncomeTaxRate,
    CapitalGainsTaxRate,
    DepreciationYears,
    DepreciationRecaptureRate,
    SellingCosts,
    DiscountRate,
    ExitCapRate,
    HoldPeriod,
    ExchangeBootPercent,
    CostSegYear1Bonus,

    // Closing costs
    TitleInsurancePercent,
    EscrowFeesPercent,
    LenderFeesPercent,
    RecordingFeesPercent,
    InspectionAppraisalFixed,
}

/// Every field with its canonical dotted path
const FIELD_PATHS: &[(InputField, &str)] = &[
    (InputField::PurchasePrice, "property.purchasePrice"),
    (InputField::RehabCosts, "property.rehabCosts"),
    (InputField::AfterRepairValue, "property.afterRepairValue"),
    (InputField::LandValuePercent, "property.landValuePercent"),
    (InputField::BuildingSize, "property.buildingSize"),
    (InputField::DownPaymentPercent, "financing.downPaymentPercent"),
    (InputField::InterestRate, "financing.interestRate"),
    (InputField::LoanTermYears, "financing.loanTermYears"),
    (InputField::VacancyRate, "operations.vacancyRate"),
    (InputField::AnnualRentGrowth, "operations.annualRentGrowth"),
    (InputField::AnnualExpenseGrowth, "operations.annualExpenseGrowth"),
    (InputField::InitialCapEx, "operations.initialCapEx"),
    (InputField::GrossRentMonthly, "operations.grossRentMonthly"),
    (InputField::OtherIncomeMonthly, "operations.otherIncomeMonthly"),
    (InputField::PropertyTaxRate, "operations.propertyTaxRate"),
    (InputField::InsuranceAnnual, "operations.insuranceAnnual"),
    (InputField::ManagementFeeRate, "operations.managementFeeRate"),
    (InputField::MaintenanceRate, "operations.maintenanceRate"),
    (InputField::CapexRate, "operations.capexRate"),
    (InputField::AnnualBaseRentPerSqFt, "operations.annualBaseRentPerSqFt"),
    (InputField::OtherIncomePercent, "operations.otherIncomePercent"),
    (InputField::PropertyTaxPerSqFt, "commercialExpenses.propertyTaxPerSqFt"),
    (InputField::InsurancePerSqFt, "commercialExpenses.insurancePerSqFt"),
    (InputField::CamPerSqFt, "commercialExpenses.camPerSqFt"),
    (InputField::ManagementPercent, "commercialExpenses.managementPercent"),
    (InputField::RepairsMaintenanceAnnual, "commercialExpenses.repairsMaintenanceAnnual"),
    (InputField::AnnualCapExReservePerSqFt, "commercialExpenses.annualCapExReservePerSqFt"),
    (InputField::IncomeTaxRate, "taxMarket.incomeTaxRate"),
    (InputField::CapitalGainsTaxRate, "taxMarket.capitalGainsTaxRate"),
    (InputField::DepreciationYears, "taxMarket.depreciationYears"),
    (InputField::DepreciationRecaptureRate, "taxMarket.depreciationRecaptureRate"),
    (InputField::SellingCosts, "taxMarket.sellingCosts"),
    (InputField::DiscountRate, "taxMarket.discountRate"),
    (InputField::ExitCapRate, "taxMarket.exitCapRate"),
    (InputField::HoldPeriod, "taxMarket.holdPeriod"),
    (InputField::ExchangeBootPercent, "taxMarket.exchangeBootPercent"),
    (InputField::CostSegYear1Bonus, "taxMarket.costSegYear1Bonus"),
    (InputField::TitleInsurancePercent, "closingCosts.titleInsurancePercent"),
    (InputField::EscrowFeesPercent, "closingCosts.escrowFeesPercent"),
    (InputField::LenderFeesPercent, "closingCosts.lenderFeesPercent"),
    (InputField::RecordingFeesPercent, "closingCosts.recordingFeesPercent"),
    (InputField::InspectionAppraisalFixed, "closingCosts.inspectionAppraisalFixed"),
];

impl InputField {
    /// Canonical dotted path
    pub fn path(&self) -> &'static str {
        FIELD_PATHS
            .iter()
            .find(|(field, _)| field == self)
            .map(|(_, path)| *path)
            .unwrap_or("")
    }

    pub fn all() -> impl Iterator<Item = InputField> {
        FIELD_PATHS.iter().map(|(field, _)| *field)
    }

    /// Read the current value of this field
    pub fn get(&self, inputs: &DealInputs) -> Result<f64> {
        let p = &inputs.property;
        let f = &inputs.financing;
        let o = &inputs.operations;
        let t = &inputs.tax_market;
        let c = &inputs.closing_costs;

        let value = match self {
            InputField::PurchasePrice => p.purchase_price,
            InputField::RehabCosts => p.rehab_costs,
            InputField::AfterRepairValue => p.after_repair_value,
            InputField::LandValuePercent => p.land_value_percent,
            InputField::BuildingSize => p.building_size,
            InputField::DownPaymentPercent => f.down_payment_percent,
            InputField::InterestRate => f.interest_rate,
            InputField::LoanTermYears => f.loan_term_years as f64,
            InputField::VacancyRate => o.vacancy_rate,
            InputField::AnnualRentGrowth => o.annual_rent_growth,
            InputField::AnnualExpenseGrowth => o.annual_expense_growth,
            InputField::InitialCapEx => o.initial_capex,
            InputField::IncomeTaxRate => t.income_tax_rate,
            InputField::CapitalGainsTaxRate => t.capital_gains_tax_rate,
            InputField::DepreciationYears => t.depreciation_years,
            InputField::DepreciationRecaptureRate => t.depreciation_recapture_rate,
            InputField::SellingCosts => t.selling_costs,
            InputField::DiscountRate => t.discount_rate,
            InputField::ExitCapRate => t.exit_cap_rate,
            InputField::HoldPeriod => t.hold_period as f64,
            InputField::ExchangeBootPercent => t.exchange_boot_percent,
            InputField::CostSegYear1Bonus => t.cost_seg_year1_bonus,
            InputField::TitleInsurancePercent => c.title_insurance_percent,
            InputField::EscrowFeesPercent => c.escrow_fees_percent,
            InputField::LenderFeesPercent => c.lender_fees_percent,
            InputField::RecordingFeesPercent => c.recording_fees_percent,
            InputField::InspectionAppraisalFixed => c.inspection_appraisal_fixed,
            mode_field => return self.get_mode_field(*mode_field, &o.mode),
        };

        Ok(value)
    }

    fn get_mode_field(&self, field: InputField, mode: &OperatingMode) -> Result<f64> {
        let value = match (field, mode) {
            (InputField::GrossRentMonthly, OperatingMode::Simple(s)) => s.gross_rent_monthly,
            (InputField::OtherIncomeMonthly, OperatingMode::Simple(s)) => s.other_income_monthly,
            (InputField::PropertyTaxRate, OperatingMode::Simple(s)) => s.property_tax_rate,
            (InputField::InsuranceAnnual, OperatingMode::Simple(s)) => s.insurance_annual,
            (InputField::ManagementFeeRate, OperatingMode::Simple(s)) => s.management_fee_rate,
            (InputField::MaintenanceRate, OperatingMode::Simple(s)) => s.maintenance_rate,
            (InputField::CapexRate, OperatingMode::Simple(s)) => s.capex_rate,
            (InputField::AnnualBaseRentPerSqFt, OperatingMode::Commercial(c)) => c.annual_base_rent_per_sq_ft,
            (InputField::OtherIncomePercent, OperatingMode::Commercial(c)) => c.other_income_percent,
            (InputField::PropertyTaxPerSqFt, OperatingMode::Commercial(c)) => c.commercial_expenses.property_tax_per_sq_ft,
            (InputField::InsurancePerSqFt, OperatingMode::Commercial(c)) => c.commercial_expenses.insurance_per_sq_ft,
            (InputField::CamPerSqFt, OperatingMode::Commercial(c)) => c.commercial_expenses.cam_per_sq_ft,
            (InputField::ManagementPercent, OperatingMode::Commercial(c)) => c.commercial_expenses.management_percent,
            (InputField::RepairsMaintenanceAnnual, OperatingMode::Commercial(c)) => c.commercial_expenses.repairs_maintenance_annual,
            (InputField::AnnualCapExReservePerSqFt, OperatingMode::Commercial(c)) => {
                c.commercial_expenses.annual_capex_reserve_per_sq_ft
            }
            _ => return Err(self.not_applicable(mode.input_mode())),
        };

        Ok(value)
    }

    /// Overwrite this field in place.
    ///
    /// Integer fields (loan term, hold period) are rounded and floored at zero;
    /// a non-finite value or one beyond [`MAX_TERM_YEARS`] is rejected.
    pub fn set(&self, inputs: &mut DealInputs, value: f64) -> Result<()> {
        let whole_years = match self {
            InputField::LoanTermYears | InputField::HoldPeriod => self.whole_years(value)?,
            _ => 0,
        };

        match self {
            InputField::PurchasePrice => inputs.property.purchase_price = value,
            InputField::RehabCosts => inputs.property.rehab_costs = value,
            InputField::AfterRepairValue => inputs.property.after_repair_value = value,
            InputField::LandValuePercent => inputs.property.land_value_percent = value,
            InputField::BuildingSize => inputs.property.building_size = value,
            InputField::DownPaymentPercent => inputs.financing.down_payment_percent = value,
            InputField::InterestRate => inputs.financing.interest_rate = value,
            InputField::LoanTermYears => inputs.financing.loan_term_years = whole_years,
            InputField::VacancyRate => inputs.operations.vacancy_rate = value,
            InputField::AnnualRentGrowth => inputs.operations.annual_rent_growth = value,
            InputField::AnnualExpenseGrowth => inputs.operations.annual_expense_growth = value,
            InputField::InitialCapEx => inputs.operations.initial_capex = value,
            InputField::IncomeTaxRate => inputs.tax_market.income_tax_rate = value,
            InputField::CapitalGainsTaxRate => inputs.tax_market.capital_gains_tax_rate = value,
            InputField::DepreciationYears => inputs.tax_market.depreciation_years = value,
            InputField::DepreciationRecaptureRate => inputs.tax_market.depreciation_recapture_rate = value,
            InputField::SellingCosts => inputs.tax_market.selling_costs = value,
            InputField::DiscountRate => inputs.tax_market.discount_rate = value,
            InputField::ExitCapRate => inputs.tax_market.exit_cap_rate = value,
            InputField::HoldPeriod => inputs.tax_market.hold_period = whole_years,
            InputField::ExchangeBootPercent => inputs.tax_market.exchange_boot_percent = value,
            InputField::CostSegYear1Bonus => inputs.tax_market.cost_seg_year1_bonus = value,
            InputField::TitleInsurancePercent => inputs.closing_costs.title_insurance_percent = value,
            InputField::EscrowFeesPercent => inputs.closing_costs.escrow_fees_percent = value,
            InputField::LenderFeesPercent => inputs.closing_costs.lender_fees_percent = value,
            InputField::RecordingFeesPercent => inputs.closing_costs.recording_fees_percent = value,
            InputField::InspectionAppraisalFixed => inputs.closing_costs.inspection_appraisal_fixed = value,
            mode_field => return mode_field.set_mode_field(&mut inputs.operations.mode, value),
        }

        Ok(())
    }

    fn set_mode_field(&self, mode: &mut OperatingMode, value: f64) -> Result<()> {
        let input_mode = mode.input_mode();
        let slot = match (self, mode) {
            (InputField::GrossRentMonthly, OperatingMode::Simple(s)) => &mut s.gross_rent_monthly,
            (InputField::OtherIncomeMonthly, OperatingMode::Simple(s)) => &mut s.other_income_monthly,
            (InputField::PropertyTaxRate, OperatingMode::Simple(s)) => &mut s.property_tax_rate,
            (InputField::InsuranceAnnual, OperatingMode::Simple(s)) => &mut s.insurance_annual,
            (InputField::ManagementFeeRate, OperatingMode::Simple(s)) => &mut s.management_fee_rate,
            (InputField::MaintenanceRate, OperatingMode::Simple(s)) => &mut s.maintenance_rate,
            (InputField::CapexRate, OperatingMode::Simple(s)) => &mut s.capex_rate,
            (InputField::AnnualBaseRentPerSqFt, OperatingMode::Commercial(c)) => &mut c.annual_base_rent_per_sq_ft,
            (InputField::OtherIncomePercent, OperatingMode::Commercial(c)) => &mut c.other_income_percent,
            (InputField::PropertyTaxPerSqFt, OperatingMode::Commercial(c)) => &mut c.commercial_expenses.property_tax_per_sq_ft,
            (InputField::InsurancePerSqFt, OperatingMode::Commercial(c)) => &mut c.commercial_expenses.insurance_per_sq_ft,
            (InputField::CamPerSqFt, OperatingMode::Commercial(c)) => &mut c.commercial_expenses.cam_per_sq_ft,
            (InputField::ManagementPercent, OperatingMode::Commercial(c)) => &mut c.commercial_expenses.management_percent,
            (InputField::RepairsMaintenanceAnnual, OperatingMode::Commercial(c)) => {
                &mut c.commercial_expenses.repairs_maintenance_annual
            }
            (InputField::AnnualCapExReservePerSqFt, OperatingMode::Commercial(c)) => {
                &mut c.commercial_expenses.annual_capex_reserve_per_sq_ft
            }
            _ => return Err(self.not_applicable(input_mode)),
        };

        *slot = value;
        Ok(())
    }

    fn whole_years(&self, value: f64) -> Result<u32> {
        let years = value.round().max(0.0);
        if !years.is_finite() || years > MAX_TERM_YEARS as f64 {
            return Err(EngineError::OutOfRange {
                field: self.path().to_string(),
                value,
            });
        }
        Ok(years as u32)
    }

    fn not_applicable(&self, mode: InputMode) -> EngineError {
        EngineError::FieldNotApplicable {
            field: self.path().to_string(),
            mode: mode.to_string(),
        }
    }
}

impl FromStr for InputField {
    type Err = EngineError;

    /// Accepts `section.field` or a bare tax/market field name.
    ///
    /// Commercial expense fields may also be addressed as
    /// `operations.<field>`.
    fn from_str(s: &str) -> Result<Self> {
        let qualified = if s.contains('.') {
            s.to_string()
        } else {
            format!("taxMarket.{s}")
        };

        FIELD_PATHS
            .iter()
            .find(|(_, path)| {
                *path == qualified
                    || path
                        .strip_prefix("commercialExpenses.")
                        .is_some_and(|rest| qualified == format!("operations.{rest}"))
            })
            .map(|(field, _)| *field)
            .ok_or_else(|| EngineError::UnknownField(s.to_string()))
    }
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path())
    }
}
