//! Property, financing, closing-cost and tax/market input structures
//!
//! All rates are percentages (`7.0` means 7%). Monetary amounts are plain
//! numbers in the caller's base currency.

use serde::{Deserialize, Serialize};

/// Default hold period applied when a scenario carries a zero hold period
pub const DEFAULT_HOLD_PERIOD: u32 = 10;

/// Longest loan term or hold period the engine will project
pub const MAX_TERM_YEARS: u32 = 100;

/// Recapture rate applied when a scenario carries a zero rate
pub const DEFAULT_RECAPTURE_RATE: f64 = 25.0;

/// Physical asset and acquisition price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub purchase_price: f64,
    pub rehab_costs: f64,
    pub after_repair_value: f64,
    /// Share of the purchase price attributed to land (0-100), not depreciable
    pub land_value_percent: f64,
    /// Rentable building area in square feet
    pub building_size: f64,
}

impl Default for Property {
    fn default() -> Self {
        Self {
            purchase_price: 2_000_000.0,
            rehab_costs: 0.0,
            after_repair_value: 2_000_000.0,
            land_value_percent: 20.0,
            building_size: 10_000.0,
        }
    }
}

impl Property {
    pub fn land_value(&self) -> f64 {
        self.purchase_price * self.land_value_percent / 100.0
    }
}

/// Acquisition financing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Financing {
    pub down_payment_percent: f64,
    /// Annual interest rate (percent)
    pub interest_rate: f64,
    pub loan_term_years: u32,
}

impl Default for Financing {
    fn default() -> Self {
        Self {
            down_payment_percent: 25.0,
            interest_rate: 7.0,
            loan_term_years: 25,
        }
    }
}

impl Financing {
    pub fn down_payment(&self, purchase_price: f64) -> f64 {
        purchase_price * self.down_payment_percent / 100.0
    }

    pub fn loan_amount(&self, purchase_price: f64) -> f64 {
        purchase_price * (1.0 - self.down_payment_percent / 100.0)
    }

    /// No acquisition debt at all
    pub fn is_all_cash(&self) -> bool {
        self.down_payment_percent >= 100.0
    }
}

/// Closing costs: four price-proportional components plus one fixed fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingCosts {
    pub title_insurance_percent: f64,
    pub escrow_fees_percent: f64,
    pub lender_fees_percent: f64,
    pub recording_fees_percent: f64,
    pub inspection_appraisal_fixed: f64,
}

impl Default for ClosingCosts {
    fn default() -> Self {
        Self {
            title_insurance_percent: 0.5,
            escrow_fees_percent: 1.0,
            lender_fees_percent: 1.0,
            recording_fees_percent: 0.5,
            inspection_appraisal_fixed: 2_000.0,
        }
    }
}

impl ClosingCosts {
    /// Itemize closing costs against a purchase price.
    ///
    /// Lender fees only apply when the purchase is financed.
    pub fn breakdown(&self, purchase_price: f64, all_cash: bool) -> ClosingCostsBreakdown {
        let pct = |p: f64| p / 100.0 * purchase_price;

        let title_insurance = pct(self.title_insurance_percent);
        let escrow_fees = pct(self.escrow_fees_percent);
        let lender_fees = if all_cash { 0.0 } else { pct(self.lender_fees_percent) };
        let recording_fees = pct(self.recording_fees_percent);
        let inspection_appraisal = self.inspection_appraisal_fixed;

        ClosingCostsBreakdown {
            title_insurance,
            escrow_fees,
            lender_fees,
            recording_fees,
            inspection_appraisal,
            total: title_insurance + escrow_fees + lender_fees + recording_fees + inspection_appraisal,
        }
    }
}

/// Dollar amounts of each closing-cost component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingCostsBreakdown {
    pub title_insurance: f64,
    pub escrow_fees: f64,
    pub lender_fees: f64,
    pub recording_fees: f64,
    pub inspection_appraisal: f64,
    pub total: f64,
}

/// Tax treatment and market assumptions, including exit strategy toggles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxMarket {
    pub income_tax_rate: f64,
    pub capital_gains_tax_rate: f64,
    /// Straight-line recovery period in years
    pub depreciation_years: f64,
    pub depreciation_recapture_rate: f64,
    /// Selling costs as a percent of the gross sale price
    pub selling_costs: f64,
    /// NPV discount rate (percent)
    pub discount_rate: f64,
    /// Cap rate used to value forward NOI at exit; zero falls back to appreciation
    pub exit_cap_rate: f64,
    pub hold_period: u32,

    /// Defer gain on sale through a like-kind exchange
    #[serde(rename = "use1031Exchange")]
    pub use_1031_exchange: bool,
    /// Percent of net sale proceeds taken out as cash (taxable boot)
    pub exchange_boot_percent: f64,

    pub use_cost_segregation: bool,
    /// Additional first-year depreciation from a cost-segregation study
    #[serde(rename = "costSegYear1Bonus")]
    pub cost_seg_year1_bonus: f64,
}

impl TaxMarket {
    /// Recapture rate in effect at sale; zero means unset
    pub fn effective_recapture_rate(&self) -> f64 {
        if self.depreciation_recapture_rate == 0.0 {
            DEFAULT_RECAPTURE_RATE
        } else {
            self.depreciation_recapture_rate
        }
    }
}

impl Default for TaxMarket {
    fn default() -> Self {
        Self {
            income_tax_rate: 37.0,
            capital_gains_tax_rate: 20.0,
            depreciation_years: 39.0,
            depreciation_recapture_rate: DEFAULT_RECAPTURE_RATE,
            selling_costs: 3.0,
            discount_rate: 10.0,
            exit_cap_rate: 6.5,
            hold_period: DEFAULT_HOLD_PERIOD,
            use_1031_exchange: false,
            exchange_boot_percent: 0.0,
            use_cost_segregation: false,
            cost_seg_year1_bonus: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closing_costs_total() {
        let costs = ClosingCosts::default();
        let breakdown = costs.breakdown(500_000.0, false);
        // 3% of 500k plus 2k fixed
        assert_eq!(breakdown.total, 17_000.0);
        assert_eq!(breakdown.lender_fees, 5_000.0);
    }

    #[test]
    fn test_zero_price_leaves_fixed_fee() {
        let breakdown = ClosingCosts::default().breakdown(0.0, false);
        assert_eq!(breakdown.total, 2_000.0);
    }

    #[test]
    fn test_all_cash_drops_lender_fees() {
        let breakdown = ClosingCosts::default().breakdown(500_000.0, true);
        assert_eq!(breakdown.lender_fees, 0.0);
        assert_eq!(breakdown.total, 12_000.0);
    }

    #[test]
    fn test_financing_split() {
        let financing = Financing::default();
        assert_eq!(financing.down_payment(400_000.0), 100_000.0);
        assert_eq!(financing.loan_amount(400_000.0), 300_000.0);
        assert!(!financing.is_all_cash());
    }

    #[test]
    fn test_tax_market_serde_names() {
        let json = serde_json::to_value(TaxMarket::default()).unwrap();
        assert!(json.get("use1031Exchange").is_some());
        assert!(json.get("costSegYear1Bonus").is_some());
        assert!(json.get("exitCapRate").is_some());
    }
}
