//! Terminal sale at the end of the hold period
//!
//! Sale value is the forward NOI capitalized at the exit cap rate. Tax on sale
//! splits into depreciation recapture and capital gains on the remainder, with
//! an optional 1031 exchange that taxes only the cash taken out.

use serde::{Deserialize, Serialize};

use crate::inputs::{DealInputs, TaxMarket};
use super::guard::{finite_or_zero, pct, safe_div};

/// Position at the end of the hold period, as the forecast leaves it
#[derive(Debug, Clone, Copy)]
pub struct HoldingPosition {
    pub years: u32,
    pub final_noi: f64,
    pub final_loan_balance: f64,
    pub annual_depreciation: f64,
    pub closing_costs: f64,
}

/// 1031 exchange outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeSummary {
    pub enabled: bool,
    pub boot_percent: f64,
    /// Cash taken out of the exchange (taxable)
    pub boot_amount: f64,
    pub deferred_gain: f64,
    pub tax_saved: f64,
}

/// Sale proceeds and tax on sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExitAnalysis {
    pub gross_sale_price: f64,
    pub selling_costs: f64,
    pub loan_balance_at_exit: f64,
    /// After selling costs and loan payoff, before tax
    pub net_sale_proceeds: f64,
    pub total_tax_on_sale: f64,
    pub depreciation_recapture: f64,
    pub capital_gains_tax: f64,
    pub net_cash_from_sale: f64,
    #[serde(rename = "exchange1031")]
    pub exchange_1031: Option<ExchangeSummary>,
}

/// Depreciation taken over the hold, including any cost-segregation bonus
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CostSegregationSummary {
    pub enabled: bool,
    #[serde(rename = "year1Bonus")]
    pub year1_bonus: f64,
    pub total_depreciation: f64,
}

/// Exit valuation plus the cost-segregation summary when that strategy is on
#[derive(Debug, Clone, PartialEq)]
pub struct ExitOutcome {
    pub analysis: ExitAnalysis,
    pub cost_segregation: Option<CostSegregationSummary>,
}

/// Sale price from the forward NOI, or price appreciation when there is no exit cap
pub fn sale_value(inputs: &DealInputs, years: u32, final_noi: f64) -> f64 {
    let growth = 1.0 + pct(inputs.operations.annual_rent_growth);
    let exit_cap = inputs.tax_market.exit_cap_rate;

    if exit_cap != 0.0 {
        safe_div(final_noi * growth, pct(exit_cap))
    } else {
        finite_or_zero(inputs.property.purchase_price * growth.powi(years as i32))
    }
}

fn cost_seg_bonus(tax: &TaxMarket) -> f64 {
    if tax.use_cost_segregation {
        tax.cost_seg_year1_bonus
    } else {
        0.0
    }
}

/// Value the sale and the tax owed on it
pub fn evaluate_exit(inputs: &DealInputs, position: &HoldingPosition) -> ExitOutcome {
    let tax = &inputs.tax_market;
    let property = &inputs.property;

    let gross_sale_price = sale_value(inputs, position.years, position.final_noi);
    let selling_costs = gross_sale_price * pct(tax.selling_costs);
    let net_sale_proceeds = gross_sale_price - selling_costs - position.final_loan_balance;

    let bonus = cost_seg_bonus(tax);
    let accumulated_depreciation = position.annual_depreciation * position.years as f64 + bonus;
    let adjusted_basis =
        property.purchase_price + property.rehab_costs + position.closing_costs - accumulated_depreciation;
    let capital_gain = (gross_sale_price - selling_costs) - adjusted_basis;

    let recapture_rate = tax.effective_recapture_rate();
    let depreciation_recapture = accumulated_depreciation * pct(recapture_rate);
    let remaining_gain = (capital_gain - accumulated_depreciation).max(0.0);
    let capital_gains_tax = remaining_gain * pct(tax.capital_gains_tax_rate);

    let (total_tax_on_sale, exchange_1031) = if tax.use_1031_exchange {
        let boot_amount = net_sale_proceeds * pct(tax.exchange_boot_percent);
        let blended_rate = (tax.capital_gains_tax_rate + recapture_rate) / 2.0;
        let tax_on_boot = boot_amount * pct(blended_rate);

        let summary = ExchangeSummary {
            enabled: true,
            boot_percent: tax.exchange_boot_percent,
            boot_amount,
            deferred_gain: capital_gain - boot_amount,
            tax_saved: (depreciation_recapture + capital_gains_tax) - tax_on_boot,
        };
        (tax_on_boot, Some(summary))
    } else {
        (depreciation_recapture + capital_gains_tax, None)
    };

    let cost_segregation = tax.use_cost_segregation.then(|| CostSegregationSummary {
        enabled: true,
        year1_bonus: bonus,
        total_depreciation: accumulated_depreciation,
    });

    ExitOutcome {
        analysis: ExitAnalysis {
            gross_sale_price,
            selling_costs,
            loan_balance_at_exit: position.final_loan_balance,
            net_sale_proceeds,
            total_tax_on_sale,
            depreciation_recapture,
            capital_gains_tax,
            net_cash_from_sale: net_sale_proceeds - total_tax_on_sale,
            exchange_1031,
        },
        cost_segregation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn position() -> HoldingPosition {
        HoldingPosition {
            years: 10,
            final_noi: 130_000.0,
            final_loan_balance: 1_000_000.0,
            annual_depreciation: 40_000.0,
            closing_costs: 60_000.0,
        }
    }

    #[test]
    fn test_capitalized_sale() {
        let inputs = DealInputs::default();
        let exit = evaluate_exit(&inputs, &position()).analysis;

        // 130,000 grown 3%, capped at 6.5%
        assert_relative_eq!(exit.gross_sale_price, 2_060_000.0, max_relative = 1e-12);
        assert_relative_eq!(exit.selling_costs, 61_800.0, max_relative = 1e-12);
        assert_relative_eq!(exit.net_sale_proceeds, 998_200.0, max_relative = 1e-12);
        assert!(exit.exchange_1031.is_none());
    }

    #[test]
    fn test_tax_on_sale() {
        let inputs = DealInputs::default();
        let exit = evaluate_exit(&inputs, &position()).analysis;

        // Accumulated depreciation 400,000 taxed at 25%
        assert_relative_eq!(exit.depreciation_recapture, 100_000.0);
        // Gain = 1,998,200 - 1,660,000 = 338,200; nothing left after recapture
        assert_eq!(exit.capital_gains_tax, 0.0);
        assert_relative_eq!(exit.net_cash_from_sale, exit.net_sale_proceeds - 100_000.0);
    }

    #[test]
    fn test_zero_exit_cap_uses_appreciation() {
        let mut inputs = DealInputs::default();
        inputs.tax_market.exit_cap_rate = 0.0;
        let exit = evaluate_exit(&inputs, &position()).analysis;

        assert_relative_eq!(exit.gross_sale_price, 2_000_000.0 * 1.03_f64.powi(10), max_relative = 1e-12);
    }

    #[test]
    fn test_1031_without_boot_defers_all_tax() {
        let mut inputs = DealInputs::default();
        inputs.tax_market.use_1031_exchange = true;
        let exit = evaluate_exit(&inputs, &position()).analysis;

        assert_eq!(exit.total_tax_on_sale, 0.0);
        assert_relative_eq!(exit.net_cash_from_sale, exit.net_sale_proceeds);
        let exchange = exit.exchange_1031.unwrap();
        assert_relative_eq!(exchange.tax_saved, exit.depreciation_recapture + exit.capital_gains_tax);
        assert!(exchange.deferred_gain > 0.0);
    }

    #[test]
    fn test_1031_boot_taxed_at_blended_rate() {
        let mut inputs = DealInputs::default();
        inputs.tax_market.use_1031_exchange = true;
        inputs.tax_market.exchange_boot_percent = 10.0;
        let exit = evaluate_exit(&inputs, &position()).analysis;

        let boot = exit.net_sale_proceeds * 0.10;
        // Blended rate (20 + 25) / 2
        assert_relative_eq!(exit.total_tax_on_sale, boot * 0.225, max_relative = 1e-12);
    }

    #[test]
    fn test_zero_recapture_rate_falls_back_to_default() {
        let mut inputs = DealInputs::default();
        inputs.tax_market.depreciation_recapture_rate = 0.0;
        let exit = evaluate_exit(&inputs, &position()).analysis;

        // 400,000 accumulated at the 25% fallback
        assert_relative_eq!(exit.depreciation_recapture, 100_000.0);

        inputs.tax_market.use_1031_exchange = true;
        inputs.tax_market.exchange_boot_percent = 10.0;
        let exit = evaluate_exit(&inputs, &position()).analysis;
        assert_relative_eq!(exit.total_tax_on_sale, exit.net_sale_proceeds * 0.10 * 0.225, max_relative = 1e-12);
    }

    #[test]
    fn test_cost_segregation_adds_to_recapture() {
        let mut inputs = DealInputs::default();
        inputs.tax_market.use_cost_segregation = true;
        inputs.tax_market.cost_seg_year1_bonus = 50_000.0;
        let outcome = evaluate_exit(&inputs, &position());

        let summary = outcome.cost_segregation.unwrap();
        assert_relative_eq!(summary.total_depreciation, 450_000.0);
        assert_relative_eq!(outcome.analysis.depreciation_recapture, 112_500.0);
    }
}
