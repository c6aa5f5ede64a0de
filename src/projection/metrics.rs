//! Investment-return metrics aggregated from a forecast and its exit

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::inputs::{ClosingCostsBreakdown, DealInputs};
use super::cashflows::ForecastYear;
use super::exit::{CostSegregationSummary, ExitAnalysis, ExitOutcome};
use super::guard::{pct, percent_of};
use super::irr::{calculate_npv, IrrSolver};

/// Headline results of one projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    /// Pre-tax IRR (percent)
    pub irr: f64,
    pub irr_after_tax: f64,
    pub equity_multiple: f64,
    pub equity_multiple_after_tax: f64,
    pub average_cash_on_cash: f64,
    pub average_cash_on_cash_after_tax: f64,
    /// After-tax NPV at the discount rate
    pub npv_after_tax: f64,
    pub total_initial_investment: f64,
    pub closing_costs_breakdown: ClosingCostsBreakdown,
    pub net_sale_proceeds: f64,
    pub net_cash_from_sale: f64,
    pub total_profit: f64,
    /// Year-1 NOI over purchase price (percent)
    pub cap_rate: f64,
    /// Year-1 NOI over debt service; infinite with no debt
    pub dscr: f64,
    pub year1_noi: f64,
    pub year1_cash_on_cash_after_tax: f64,
    pub exit_analysis: ExitAnalysis,
    pub cost_segregation: Option<CostSegregationSummary>,
}

/// Equity cash-flow vector: investment at t=0, then each year's flow with
/// the sale proceeds folded into the final year
pub fn equity_cashflows(total_initial_investment: f64, annual: &[f64], sale_proceeds: f64) -> Vec<f64> {
    let mut flows = Vec::with_capacity(annual.len() + 1);
    flows.push(-total_initial_investment);
    flows.extend_from_slice(annual);
    if !annual.is_empty() {
        if let Some(last) = flows.last_mut() {
            *last += sale_proceeds;
        }
    }
    flows
}

fn average(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        values.sum::<f64>() / count as f64
    }
}

impl Metrics {
    /// Aggregate a completed forecast and exit into headline metrics
    pub fn aggregate(
        inputs: &DealInputs,
        forecast: &[ForecastYear],
        total_initial_investment: f64,
        closing_costs_breakdown: ClosingCostsBreakdown,
        exit: ExitOutcome,
        solver: &IrrSolver,
    ) -> Self {
        let tii = total_initial_investment;
        let years = forecast.len();
        let exit_analysis = exit.analysis;

        let pre_tax: Vec<f64> = forecast.iter().map(|f| f.cash_flow).collect();
        let after_tax: Vec<f64> = forecast.iter().map(|f| f.cash_flow_after_tax).collect();

        let flows_pre_tax = equity_cashflows(tii, &pre_tax, exit_analysis.net_sale_proceeds);
        let flows_after_tax = equity_cashflows(tii, &after_tax, exit_analysis.net_cash_from_sale);

        let total_cash_flow: f64 = pre_tax.iter().sum();
        let total_cash_flow_after_tax: f64 = after_tax.iter().sum();

        let (equity_multiple, equity_multiple_after_tax) = if tii > 0.0 {
            (
                (total_cash_flow + exit_analysis.net_sale_proceeds) / tii,
                (total_cash_flow_after_tax + exit_analysis.net_cash_from_sale) / tii,
            )
        } else {
            (0.0, 0.0)
        };

        let year1 = forecast.first();
        let year1_noi = year1.map_or(0.0, |f| f.noi);
        let year1_debt_service = year1.map_or(0.0, |f| f.debt_service);

        let dscr = if year1_debt_service > 0.0 {
            year1_noi / year1_debt_service
        } else {
            f64::INFINITY
        };

        Self {
            irr: solver.irr_percent(&flows_pre_tax),
            irr_after_tax: solver.irr_percent(&flows_after_tax),
            equity_multiple,
            equity_multiple_after_tax,
            average_cash_on_cash: average(forecast.iter().map(|f| f.cash_on_cash), years),
            average_cash_on_cash_after_tax: average(forecast.iter().map(|f| f.cash_on_cash_after_tax), years),
            npv_after_tax: calculate_npv(pct(inputs.tax_market.discount_rate), &flows_after_tax),
            total_initial_investment: tii,
            closing_costs_breakdown,
            net_sale_proceeds: exit_analysis.net_sale_proceeds,
            net_cash_from_sale: exit_analysis.net_cash_from_sale,
            total_profit: total_cash_flow_after_tax + exit_analysis.net_cash_from_sale - tii,
            cap_rate: if inputs.property.purchase_price > 0.0 {
                percent_of(year1_noi, inputs.property.purchase_price)
            } else {
                0.0
            },
            dscr,
            year1_noi,
            year1_cash_on_cash_after_tax: year1.map_or(0.0, |f| f.cash_on_cash_after_tax),
            exit_analysis,
            cost_segregation: exit.cost_segregation,
        }
    }
}

/// Scalar metrics addressable by name (sensitivity grids, CLI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricName {
    Irr,
    IrrAfterTax,
    EquityMultiple,
    EquityMultipleAfterTax,
    AverageCashOnCash,
    AverageCashOnCashAfterTax,
    NpvAfterTax,
    TotalInitialInvestment,
    NetSaleProceeds,
    NetCashFromSale,
    TotalProfit,
    CapRate,
    Dscr,
    Year1Noi,
    Year1CashOnCashAfterTax,
}

impl MetricName {
    pub const ALL: [MetricName; 15] = [
        MetricName::Irr,
        MetricName::IrrAfterTax,
        MetricName::EquityMultiple,
        MetricName::EquityMultipleAfterTax,
        MetricName::AverageCashOnCash,
        MetricName::AverageCashOnCashAfterTax,
        MetricName::NpvAfterTax,
        MetricName::TotalInitialInvestment,
        MetricName::NetSaleProceeds,
        MetricName::NetCashFromSale,
        MetricName::TotalProfit,
        MetricName::CapRate,
        MetricName::Dscr,
        MetricName::Year1Noi,
        MetricName::Year1CashOnCashAfterTax,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            MetricName::Irr => "irr",
            MetricName::IrrAfterTax => "irrAfterTax",
            MetricName::EquityMultiple => "equityMultiple",
            MetricName::EquityMultipleAfterTax => "equityMultipleAfterTax",
            MetricName::AverageCashOnCash => "averageCashOnCash",
            MetricName::AverageCashOnCashAfterTax => "averageCashOnCashAfterTax",
            MetricName::NpvAfterTax => "npvAfterTax",
            MetricName::TotalInitialInvestment => "totalInitialInvestment",
            MetricName::NetSaleProceeds => "netSaleProceeds",
            MetricName::NetCashFromSale => "netCashFromSale",
            MetricName::TotalProfit => "totalProfit",
            MetricName::CapRate => "capRate",
            MetricName::Dscr => "dscr",
            MetricName::Year1Noi => "year1Noi",
            MetricName::Year1CashOnCashAfterTax => "year1CashOnCashAfterTax",
        }
    }

    pub fn value(&self, metrics: &Metrics) -> f64 {
        match self {
            MetricName::Irr => metrics.irr,
            MetricName::IrrAfterTax => metrics.irr_after_tax,
            MetricName::EquityMultiple => metrics.equity_multiple,
            MetricName::EquityMultipleAfterTax => metrics.equity_multiple_after_tax,
            MetricName::AverageCashOnCash => metrics.average_cash_on_cash,
            MetricName::AverageCashOnCashAfterTax => metrics.average_cash_on_cash_after_tax,
            MetricName::NpvAfterTax => metrics.npv_after_tax,
            MetricName::TotalInitialInvestment => metrics.total_initial_investment,
            MetricName::NetSaleProceeds => metrics.net_sale_proceeds,
            MetricName::NetCashFromSale => metrics.net_cash_from_sale,
            MetricName::TotalProfit => metrics.total_profit,
            MetricName::CapRate => metrics.cap_rate,
            MetricName::Dscr => metrics.dscr,
            MetricName::Year1Noi => metrics.year1_noi,
            MetricName::Year1CashOnCashAfterTax => metrics.year1_cash_on_cash_after_tax,
        }
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MetricName {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricName::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| EngineError::UnknownMetric(s.to_string()))
    }
}
