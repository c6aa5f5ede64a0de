//! Output structures for a pro forma projection

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use super::metrics::Metrics;

/// One year of the operating forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastYear {
    pub year: u32,

    // Income
    pub potential_gross_income: f64,
    pub vacancy_loss: f64,
    pub effective_gross_income: f64,

    // Operations
    pub total_expenses: f64,
    pub noi: f64,

    // Debt
    pub debt_service: f64,
    pub interest_payment: f64,
    pub principal_payment: f64,
    pub loan_balance_end: f64,

    // Cash flow and tax
    pub cash_flow: f64,
    pub taxable_income: f64,
    pub tax_liability: f64,
    pub cash_flow_after_tax: f64,

    // Returns on total initial investment (percent)
    pub cash_on_cash: f64,
    pub cash_on_cash_after_tax: f64,
}

impl ForecastYear {
    /// Create a zeroed row for `year`
    pub fn new(year: u32) -> Self {
        Self {
            year,
            potential_gross_income: 0.0,
            vacancy_loss: 0.0,
            effective_gross_income: 0.0,
            total_expenses: 0.0,
            noi: 0.0,
            debt_service: 0.0,
            interest_payment: 0.0,
            principal_payment: 0.0,
            loan_balance_end: 0.0,
            cash_flow: 0.0,
            taxable_income: 0.0,
            tax_liability: 0.0,
            cash_flow_after_tax: 0.0,
            cash_on_cash: 0.0,
            cash_on_cash_after_tax: 0.0,
        }
    }
}

/// Year-end loan position over the loan term
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmortizationEntry {
    pub year: u32,
    pub balance: f64,
    /// Cumulative principal repaid
    pub principal_paid: f64,
    /// Cumulative principal repaid as a percent of the original loan
    pub equity_percent: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// One row per hold-period year
    pub forecast: Vec<ForecastYear>,

    /// One row per loan-term year, independent of the hold period
    pub amortization_schedule: Vec<AmortizationEntry>,

    pub metrics: Metrics,
}

impl ProjectionResult {
    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let total_noi: f64 = self.forecast.iter().map(|r| r.noi).sum();
        let total_debt_service: f64 = self.forecast.iter().map(|r| r.debt_service).sum();
        let total_cash_flow: f64 = self.forecast.iter().map(|r| r.cash_flow).sum();
        let total_cash_flow_after_tax: f64 = self.forecast.iter().map(|r| r.cash_flow_after_tax).sum();
        let total_tax_liability: f64 = self.forecast.iter().map(|r| r.tax_liability).sum();

        let final_loan_balance = self.forecast.last().map(|r| r.loan_balance_end).unwrap_or(0.0);

        ProjectionSummary {
            total_years: self.forecast.len() as u32,
            total_noi,
            total_debt_service,
            total_cash_flow,
            total_cash_flow_after_tax,
            total_tax_liability,
            final_loan_balance,
        }
    }

    /// Write the forecast rows as CSV with a camelCase header
    pub fn write_forecast_csv<W: Write>(&self, writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);
        for row in &self.forecast {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub total_years: u32,
    pub total_noi: f64,
    pub total_debt_service: f64,
    pub total_cash_flow: f64,
    pub total_cash_flow_after_tax: f64,
    pub total_tax_liability: f64,
    pub final_loan_balance: f64,
}

#[cfg(test)]
mod tests {
    use crate::projection::project;
    use crate::inputs::DealInputs;

    #[test]
    fn test_summary_totals() {
        let result = project(&DealInputs::default());
        let summary = result.summary();

        assert_eq!(summary.total_years, 10);
        let noi: f64 = result.forecast.iter().map(|r| r.noi).sum();
        assert_eq!(summary.total_noi, noi);
        assert_eq!(summary.final_loan_balance, result.forecast[9].loan_balance_end);
    }

    #[test]
    fn test_forecast_csv() {
        let mut inputs = DealInputs::default();
        inputs.tax_market.hold_period = 3;
        let result = project(&inputs);

        let mut buf = Vec::new();
        result.write_forecast_csv(&mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("year,potentialGrossIncome,vacancyLoss"));
        assert!(lines[3].starts_with("3,"));
    }
}
