//! Level-payment mortgage math
//!
//! Monthly compounding with a fixed monthly payment. Financing with no
//! principal, no interest or no term produces a zero payment rather than an
//! error; callers treat that as interest-free or already repaid.

use serde::{Deserialize, Serialize};

use crate::inputs::MAX_TERM_YEARS;
use super::cashflows::AmortizationEntry;
use super::guard::{finite_or_zero, pct, percent_of};

/// Interest and principal paid over one loan year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnnualDebtSplit {
    pub interest: f64,
    pub principal: f64,
}

/// Monthly principal-and-interest payment
///
/// `P·r·(1+r)^n / ((1+r)^n − 1)` with `r` the monthly rate and `n` the
/// number of monthly payments.
pub fn monthly_payment(principal: f64, annual_rate_percent: f64, years: f64) -> f64 {
    if principal <= 0.0 || annual_rate_percent <= 0.0 || years <= 0.0 {
        return 0.0;
    }

    let r = pct(annual_rate_percent) / 12.0;
    let n = years * 12.0;
    let growth = (1.0 + r).powf(n);

    finite_or_zero(principal * r * growth / (growth - 1.0))
}

/// Interest/principal split for the next twelve monthly payments
/// starting from `balance`
pub fn annual_interest_split(balance: f64, annual_rate_percent: f64, monthly_payment: f64) -> AnnualDebtSplit {
    let r = pct(annual_rate_percent) / 12.0;
    let mut balance = balance;
    let mut interest = 0.0;

    for _ in 0..12 {
        let month_interest = balance * r;
        interest += month_interest;
        balance -= monthly_payment - month_interest;
    }

    AnnualDebtSplit {
        interest,
        principal: monthly_payment * 12.0 - interest,
    }
}

/// Year-end balances over the full loan term (one entry per loan year)
///
/// Terms beyond [`MAX_TERM_YEARS`] are truncated to it.
pub fn amortization_schedule(principal: f64, annual_rate_percent: f64, years: u32) -> Vec<AmortizationEntry> {
    let years = years.min(MAX_TERM_YEARS);
    let r = pct(annual_rate_percent) / 12.0;
    let payment = monthly_payment(principal, annual_rate_percent, years as f64);
    let mut balance = principal;
    let mut schedule = Vec::with_capacity(years as usize);

    for month in 1..=years * 12 {
        let interest = balance * r;
        balance -= payment - interest;

        if month % 12 == 0 {
            let principal_paid = principal - balance;
            schedule.push(AmortizationEntry {
                year: month / 12,
                balance: balance.max(0.0),
                principal_paid,
                equity_percent: percent_of(principal_paid, principal),
            });
        }
    }

    schedule
}

/// A financing alternative to compare against others
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanOption {
    pub name: String,
    /// Annual rate (percent)
    pub rate: f64,
    pub term_years: u32,
    /// Discount points paid up front (percent of loan amount)
    pub points: f64,
}

impl LoanOption {
    pub fn new(name: impl Into<String>, rate: f64, term_years: u32, points: f64) -> Self {
        Self {
            name: name.into(),
            rate,
            term_years,
            points,
        }
    }
}

/// Lifetime cost of one financing alternative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanComparison {
    pub name: String,
    pub monthly_payment: f64,
    pub points_cost: f64,
    pub total_interest: f64,
    pub total_cost: f64,
    /// Interest plus points per year, as a percent of the loan amount
    pub effective_rate: f64,
}

/// Compare financing alternatives for the same loan amount
pub fn compare_loans(loan_amount: f64, options: &[LoanOption]) -> Vec<LoanComparison> {
    options
        .iter()
        .map(|option| {
            if loan_amount <= 0.0 {
                return LoanComparison {
                    name: option.name.clone(),
                    monthly_payment: 0.0,
                    points_cost: 0.0,
                    total_interest: 0.0,
                    total_cost: 0.0,
                    effective_rate: 0.0,
                };
            }

            let payment = monthly_payment(loan_amount, option.rate, option.term_years as f64);
            let points_cost = loan_amount * pct(option.points);
            let total_interest = payment * option.term_years as f64 * 12.0 - loan_amount;
            let effective_rate = if option.term_years > 0 {
                percent_of(total_interest + points_cost, loan_amount) / option.term_years as f64
            } else {
                0.0
            };

            LoanComparison {
                name: option.name.clone(),
                monthly_payment: payment,
                points_cost,
                total_interest,
                total_cost: loan_amount + total_interest + points_cost,
                effective_rate,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_standard_payment() {
        // $200,000 at 7% for 30 years
        assert_abs_diff_eq!(monthly_payment(200_000.0, 7.0, 30.0), 1330.60, epsilon = 1.0);
        // $100,000 at 5% for 5 years
        assert_abs_diff_eq!(monthly_payment(100_000.0, 5.0, 5.0), 1887.12, epsilon = 1.0);
    }

    #[test]
    fn test_degenerate_payment_is_zero() {
        assert_eq!(monthly_payment(0.0, 7.0, 30.0), 0.0);
        assert_eq!(monthly_payment(200_000.0, 0.0, 30.0), 0.0);
        assert_eq!(monthly_payment(200_000.0, 7.0, 0.0), 0.0);
        assert_eq!(monthly_payment(-100_000.0, 7.0, 30.0), 0.0);
        assert_eq!(monthly_payment(100_000.0, -5.0, 30.0), 0.0);
        assert_eq!(monthly_payment(100_000.0, 7.0, -10.0), 0.0);
    }

    #[test]
    fn test_high_rate_payment_is_bounded() {
        let payment = monthly_payment(100_000.0, 20.0, 30.0);
        assert!(payment > 0.0 && payment < 2_000.0);
    }

    #[test]
    fn test_annual_split_sums_to_payments() {
        let payment = monthly_payment(200_000.0, 7.0, 30.0);
        let split = annual_interest_split(200_000.0, 7.0, payment);

        assert_abs_diff_eq!(split.interest + split.principal, payment * 12.0, epsilon = 1e-6);
        // First year of a 30-year loan is mostly interest
        assert!(split.interest > split.principal);
        assert!(split.principal > 0.0);
    }

    #[test]
    fn test_schedule_length_and_payoff() {
        let schedule = amortization_schedule(200_000.0, 7.0, 30);
        assert_eq!(schedule.len(), 30);
        assert_abs_diff_eq!(schedule.last().unwrap().balance, 0.0, epsilon = 1.0);

        let short = amortization_schedule(100_000.0, 5.0, 5);
        assert_eq!(short.len(), 5);
        assert_abs_diff_eq!(short[4].balance, 0.0, epsilon = 1.0);
    }

    #[test]
    fn test_equity_strictly_increasing() {
        let schedule = amortization_schedule(200_000.0, 7.0, 30);
        for pair in schedule.windows(2) {
            assert!(pair[1].equity_percent > pair[0].equity_percent);
        }
        assert_abs_diff_eq!(schedule.last().unwrap().equity_percent, 100.0, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_schedule_never_amortizes() {
        let schedule = amortization_schedule(200_000.0, 0.0, 30);
        assert_eq!(schedule.len(), 30);
        for entry in &schedule {
            assert_eq!(entry.balance, 200_000.0);
            assert_eq!(entry.equity_percent, 0.0);
        }
    }

    #[test]
    fn test_schedule_term_is_capped() {
        let schedule = amortization_schedule(200_000.0, 7.0, 400_000_000);
        assert_eq!(schedule.len(), MAX_TERM_YEARS as usize);
        assert_abs_diff_eq!(schedule.last().unwrap().balance, 0.0, epsilon = 1.0);
    }

    #[test]
    fn test_compare_loans() {
        let options = vec![
            LoanOption::new("Option 1", 6.5, 30, 0.0),
            LoanOption::new("Option 2", 6.25, 30, 1.0),
            LoanOption::new("Option 3", 7.0, 25, 0.0),
        ];
        let results = compare_loans(300_000.0, &options);

        assert_eq!(results.len(), 3);
        assert_eq!(results[1].points_cost, 3_000.0);
        assert!(results[1].monthly_payment < results[0].monthly_payment);
        for r in &results {
            assert_abs_diff_eq!(
                r.total_cost,
                300_000.0 + r.total_interest + r.points_cost,
                epsilon = 1e-6
            );
        }
    }

    #[test]
    fn test_compare_loans_without_loan() {
        let results = compare_loans(0.0, &[LoanOption::new("Cash", 6.0, 30, 1.0)]);
        assert_eq!(results[0].total_cost, 0.0);
        assert_eq!(results[0].effective_rate, 0.0);
    }
}
