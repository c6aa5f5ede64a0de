//! Internal Rate of Return (IRR) and Net Present Value (NPV)
//!
//! Both work over annual cash-flow vectors where index 0 is the initial
//! (usually negative) investment.

use log::{trace, warn};
use serde::{Deserialize, Serialize};

/// Rates at or below this are treated as divergence
const DIVERGENCE_FLOOR: f64 = -0.99;

/// Newton-Raphson settings for the IRR search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IrrSolver {
    /// Starting rate (decimal)
    pub guess: f64,
    /// Convergence threshold on both |NPV| and the step size
    pub tolerance: f64,
    pub max_iterations: u32,
}

impl Default for IrrSolver {
    fn default() -> Self {
        Self {
            guess: 0.1,
            tolerance: 1e-5,
            max_iterations: 1000,
        }
    }
}

impl IrrSolver {
    /// Solve for the rate (decimal) that zeroes NPV.
    ///
    /// `None` when the series has no meaningful IRR (fewer than two flows,
    /// all zero, or one-signed) or when the iteration diverges or fails to
    /// converge.
    pub fn solve(&self, cashflows: &[f64]) -> Option<f64> {
        if cashflows.len() < 2 || cashflows.iter().all(|&cf| cf == 0.0) {
            return None;
        }

        let has_positive = cashflows.iter().any(|&cf| cf > 0.0);
        let has_negative = cashflows.iter().any(|&cf| cf < 0.0);
        if !has_positive || !has_negative {
            return None;
        }

        let mut rate = self.guess;

        for iteration in 0..self.max_iterations {
            let (npv, dnpv) = npv_and_derivative(cashflows, rate)?;

            if npv.abs() < self.tolerance {
                return Some(rate);
            }

            if dnpv == 0.0 || !dnpv.is_finite() {
                warn!("IRR derivative vanished at rate {:.6}", rate);
                return None;
            }

            let new_rate = rate - npv / dnpv;
            trace!("IRR iteration {}: rate={:.8} npv={:.6}", iteration, new_rate, npv);

            if !new_rate.is_finite() || new_rate < DIVERGENCE_FLOOR {
                warn!("IRR diverged after {} iterations", iteration + 1);
                return None;
            }

            if (new_rate - rate).abs() < self.tolerance {
                return Some(new_rate);
            }

            rate = new_rate;
        }

        warn!("IRR did not converge within {} iterations", self.max_iterations);
        None
    }

    /// IRR as a percentage, 0 when no meaningful rate exists
    pub fn irr_percent(&self, cashflows: &[f64]) -> f64 {
        self.solve(cashflows).map_or(0.0, |rate| rate * 100.0)
    }
}

/// NPV and dNPV/drate at `rate`; `None` if any discount factor is degenerate
fn npv_and_derivative(cashflows: &[f64], rate: f64) -> Option<(f64, f64)> {
    let mut npv = 0.0;
    let mut dnpv = 0.0;

    for (t, &cf) in cashflows.iter().enumerate() {
        let discount = (1.0 + rate).powi(t as i32);
        if discount == 0.0 || !discount.is_finite() {
            return None;
        }
        npv += cf / discount;
        dnpv -= t as f64 * cf / (discount * (1.0 + rate));
    }

    Some((npv, dnpv))
}

/// IRR of an annual series as a percentage using default solver settings
pub fn calculate_irr(cashflows: &[f64]) -> f64 {
    IrrSolver::default().irr_percent(cashflows)
}

/// Net present value at a decimal `rate` (0.10 for 10%)
pub fn calculate_npv(rate: f64, cashflows: &[f64]) -> f64 {
    cashflows
        .iter()
        .enumerate()
        .map(|(t, &cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_irr() {
        assert_abs_diff_eq!(calculate_irr(&[-100.0, 110.0]), 10.0, epsilon = 0.01);
        assert_abs_diff_eq!(calculate_irr(&[-100.0, 100.0]), 0.0, epsilon = 0.01);
        assert_abs_diff_eq!(calculate_irr(&[-100.0, 200.0]), 100.0, epsilon = 0.01);
    }

    #[test]
    fn test_negative_irr() {
        let irr = calculate_irr(&[-100.0, 80.0]);
        assert!(irr < 0.0, "Expected negative IRR, got {}", irr);
        assert_abs_diff_eq!(irr, -20.0, epsilon = 0.01);
    }

    #[test]
    fn test_one_signed_series_is_zero() {
        assert_eq!(calculate_irr(&[100.0, 100.0, 100.0]), 0.0);
        assert_eq!(calculate_irr(&[-100.0, -50.0]), 0.0);
        assert_eq!(calculate_irr(&[0.0, 0.0, 0.0]), 0.0);
        assert_eq!(calculate_irr(&[-100.0]), 0.0);
        assert_eq!(calculate_irr(&[]), 0.0);
    }

    #[test]
    fn test_multi_year_irr() {
        // 10% coupon with principal back at maturity
        let mut cashflows = vec![-1000.0];
        cashflows.extend(vec![100.0; 9]);
        cashflows.push(1100.0);

        assert_abs_diff_eq!(calculate_irr(&cashflows), 10.0, epsilon = 0.01);
    }

    #[test]
    fn test_solver_reports_no_solution() {
        assert!(IrrSolver::default().solve(&[50.0, 50.0]).is_none());
    }

    #[test]
    fn test_npv() {
        assert_abs_diff_eq!(calculate_npv(0.10, &[-1000.0, 1100.0]), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(calculate_npv(0.0, &[-100.0, 50.0, 50.0, 50.0]), 50.0, epsilon = 1e-12);
        assert_abs_diff_eq!(calculate_npv(0.0, &[-1000.0, 1100.0]), 100.0, epsilon = 1e-12);
    }

    #[test]
    fn test_npv_at_irr_is_zero() {
        let cashflows = [-5000.0, 800.0, 900.0, 1000.0, 4000.0];
        let irr = calculate_irr(&cashflows) / 100.0;
        assert_abs_diff_eq!(calculate_npv(irr, &cashflows), 0.0, epsilon = 0.01);
    }
}
