//! Weighted deal score and letter grade from after-tax return metrics

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::projection::Metrics;

/// Letter grade bands over the 0-100 weighted score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: f64) -> Self {
        if score >= 90.0 {
            Grade::A
        } else if score >= 80.0 {
            Grade::B
        } else if score >= 70.0 {
            Grade::C
        } else if score >= 60.0 {
            Grade::D
        } else {
            Grade::F
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.pad(s)
    }
}

/// Descending step function: (minimum value, score) pairs
type Thresholds = [(f64, f64); 5];

const IRR_THRESHOLDS: Thresholds = [(15.0, 100.0), (12.0, 85.0), (8.0, 70.0), (5.0, 55.0), (0.0, 40.0)];
const COC_THRESHOLDS: Thresholds = [(10.0, 100.0), (7.0, 85.0), (5.0, 70.0), (3.0, 55.0), (0.0, 40.0)];
const EM_THRESHOLDS: Thresholds = [(2.5, 100.0), (2.0, 85.0), (1.5, 70.0), (1.2, 55.0), (1.0, 40.0)];

const IRR_WEIGHT: u32 = 40;
const COC_WEIGHT: u32 = 30;
const EM_WEIGHT: u32 = 30;

fn step_score(value: f64, thresholds: &Thresholds) -> f64 {
    thresholds
        .iter()
        .find(|(min, _)| value >= *min)
        .map_or(0.0, |&(_, score)| score)
}

/// One component of the score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub score: u32,
    /// Percent of the total
    pub weight: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub irr: ScoreComponent,
    pub cash_on_cash: ScoreComponent,
    pub equity_multiple: ScoreComponent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DealScore {
    pub grade: Grade,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
}

/// Score from after-tax IRR (percent), average after-tax cash-on-cash (percent)
/// and after-tax equity multiple
pub fn score_values(irr: f64, cash_on_cash: f64, equity_multiple: f64) -> DealScore {
    let irr_score = step_score(irr, &IRR_THRESHOLDS);
    let coc_score = step_score(cash_on_cash, &COC_THRESHOLDS);
    let em_score = step_score(equity_multiple, &EM_THRESHOLDS);

    let total = (irr_score * IRR_WEIGHT as f64 + coc_score * COC_WEIGHT as f64 + em_score * EM_WEIGHT as f64) / 100.0;

    let component = |score: f64, weight| ScoreComponent {
        score: score.round() as u32,
        weight,
    };

    DealScore {
        grade: Grade::from_score(total),
        score: total.round() as u32,
        breakdown: ScoreBreakdown {
            irr: component(irr_score, IRR_WEIGHT),
            cash_on_cash: component(coc_score, COC_WEIGHT),
            equity_multiple: component(em_score, EM_WEIGHT),
        },
    }
}

/// Score a projection's after-tax metrics
pub fn score(metrics: &Metrics) -> DealScore {
    score_values(
        metrics.irr_after_tax,
        metrics.average_cash_on_cash_after_tax,
        metrics.equity_multiple_after_tax,
    )
}
