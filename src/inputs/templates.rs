//! Starting-point assumptions by property type

use serde::{Deserialize, Serialize};

use super::operations::{CommercialOperations, OperatingMode};
use super::DealInputs;
use crate::error::EngineError;

/// Property type presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyTemplate {
    Multifamily,
    Retail,
    Office,
    Industrial,
}

/// Market assumptions carried by a template
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemplateAssumptions {
    pub annual_base_rent_per_sq_ft: f64,
    pub vacancy_rate: f64,
    pub annual_rent_growth: f64,
    pub annual_expense_growth: f64,
    pub exit_cap_rate: f64,
    pub discount_rate: f64,
    pub hold_period: u32,
}

impl PropertyTemplate {
    pub const ALL: [PropertyTemplate; 4] = [
        PropertyTemplate::Multifamily,
        PropertyTemplate::Retail,
        PropertyTemplate::Office,
        PropertyTemplate::Industrial,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PropertyTemplate::Multifamily => "Multifamily",
            PropertyTemplate::Retail => "Retail",
            PropertyTemplate::Office => "Office",
            PropertyTemplate::Industrial => "Industrial",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            PropertyTemplate::Multifamily => "Apartment buildings, condos, townhomes",
            PropertyTemplate::Retail => "Shopping centers, strip malls",
            PropertyTemplate::Office => "Office buildings, business parks",
            PropertyTemplate::Industrial => "Warehouses, distribution centers",
        }
    }

    pub fn assumptions(&self) -> TemplateAssumptions {
        match self {
            PropertyTemplate::Multifamily => TemplateAssumptions {
                annual_base_rent_per_sq_ft: 18.0,
                vacancy_rate: 5.0,
                annual_rent_growth: 3.0,
                annual_expense_growth: 2.5,
                exit_cap_rate: 5.5,
                discount_rate: 8.0,
                hold_period: 10,
            },
            PropertyTemplate::Retail => TemplateAssumptions {
                annual_base_rent_per_sq_ft: 22.0,
                vacancy_rate: 7.0,
                annual_rent_growth: 2.0,
                annual_expense_growth: 2.0,
                exit_cap_rate: 6.5,
                discount_rate: 9.0,
                hold_period: 10,
            },
            PropertyTemplate::Office => TemplateAssumptions {
                annual_base_rent_per_sq_ft: 28.0,
                vacancy_rate: 10.0,
                annual_rent_growth: 2.5,
                annual_expense_growth: 2.5,
                exit_cap_rate: 6.0,
                discount_rate: 8.5,
                hold_period: 10,
            },
            PropertyTemplate::Industrial => TemplateAssumptions {
                annual_base_rent_per_sq_ft: 8.0,
                vacancy_rate: 3.0,
                annual_rent_growth: 3.0,
                annual_expense_growth: 2.0,
                exit_cap_rate: 5.0,
                discount_rate: 7.5,
                hold_period: 10,
            },
        }
    }

    /// Overwrite the template's fields on a copy of `inputs`.
    ///
    /// Switches to commercial mode; an existing commercial expense bundle is kept.
    pub fn apply(&self, inputs: &DealInputs) -> DealInputs {
        let a = self.assumptions();
        let mut out = inputs.clone();

        let mut commercial = match &inputs.operations.mode {
            OperatingMode::Commercial(c) => c.clone(),
            OperatingMode::Simple(_) => CommercialOperations::default(),
        };
        commercial.annual_base_rent_per_sq_ft = a.annual_base_rent_per_sq_ft;

        out.operations.mode = OperatingMode::Commercial(commercial);
        out.operations.vacancy_rate = a.vacancy_rate;
        out.operations.annual_rent_growth = a.annual_rent_growth;
        out.operations.annual_expense_growth = a.annual_expense_growth;
        out.tax_market.exit_cap_rate = a.exit_cap_rate;
        out.tax_market.discount_rate = a.discount_rate;
        out.tax_market.hold_period = a.hold_period;

        out
    }
}

impl std::str::FromStr for PropertyTemplate {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PropertyTemplate::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::UnknownTemplate(s.to_string()))
    }
}
