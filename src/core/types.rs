use serde::Serialize;

use super::error::ProjectionError;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InflationScenario {
    Low,
    Moderate,
    High,
    Custom(f64),
}

impl InflationScenario {
    pub const LOW_RATE: f64 = 1.8;
    pub const MODERATE_RATE: f64 = 2.7;
    pub const HIGH_RATE: f64 = 4.5;

    pub fn rate(self) -> f64 {
        match self {
            InflationScenario::Low => Self::LOW_RATE,
            InflationScenario::Moderate => Self::MODERATE_RATE,
            InflationScenario::High => Self::HIGH_RATE,
            InflationScenario::Custom(rate) => rate,
        }
    }
}

// Rates are percentages: 9.6 means 9.6%.
#[derive(Debug, Clone)]
pub struct ProjectionInput {
    pub current_age: u32,
    pub retirement_age: u32,
    pub life_expectancy: u32,
    pub desired_annual_income: f64,
    pub tax_rate: f64,
    pub inflation_rate: f64,
    pub pre_retirement_return: f64,
    pub post_retirement_return: f64,
    pub initial_investment: f64,
    pub annual_contribution: f64,
}

impl ProjectionInput {
    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }

    pub fn years_in_retirement(&self) -> u32 {
        self.life_expectancy.saturating_sub(self.retirement_age)
    }

    pub fn validate(&self) -> Result<(), ProjectionError> {
        if self.retirement_age <= self.current_age {
            return Err(ProjectionError::RetirementBeforeCurrentAge {
                current_age: self.current_age,
                retirement_age: self.retirement_age,
            });
        }
        if self.life_expectancy <= self.retirement_age {
            return Err(ProjectionError::LifeExpectancyBeforeRetirement {
                retirement_age: self.retirement_age,
                life_expectancy: self.life_expectancy,
            });
        }
        if !self.tax_rate.is_finite() || !(0.0..100.0).contains(&self.tax_rate) {
            return Err(ProjectionError::InvalidTaxRate(self.tax_rate));
        }
        for (name, amount) in [
            ("desired_annual_income", self.desired_annual_income),
            ("initial_investment", self.initial_investment),
            ("annual_contribution", self.annual_contribution),
        ] {
            if !amount.is_finite() || amount < 0.0 {
                return Err(ProjectionError::InvalidAmount { name, value: amount });
            }
        }
        for (name, rate) in [
            ("inflation_rate", self.inflation_rate),
            ("pre_retirement_return", self.pre_retirement_return),
            ("post_retirement_return", self.post_retirement_return),
        ] {
            if !rate.is_finite() || rate <= -100.0 {
                return Err(ProjectionError::InvalidRate { name, value: rate });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetirementNeed {
    pub pre_tax_income: f64,
    pub income_at_retirement: f64,
    pub portfolio_needed: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReturnSolution {
    pub rate_percent: f64,
    pub converged: bool,
    pub iterations: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub projected_value: f64,
    pub gap: f64,
    pub required_return: Option<ReturnSolution>,
    pub additional_annual_contribution: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalPoint {
    pub year: u32,
    pub withdrawal_amount: f64,
    pub balance: f64,
    pub depleted: bool,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioNeeds {
    pub conservative: RetirementNeed,
    pub base: RetirementNeed,
    pub optimistic: RetirementNeed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub scenarios: ScenarioNeeds,
    pub projected_value: f64,
    pub base_gap: GapAnalysis,
    pub conservative_gap: GapAnalysis,
    pub years_to_retirement: u32,
    pub years_in_retirement: u32,
    pub total_contributions: f64,
    pub contributions_future_value: f64,
    pub after_tax_income: f64,
    pub pre_tax_income: f64,
    pub withdrawal_schedule: Vec<WithdrawalPoint>,
    pub withdrawal_rate: Option<f64>,
    pub portfolio_longevity: u32,
    pub longevity_indefinite: bool,
    pub real_return: f64,
    pub break_even_return: f64,
}
