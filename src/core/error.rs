use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("retirement age {retirement_age} must be greater than current age {current_age}")]
    RetirementBeforeCurrentAge { current_age: u32, retirement_age: u32 },
    #[error("life expectancy {life_expectancy} must be greater than retirement age {retirement_age}")]
    LifeExpectancyBeforeRetirement {
        retirement_age: u32,
        life_expectancy: u32,
    },
    #[error("tax rate must be in [0, 100), got {0}")]
    InvalidTaxRate(f64),
    #[error("{name} must be a finite non-negative amount, got {value}")]
    InvalidAmount { name: &'static str, value: f64 },
    #[error("{name} must be a finite rate above -100%, got {value}")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("horizon must be at least one year")]
    EmptyHorizon,
    #[error("initial investment must be > 0 to solve for a return without contributions, got {0}")]
    NonPositiveInitial(f64),
}
