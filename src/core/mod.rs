mod error;
mod growth;
mod needs;
mod plan;
mod solver;
mod types;
mod withdrawal;

pub use error::ProjectionError;
pub use growth::{additional_annual_contribution, future_value};
pub use needs::{DEGENERATE_RATE_EPS, retirement_need};
pub use plan::recompute;
pub use solver::{MAX_ITERATIONS, required_return};
pub use types::{
    GapAnalysis, InflationScenario, PlanReport, ProjectionInput, RetirementNeed, ReturnSolution,
    ScenarioNeeds, WithdrawalPoint,
};
pub use withdrawal::{
    MAX_LONGEVITY_YEARS, SAMPLE_INTERVAL, is_indefinite, portfolio_longevity, real_return,
    simulate_withdrawals, withdrawal_rate,
};
