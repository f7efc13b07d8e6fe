use super::error::ProjectionError;
use super::growth::{additional_annual_contribution, future_value};
use super::needs::retirement_need;
use super::solver::required_return;
use super::types::{
    GapAnalysis, InflationScenario, PlanReport, ProjectionInput, RetirementNeed, ScenarioNeeds,
};
use super::withdrawal::{
    is_indefinite, portfolio_longevity, real_return, simulate_withdrawals, withdrawal_rate,
};

pub fn recompute(input: &ProjectionInput) -> Result<PlanReport, ProjectionError> {
    input.validate()?;

    let years_to_retirement = input.years_to_retirement();
    let years_in_retirement = input.years_in_retirement();

    let scenarios = ScenarioNeeds {
        conservative: need_for_inflation(input, InflationScenario::High.rate())?,
        base: need_for_inflation(input, input.inflation_rate)?,
        optimistic: need_for_inflation(input, InflationScenario::Low.rate())?,
    };

    let projected_value = future_value(
        input.initial_investment,
        input.annual_contribution,
        input.pre_retirement_return,
        years_to_retirement,
    );

    let base_gap = analyze_gap(input, projected_value, &scenarios.base)?;
    let conservative_gap = analyze_gap(input, projected_value, &scenarios.conservative)?;

    let first_withdrawal = scenarios.base.income_at_retirement;
    let withdrawal_schedule = simulate_withdrawals(
        projected_value,
        first_withdrawal,
        input.inflation_rate,
        input.post_retirement_return,
        years_in_retirement,
    );
    let portfolio_longevity = portfolio_longevity(
        projected_value,
        first_withdrawal,
        input.inflation_rate,
        input.post_retirement_return,
    );

    log::debug!(
        "plan recomputed: needed={:.2} projected={:.2} gap={:.2} longevity={}",
        scenarios.base.portfolio_needed,
        projected_value,
        base_gap.gap,
        portfolio_longevity
    );

    Ok(PlanReport {
        scenarios,
        projected_value,
        base_gap,
        conservative_gap,
        years_to_retirement,
        years_in_retirement,
        total_contributions: input.initial_investment
            + input.annual_contribution * years_to_retirement as f64,
        contributions_future_value: future_value(
            0.0,
            input.annual_contribution,
            input.pre_retirement_return,
            years_to_retirement,
        ),
        after_tax_income: input.desired_annual_income,
        pre_tax_income: scenarios.base.pre_tax_income,
        withdrawal_schedule,
        withdrawal_rate: withdrawal_rate(projected_value, first_withdrawal),
        portfolio_longevity,
        longevity_indefinite: is_indefinite(portfolio_longevity),
        real_return: real_return(input.post_retirement_return, input.inflation_rate),
        break_even_return: input.inflation_rate,
    })
}

fn need_for_inflation(
    input: &ProjectionInput,
    inflation_rate: f64,
) -> Result<RetirementNeed, ProjectionError> {
    retirement_need(
        input.desired_annual_income,
        input.tax_rate,
        inflation_rate,
        input.years_to_retirement(),
        input.years_in_retirement(),
        input.post_retirement_return,
    )
}

fn analyze_gap(
    input: &ProjectionInput,
    projected_value: f64,
    need: &RetirementNeed,
) -> Result<GapAnalysis, ProjectionError> {
    let years = input.years_to_retirement();
    let gap = need.portfolio_needed - projected_value;
    let additional = additional_annual_contribution(gap, input.pre_retirement_return, years)?;

    // An empty starting pot with no contributions has no return that helps;
    // the report carries `None` instead of failing the whole plan.
    let solved = match required_return(
        input.initial_investment,
        input.annual_contribution,
        need.portfolio_needed,
        years,
    ) {
        Ok(solution) => Some(solution),
        Err(err) => {
            log::debug!("required return unavailable: {err}");
            None
        }
    };

    Ok(GapAnalysis {
        projected_value,
        gap,
        required_return: solved,
        additional_annual_contribution: additional,
    })
}
