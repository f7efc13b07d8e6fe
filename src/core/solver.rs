use super::error::ProjectionError;
use super::growth::{annuity_factor, annuity_factor_derivative, growth_factor};
use super::types::ReturnSolution;

pub(crate) const INITIAL_GUESS: f64 = 0.08;
pub const MAX_ITERATIONS: u32 = 50;
// Step tolerance in fractional-rate units.
pub(crate) const STEP_TOLERANCE: f64 = 1e-4;

pub fn required_return(
    initial: f64,
    annual_contribution: f64,
    target_future_value: f64,
    years: u32,
) -> Result<ReturnSolution, ProjectionError> {
    if years == 0 {
        return Err(ProjectionError::EmptyHorizon);
    }
    for (name, value) in [
        ("initial", initial),
        ("annual_contribution", annual_contribution),
        ("target_future_value", target_future_value),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ProjectionError::InvalidAmount { name, value });
        }
    }

    if annual_contribution == 0.0 {
        if initial <= 0.0 {
            return Err(ProjectionError::NonPositiveInitial(initial));
        }
        let rate = (target_future_value / initial).powf(1.0 / years as f64) - 1.0;
        return Ok(ReturnSolution {
            rate_percent: rate * 100.0,
            converged: true,
            iterations: 0,
        });
    }

    Ok(newton_solve(
        initial,
        annual_contribution,
        target_future_value,
        years,
    ))
}

fn newton_solve(initial: f64, contribution: f64, target: f64, years: u32) -> ReturnSolution {
    let mut rate = INITIAL_GUESS;
    let mut converged = false;
    let mut iterations = 0;

    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let fv = initial * growth_factor(rate, years) + contribution * annuity_factor(rate, years);
        let dfv = initial * years as f64 * (1.0 + rate).powf(years as f64 - 1.0)
            + contribution * annuity_factor_derivative(rate, years);

        if !dfv.is_finite() || dfv.abs() <= f64::EPSILON * fv.abs().max(1.0) {
            break;
        }

        let next = rate - (fv - target) / dfv;
        if !next.is_finite() {
            break;
        }
        let step = (next - rate).abs();
        rate = next;
        if step < STEP_TOLERANCE {
            converged = true;
            break;
        }
    }

    if converged {
        log::debug!("required return solved at {rate:.6} after {iterations} iterations");
    } else {
        log::warn!(
            "required return did not converge after {iterations} iterations \
             (initial={initial}, contribution={contribution}, target={target}, years={years})"
        );
    }

    ReturnSolution {
        rate_percent: rate * 100.0,
        converged,
        iterations,
    }
}
