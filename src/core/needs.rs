use super::error::ProjectionError;
use super::growth::growth_factor;
use super::types::RetirementNeed;

/// Below this gap between discount and growth rate the growing annuity is
/// valued as level payments over the horizon.
pub const DEGENERATE_RATE_EPS: f64 = 1e-4;

pub fn retirement_need(
    desired_after_tax_income: f64,
    tax_rate_percent: f64,
    inflation_rate_percent: f64,
    years_to_retirement: u32,
    years_in_retirement: u32,
    post_retirement_return_percent: f64,
) -> Result<RetirementNeed, ProjectionError> {
    if !tax_rate_percent.is_finite() || !(0.0..100.0).contains(&tax_rate_percent) {
        return Err(ProjectionError::InvalidTaxRate(tax_rate_percent));
    }

    let pre_tax_income = desired_after_tax_income / (1.0 - tax_rate_percent / 100.0);
    let g = inflation_rate_percent / 100.0;
    let r = post_retirement_return_percent / 100.0;
    let income_at_retirement = pre_tax_income * growth_factor(g, years_to_retirement);

    let portfolio_needed = if (r - g).abs() < DEGENERATE_RATE_EPS {
        income_at_retirement * years_in_retirement as f64
    } else {
        let ratio = ((1.0 + g) / (1.0 + r)).powf(years_in_retirement as f64);
        income_at_retirement * (1.0 - ratio) / (r - g)
    };

    Ok(RetirementNeed {
        pre_tax_income,
        income_at_retirement,
        portfolio_needed: portfolio_needed.max(0.0),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, proptest};

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    #[test]
    fn oracle_reference_scenario_uses_growing_annuity_branch() {
        let need = retirement_need(100_000.0, 22.0, 2.7, 21, 40, 5.0).expect("valid inputs");

        assert_approx_tol(need.pre_tax_income, 128_205.13, 0.01);
        assert_approx_tol(need.income_at_retirement, 224_328.634_538, 1e-3);

        let g: f64 = 0.027;
        let r: f64 = 0.05;
        let expected =
            need.income_at_retirement * (1.0 - ((1.0 + g) / (1.0 + r)).powi(40)) / (r - g);
        assert_approx_tol(need.portfolio_needed, expected, 1e-6);
        assert_approx_tol(need.portfolio_needed, 5_731_783.836_856, 1e-2);
    }

    #[test]
    fn equal_rates_use_level_payment_branch() {
        let need = retirement_need(60_000.0, 0.0, 3.0, 0, 25, 3.0).expect("valid inputs");
        assert_approx_tol(need.portfolio_needed, 60_000.0 * 25.0, 1e-9);
    }

    #[test]
    fn degenerate_branch_has_no_jump_just_inside_epsilon() {
        let exact = retirement_need(80_000.0, 20.0, 3.0, 15, 30, 3.0).expect("valid inputs");
        let above = retirement_need(80_000.0, 20.0, 3.0, 15, 30, 3.00001).expect("valid inputs");
        let below = retirement_need(80_000.0, 20.0, 3.0, 15, 30, 2.99999).expect("valid inputs");

        let tol = exact.portfolio_needed * 1e-9;
        assert_approx_tol(above.portfolio_needed, exact.portfolio_needed, tol);
        assert_approx_tol(below.portfolio_needed, exact.portfolio_needed, tol);
    }

    #[test]
    fn zero_tax_keeps_income_unchanged() {
        let need = retirement_need(50_000.0, 0.0, 0.0, 10, 20, 4.0).expect("valid inputs");
        assert_approx_tol(need.pre_tax_income, 50_000.0, 1e-9);
        assert_approx_tol(need.income_at_retirement, 50_000.0, 1e-9);
    }

    #[test]
    fn rejects_full_tax_rate() {
        let err = retirement_need(50_000.0, 100.0, 2.0, 10, 20, 4.0).expect_err("must reject");
        assert_eq!(err, ProjectionError::InvalidTaxRate(100.0));
    }

    #[test]
    fn rejects_negative_tax_rate() {
        assert!(retirement_need(50_000.0, -1.0, 2.0, 10, 20, 4.0).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_portfolio_needed_is_finite_and_non_negative(
            income in 0.0f64..500_000.0,
            tax in 0.0f64..60.0,
            inflation in -2.0f64..10.0,
            post_return in -2.0f64..12.0,
            years_to in 0u32..50,
            years_in in 0u32..60,
        ) {
            let need = retirement_need(income, tax, inflation, years_to, years_in, post_return)
                .expect("valid inputs");
            prop_assert!(need.portfolio_needed.is_finite());
            prop_assert!(need.portfolio_needed >= 0.0);
            prop_assert!(need.pre_tax_income >= income);
        }

        #[test]
        fn prop_longer_retirement_needs_more(
            income in 1_000.0f64..200_000.0,
            inflation in 0.0f64..6.0,
            post_return in 0.0f64..10.0,
            years_in in 1u32..50,
        ) {
            let shorter = retirement_need(income, 20.0, inflation, 10, years_in, post_return)
                .expect("valid inputs");
            let longer = retirement_need(income, 20.0, inflation, 10, years_in + 1, post_return)
                .expect("valid inputs");
            prop_assert!(longer.portfolio_needed >= shorter.portfolio_needed);
        }
    }
}
