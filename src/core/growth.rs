use super::error::ProjectionError;

/// Below this rate the annuity factor and its derivative are summed term by
/// term; the closed forms cancel catastrophically as r approaches 0.
pub(crate) const SMALL_RATE: f64 = 1e-4;

pub(crate) fn growth_factor(rate: f64, years: u32) -> f64 {
    (1.0 + rate).powf(years as f64)
}

// Sum of (1+r)^k and of k(1+r)^(k-1) for k in 0..n.
fn small_rate_sums(rate: f64, years: u32) -> (f64, f64) {
    let growth = 1.0 + rate;
    let mut power = 1.0;
    let mut previous = 0.0;
    let mut factor = 0.0;
    let mut derivative = 0.0;
    for k in 0..years {
        factor += power;
        derivative += k as f64 * previous;
        previous = power;
        power *= growth;
    }
    (factor, derivative)
}

/// `((1+r)^n - 1) / r`, which is `n` at r = 0.
pub(crate) fn annuity_factor(rate: f64, years: u32) -> f64 {
    if rate.abs() < SMALL_RATE {
        return small_rate_sums(rate, years).0;
    }
    (growth_factor(rate, years) - 1.0) / rate
}

/// d/dr of the annuity factor, which is `n(n-1)/2` at r = 0.
pub(crate) fn annuity_factor_derivative(rate: f64, years: u32) -> f64 {
    if rate.abs() < SMALL_RATE {
        return small_rate_sums(rate, years).1;
    }
    let n = years as f64;
    (n * (1.0 + rate).powf(n - 1.0) * rate - (growth_factor(rate, years) - 1.0)) / (rate * rate)
}

pub fn future_value(
    initial: f64,
    annual_contribution: f64,
    annual_rate_percent: f64,
    years: u32,
) -> f64 {
    let r = annual_rate_percent / 100.0;
    let from_initial = initial * growth_factor(r, years);
    if annual_contribution == 0.0 {
        return from_initial;
    }
    from_initial + annual_contribution * annuity_factor(r, years)
}

pub fn additional_annual_contribution(
    gap: f64,
    annual_rate_percent: f64,
    years: u32,
) -> Result<f64, ProjectionError> {
    if years == 0 {
        return Err(ProjectionError::EmptyHorizon);
    }
    if gap <= 0.0 {
        return Ok(0.0);
    }
    let per_unit = future_value(0.0, 1.0, annual_rate_percent, years);
    Ok(gap / per_unit)
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
    fn oracle_future_value_matches_reference_scenario() {
        // 50000 * 1.096^21 + 10000 * (1.096^21 - 1) / 0.096
        let value = future_value(50_000.0, 10_000.0, 9.6, 21);
        assert_approx_tol(value, 952_680.334_626_986, 1e-4);
    }

    #[test]
    fn compound_path_matches_hand_calculation() {
        // ((100*1.1+10)*1.1+10)*1.1+10 = 166.2
        assert_approx_tol(future_value(100.0, 10.0, 10.0, 3), 166.2, 1e-9);
    }

    #[test]
    fn zero_rate_with_contributions_is_linear() {
        assert_approx_tol(future_value(1_000.0, 250.0, 0.0, 8), 3_000.0, 1e-9);
    }

    #[test]
    fn zero_contribution_only_compounds_initial() {
        assert_approx_tol(future_value(1_000.0, 0.0, 0.0, 30), 1_000.0, 1e-9);
        assert_approx_tol(future_value(1_000.0, 0.0, 5.0, 2), 1_102.5, 1e-9);
    }

    #[test]
    fn annuity_derivative_stays_accurate_near_zero_rate() {
        // n(n-1)/2 + n(n-1)(n-2)/6 * r for n = 40
        for &rate in &[1e-6, 1e-8, 1e-10, 1e-11, -1e-9] {
            let expected = 780.0 + 9_880.0 * rate;
            assert_approx_tol(annuity_factor_derivative(rate, 40), expected, 1e-3);
        }
        assert_approx_tol(annuity_factor_derivative(0.0, 10), 45.0, 1e-12);
    }

    #[test]
    fn annuity_terms_are_continuous_across_small_rate_cutoff() {
        let below = SMALL_RATE * (1.0 - 1e-9);
        let above = SMALL_RATE * (1.0 + 1e-9);
        for years in [1u32, 10, 40, 90] {
            let (lo, hi) = (annuity_factor(below, years), annuity_factor(above, years));
            assert_approx_tol(lo, hi, hi.abs() * 1e-9);
            let (lo, hi) = (
                annuity_factor_derivative(below, years),
                annuity_factor_derivative(above, years),
            );
            assert_approx_tol(lo, hi, hi.abs().max(1.0) * 1e-6);
        }
    }

    #[test]
    fn zero_years_returns_initial() {
        assert_approx_tol(future_value(5_000.0, 1_000.0, 7.0, 0), 5_000.0, 1e-9);
    }

    #[test]
    fn additional_contribution_closes_gap() {
        let extra = additional_annual_contribution(100_000.0, 9.6, 21).expect("valid horizon");
        assert_approx_tol(future_value(0.0, extra, 9.6, 21), 100_000.0, 1e-6);
    }

    #[test]
    fn additional_contribution_at_zero_rate_spreads_gap_evenly() {
        let extra = additional_annual_contribution(10_000.0, 0.0, 4).expect("valid horizon");
        assert_approx_tol(extra, 2_500.0, 1e-9);
    }

    #[test]
    fn additional_contribution_is_zero_for_surplus() {
        let extra = additional_annual_contribution(-5_000.0, 6.0, 10).expect("valid horizon");
        assert_eq!(extra, 0.0);
    }

    #[test]
    fn additional_contribution_rejects_empty_horizon() {
        assert_eq!(
            additional_annual_contribution(1_000.0, 6.0, 0),
            Err(ProjectionError::EmptyHorizon)
        );
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(64))]

        #[test]
        fn prop_non_negative_rate_never_loses_initial(
            initial in 0.0f64..5_000_000.0,
            contribution in 0.0f64..100_000.0,
            rate in 0.0f64..25.0,
            years in 0u32..80,
        ) {
            let value = future_value(initial, contribution, rate, years);
            prop_assert!(value.is_finite());
            prop_assert!(value >= initial);
        }

        #[test]
        fn prop_higher_rate_never_reduces_value(
            initial in 0.0f64..1_000_000.0,
            contribution in 0.0f64..50_000.0,
            rate in -5.0f64..20.0,
            bump in 0.0f64..5.0,
            years in 1u32..60,
        ) {
            let low = future_value(initial, contribution, rate, years);
            let high = future_value(initial, contribution, rate + bump, years);
            prop_assert!(high + 1e-6 * low.abs().max(1.0) >= low);
        }
    }
}
