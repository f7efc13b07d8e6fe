use super::types::WithdrawalPoint;

pub const SAMPLE_INTERVAL: u32 = 5;
// Reaching the longevity ceiling means the portfolio sustains itself.
pub const MAX_LONGEVITY_YEARS: u32 = 200;

#[derive(Debug, Clone, Copy)]
struct DrawdownState {
    balance: f64,
    withdrawal: f64,
}

enum YearOutcome {
    Survived { withdrawn: f64 },
    Depleted { withdrawn: f64 },
}

impl DrawdownState {
    // Withdraw at the start of the year, grow the rest, then index next year's withdrawal.
    fn advance(&mut self, growth: f64, inflation: f64) -> YearOutcome {
        let withdrawn = self.withdrawal;
        self.balance -= withdrawn;
        if self.balance <= 0.0 {
            self.balance = 0.0;
            return YearOutcome::Depleted { withdrawn };
        }
        self.balance *= growth;
        self.withdrawal *= inflation;
        YearOutcome::Survived { withdrawn }
    }
}

pub fn simulate_withdrawals(
    starting_portfolio: f64,
    first_year_withdrawal: f64,
    inflation_rate_percent: f64,
    return_rate_percent: f64,
    total_years: u32,
) -> Vec<WithdrawalPoint> {
    let growth = 1.0 + return_rate_percent / 100.0;
    let inflation = 1.0 + inflation_rate_percent / 100.0;
    let mut state = DrawdownState {
        balance: starting_portfolio,
        withdrawal: first_year_withdrawal,
    };

    let mut schedule = Vec::with_capacity((total_years / SAMPLE_INTERVAL) as usize + 2);
    schedule.push(WithdrawalPoint {
        year: 0,
        withdrawal_amount: first_year_withdrawal,
        balance: starting_portfolio,
        depleted: false,
    });

    let mut last_withdrawn = first_year_withdrawal;
    for year in 1..=total_years {
        match state.advance(growth, inflation) {
            YearOutcome::Depleted { withdrawn } => {
                schedule.push(WithdrawalPoint {
                    year,
                    withdrawal_amount: withdrawn,
                    balance: 0.0,
                    depleted: true,
                });
                return schedule;
            }
            YearOutcome::Survived { withdrawn } => {
                last_withdrawn = withdrawn;
                if year % SAMPLE_INTERVAL == 0 {
                    schedule.push(WithdrawalPoint {
                        year,
                        withdrawal_amount: withdrawn,
                        balance: state.balance,
                        depleted: false,
                    });
                }
            }
        }
    }

    if total_years % SAMPLE_INTERVAL != 0 {
        schedule.push(WithdrawalPoint {
            year: total_years,
            withdrawal_amount: last_withdrawn,
            balance: state.balance,
            depleted: false,
        });
    }

    schedule
}

pub fn portfolio_longevity(
    starting_portfolio: f64,
    first_year_withdrawal: f64,
    inflation_rate_percent: f64,
    return_rate_percent: f64,
) -> u32 {
    let growth = 1.0 + return_rate_percent / 100.0;
    let inflation = 1.0 + inflation_rate_percent / 100.0;
    let mut state = DrawdownState {
        balance: starting_portfolio,
        withdrawal: first_year_withdrawal,
    };

    let mut years = 0;
    while state.balance > 0.0 && years < MAX_LONGEVITY_YEARS {
        if let YearOutcome::Depleted { .. } = state.advance(growth, inflation) {
            break;
        }
        years += 1;
    }
    years
}

pub fn is_indefinite(longevity_years: u32) -> bool {
    longevity_years >= MAX_LONGEVITY_YEARS
}

pub fn withdrawal_rate(portfolio: f64, first_year_withdrawal: f64) -> Option<f64> {
    if portfolio <= 0.0 {
        return None;
    }
    Some(first_year_withdrawal / portfolio * 100.0)
}

pub fn real_return(nominal_percent: f64, inflation_percent: f64) -> f64 {
    ((1.0 + nominal_percent / 100.0) / (1.0 + inflation_percent / 100.0) - 1.0) * 100.0
}
