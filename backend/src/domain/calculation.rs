//! Pure calculation engine for the rolling daily budget.
//!
//! Every function here is deterministic and free of I/O. Monetary results
//! are rounded to two decimal places (half away from zero) so that stored
//! values match what the user sees.

use chrono::{Datelike, Duration, NaiveDate};
use shared::{BudgetStatusLevel, CarryOverMode, DerivedBudgets};

/// Date format used everywhere a date is persisted or crosses the API.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Round a monetary value to two decimal places, half away from zero.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// How much may be spent today: the daily base adjusted by spreading the
/// cycle's accumulated balance evenly across the remaining days, so a
/// single large deviation never lands entirely on the next day.
///
/// With no days remaining the balance has nowhere to spread and the base
/// is returned untouched.
pub fn available_budget(daily_base: f64, accumulated_balance: f64, remaining_days: i64) -> f64 {
    if remaining_days <= 0 {
        return daily_base;
    }
    round2(daily_base + accumulated_balance / remaining_days as f64)
}

/// What is left of today's budget. Positive = saved, negative = overspent.
pub fn daily_balance(available_budget: f64, total_spent: f64) -> f64 {
    round2(available_budget - total_spent)
}

/// Days left in the cycle, counting the current day itself. Never less
/// than 1, even when `current` has already passed `cycle_end`.
pub fn remaining_days(current: NaiveDate, cycle_end: NaiveDate) -> i64 {
    ((cycle_end - current).num_days() + 1).max(1)
}

/// The 7-day window containing `reference`: start is the most recent date
/// (reference included) whose weekday equals `week_start_day`
/// (0 = Sunday .. 6 = Saturday), end is six days later.
pub fn week_cycle_dates(reference: NaiveDate, week_start_day: u8) -> (NaiveDate, NaiveDate) {
    let weekday = reference.weekday().num_days_from_sunday() as i64;
    let offset = (weekday - week_start_day as i64).rem_euclid(7);
    let start = reference - Duration::days(offset);
    (start, start + Duration::days(6))
}

/// Classify today's available budget against the configured daily base.
pub fn budget_status(available_budget: f64, daily_base: f64) -> BudgetStatusLevel {
    if daily_base <= 0.0 {
        return BudgetStatusLevel::AtBase;
    }
    let ratio = available_budget / daily_base;
    if ratio < 0.5 {
        BudgetStatusLevel::Critical
    } else if ratio < 1.0 {
        BudgetStatusLevel::BelowBase
    } else if ratio > 1.0 {
        BudgetStatusLevel::AboveBase
    } else {
        BudgetStatusLevel::AtBase
    }
}

/// Project the daily base onto display periods. With a concrete month
/// (1-12) and year the monthly figure uses that month's true length;
/// otherwise a 30-day month is assumed. A supplied leap year yields a
/// 366-day yearly figure.
pub fn derived_budgets(daily_base: f64, month: Option<u32>, year: Option<i32>) -> DerivedBudgets {
    let monthly_days = match (month, year) {
        (Some(m), Some(y)) => days_in_month(y, m).unwrap_or(30),
        _ => 30,
    };
    let yearly_days = match year {
        Some(y) if is_leap_year(y) => 366,
        _ => 365,
    };
    DerivedBudgets {
        daily: round2(daily_base),
        weekly: round2(daily_base * 7.0),
        monthly: round2(daily_base * monthly_days as f64),
        yearly: round2(daily_base * yearly_days as f64),
    }
}

/// Resolve what part of a cycle's ending balance seeds its successor.
pub fn carry_over_balance(accumulated_balance: f64, mode: CarryOverMode) -> f64 {
    match mode {
        CarryOverMode::Reset => 0.0,
        CarryOverMode::CarryAll => accumulated_balance,
        CarryOverMode::CarryDeficit => accumulated_balance.min(0.0),
        CarryOverMode::CarryCredit => accumulated_balance.max(0.0),
    }
}

/// Number of days in the given month, or None for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> Option<i64> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next - first).num_days())
}

pub fn is_leap_year(year: i32) -> bool {
    NaiveDate::from_ymd_opt(year, 2, 29).is_some()
}

/// Format a date for storage or the wire (`YYYY-MM-DD`).
pub fn format_date_to_string(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a stored `YYYY-MM-DD` date. Inverse of [`format_date_to_string`]
/// at day granularity.
pub fn parse_date_string(s: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn available_budget_returns_base_when_no_days_remain() {
        assert_eq!(available_budget(100.0, 500.0, 0), 100.0);
        assert_eq!(available_budget(100.0, -500.0, -3), 100.0);
    }

    #[test]
    fn available_budget_spreads_balance_over_remaining_days() {
        assert_eq!(available_budget(100.0, 20.0, 6), 103.33);
        assert_eq!(available_budget(100.0, 25.0, 1), 125.0);
        assert_eq!(available_budget(100.0, -100.0, 6), 83.33);
    }

    #[test]
    fn daily_balance_signs() {
        assert_eq!(daily_balance(100.0, 80.0), 20.0);
        assert_eq!(daily_balance(100.0, 120.0), -20.0);
        assert_eq!(daily_balance(100.0, 100.0), 0.0);
    }

    #[test]
    fn remaining_days_counts_today() {
        let end = date(2025, 3, 9);
        assert_eq!(remaining_days(date(2025, 3, 3), end), 7);
        assert_eq!(remaining_days(date(2025, 3, 9), end), 1);
    }

    #[test]
    fn remaining_days_clamps_to_one_past_cycle_end() {
        assert_eq!(remaining_days(date(2025, 3, 12), date(2025, 3, 9)), 1);
    }

    #[test]
    fn week_cycle_dates_aligns_to_start_day() {
        // 2025-03-05 is a Wednesday; Monday start pulls back to 2025-03-03
        let (start, end) = week_cycle_dates(date(2025, 3, 5), 1);
        assert_eq!(start, date(2025, 3, 3));
        assert_eq!(end, date(2025, 3, 9));

        // A reference already on the start day stays put
        let (start, end) = week_cycle_dates(date(2025, 3, 3), 1);
        assert_eq!(start, date(2025, 3, 3));
        assert_eq!(end, date(2025, 3, 9));
    }

    #[test]
    fn week_cycle_dates_crosses_year_boundary() {
        // 2024-12-30 is a Monday; a Monday-start week runs into January
        let (start, end) = week_cycle_dates(date(2024, 12, 30), 1);
        assert_eq!(start, date(2024, 12, 30));
        assert_eq!(end, date(2025, 1, 5));

        // Mid-window reference on Jan 2 resolves to the same window
        let (start, end) = week_cycle_dates(date(2025, 1, 2), 1);
        assert_eq!(start, date(2024, 12, 30));
        assert_eq!(end, date(2025, 1, 5));
    }

    #[test]
    fn week_cycle_dates_sunday_start() {
        // 2025-03-05 is a Wednesday; Sunday start pulls back to 2025-03-02
        let (start, end) = week_cycle_dates(date(2025, 3, 5), 0);
        assert_eq!(start, date(2025, 3, 2));
        assert_eq!(end, date(2025, 3, 8));
    }

    #[test]
    fn budget_status_classification() {
        assert_eq!(budget_status(40.0, 100.0), BudgetStatusLevel::Critical);
        assert_eq!(budget_status(80.0, 100.0), BudgetStatusLevel::BelowBase);
        assert_eq!(budget_status(100.0, 100.0), BudgetStatusLevel::AtBase);
        assert_eq!(budget_status(130.0, 100.0), BudgetStatusLevel::AboveBase);
    }

    #[test]
    fn budget_status_boundaries() {
        // exactly half the base is below-base, not critical
        assert_eq!(budget_status(50.0, 100.0), BudgetStatusLevel::BelowBase);
        // a zero or negative base always reads as at-base
        assert_eq!(budget_status(50.0, 0.0), BudgetStatusLevel::AtBase);
        assert_eq!(budget_status(50.0, -10.0), BudgetStatusLevel::AtBase);
    }

    #[test]
    fn derived_budgets_defaults() {
        let d = derived_budgets(100.0, None, None);
        assert_eq!(d.daily, 100.0);
        assert_eq!(d.weekly, 700.0);
        assert_eq!(d.monthly, 3000.0);
        assert_eq!(d.yearly, 36500.0);
    }

    #[test]
    fn derived_budgets_respects_month_length_and_leap_years() {
        let leap = derived_budgets(100.0, Some(2), Some(2024));
        assert_eq!(leap.monthly, 2900.0);
        assert_eq!(leap.yearly, 36600.0);

        let common = derived_budgets(100.0, Some(2), Some(2023));
        assert_eq!(common.monthly, 2800.0);
        assert_eq!(common.yearly, 36500.0);
    }

    #[test]
    fn carry_over_table() {
        for balance in [35.5, -42.0, 0.0] {
            assert_eq!(carry_over_balance(balance, CarryOverMode::Reset), 0.0);
            assert_eq!(carry_over_balance(balance, CarryOverMode::CarryAll), balance);
        }
        assert_eq!(carry_over_balance(35.5, CarryOverMode::CarryDeficit), 0.0);
        assert_eq!(carry_over_balance(-42.0, CarryOverMode::CarryDeficit), -42.0);
        assert_eq!(carry_over_balance(35.5, CarryOverMode::CarryCredit), 35.5);
        assert_eq!(carry_over_balance(-42.0, CarryOverMode::CarryCredit), 0.0);
    }

    #[test]
    fn date_strings_round_trip() {
        for d in [date(2024, 2, 29), date(2024, 12, 31), date(2025, 1, 1)] {
            let s = format_date_to_string(d);
            assert_eq!(parse_date_string(&s).unwrap(), d);
        }
        assert!(parse_date_string("not-a-date").is_err());
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        // 0.625 and 0.125 are exact in binary, so the half is a true half
        assert_eq!(round2(0.625), 0.63);
        assert_eq!(round2(-0.625), -0.63);
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(103.333333), 103.33);
    }
}
