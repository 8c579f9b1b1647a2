//! Input validation for budget mutations.
//!
//! These checks run before any write. A [`ValidationError`] carries the
//! message shown to the user and is always recoverable by correcting the
//! input; the REST layer maps it to a 400 instead of a generic failure.

use chrono::NaiveDate;

pub const MAX_DAILY_BASE: f64 = 100_000.0;
pub const MAX_EXPENSE_AMOUNT: f64 = 1_000_000.0;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("Daily base must be a positive amount of at most {MAX_DAILY_BASE}")]
    DailyBaseOutOfRange,

    #[error("Expense amount must be a positive amount of at most {MAX_EXPENSE_AMOUNT}")]
    ExpenseAmountOutOfRange,

    #[error("Expense date {date} is outside the current cycle ({cycle_start} to {cycle_end})")]
    ExpenseDateOutsideCycle {
        date: NaiveDate,
        cycle_start: NaiveDate,
        cycle_end: NaiveDate,
    },

    #[error("Week start day must be between 0 (Sunday) and 6 (Saturday), got {0}")]
    InvalidWeekStartDay(u8),
}

pub fn validate_daily_base(daily_base: f64) -> Result<(), ValidationError> {
    if !daily_base.is_finite() || daily_base <= 0.0 || daily_base > MAX_DAILY_BASE {
        return Err(ValidationError::DailyBaseOutOfRange);
    }
    Ok(())
}

pub fn validate_expense_amount(amount: f64) -> Result<(), ValidationError> {
    if !amount.is_finite() || amount <= 0.0 || amount > MAX_EXPENSE_AMOUNT {
        return Err(ValidationError::ExpenseAmountOutOfRange);
    }
    Ok(())
}

pub fn validate_expense_date(
    date: NaiveDate,
    cycle_start: NaiveDate,
    cycle_end: NaiveDate,
) -> Result<(), ValidationError> {
    if date < cycle_start || date > cycle_end {
        return Err(ValidationError::ExpenseDateOutsideCycle {
            date,
            cycle_start,
            cycle_end,
        });
    }
    Ok(())
}

pub fn validate_week_start_day(day: u8) -> Result<(), ValidationError> {
    if day > 6 {
        return Err(ValidationError::InvalidWeekStartDay(day));
    }
    Ok(())
}
