use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Policy controlling what part of a cycle's ending balance seeds the next cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CarryOverMode {
    /// Next cycle starts from zero regardless of outcome
    Reset,
    /// Full ending balance carries forward, positive or negative
    CarryAll,
    /// Only a negative ending balance carries forward (debt follows you)
    CarryDeficit,
    /// Only a positive ending balance carries forward (savings follow you)
    CarryCredit,
}

impl fmt::Display for CarryOverMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CarryOverMode::Reset => "reset",
            CarryOverMode::CarryAll => "carry_all",
            CarryOverMode::CarryDeficit => "carry_deficit",
            CarryOverMode::CarryCredit => "carry_credit",
        };
        write!(f, "{}", s)
    }
}

impl CarryOverMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "reset" => Some(CarryOverMode::Reset),
            "carry_all" => Some(CarryOverMode::CarryAll),
            "carry_deficit" => Some(CarryOverMode::CarryDeficit),
            "carry_credit" => Some(CarryOverMode::CarryCredit),
            _ => None,
        }
    }
}

/// How today's available budget compares to the configured daily base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatusLevel {
    /// Less than half the daily base remains
    Critical,
    BelowBase,
    AtBase,
    AboveBase,
}

/// Daily base projected onto larger display periods.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedBudgets {
    pub daily: f64,
    pub weekly: f64,
    pub monthly: f64,
    pub yearly: f64,
}

/// Budget configuration as exposed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfigDto {
    pub id: String,
    pub account_id: String,
    /// Nominal amount allowed per day before redistribution
    pub daily_base: f64,
    /// 0 = Sunday .. 6 = Saturday
    pub week_start_day: u8,
    pub carry_over_mode: CarryOverMode,
}

/// A weekly budgeting cycle as exposed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekCycleDto {
    pub id: String,
    pub account_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_budget: f64,
    pub carried_balance: f64,
    pub accumulated_balance: f64,
    pub status: String,
}

/// One day's budget record as exposed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecordDto {
    pub id: String,
    pub record_date: NaiveDate,
    pub base_budget: f64,
    pub available_budget: f64,
    pub total_spent: f64,
    pub daily_balance: f64,
    pub remaining_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateBudgetConfigRequest {
    pub daily_base: f64,
    /// 0 = Sunday .. 6 = Saturday
    pub week_start_day: u8,
    pub carry_over_mode: CarryOverMode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddExpenseRequest {
    pub amount: f64,
    pub description: String,
    /// Defaults to today when omitted
    pub expense_date: Option<NaiveDate>,
}

/// Everything the UI needs to render the "today" budget card.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TodayBudgetResponse {
    pub cycle: WeekCycleDto,
    pub record: DailyRecordDto,
    pub status: BudgetStatusLevel,
    pub derived: DerivedBudgets,
}

/// The active cycle plus all of its daily records, oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleOverviewResponse {
    pub cycle: WeekCycleDto,
    pub records: Vec<DailyRecordDto>,
}
