//! Domain model for a single day's budget record.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One row per account per calendar date. `available_budget` is computed
/// once at creation and never changes; `total_spent` and `daily_balance`
/// track expense mutations over the day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub id: String,
    pub account_id: String,
    pub cycle_id: String,
    pub record_date: NaiveDate,
    /// The config's daily base at creation time
    pub base_budget: f64,
    /// daily base plus the cycle balance spread over the remaining days
    pub available_budget: f64,
    pub total_spent: f64,
    /// available_budget − total_spent
    pub daily_balance: f64,
    /// Days left in the cycle at creation time, today inclusive
    pub remaining_days: i64,
}

impl DailyRecord {
    /// Generate a unique record ID.
    /// Format: record::<uuid>
    pub fn generate_id() -> String {
        format!("record::{}", Uuid::new_v4())
    }
}
