//! Domain model for an individual budget expense.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single spend entry attached to a daily record. The engine only ever
/// consumes these in aggregate: a record's `total_spent` is the sum of its
/// expenses' amounts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetExpense {
    pub id: String,
    pub account_id: String,
    pub daily_record_id: String,
    /// Always positive
    pub amount: f64,
    pub description: String,
    pub expense_date: NaiveDate,
    /// RFC 3339 timestamp
    pub created_at: String,
}

impl BudgetExpense {
    /// Generate a unique expense ID.
    /// Format: expense::<uuid>
    pub fn generate_id() -> String {
        format!("expense::{}", Uuid::new_v4())
    }
}
