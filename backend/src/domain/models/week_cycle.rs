//! Domain model for a weekly budgeting cycle.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a cycle row. At most one `Active` row exists per
/// account; a `Closed` row is final.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleStatus {
    Active,
    Closed,
}

impl CycleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleStatus::Active => "active",
            CycleStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(CycleStatus::Active),
            "closed" => Some(CycleStatus::Closed),
            _ => None,
        }
    }
}

/// A 7-day budgeting window. `start_date`/`end_date` are inclusive and
/// anchored to the config's week start day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekCycle {
    pub id: String,
    pub account_id: String,
    pub config_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// daily_base × 7 at creation time
    pub initial_budget: f64,
    /// Balance inherited from the previous cycle per the carry-over mode
    pub carried_balance: f64,
    /// carried_balance + Σ daily_balance over this cycle's records
    pub accumulated_balance: f64,
    pub status: CycleStatus,
}

impl WeekCycle {
    /// Generate a unique cycle ID.
    /// Format: cycle::<uuid>
    pub fn generate_id() -> String {
        format!("cycle::{}", Uuid::new_v4())
    }

    /// Returns true if the given date falls within this cycle's window.
    pub fn contains_date(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }

    /// Returns true once `today` has moved past the cycle's end date.
    pub fn has_expired(&self, today: NaiveDate) -> bool {
        today > self.end_date
    }

    pub fn is_active(&self) -> bool {
        self.status == CycleStatus::Active
    }
}
