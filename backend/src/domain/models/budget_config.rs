//! Domain model for the per-account budget configuration.

use serde::{Deserialize, Serialize};
use shared::CarryOverMode;
use uuid::Uuid;

/// User-configured budgeting parameters. One active config per account;
/// mutating it never retroactively alters closed cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub id: String,
    pub account_id: String,
    /// Nominal amount allowed per day before redistribution
    pub daily_base: f64,
    /// Weekday the cycle window is anchored to, 0 = Sunday .. 6 = Saturday
    pub week_start_day: u8,
    pub carry_over_mode: CarryOverMode,
    /// RFC 3339 timestamps
    pub created_at: String,
    pub updated_at: String,
}

impl BudgetConfig {
    /// Generate a unique config ID.
    /// Format: config::<uuid>
    pub fn generate_id() -> String {
        format!("config::{}", Uuid::new_v4())
    }

    pub fn is_valid_week_start_day(day: u8) -> bool {
        day <= 6
    }
}
