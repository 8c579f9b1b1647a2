//! Domain models for the rolling budget engine.

pub mod budget_config;
pub mod daily_record;
pub mod expense;
pub mod week_cycle;

pub use budget_config::BudgetConfig;
pub use daily_record::DailyRecord;
pub use expense::BudgetExpense;
pub use week_cycle::{CycleStatus, WeekCycle};
