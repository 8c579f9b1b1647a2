//! SQLite storage backend built on sqlx.

pub mod config_repository;
pub mod connection;
pub mod cycle_repository;
pub mod daily_record_repository;
pub mod expense_repository;

#[cfg(test)]
pub mod test_utils;

pub use config_repository::ConfigRepository;
pub use connection::DbConnection;
pub use cycle_repository::CycleRepository;
pub use daily_record_repository::DailyRecordRepository;
pub use expense_repository::ExpenseRepository;
