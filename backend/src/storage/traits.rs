//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer. The
//! contract the engine depends on: point lookups return `Option` (absence
//! is a normal state, not an error), and inserts surface a distinguishable
//! [`StorageError::DuplicateKey`] so creation races can be resolved by
//! re-reading the winner's row.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::models::{BudgetConfig, BudgetExpense, CycleStatus, DailyRecord, WeekCycle};
use crate::storage::error::StorageError;

/// Storage operations for per-account budget configuration.
#[async_trait]
pub trait BudgetConfigStorage: Send + Sync {
    /// Store a new config. Duplicate account_id surfaces as DuplicateKey.
    async fn store_config(&self, config: &BudgetConfig) -> Result<(), StorageError>;

    /// Retrieve the config for an account, if any.
    async fn get_config(&self, account_id: &str) -> Result<Option<BudgetConfig>, StorageError>;

    /// Update an existing config in place.
    async fn update_config(&self, config: &BudgetConfig) -> Result<(), StorageError>;
}

/// Storage operations for weekly cycles.
#[async_trait]
pub trait CycleStorage: Send + Sync {
    /// Insert a new cycle. A concurrent insert of the same
    /// `(account_id, start_date, end_date)` window surfaces as DuplicateKey.
    async fn store_cycle(&self, cycle: &WeekCycle) -> Result<(), StorageError>;

    /// Point lookup by cycle ID.
    async fn get_cycle(&self, cycle_id: &str) -> Result<Option<WeekCycle>, StorageError>;

    /// The account's active cycle regardless of date, if any.
    /// The schema guarantees at most one.
    async fn get_active_cycle(&self, account_id: &str)
        -> Result<Option<WeekCycle>, StorageError>;

    /// The account's active cycle whose window contains `reference`, if any.
    async fn get_active_cycle_containing(
        &self,
        account_id: &str,
        reference: NaiveDate,
    ) -> Result<Option<WeekCycle>, StorageError>;

    /// Lookup by the unique `(account_id, start_date, end_date)` window,
    /// used to adopt the winner's row after a lost creation race.
    async fn get_cycle_by_window(
        &self,
        account_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<WeekCycle>, StorageError>;

    /// Transition a cycle's lifecycle status.
    async fn set_cycle_status(
        &self,
        cycle_id: &str,
        status: CycleStatus,
    ) -> Result<(), StorageError>;

    /// Write back a recomputed accumulated balance.
    async fn update_accumulated_balance(
        &self,
        cycle_id: &str,
        accumulated_balance: f64,
    ) -> Result<(), StorageError>;
}

/// Storage operations for daily budget records.
#[async_trait]
pub trait DailyRecordStorage: Send + Sync {
    /// Insert a new record. A concurrent insert for the same
    /// `(account_id, record_date)` surfaces as DuplicateKey.
    async fn store_record(&self, record: &DailyRecord) -> Result<(), StorageError>;

    /// Point lookup by record ID.
    async fn get_record(&self, record_id: &str) -> Result<Option<DailyRecord>, StorageError>;

    /// Lookup by the unique `(account_id, record_date)` pair.
    async fn get_record_by_date(
        &self,
        account_id: &str,
        record_date: NaiveDate,
    ) -> Result<Option<DailyRecord>, StorageError>;

    /// All records of a cycle, ordered by record_date ascending.
    async fn get_records_for_cycle(
        &self,
        cycle_id: &str,
    ) -> Result<Vec<DailyRecord>, StorageError>;

    /// Persist a new spent total and the daily balance derived from it.
    /// `available_budget` is immutable and deliberately not updatable.
    async fn update_spent(
        &self,
        record_id: &str,
        total_spent: f64,
        daily_balance: f64,
    ) -> Result<(), StorageError>;
}

/// Storage operations for individual expenses. The engine only consumes
/// expenses in aggregate.
#[async_trait]
pub trait ExpenseStorage: Send + Sync {
    /// Store a new expense entry.
    async fn store_expense(&self, expense: &BudgetExpense) -> Result<(), StorageError>;

    /// Point lookup by expense ID.
    async fn get_expense(&self, expense_id: &str)
        -> Result<Option<BudgetExpense>, StorageError>;

    /// Delete an expense. Returns true if a row was removed.
    async fn delete_expense(&self, expense_id: &str) -> Result<bool, StorageError>;

    /// Sum of all expense amounts attached to a daily record.
    async fn sum_expenses_for_record(
        &self,
        daily_record_id: &str,
    ) -> Result<f64, StorageError>;
}

/// Trait defining the interface for storage connections.
///
/// Abstracts away the concrete connection type and provides factory methods
/// for creating repositories, so the domain services can be generic over
/// the storage backend.
pub trait Connection: Send + Sync + Clone + 'static {
    type ConfigRepository: BudgetConfigStorage + Clone;
    type CycleRepository: CycleStorage + Clone;
    type DailyRecordRepository: DailyRecordStorage + Clone;
    type ExpenseRepository: ExpenseStorage + Clone;

    fn create_config_repository(&self) -> Self::ConfigRepository;
    fn create_cycle_repository(&self) -> Self::CycleRepository;
    fn create_daily_record_repository(&self) -> Self::DailyRecordRepository;
    fn create_expense_repository(&self) -> Self::ExpenseRepository;
}
