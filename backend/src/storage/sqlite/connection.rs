//! SQLite connection management.

use anyhow::Result;
use sqlx::{migrate::MigrateDatabase, Sqlite, SqlitePool};
use std::sync::Arc;

use crate::storage::error::StorageError;
use crate::storage::traits::Connection;

use super::{ConfigRepository, CycleRepository, DailyRecordRepository, ExpenseRepository};

// The database URL for the production database
const DATABASE_URL: &str = "sqlite:fluid_budget.db";

/// DbConnection manages database operations over a shared sqlx pool.
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;
        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Initialize the standard database
    pub async fn init() -> Result<Self> {
        Self::new(DATABASE_URL).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        // Shared-cache in-memory DB so every pooled connection sees the
        // same rows, which the concurrency tests depend on
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    /// Set up the required database schema.
    ///
    /// The unique constraints on `week_cycles` and `daily_records` are the
    /// engine's only concurrency-control mechanism; creation races are
    /// resolved by catching the violation and re-reading.
    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budget_configs (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL UNIQUE,
                daily_base REAL NOT NULL,
                week_start_day INTEGER NOT NULL,
                carry_over_mode TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS week_cycles (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                config_id TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT NOT NULL,
                initial_budget REAL NOT NULL,
                carried_balance REAL NOT NULL,
                accumulated_balance REAL NOT NULL,
                status TEXT NOT NULL,
                UNIQUE(account_id, start_date, end_date)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS daily_records (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                cycle_id TEXT NOT NULL REFERENCES week_cycles(id),
                record_date TEXT NOT NULL,
                base_budget REAL NOT NULL,
                available_budget REAL NOT NULL,
                total_spent REAL NOT NULL,
                daily_balance REAL NOT NULL,
                remaining_days INTEGER NOT NULL,
                UNIQUE(account_id, record_date)
            );
            "#,
        )
        .execute(pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS budget_expenses (
                id TEXT PRIMARY KEY,
                account_id TEXT NOT NULL,
                daily_record_id TEXT NOT NULL REFERENCES daily_records(id),
                amount REAL NOT NULL,
                description TEXT NOT NULL,
                expense_date TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Get the underlying SQLite pool
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

impl Connection for DbConnection {
    type ConfigRepository = ConfigRepository;
    type CycleRepository = CycleRepository;
    type DailyRecordRepository = DailyRecordRepository;
    type ExpenseRepository = ExpenseRepository;

    fn create_config_repository(&self) -> ConfigRepository {
        ConfigRepository::new(self.clone())
    }

    fn create_cycle_repository(&self) -> CycleRepository {
        CycleRepository::new(self.clone())
    }

    fn create_daily_record_repository(&self) -> DailyRecordRepository {
        DailyRecordRepository::new(self.clone())
    }

    fn create_expense_repository(&self) -> ExpenseRepository {
        ExpenseRepository::new(self.clone())
    }
}

/// Map a sqlx write error, turning a unique-constraint violation into the
/// DuplicateKey signal the domain layer resolves races with.
pub(super) fn map_write_err(
    operation: &'static str,
    constraint: &'static str,
    e: sqlx::Error,
) -> StorageError {
    match &e {
        sqlx::Error::Database(db)
            if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) =>
        {
            StorageError::DuplicateKey { constraint }
        }
        _ => StorageError::backend(operation, e),
    }
}

/// Map a sqlx read error. Reads never produce an expected conflict.
pub(super) fn map_read_err(operation: &'static str, e: sqlx::Error) -> StorageError {
    StorageError::backend(operation, e)
}
