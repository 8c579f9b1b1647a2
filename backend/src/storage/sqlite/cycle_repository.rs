//! SQLite repository for weekly cycles.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row};
use tracing::debug;

use crate::domain::calculation::{format_date_to_string, parse_date_string};
use crate::domain::models::{CycleStatus, WeekCycle};
use crate::storage::error::StorageError;
use crate::storage::traits::CycleStorage;

use super::connection::{map_read_err, map_write_err, DbConnection};

#[derive(Clone)]
pub struct CycleRepository {
    connection: DbConnection,
}

impl CycleRepository {
    pub fn new(connection: DbConnection) -> Self {
        Self { connection }
    }

    fn row_to_cycle(row: &SqliteRow) -> Result<WeekCycle, StorageError> {
        let decode = |what: &str, e: chrono::ParseError| {
            StorageError::backend(
                "decoding week cycle",
                anyhow::anyhow!("bad {} in week_cycles row: {}", what, e),
            )
        };
        let start_str: String = row.get("start_date");
        let end_str: String = row.get("end_date");
        let status_str: String = row.get("status");

        Ok(WeekCycle {
            id: row.get("id"),
            account_id: row.get("account_id"),
            config_id: row.get("config_id"),
            start_date: parse_date_string(&start_str).map_err(|e| decode("start_date", e))?,
            end_date: parse_date_string(&end_str).map_err(|e| decode("end_date", e))?,
            initial_budget: row.get("initial_budget"),
            carried_balance: row.get("carried_balance"),
            accumulated_balance: row.get("accumulated_balance"),
            status: CycleStatus::parse(&status_str).ok_or_else(|| {
                StorageError::backend(
                    "decoding week cycle",
                    anyhow::anyhow!("unknown cycle status '{}'", status_str),
                )
            })?,
        })
    }
}

#[async_trait]
impl CycleStorage for CycleRepository {
    async fn store_cycle(&self, cycle: &WeekCycle) -> Result<(), StorageError> {
        debug!(
            "Inserting cycle {} for {} ({} to {})",
            cycle.id, cycle.account_id, cycle.start_date, cycle.end_date
        );
        sqlx::query(
            r#"
            INSERT INTO week_cycles
                (id, account_id, config_id, start_date, end_date,
                 initial_budget, carried_balance, accumulated_balance, status)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&cycle.id)
        .bind(&cycle.account_id)
        .bind(&cycle.config_id)
        .bind(format_date_to_string(cycle.start_date))
        .bind(format_date_to_string(cycle.end_date))
        .bind(cycle.initial_budget)
        .bind(cycle.carried_balance)
        .bind(cycle.accumulated_balance)
        .bind(cycle.status.as_str())
        .execute(self.connection.pool())
        .await
        .map_err(|e| {
            map_write_err(
                "storing week cycle",
                "week_cycles(account_id, start_date, end_date)",
                e,
            )
        })?;

        Ok(())
    }

    async fn get_cycle(&self, cycle_id: &str) -> Result<Option<WeekCycle>, StorageError> {
        let row = sqlx::query("SELECT * FROM week_cycles WHERE id = ?")
            .bind(cycle_id)
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| map_read_err("fetching week cycle", e))?;

        row.as_ref().map(Self::row_to_cycle).transpose()
    }

    async fn get_active_cycle(
        &self,
        account_id: &str,
    ) -> Result<Option<WeekCycle>, StorageError> {
        let row =
            sqlx::query("SELECT * FROM week_cycles WHERE account_id = ? AND status = 'active'")
                .bind(account_id)
                .fetch_optional(self.connection.pool())
                .await
                .map_err(|e| map_read_err("fetching active cycle", e))?;

        row.as_ref().map(Self::row_to_cycle).transpose()
    }

    async fn get_active_cycle_containing(
        &self,
        account_id: &str,
        reference: NaiveDate,
    ) -> Result<Option<WeekCycle>, StorageError> {
        let reference = format_date_to_string(reference);
        let row = sqlx::query(
            r#"
            SELECT * FROM week_cycles
            WHERE account_id = ? AND status = 'active'
              AND start_date <= ? AND end_date >= ?
            "#,
        )
        .bind(account_id)
        .bind(&reference)
        .bind(&reference)
        .fetch_optional(self.connection.pool())
        .await
        .map_err(|e| map_read_err("fetching active cycle for date", e))?;

        row.as_ref().map(Self::row_to_cycle).transpose()
    }

    async fn get_cycle_by_window(
        &self,
        account_id: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Option<WeekCycle>, StorageError> {
        let row = sqlx::query(
            "SELECT * FROM week_cycles WHERE account_id = ? AND start_date = ? AND end_date = ?",
        )
        .bind(account_id)
        .bind(format_date_to_string(start_date))
        .bind(format_date_to_string(end_date))
        .fetch_optional(self.connection.pool())
        .await
        .map_err(|e| map_read_err("fetching cycle by window", e))?;

        row.as_ref().map(Self::row_to_cycle).transpose()
    }

    async fn set_cycle_status(
        &self,
        cycle_id: &str,
        status: CycleStatus,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE week_cycles SET status = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(cycle_id)
            .execute(self.connection.pool())
            .await
            .map_err(|e| map_write_err("updating cycle status", "week_cycles.id", e))?;

        Ok(())
    }

    async fn update_accumulated_balance(
        &self,
        cycle_id: &str,
        accumulated_balance: f64,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE week_cycles SET accumulated_balance = ? WHERE id = ?")
            .bind(accumulated_balance)
            .bind(cycle_id)
            .execute(self.connection.pool())
            .await
            .map_err(|e| map_write_err("updating accumulated balance", "week_cycles.id", e))?;

        Ok(())
    }
}
