//! SQLite repository for budget configurations.

use async_trait::async_trait;
use shared::CarryOverMode;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::models::BudgetConfig;
use crate::storage::error::StorageError;
use crate::storage::traits::BudgetConfigStorage;

use super::connection::{map_read_err, map_write_err, DbConnection};

#[derive(Clone)]
pub struct ConfigRepository {
    connection: DbConnection,
}

impl ConfigRepository {
    pub fn new(connection: DbConnection) -> Self {
        Self { connection }
    }

    fn row_to_config(row: &SqliteRow) -> Result<BudgetConfig, StorageError> {
        let mode_str: String = row.get("carry_over_mode");
        let carry_over_mode = CarryOverMode::parse(&mode_str).ok_or_else(|| {
            StorageError::backend(
                "decoding budget config",
                anyhow::anyhow!("unknown carry_over_mode '{}'", mode_str),
            )
        })?;
        let week_start_day: i64 = row.get("week_start_day");

        Ok(BudgetConfig {
            id: row.get("id"),
            account_id: row.get("account_id"),
            daily_base: row.get("daily_base"),
            week_start_day: week_start_day as u8,
            carry_over_mode,
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl BudgetConfigStorage for ConfigRepository {
    async fn store_config(&self, config: &BudgetConfig) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO budget_configs
                (id, account_id, daily_base, week_start_day, carry_over_mode, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&config.id)
        .bind(&config.account_id)
        .bind(config.daily_base)
        .bind(config.week_start_day as i64)
        .bind(config.carry_over_mode.to_string())
        .bind(&config.created_at)
        .bind(&config.updated_at)
        .execute(self.connection.pool())
        .await
        .map_err(|e| map_write_err("storing budget config", "budget_configs.account_id", e))?;

        Ok(())
    }

    async fn get_config(&self, account_id: &str) -> Result<Option<BudgetConfig>, StorageError> {
        let row = sqlx::query("SELECT * FROM budget_configs WHERE account_id = ?")
            .bind(account_id)
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| map_read_err("fetching budget config", e))?;

        row.as_ref().map(Self::row_to_config).transpose()
    }

    async fn update_config(&self, config: &BudgetConfig) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            UPDATE budget_configs
            SET daily_base = ?, week_start_day = ?, carry_over_mode = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(config.daily_base)
        .bind(config.week_start_day as i64)
        .bind(config.carry_over_mode.to_string())
        .bind(&config.updated_at)
        .bind(&config.id)
        .execute(self.connection.pool())
        .await
        .map_err(|e| map_write_err("updating budget config", "budget_configs.id", e))?;

        Ok(())
    }
}
