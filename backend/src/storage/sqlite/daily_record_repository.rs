//! SQLite repository for daily budget records.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::calculation::{format_date_to_string, parse_date_string};
use crate::domain::models::DailyRecord;
use crate::storage::error::StorageError;
use crate::storage::traits::DailyRecordStorage;

use super::connection::{map_read_err, map_write_err, DbConnection};

#[derive(Clone)]
pub struct DailyRecordRepository {
    connection: DbConnection,
}

impl DailyRecordRepository {
    pub fn new(connection: DbConnection) -> Self {
        Self { connection }
    }

    fn row_to_record(row: &SqliteRow) -> Result<DailyRecord, StorageError> {
        let date_str: String = row.get("record_date");
        let record_date = parse_date_string(&date_str).map_err(|e| {
            StorageError::backend(
                "decoding daily record",
                anyhow::anyhow!("bad record_date in daily_records row: {}", e),
            )
        })?;

        Ok(DailyRecord {
            id: row.get("id"),
            account_id: row.get("account_id"),
            cycle_id: row.get("cycle_id"),
            record_date,
            base_budget: row.get("base_budget"),
            available_budget: row.get("available_budget"),
            total_spent: row.get("total_spent"),
            daily_balance: row.get("daily_balance"),
            remaining_days: row.get("remaining_days"),
        })
    }
}

#[async_trait]
impl DailyRecordStorage for DailyRecordRepository {
    async fn store_record(&self, record: &DailyRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO daily_records
                (id, account_id, cycle_id, record_date, base_budget,
                 available_budget, total_spent, daily_balance, remaining_days)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&record.id)
        .bind(&record.account_id)
        .bind(&record.cycle_id)
        .bind(format_date_to_string(record.record_date))
        .bind(record.base_budget)
        .bind(record.available_budget)
        .bind(record.total_spent)
        .bind(record.daily_balance)
        .bind(record.remaining_days)
        .execute(self.connection.pool())
        .await
        .map_err(|e| {
            map_write_err(
                "storing daily record",
                "daily_records(account_id, record_date)",
                e,
            )
        })?;

        Ok(())
    }

    async fn get_record(&self, record_id: &str) -> Result<Option<DailyRecord>, StorageError> {
        let row = sqlx::query("SELECT * FROM daily_records WHERE id = ?")
            .bind(record_id)
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| map_read_err("fetching daily record", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn get_record_by_date(
        &self,
        account_id: &str,
        record_date: NaiveDate,
    ) -> Result<Option<DailyRecord>, StorageError> {
        let row =
            sqlx::query("SELECT * FROM daily_records WHERE account_id = ? AND record_date = ?")
                .bind(account_id)
                .bind(format_date_to_string(record_date))
                .fetch_optional(self.connection.pool())
                .await
                .map_err(|e| map_read_err("fetching daily record by date", e))?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn get_records_for_cycle(
        &self,
        cycle_id: &str,
    ) -> Result<Vec<DailyRecord>, StorageError> {
        let rows =
            sqlx::query("SELECT * FROM daily_records WHERE cycle_id = ? ORDER BY record_date ASC")
                .bind(cycle_id)
                .fetch_all(self.connection.pool())
                .await
                .map_err(|e| map_read_err("listing daily records for cycle", e))?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn update_spent(
        &self,
        record_id: &str,
        total_spent: f64,
        daily_balance: f64,
    ) -> Result<(), StorageError> {
        sqlx::query("UPDATE daily_records SET total_spent = ?, daily_balance = ? WHERE id = ?")
            .bind(total_spent)
            .bind(daily_balance)
            .bind(record_id)
            .execute(self.connection.pool())
            .await
            .map_err(|e| map_write_err("updating daily record spent", "daily_records.id", e))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::sqlite::test_utils::TestHelper;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_record(account_id: &str, cycle_id: &str, day: NaiveDate) -> DailyRecord {
        DailyRecord {
            id: DailyRecord::generate_id(),
            account_id: account_id.to_string(),
            cycle_id: cycle_id.to_string(),
            record_date: day,
            base_budget: 100.0,
            available_budget: 100.0,
            total_spent: 0.0,
            daily_balance: 100.0,
            remaining_days: 7,
        }
    }

    #[tokio::test]
    async fn store_and_fetch_by_date() {
        let helper = TestHelper::new().await.unwrap();
        let record = sample_record("account::1", "cycle::a", date(2025, 3, 3));
        helper.record_repo.store_record(&record).await.unwrap();

        let fetched = helper
            .record_repo
            .get_record_by_date("account::1", date(2025, 3, 3))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fetched, record);

        assert!(helper
            .record_repo
            .get_record_by_date("account::1", date(2025, 3, 4))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn one_record_per_account_per_date() {
        let helper = TestHelper::new().await.unwrap();
        let record = sample_record("account::1", "cycle::a", date(2025, 3, 3));
        helper.record_repo.store_record(&record).await.unwrap();

        let rival = sample_record("account::1", "cycle::a", date(2025, 3, 3));
        let err = helper.record_repo.store_record(&rival).await.unwrap_err();
        assert!(err.is_duplicate_key());

        // Another account may use the same date
        let other = sample_record("account::2", "cycle::b", date(2025, 3, 3));
        helper.record_repo.store_record(&other).await.unwrap();
    }

    #[tokio::test]
    async fn cycle_records_come_back_in_date_order() {
        let helper = TestHelper::new().await.unwrap();
        for day in [5, 3, 4] {
            let record = sample_record("account::1", "cycle::a", date(2025, 3, day));
            helper.record_repo.store_record(&record).await.unwrap();
        }

        let records = helper.record_repo.get_records_for_cycle("cycle::a").await.unwrap();
        let days: Vec<u32> = records.iter().map(|r| chrono::Datelike::day(&r.record_date)).collect();
        assert_eq!(days, vec![3, 4, 5]);
    }

    #[tokio::test]
    async fn update_spent_leaves_available_budget_alone() {
        let helper = TestHelper::new().await.unwrap();
        let record = sample_record("account::1", "cycle::a", date(2025, 3, 3));
        helper.record_repo.store_record(&record).await.unwrap();

        helper
            .record_repo
            .update_spent(&record.id, 35.0, 65.0)
            .await
            .unwrap();

        let fetched = helper.record_repo.get_record(&record.id).await.unwrap().unwrap();
        assert_eq!(fetched.total_spent, 35.0);
        assert_eq!(fetched.daily_balance, 65.0);
        assert_eq!(fetched.available_budget, 100.0);
    }
}
