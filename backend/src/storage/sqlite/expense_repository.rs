//! SQLite repository for budget expenses.

use async_trait::async_trait;
use sqlx::{sqlite::SqliteRow, Row};

use crate::domain::calculation::{format_date_to_string, parse_date_string};
use crate::domain::models::BudgetExpense;
use crate::storage::error::StorageError;
use crate::storage::traits::ExpenseStorage;

use super::connection::{map_read_err, map_write_err, DbConnection};

#[derive(Clone)]
pub struct ExpenseRepository {
    connection: DbConnection,
}

impl ExpenseRepository {
    pub fn new(connection: DbConnection) -> Self {
        Self { connection }
    }

    fn row_to_expense(row: &SqliteRow) -> Result<BudgetExpense, StorageError> {
        let date_str: String = row.get("expense_date");
        let expense_date = parse_date_string(&date_str).map_err(|e| {
            StorageError::backend(
                "decoding expense",
                anyhow::anyhow!("bad expense_date in budget_expenses row: {}", e),
            )
        })?;

        Ok(BudgetExpense {
            id: row.get("id"),
            account_id: row.get("account_id"),
            daily_record_id: row.get("daily_record_id"),
            amount: row.get("amount"),
            description: row.get("description"),
            expense_date,
            created_at: row.get("created_at"),
        })
    }
}

#[async_trait]
impl ExpenseStorage for ExpenseRepository {
    async fn store_expense(&self, expense: &BudgetExpense) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO budget_expenses
                (id, account_id, daily_record_id, amount, description, expense_date, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&expense.id)
        .bind(&expense.account_id)
        .bind(&expense.daily_record_id)
        .bind(expense.amount)
        .bind(&expense.description)
        .bind(format_date_to_string(expense.expense_date))
        .bind(&expense.created_at)
        .execute(self.connection.pool())
        .await
        .map_err(|e| map_write_err("storing expense", "budget_expenses.id", e))?;

        Ok(())
    }

    async fn get_expense(
        &self,
        expense_id: &str,
    ) -> Result<Option<BudgetExpense>, StorageError> {
        let row = sqlx::query("SELECT * FROM budget_expenses WHERE id = ?")
            .bind(expense_id)
            .fetch_optional(self.connection.pool())
            .await
            .map_err(|e| map_read_err("fetching expense", e))?;

        row.as_ref().map(Self::row_to_expense).transpose()
    }

    async fn delete_expense(&self, expense_id: &str) -> Result<bool, StorageError> {
        let result = sqlx::query("DELETE FROM budget_expenses WHERE id = ?")
            .bind(expense_id)
            .execute(self.connection.pool())
            .await
            .map_err(|e| map_write_err("deleting expense", "budget_expenses.id", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn sum_expenses_for_record(
        &self,
        daily_record_id: &str,
    ) -> Result<f64, StorageError> {
        let row = sqlx::query(
            "SELECT COALESCE(SUM(amount), 0.0) AS total FROM budget_expenses WHERE daily_record_id = ?",
        )
        .bind(daily_record_id)
        .fetch_one(self.connection.pool())
        .await
        .map_err(|e| map_read_err("summing expenses for record", e))?;

        Ok(row.get("total"))
    }
}
