//! Test utilities providing a fresh in-memory database per test.

use anyhow::Result;

use super::{
    ConfigRepository, CycleRepository, DailyRecordRepository, DbConnection, ExpenseRepository,
};
use crate::storage::traits::Connection;

/// Test helper bundling a unique in-memory database with one repository of
/// each kind. Dropping it drops the database.
pub struct TestHelper {
    pub connection: DbConnection,
    pub config_repo: ConfigRepository,
    pub cycle_repo: CycleRepository,
    pub record_repo: DailyRecordRepository,
    pub expense_repo: ExpenseRepository,
}

impl TestHelper {
    pub async fn new() -> Result<Self> {
        let connection = DbConnection::init_test().await?;
        Ok(Self {
            config_repo: connection.create_config_repository(),
            cycle_repo: connection.create_cycle_repository(),
            record_repo: connection.create_daily_record_repository(),
            expense_repo: connection.create_expense_repository(),
            connection,
        })
    }
}
