//! # Fluid Budget Backend
//!
//! Rolling daily budget engine: each day's allowance is the configured
//! daily base adjusted by spreading the week's surplus or overspend across
//! the remaining days of the cycle. Weekly cycles close lazily and carry
//! their balance forward per the account's carry-over policy.
//!
//! The domain layer is generic over [`storage::Connection`]; the shipped
//! backend is SQLite via sqlx, whose unique constraints are the engine's
//! only concurrency-control mechanism.

use anyhow::Result;
use std::sync::Arc;

pub mod domain;
pub mod rest;
pub mod storage;

pub use storage::DbConnection;

use domain::{BudgetConfigService, CycleService, DailyRecordService};

/// Bundles all domain services over one storage connection.
#[derive(Clone)]
pub struct Backend {
    pub config_service: BudgetConfigService<DbConnection>,
    pub cycle_service: CycleService<DbConnection>,
    pub daily_record_service: DailyRecordService<DbConnection>,
}

impl Backend {
    /// Create a backend over an already-initialized connection.
    pub fn new(connection: DbConnection) -> Result<Self> {
        let connection = Arc::new(connection);
        Ok(Self {
            config_service: BudgetConfigService::new(connection.clone()),
            cycle_service: CycleService::new(connection.clone()),
            daily_record_service: DailyRecordService::new(connection),
        })
    }
}
