//! Storage abstraction for the budget engine.
//!
//! The domain layer talks to storage exclusively through the traits in
//! [`traits`]; [`sqlite`] provides the sqlx-backed implementation.

pub mod error;
pub mod sqlite;
pub mod traits;

pub use error::StorageError;
pub use sqlite::DbConnection;
pub use traits::{
    BudgetConfigStorage, Connection, CycleStorage, DailyRecordStorage, ExpenseStorage,
};
