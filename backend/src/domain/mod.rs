//! Domain layer: pure calculations plus the services that drive the
//! cycle and daily-record state machines.

pub mod calculation;
pub mod config_service;
pub mod cycle_service;
pub mod daily_record_service;
pub mod models;
pub mod validation;

pub use config_service::BudgetConfigService;
pub use cycle_service::CycleService;
pub use daily_record_service::DailyRecordService;
pub use validation::ValidationError;
