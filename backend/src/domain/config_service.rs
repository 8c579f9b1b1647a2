//! Budget configuration management.

use anyhow::{Context, Result};
use chrono::Utc;
use shared::CarryOverMode;
use std::sync::Arc;
use tracing::info;

use crate::domain::models::BudgetConfig;
use crate::domain::validation::{validate_daily_base, validate_week_start_day};
use crate::storage::traits::{BudgetConfigStorage, Connection};

/// Service for reading and updating an account's budget configuration.
/// Config changes apply from the next computation onward; closed cycles
/// are never rewritten.
#[derive(Clone)]
pub struct BudgetConfigService<C: Connection> {
    config_repository: C::ConfigRepository,
}

impl<C: Connection> BudgetConfigService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let config_repository = connection.create_config_repository();
        Self { config_repository }
    }

    /// The account's config, if it has completed setup.
    pub async fn get_config(&self, account_id: &str) -> Result<Option<BudgetConfig>> {
        let config = self
            .config_repository
            .get_config(account_id)
            .await
            .context("fetching budget config")?;
        Ok(config)
    }

    /// Create or update the account's config after validating the inputs.
    pub async fn update_config(
        &self,
        account_id: &str,
        daily_base: f64,
        week_start_day: u8,
        carry_over_mode: CarryOverMode,
    ) -> Result<BudgetConfig> {
        validate_daily_base(daily_base)?;
        validate_week_start_day(week_start_day)?;

        let existing = self
            .config_repository
            .get_config(account_id)
            .await
            .context("fetching budget config for update")?;

        let now = Utc::now().to_rfc3339();
        let config = match existing {
            Some(mut config) => {
                config.daily_base = daily_base;
                config.week_start_day = week_start_day;
                config.carry_over_mode = carry_over_mode;
                config.updated_at = now;
                self.config_repository
                    .update_config(&config)
                    .await
                    .context("updating budget config")?;
                info!("Updated budget config for {}", account_id);
                config
            }
            None => {
                let config = BudgetConfig {
                    id: BudgetConfig::generate_id(),
                    account_id: account_id.to_string(),
                    daily_base,
                    week_start_day,
                    carry_over_mode,
                    created_at: now.clone(),
                    updated_at: now,
                };
                self.config_repository
                    .store_config(&config)
                    .await
                    .context("storing budget config")?;
                info!("Created budget config for {}", account_id);
                config
            }
        };

        Ok(config)
    }
}
