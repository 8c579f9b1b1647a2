//! Weekly cycle lifecycle management.
//!
//! A cycle row moves none → active → closed, and a closed cycle always
//! produces a successor the next time the account is touched. Transition
//! is evaluated lazily on read; there is no background sweep, so a dormant
//! account keeps its stale active row until the next request arrives.

use anyhow::{anyhow, Context, Result};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::calculation::{carry_over_balance, round2, week_cycle_dates};
use crate::domain::models::{BudgetConfig, CycleStatus, WeekCycle};
use crate::storage::traits::{Connection, CycleStorage};

/// Service owning the cycle state machine.
#[derive(Clone)]
pub struct CycleService<C: Connection> {
    cycle_repository: C::CycleRepository,
}

impl<C: Connection> CycleService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        let cycle_repository = connection.create_cycle_repository();
        Self { cycle_repository }
    }

    /// The account's active cycle containing `reference`, if one exists.
    /// Absence is a normal state, never an error.
    pub async fn get_active_cycle(
        &self,
        account_id: &str,
        reference: NaiveDate,
    ) -> Result<Option<WeekCycle>> {
        let cycle = self
            .cycle_repository
            .get_active_cycle_containing(account_id, reference)
            .await
            .context("looking up active cycle")?;
        Ok(cycle)
    }

    /// Create the cycle whose window contains `reference`, seeded with
    /// `carried_balance`.
    ///
    /// Creation is optimistic: if a concurrent caller already inserted the
    /// identical `(account, start, end)` row, the unique constraint fires
    /// and the winner's row is re-read and returned instead of failing.
    /// That one extra read is the whole concurrency story; no locks.
    pub async fn create_new_cycle(
        &self,
        account_id: &str,
        config: &BudgetConfig,
        reference: NaiveDate,
        carried_balance: f64,
    ) -> Result<WeekCycle> {
        let (start_date, end_date) = week_cycle_dates(reference, config.week_start_day);

        let cycle = WeekCycle {
            id: WeekCycle::generate_id(),
            account_id: account_id.to_string(),
            config_id: config.id.clone(),
            start_date,
            end_date,
            initial_budget: round2(config.daily_base * 7.0),
            carried_balance,
            accumulated_balance: carried_balance,
            status: CycleStatus::Active,
        };

        match self.cycle_repository.store_cycle(&cycle).await {
            Ok(()) => {
                info!(
                    "Created cycle {} for {} ({} to {}), carried balance {:.2}",
                    cycle.id, account_id, start_date, end_date, carried_balance
                );
                Ok(cycle)
            }
            Err(e) if e.is_duplicate_key() => {
                info!(
                    "Lost cycle creation race for {} ({} to {}), adopting winner",
                    account_id, start_date, end_date
                );
                let winner = self
                    .cycle_repository
                    .get_cycle_by_window(account_id, start_date, end_date)
                    .await
                    .context("re-reading cycle after duplicate-key conflict")?
                    .ok_or_else(|| {
                        anyhow!(
                            "cycle for {} ({} to {}) vanished after duplicate-key conflict",
                            account_id,
                            start_date,
                            end_date
                        )
                    })?;
                Ok(winner)
            }
            Err(e) => Err(e).context("creating week cycle"),
        }
    }

    /// Close an expired active cycle and open its successor, applying the
    /// carry-over policy. A still-current cycle is returned unchanged; an
    /// account with no active cycle gets a fresh one with nothing carried.
    pub async fn handle_cycle_transition(
        &self,
        account_id: &str,
        config: &BudgetConfig,
        today: NaiveDate,
    ) -> Result<WeekCycle> {
        let active = self
            .cycle_repository
            .get_active_cycle(account_id)
            .await
            .context("looking up active cycle for transition")?;

        match active {
            Some(cycle) if cycle.has_expired(today) => {
                self.cycle_repository
                    .set_cycle_status(&cycle.id, CycleStatus::Closed)
                    .await
                    .context("closing expired cycle")?;

                let carried =
                    carry_over_balance(cycle.accumulated_balance, config.carry_over_mode);
                info!(
                    "Closed cycle {} for {} (ended {}, final balance {:.2}, carrying {:.2} via {})",
                    cycle.id,
                    account_id,
                    cycle.end_date,
                    cycle.accumulated_balance,
                    carried,
                    config.carry_over_mode
                );

                self.create_new_cycle(account_id, config, today, carried).await
            }
            Some(cycle) => Ok(cycle),
            None => {
                info!("No active cycle for {}, starting first cycle", account_id);
                self.create_new_cycle(account_id, config, today, 0.0).await
            }
        }
    }

    /// The one entry point the rest of the system calls. Idempotent and
    /// safe to invoke on every request.
    pub async fn ensure_active_cycle(
        &self,
        account_id: &str,
        config: &BudgetConfig,
    ) -> Result<WeekCycle> {
        self.ensure_active_cycle_on(account_id, config, Local::now().date_naive())
            .await
    }

    /// [`Self::ensure_active_cycle`] with an explicit "today", which is
    /// what tests and backdated tooling use.
    pub async fn ensure_active_cycle_on(
        &self,
        account_id: &str,
        config: &BudgetConfig,
        today: NaiveDate,
    ) -> Result<WeekCycle> {
        if let Some(cycle) = self.get_active_cycle(account_id, today).await? {
            return Ok(cycle);
        }

        // Either the cycle expired or none exists yet
        let cycle = self.handle_cycle_transition(account_id, config, today).await?;
        if !cycle.contains_date(today) {
            // Should be unreachable: the successor window always contains today
            warn!(
                "Cycle {} for {} does not contain {} after transition",
                cycle.id, account_id, today
            );
        }
        Ok(cycle)
    }
}
