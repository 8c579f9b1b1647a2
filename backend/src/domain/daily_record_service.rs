//! Daily record management: lazy creation of today's record, spent-total
//! maintenance as expenses change, and recomputation of the cycle's
//! accumulated balance.

use anyhow::{anyhow, Context, Result};
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use tracing::{debug, info};

use crate::domain::calculation::{available_budget, daily_balance, remaining_days, round2};
use crate::domain::models::{BudgetConfig, BudgetExpense, DailyRecord, WeekCycle};
use crate::domain::validation::{validate_expense_amount, validate_expense_date};
use crate::storage::traits::{
    Connection, CycleStorage, DailyRecordStorage, ExpenseStorage,
};

/// Service owning daily records and the expense mutation chain.
#[derive(Clone)]
pub struct DailyRecordService<C: Connection> {
    record_repository: C::DailyRecordRepository,
    cycle_repository: C::CycleRepository,
    expense_repository: C::ExpenseRepository,
}

impl<C: Connection> DailyRecordService<C> {
    pub fn new(connection: Arc<C>) -> Self {
        Self {
            record_repository: connection.create_daily_record_repository(),
            cycle_repository: connection.create_cycle_repository(),
            expense_repository: connection.create_expense_repository(),
        }
    }

    /// Fetch the record for `(account, date)`, creating it on first touch.
    ///
    /// The available budget is computed once here, from the cycle's
    /// accumulated balance spread over the remaining days, and is frozen
    /// for the rest of the day; later expense edits shift the balance seen
    /// by the *next* day's record, not today's.
    ///
    /// Creation follows the same optimistic-insert contract as cycles: a
    /// duplicate-key conflict means a concurrent caller created the row
    /// first, and the winner's row is re-read and returned.
    pub async fn get_or_create_daily_record(
        &self,
        cycle: &WeekCycle,
        config: &BudgetConfig,
        date: NaiveDate,
    ) -> Result<DailyRecord> {
        if let Some(existing) = self
            .record_repository
            .get_record_by_date(&cycle.account_id, date)
            .await
            .context("looking up daily record")?
        {
            return Ok(existing);
        }

        let remaining = remaining_days(date, cycle.end_date);
        let available = available_budget(config.daily_base, cycle.accumulated_balance, remaining);

        let record = DailyRecord {
            id: DailyRecord::generate_id(),
            account_id: cycle.account_id.clone(),
            cycle_id: cycle.id.clone(),
            record_date: date,
            base_budget: config.daily_base,
            available_budget: available,
            total_spent: 0.0,
            daily_balance: available,
            remaining_days: remaining,
        };

        match self.record_repository.store_record(&record).await {
            Ok(()) => {
                info!(
                    "Created daily record {} for {} on {} (available {:.2} over {} remaining days)",
                    record.id, record.account_id, date, available, remaining
                );
                Ok(record)
            }
            Err(e) if e.is_duplicate_key() => {
                debug!(
                    "Lost daily record creation race for {} on {}, adopting winner",
                    cycle.account_id, date
                );
                let winner = self
                    .record_repository
                    .get_record_by_date(&cycle.account_id, date)
                    .await
                    .context("re-reading daily record after duplicate-key conflict")?
                    .ok_or_else(|| {
                        anyhow!(
                            "daily record for {} on {} vanished after duplicate-key conflict",
                            cycle.account_id,
                            date
                        )
                    })?;
                Ok(winner)
            }
            Err(e) => Err(e).context("creating daily record"),
        }
    }

    /// Persist a new spent total, recomputing the daily balance against the
    /// record's immutable available budget.
    pub async fn update_daily_record_spent(
        &self,
        record_id: &str,
        new_total_spent: f64,
    ) -> Result<DailyRecord> {
        let mut record = self
            .record_repository
            .get_record(record_id)
            .await
            .context("looking up daily record for spent update")?
            .ok_or_else(|| anyhow!("daily record not found: {}", record_id))?;

        record.total_spent = round2(new_total_spent);
        record.daily_balance = daily_balance(record.available_budget, record.total_spent);

        self.record_repository
            .update_spent(record_id, record.total_spent, record.daily_balance)
            .await
            .context("persisting daily record spent")?;

        debug!(
            "Updated record {}: spent {:.2}, balance {:.2}",
            record_id, record.total_spent, record.daily_balance
        );
        Ok(record)
    }

    /// Recompute a cycle's accumulated balance as its carried balance plus
    /// the sum of all daily balances, and write it back. Must run after
    /// every spent update so the next day's record sees the redistribution.
    pub async fn recalculate_cycle_accumulated_balance(&self, cycle_id: &str) -> Result<f64> {
        let cycle = self
            .cycle_repository
            .get_cycle(cycle_id)
            .await
            .context("looking up cycle for balance recalculation")?
            .ok_or_else(|| anyhow!("cycle not found: {}", cycle_id))?;

        let records = self
            .record_repository
            .get_records_for_cycle(cycle_id)
            .await
            .context("listing records for balance recalculation")?;

        let daily_sum: f64 = records.iter().map(|r| r.daily_balance).sum();
        let accumulated = round2(cycle.carried_balance + daily_sum);

        self.cycle_repository
            .update_accumulated_balance(cycle_id, accumulated)
            .await
            .context("writing recalculated accumulated balance")?;

        debug!(
            "Recalculated cycle {}: carried {:.2} + {} daily balances = {:.2}",
            cycle_id,
            cycle.carried_balance,
            records.len(),
            accumulated
        );
        Ok(accumulated)
    }

    /// Sum of all expenses attached to a record.
    pub async fn get_total_expenses_for_record(&self, record_id: &str) -> Result<f64> {
        let total = self
            .expense_repository
            .sum_expenses_for_record(record_id)
            .await
            .context("summing expenses for record")?;
        Ok(total)
    }

    /// All records of a cycle, oldest first.
    pub async fn get_daily_records_for_cycle(&self, cycle_id: &str) -> Result<Vec<DailyRecord>> {
        let records = self
            .record_repository
            .get_records_for_cycle(cycle_id)
            .await
            .context("listing daily records for cycle")?;
        Ok(records)
    }

    /// Add an expense for `date` inside `cycle`, then run the maintenance
    /// chain: re-sum the record's expenses, update its spent total, and
    /// recalculate the cycle's accumulated balance.
    pub async fn add_expense(
        &self,
        cycle: &WeekCycle,
        config: &BudgetConfig,
        amount: f64,
        description: &str,
        date: NaiveDate,
    ) -> Result<BudgetExpense> {
        validate_expense_amount(amount)?;
        validate_expense_date(date, cycle.start_date, cycle.end_date)?;

        let record = self.get_or_create_daily_record(cycle, config, date).await?;

        let expense = BudgetExpense {
            id: BudgetExpense::generate_id(),
            account_id: cycle.account_id.clone(),
            daily_record_id: record.id.clone(),
            amount: round2(amount),
            description: description.to_string(),
            expense_date: date,
            created_at: Utc::now().to_rfc3339(),
        };
        self.expense_repository
            .store_expense(&expense)
            .await
            .context("storing expense")?;

        let total = self.get_total_expenses_for_record(&record.id).await?;
        self.update_daily_record_spent(&record.id, total).await?;
        self.recalculate_cycle_accumulated_balance(&cycle.id).await?;

        info!(
            "Added expense {} ({:.2}) to record {} for {}",
            expense.id, expense.amount, record.id, cycle.account_id
        );
        Ok(expense)
    }

    /// Remove an expense and run the same maintenance chain as
    /// [`Self::add_expense`]. Returns false if no such expense exists.
    pub async fn remove_expense(&self, expense_id: &str) -> Result<bool> {
        let expense = match self
            .expense_repository
            .get_expense(expense_id)
            .await
            .context("looking up expense for removal")?
        {
            Some(expense) => expense,
            None => return Ok(false),
        };

        self.expense_repository
            .delete_expense(expense_id)
            .await
            .context("deleting expense")?;

        let total = self
            .get_total_expenses_for_record(&expense.daily_record_id)
            .await?;
        let record = self
            .update_daily_record_spent(&expense.daily_record_id, total)
            .await?;
        self.recalculate_cycle_accumulated_balance(&record.cycle_id).await?;

        info!(
            "Removed expense {} ({:.2}) from record {}",
            expense_id, expense.amount, expense.daily_record_id
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle_service::CycleService;
    use crate::domain::validation::ValidationError;
    use crate::storage::sqlite::test_utils::TestHelper;
    use crate::storage::DbConnection;
    use shared::CarryOverMode;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> BudgetConfig {
        BudgetConfig {
            id: BudgetConfig::generate_id(),
            account_id: "account::1".to_string(),
            daily_base: 100.0,
            week_start_day: 1, // Monday
            carry_over_mode: CarryOverMode::CarryAll,
            created_at: Utc::now().to_rfc3339(),
            updated_at: Utc::now().to_rfc3339(),
        }
    }

    struct Services {
        cycles: CycleService<DbConnection>,
        records: DailyRecordService<DbConnection>,
        helper: TestHelper,
    }

    async fn setup() -> Services {
        let helper = TestHelper::new().await.unwrap();
        let connection = Arc::new(helper.connection.clone());
        Services {
            cycles: CycleService::new(connection.clone()),
            records: DailyRecordService::new(connection),
            helper,
        }
    }

    #[tokio::test]
    async fn first_record_of_fresh_cycle_gets_the_base() {
        let s = setup().await;
        let config = config();
        let cycle = s
            .cycles
            .ensure_active_cycle_on("account::1", &config, date(2025, 3, 3))
            .await
            .unwrap();

        let record = s
            .records
            .get_or_create_daily_record(&cycle, &config, date(2025, 3, 3))
            .await
            .unwrap();

        assert_eq!(record.remaining_days, 7);
        assert_eq!(record.available_budget, 100.0);
        assert_eq!(record.total_spent, 0.0);
        assert_eq!(record.daily_balance, 100.0);
    }

    #[tokio::test]
    async fn record_spreads_accumulated_balance_over_remaining_days() {
        let s = setup().await;
        let config = config();
        let cycle = s
            .cycles
            .ensure_active_cycle_on("account::1", &config, date(2025, 3, 3))
            .await
            .unwrap();
        s.helper
            .cycle_repo
            .update_accumulated_balance(&cycle.id, 20.0)
            .await
            .unwrap();
        let cycle = s.helper.cycle_repo.get_cycle(&cycle.id).await.unwrap().unwrap();

        // Tuesday: 6 days remain (Tue..Sun), 20 spread over 6
        let record = s
            .records
            .get_or_create_daily_record(&cycle, &config, date(2025, 3, 4))
            .await
            .unwrap();

        assert_eq!(record.remaining_days, 6);
        assert_eq!(record.available_budget, 103.33);
    }

    #[tokio::test]
    async fn get_or_create_is_idempotent_and_race_safe() {
        let s = setup().await;
        let config = config();
        let cycle = s
            .cycles
            .ensure_active_cycle_on("account::1", &config, date(2025, 3, 3))
            .await
            .unwrap();

        let (a, b) = tokio::join!(
            s.records.get_or_create_daily_record(&cycle, &config, date(2025, 3, 3)),
            s.records.get_or_create_daily_record(&cycle, &config, date(2025, 3, 3)),
        );
        let a = a.unwrap();
        let b = b.unwrap();

        // Exactly one row; both callers observe identical field values
        assert_eq!(a, b);
        let records = s.records.get_daily_records_for_cycle(&cycle.id).await.unwrap();
        assert_eq!(records.len(), 1);
    }

    #[tokio::test]
    async fn available_budget_is_frozen_for_the_day() {
        let s = setup().await;
        let config = config();
        let cycle = s
            .cycles
            .ensure_active_cycle_on("account::1", &config, date(2025, 3, 3))
            .await
            .unwrap();

        let record = s
            .records
            .get_or_create_daily_record(&cycle, &config, date(2025, 3, 3))
            .await
            .unwrap();

        // Spending changes the cycle balance but must not touch today's
        // available budget
        s.records
            .add_expense(&cycle, &config, 40.0, "groceries", date(2025, 3, 3))
            .await
            .unwrap();

        let after = s
            .records
            .get_or_create_daily_record(&cycle, &config, date(2025, 3, 3))
            .await
            .unwrap();
        assert_eq!(after.id, record.id);
        assert_eq!(after.available_budget, 100.0);
        assert_eq!(after.total_spent, 40.0);
        assert_eq!(after.daily_balance, 60.0);
    }

    #[tokio::test]
    async fn expense_chain_updates_spent_and_cycle_balance() {
        let s = setup().await;
        let config = config();
        let cycle = s
            .cycles
            .ensure_active_cycle_on("account::1", &config, date(2025, 3, 3))
            .await
            .unwrap();

        s.records
            .add_expense(&cycle, &config, 30.0, "lunch", date(2025, 3, 3))
            .await
            .unwrap();
        let expense = s
            .records
            .add_expense(&cycle, &config, 12.5, "bus", date(2025, 3, 3))
            .await
            .unwrap();

        let record = s
            .records
            .get_or_create_daily_record(&cycle, &config, date(2025, 3, 3))
            .await
            .unwrap();
        assert_eq!(record.total_spent, 42.5);
        assert_eq!(record.daily_balance, 57.5);

        let updated_cycle = s.helper.cycle_repo.get_cycle(&cycle.id).await.unwrap().unwrap();
        assert_eq!(updated_cycle.accumulated_balance, 57.5);

        // Removing one expense walks the same chain back
        assert!(s.records.remove_expense(&expense.id).await.unwrap());
        let record = s.helper.record_repo.get_record(&record.id).await.unwrap().unwrap();
        assert_eq!(record.total_spent, 30.0);
        assert_eq!(record.daily_balance, 70.0);
        let updated_cycle = s.helper.cycle_repo.get_cycle(&cycle.id).await.unwrap().unwrap();
        assert_eq!(updated_cycle.accumulated_balance, 70.0);

        // Unknown expense is a no-op
        assert!(!s.records.remove_expense("expense::missing").await.unwrap());
    }

    #[tokio::test]
    async fn expense_validation_short_circuits() {
        let s = setup().await;
        let config = config();
        let cycle = s
            .cycles
            .ensure_active_cycle_on("account::1", &config, date(2025, 3, 3))
            .await
            .unwrap();

        let err = s
            .records
            .add_expense(&cycle, &config, -5.0, "refund?", date(2025, 3, 3))
            .await
            .unwrap_err();
        assert!(err.downcast_ref::<ValidationError>().is_some());

        let err = s
            .records
            .add_expense(&cycle, &config, 5.0, "early", date(2025, 3, 2))
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ValidationError>(),
            Some(ValidationError::ExpenseDateOutsideCycle { .. })
        ));

        // Nothing was written
        let records = s.records.get_daily_records_for_cycle(&cycle.id).await.unwrap();
        assert!(records.iter().all(|r| r.total_spent == 0.0));
    }

    #[tokio::test]
    async fn week_simulation_reconciles_accumulated_balance() {
        let s = setup().await;
        let mut config = config();
        config.carry_over_mode = CarryOverMode::CarryAll;

        // Seed a previous cycle that carries 15.0 into the week under test
        let previous = s
            .cycles
            .ensure_active_cycle_on("account::1", &config, date(2025, 2, 24))
            .await
            .unwrap();
        s.helper
            .cycle_repo
            .update_accumulated_balance(&previous.id, 15.0)
            .await
            .unwrap();

        let cycle = s
            .cycles
            .ensure_active_cycle_on("account::1", &config, date(2025, 3, 3))
            .await
            .unwrap();
        assert_eq!(cycle.carried_balance, 15.0);

        // Walk the whole week, spending a different amount each day
        let spends = [80.0, 120.0, 100.0, 0.0, 95.5, 130.0, 60.0];
        for (i, spend) in spends.iter().enumerate() {
            let day = date(2025, 3, 3 + i as u32);
            // Re-read the cycle so each day sees the latest redistribution
            let cycle = s.helper.cycle_repo.get_cycle(&cycle.id).await.unwrap().unwrap();
            if *spend > 0.0 {
                s.records
                    .add_expense(&cycle, &config, *spend, "day spend", day)
                    .await
                    .unwrap();
            } else {
                s.records
                    .get_or_create_daily_record(&cycle, &config, day)
                    .await
                    .unwrap();
            }
        }

        let final_cycle = s.helper.cycle_repo.get_cycle(&cycle.id).await.unwrap().unwrap();
        let records = s.records.get_daily_records_for_cycle(&cycle.id).await.unwrap();
        assert_eq!(records.len(), 7);

        let daily_sum: f64 = records.iter().map(|r| r.daily_balance).sum();
        let expected = round2(cycle.carried_balance + daily_sum);
        assert!(
            (final_cycle.accumulated_balance - expected).abs() < 0.005,
            "accumulated {} vs carried+daily {}",
            final_cycle.accumulated_balance,
            expected
        );
    }
}
