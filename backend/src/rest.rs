//! REST surface over the budget engine.
//!
//! Thin handlers only: validate, call a domain service, map the result.
//! Validation failures come back as 400 with the message; storage
//! failures as a generic 500; missing setup as 404.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{Datelike, Local};
use std::sync::Arc;
use tracing::info;

use shared::{
    AddExpenseRequest, BudgetConfigDto, CycleOverviewResponse, DailyRecordDto,
    TodayBudgetResponse, UpdateBudgetConfigRequest, WeekCycleDto,
};

use crate::domain::calculation::{budget_status, derived_budgets};
use crate::domain::models::{BudgetConfig, DailyRecord, WeekCycle};
use crate::domain::ValidationError;
use crate::Backend;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<Backend>,
}

impl AppState {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend: Arc::new(backend),
        }
    }
}

/// Build the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/api/budget/config/:account_id", get(get_config))
        .route("/api/budget/config/:account_id", put(put_config))
        .route("/api/budget/today/:account_id", get(get_today))
        .route("/api/budget/cycle/:account_id", get(get_cycle))
        .route("/api/budget/expenses/:account_id", post(add_expense))
        .route(
            "/api/budget/expenses/:account_id/:expense_id",
            delete(remove_expense),
        )
        .with_state(state)
}

fn config_to_dto(config: &BudgetConfig) -> BudgetConfigDto {
    BudgetConfigDto {
        id: config.id.clone(),
        account_id: config.account_id.clone(),
        daily_base: config.daily_base,
        week_start_day: config.week_start_day,
        carry_over_mode: config.carry_over_mode,
    }
}

fn cycle_to_dto(cycle: &WeekCycle) -> WeekCycleDto {
    WeekCycleDto {
        id: cycle.id.clone(),
        account_id: cycle.account_id.clone(),
        start_date: cycle.start_date,
        end_date: cycle.end_date,
        initial_budget: cycle.initial_budget,
        carried_balance: cycle.carried_balance,
        accumulated_balance: cycle.accumulated_balance,
        status: cycle.status.as_str().to_string(),
    }
}

fn record_to_dto(record: &DailyRecord) -> DailyRecordDto {
    DailyRecordDto {
        id: record.id.clone(),
        record_date: record.record_date,
        base_budget: record.base_budget,
        available_budget: record.available_budget,
        total_spent: record.total_spent,
        daily_balance: record.daily_balance,
        remaining_days: record.remaining_days,
    }
}

/// Map a domain error onto an HTTP response: validation errors are the
/// caller's to fix, everything else is an opaque failure.
fn error_response(operation: &str, e: anyhow::Error) -> axum::response::Response {
    if let Some(validation) = e.downcast_ref::<ValidationError>() {
        (StatusCode::BAD_REQUEST, validation.to_string()).into_response()
    } else {
        tracing::error!("Error {}: {:?}", operation, e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Could not complete operation",
        )
            .into_response()
    }
}

/// GET /api/budget/config/:account_id
async fn get_config(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/budget/config/{}", account_id);

    match state.backend.config_service.get_config(&account_id).await {
        Ok(Some(config)) => (StatusCode::OK, Json(config_to_dto(&config))).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "No budget config for account").into_response(),
        Err(e) => error_response("fetching config", e),
    }
}

/// PUT /api/budget/config/:account_id
async fn put_config(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<UpdateBudgetConfigRequest>,
) -> impl IntoResponse {
    info!("PUT /api/budget/config/{} - {:?}", account_id, request);

    match state
        .backend
        .config_service
        .update_config(
            &account_id,
            request.daily_base,
            request.week_start_day,
            request.carry_over_mode,
        )
        .await
    {
        Ok(config) => (StatusCode::OK, Json(config_to_dto(&config))).into_response(),
        Err(e) => error_response("updating config", e),
    }
}

/// GET /api/budget/today/:account_id
///
/// The main entry point for the budget card: ensures the active cycle and
/// today's record exist, then reports availability, status, and projected
/// period budgets.
async fn get_today(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/budget/today/{}", account_id);
    let backend = &state.backend;

    let config = match backend.config_service.get_config(&account_id).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, "No budget config for account").into_response()
        }
        Err(e) => return error_response("fetching config", e),
    };

    let today = Local::now().date_naive();
    let cycle = match backend
        .cycle_service
        .ensure_active_cycle_on(&account_id, &config, today)
        .await
    {
        Ok(cycle) => cycle,
        Err(e) => return error_response("ensuring active cycle", e),
    };

    let record = match backend
        .daily_record_service
        .get_or_create_daily_record(&cycle, &config, today)
        .await
    {
        Ok(record) => record,
        Err(e) => return error_response("ensuring daily record", e),
    };

    let response = TodayBudgetResponse {
        status: budget_status(record.available_budget, config.daily_base),
        derived: derived_budgets(
            config.daily_base,
            Some(today.month()),
            Some(today.year()),
        ),
        cycle: cycle_to_dto(&cycle),
        record: record_to_dto(&record),
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// GET /api/budget/cycle/:account_id
async fn get_cycle(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> impl IntoResponse {
    info!("GET /api/budget/cycle/{}", account_id);
    let backend = &state.backend;

    let config = match backend.config_service.get_config(&account_id).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, "No budget config for account").into_response()
        }
        Err(e) => return error_response("fetching config", e),
    };

    let cycle = match backend
        .cycle_service
        .ensure_active_cycle(&account_id, &config)
        .await
    {
        Ok(cycle) => cycle,
        Err(e) => return error_response("ensuring active cycle", e),
    };

    match backend
        .daily_record_service
        .get_daily_records_for_cycle(&cycle.id)
        .await
    {
        Ok(records) => {
            let response = CycleOverviewResponse {
                cycle: cycle_to_dto(&cycle),
                records: records.iter().map(record_to_dto).collect(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => error_response("listing cycle records", e),
    }
}

/// POST /api/budget/expenses/:account_id
async fn add_expense(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
    Json(request): Json<AddExpenseRequest>,
) -> impl IntoResponse {
    info!("POST /api/budget/expenses/{} - {:?}", account_id, request);
    let backend = &state.backend;

    let config = match backend.config_service.get_config(&account_id).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            return (StatusCode::NOT_FOUND, "No budget config for account").into_response()
        }
        Err(e) => return error_response("fetching config", e),
    };

    let cycle = match backend
        .cycle_service
        .ensure_active_cycle(&account_id, &config)
        .await
    {
        Ok(cycle) => cycle,
        Err(e) => return error_response("ensuring active cycle", e),
    };

    let date = request.expense_date.unwrap_or_else(|| Local::now().date_naive());
    match backend
        .daily_record_service
        .add_expense(&cycle, &config, request.amount, &request.description, date)
        .await
    {
        Ok(expense) => (StatusCode::CREATED, Json(expense)).into_response(),
        Err(e) => error_response("adding expense", e),
    }
}

/// DELETE /api/budget/expenses/:account_id/:expense_id
async fn remove_expense(
    State(state): State<AppState>,
    Path((account_id, expense_id)): Path<(String, String)>,
) -> impl IntoResponse {
    info!("DELETE /api/budget/expenses/{}/{}", account_id, expense_id);

    match state
        .backend
        .daily_record_service
        .remove_expense(&expense_id)
        .await
    {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (StatusCode::NOT_FOUND, "Expense not found").into_response(),
        Err(e) => error_response("removing expense", e),
    }
}
