//! Route handlers. Grounded in
//! `original_source/adapters/inbound/api/routers/jobs.py` and the pack's
//! axum handler shape (`State` extractor, `Json` in and out).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::Value;
use uuid::Uuid;

use taskflow_core::commands::ScheduleJobCommand;
use taskflow_core::ports::UnitOfWorkFactory;
use taskflow_core::retry::{RetryPolicy, RetryStrategy};

use crate::error::ApiError;
use crate::response::JobResponse;
use crate::state::AppState;

/// The wire shape of `POST /jobs`. A separate type from
/// [`ScheduleJobCommand`] because the wire format spells out
/// `retry_strategy`/`retry_base_delay_seconds` rather than embedding a
/// `RetryPolicy` value directly.
#[derive(Debug, Deserialize)]
pub struct ScheduleJobRequest {
    pub id: Option<Uuid>,
    pub name: String,
    #[serde(default)]
    pub payload: Option<Value>,
    pub queue: Option<String>,
    pub tenant_id: Option<String>,
    pub priority: Option<i32>,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
    pub max_attempts: Option<u32>,
    pub retry_strategy: Option<RetryStrategy>,
    pub retry_base_delay_seconds: Option<u32>,
}

impl From<ScheduleJobRequest> for ScheduleJobCommand {
    fn from(req: ScheduleJobRequest) -> Self {
        let mut cmd = ScheduleJobCommand::new(req.name);
        cmd.id = req.id;
        if let Some(payload) = req.payload {
            cmd.payload = payload;
        }
        if let Some(queue) = req.queue {
            cmd.queue = queue;
        }
        cmd.tenant_id = req.tenant_id;
        if let Some(priority) = req.priority {
            cmd.priority = priority;
        }
        cmd.scheduled_at = req.scheduled_at;
        if let Some(max_attempts) = req.max_attempts {
            cmd.max_attempts = max_attempts;
        }
        if req.retry_strategy.is_some() || req.retry_base_delay_seconds.is_some() {
            let strategy = req.retry_strategy.unwrap_or(cmd.retry_policy.strategy);
            let base_delay_seconds = req
                .retry_base_delay_seconds
                .unwrap_or(cmd.retry_policy.base_delay_seconds);
            cmd.retry_policy = RetryPolicy::new(strategy, base_delay_seconds);
        }
        cmd
    }
}

pub async fn schedule_job<F: UnitOfWorkFactory + 'static>(
    State(state): State<AppState<F>>,
    Json(req): Json<ScheduleJobRequest>,
) -> Result<(StatusCode, Json<JobResponse>), ApiError> {
    let job = state.schedule_job.execute(req.into()).await?;
    Ok((StatusCode::CREATED, Json(job.into())))
}

pub async fn get_job<F: UnitOfWorkFactory + 'static>(
    State(state): State<AppState<F>>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<JobResponse>, ApiError> {
    let job = state.get_job_by_id.execute(job_id).await?;
    Ok(Json(job.into()))
}

pub async fn liveness() -> &'static str {
    "ok"
}

pub async fn readiness() -> &'static str {
    "ok"
}

/// Stable 200 for deployments scraping `/metrics`; emits no real series.
pub async fn metrics_placeholder() -> &'static str {
    "# taskflow metrics are not yet exported\n"
}
