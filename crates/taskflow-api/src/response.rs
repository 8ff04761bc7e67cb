//! Wire shapes for the jobs API. Grounded in
//! `original_source/adapters/inbound/api/schemas.py`'s `JobResponse`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use taskflow_core::job::{Job, JobState};

fn state_str(state: JobState) -> &'static str {
    match state {
        JobState::Pending => "PENDING",
        JobState::Scheduled => "SCHEDULED",
        JobState::Running => "RUNNING",
        JobState::Succeeded => "SUCCEEDED",
        JobState::Failed => "FAILED",
        JobState::Dead => "DEAD",
    }
}

#[derive(Debug, Serialize)]
pub struct JobResponse {
    pub id: Uuid,
    pub name: String,
    pub queue: String,
    pub tenant_id: Option<String>,
    pub payload: Value,
    pub state: String,
    pub priority: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub next_run_at: Option<DateTime<Utc>>,
    pub attempts: u32,
    pub max_attempts: u32,
}

impl From<Job> for JobResponse {
    fn from(job: Job) -> Self {
        JobResponse {
            id: job.id,
            name: job.name,
            queue: job.queue,
            tenant_id: job.tenant_id,
            payload: job.payload,
            state: state_str(job.state).to_string(),
            priority: job.priority,
            created_at: job.created_at,
            updated_at: job.updated_at,
            scheduled_at: job.scheduled_at,
            next_run_at: job.next_run_at,
            attempts: job.attempts,
            max_attempts: job.max_attempts,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}
