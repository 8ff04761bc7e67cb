//! The append-only history of a job's executions. Grounded in
//! `original_source/domain/models/job_attempt.py`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAttempt {
    pub id: Uuid,
    pub job_id: Uuid,
    pub attempt_number: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
    pub worker_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewJobAttempt {
    pub job_id: Uuid,
    pub attempt_number: u32,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub success: bool,
    pub worker_id: Option<String>,
    pub error_type: Option<String>,
    pub error_message: Option<String>,
}

impl JobAttempt {
    pub fn new(input: NewJobAttempt) -> Self {
        debug_assert!(
            input.finished_at >= input.started_at,
            "attempt must not finish before it started"
        );
        debug_assert_eq!(
            input.success,
            input.error_type.is_none() && input.error_message.is_none(),
            "error fields must be present iff the attempt failed"
        );

        JobAttempt {
            id: Uuid::new_v4(),
            job_id: input.job_id,
            attempt_number: input.attempt_number,
            started_at: input.started_at,
            finished_at: input.finished_at,
            success: input.success,
            error_type: input.error_type,
            error_message: input.error_message,
            worker_id: input.worker_id,
        }
    }

    pub fn success(
        job_id: Uuid,
        attempt_number: u32,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        worker_id: impl Into<String>,
    ) -> Self {
        Self::new(NewJobAttempt {
            job_id,
            attempt_number,
            started_at,
            finished_at,
            success: true,
            worker_id: Some(worker_id.into()),
            error_type: None,
            error_message: None,
        })
    }

    pub fn failure(
        job_id: Uuid,
        attempt_number: u32,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        worker_id: impl Into<String>,
        error_type: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        Self::new(NewJobAttempt {
            job_id,
            attempt_number,
            started_at,
            finished_at,
            success: false,
            worker_id: Some(worker_id.into()),
            error_type: Some(error_type.into()),
            error_message: Some(error_message.into()),
        })
    }
}
