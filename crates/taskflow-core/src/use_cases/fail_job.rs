use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::attempt::JobAttempt;
use crate::error::{TaskFlowError, TaskFlowResult};
use crate::job::{Job, JobState};
use crate::ports::{UnitOfWork, UnitOfWorkFactory};

/// Records a failed execution: asks the job's own retry policy whether to
/// schedule a retry or dead-letter it, and inserts a matching failure
/// attempt row, atomically.
pub struct FailJob<F: UnitOfWorkFactory> {
    uow_factory: Arc<F>,
}

impl<F: UnitOfWorkFactory> FailJob<F> {
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn execute(
        &self,
        job_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        worker_id: &str,
        error_type: &str,
        error_message: &str,
    ) -> TaskFlowResult<Job> {
        let worker_id = worker_id.to_string();
        let error_type = error_type.to_string();
        let error_message = error_message.to_string();

        let stored = self
            .uow_factory
            .with_transaction(move |uow| async move {
                let job = uow
                    .jobs()
                    .get_by_id(job_id)
                    .await?
                    .ok_or_else(|| TaskFlowError::not_found(format!("job {job_id}")))?;

                let attempt_number = job.attempts;
                let updated = job.apply_failure(finished_at);
                let stored = uow.jobs().update(updated).await?;

                let attempt = JobAttempt::failure(
                    job_id,
                    attempt_number,
                    started_at,
                    finished_at,
                    worker_id,
                    error_type,
                    error_message,
                );
                uow.job_attempts().insert(attempt).await?;

                Ok(stored)
            })
            .await?;

        match stored.state {
            JobState::Dead => warn!(job_id = %stored.id, "job exhausted retries, moved to DEAD"),
            JobState::Scheduled => {
                warn!(job_id = %stored.id, next_run_at = ?stored.next_run_at, "job failed, retry scheduled")
            }
            _ => {}
        }

        Ok(stored)
    }
}
