use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::attempt::JobAttempt;
use crate::error::{TaskFlowError, TaskFlowResult};
use crate::job::Job;
use crate::ports::{UnitOfWork, UnitOfWorkFactory};

/// Records a successful execution: transitions the job to SUCCEEDED and
/// inserts a matching success attempt row, atomically.
///
/// `attempt_number` is `job.attempts` as it stands after the prior
/// `AcquireNextJob` call incremented it — this use case never increments
/// the counter itself.
pub struct CompleteJob<F: UnitOfWorkFactory> {
    uow_factory: Arc<F>,
}

impl<F: UnitOfWorkFactory> CompleteJob<F> {
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }

    pub async fn execute(
        &self,
        job_id: Uuid,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        worker_id: &str,
    ) -> TaskFlowResult<Job> {
        let worker_id = worker_id.to_string();

        let stored = self
            .uow_factory
            .with_transaction(move |uow| async move {
                let job = uow
                    .jobs()
                    .get_by_id(job_id)
                    .await?
                    .ok_or_else(|| TaskFlowError::not_found(format!("job {job_id}")))?;

                let attempt_number = job.attempts;
                let updated = job.mark_succeeded(finished_at);
                let stored = uow.jobs().update(updated).await?;

                let attempt = JobAttempt::success(
                    job_id,
                    attempt_number,
                    started_at,
                    finished_at,
                    worker_id,
                );
                uow.job_attempts().insert(attempt).await?;

                Ok(stored)
            })
            .await?;

        info!(job_id = %stored.id, "job succeeded");
        Ok(stored)
    }
}
