use std::sync::Arc;

use chrono::Utc;
use tracing::debug;

use crate::error::TaskFlowResult;
use crate::job::Job;
use crate::ports::{UnitOfWork, UnitOfWorkFactory};

/// Atomically claims the next due job in a queue for `worker_id`, or
/// returns `None` if nothing is runnable right now.
pub struct AcquireNextJob<F: UnitOfWorkFactory> {
    uow_factory: Arc<F>,
}

impl<F: UnitOfWorkFactory> AcquireNextJob<F> {
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }

    pub async fn execute(&self, queue: &str, worker_id: &str) -> TaskFlowResult<Option<Job>> {
        let now = Utc::now();
        let queue = queue.to_string();
        let worker_id = worker_id.to_string();
        let queue_for_log = queue.clone();
        let worker_id_for_log = worker_id.clone();

        let job = self
            .uow_factory
            .with_transaction(move |uow| async move {
                uow.jobs()
                    .acquire_next_due_job(&queue, now, &worker_id)
                    .await
            })
            .await?;

        if let Some(job) = &job {
            debug!(job_id = %job.id, queue = %queue_for_log, worker_id = %worker_id_for_log, attempts = job.attempts, "job acquired");
        }

        Ok(job)
    }
}
