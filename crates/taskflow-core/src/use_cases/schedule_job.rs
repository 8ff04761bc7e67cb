use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::commands::ScheduleJobCommand;
use crate::error::TaskFlowResult;
use crate::job::Job;
use crate::ports::{UnitOfWork, UnitOfWorkFactory};

/// Validates a [`ScheduleJobCommand`], builds a fresh [`Job`], inserts it,
/// and returns the stored value.
pub struct ScheduleJob<F: UnitOfWorkFactory> {
    uow_factory: Arc<F>,
}

impl<F: UnitOfWorkFactory> ScheduleJob<F> {
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }

    pub async fn execute(&self, command: ScheduleJobCommand) -> TaskFlowResult<Job> {
        let resolved = command.validate()?;
        let now = Utc::now();
        let job = Job::new(resolved.new_job, now);

        let stored = self
            .uow_factory
            .with_transaction(|uow| {
                let job = job.clone();
                async move { uow.jobs().insert(job).await }
            })
            .await?;

        info!(job_id = %stored.id, queue = %stored.queue, name = %stored.name, "job scheduled");
        Ok(stored)
    }
}
