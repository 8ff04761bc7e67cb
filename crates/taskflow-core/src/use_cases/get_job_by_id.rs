use std::sync::Arc;

use uuid::Uuid;

use crate::error::{TaskFlowError, TaskFlowResult};
use crate::job::Job;
use crate::ports::{UnitOfWork, UnitOfWorkFactory};

/// Fetches a job by id. Raises `NotFound` if it does not exist.
pub struct GetJobById<F: UnitOfWorkFactory> {
    uow_factory: Arc<F>,
}

impl<F: UnitOfWorkFactory> GetJobById<F> {
    pub fn new(uow_factory: Arc<F>) -> Self {
        Self { uow_factory }
    }

    pub async fn execute(&self, job_id: Uuid) -> TaskFlowResult<Job> {
        self.uow_factory
            .with_transaction(|uow| async move {
                uow.jobs()
                    .get_by_id(job_id)
                    .await?
                    .ok_or_else(|| TaskFlowError::not_found(format!("job {job_id}")))
            })
            .await
    }
}
