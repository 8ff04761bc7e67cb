use std::sync::Arc;

use taskflow_core::ports::UnitOfWorkFactory;
use taskflow_core::use_cases::{GetJobById, ScheduleJob};

pub struct AppState<F: UnitOfWorkFactory> {
    pub schedule_job: Arc<ScheduleJob<F>>,
    pub get_job_by_id: Arc<GetJobById<F>>,
}

impl<F: UnitOfWorkFactory> Clone for AppState<F> {
    fn clone(&self) -> Self {
        AppState {
            schedule_job: self.schedule_job.clone(),
            get_job_by_id: self.get_job_by_id.clone(),
        }
    }
}

impl<F: UnitOfWorkFactory + 'static> AppState<F> {
    pub fn new(factory: Arc<F>) -> Self {
        AppState {
            schedule_job: Arc::new(ScheduleJob::new(factory.clone())),
            get_job_by_id: Arc::new(GetJobById::new(factory)),
        }
    }
}
