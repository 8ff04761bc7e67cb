//! Application use cases. Each one opens exactly one [`UnitOfWork`] (spec
//! §4.5/§4.6) so that a job mutation and its attempt insert commit
//! atomically. Grounded in `original_source/application/use_cases/*.py`.

mod acquire_next_job;
mod complete_job;
mod fail_job;
mod get_job_by_id;
mod schedule_job;

pub use acquire_next_job::AcquireNextJob;
pub use complete_job::CompleteJob;
pub use fail_job::FailJob;
pub use get_job_by_id::GetJobById;
pub use schedule_job::ScheduleJob;
