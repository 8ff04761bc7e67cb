//! Port traits the application layer depends on. The relational adapter in
//! `taskflow-postgres` is the only production implementation; tests
//! substitute the in-memory fakes in `taskflow-testing`.
//!
//! Grounded in `original_source/domain/ports/{job_repository,
//! job_attempt_repository}.py` and `application/uow.py`, expressed as
//! `async_trait` traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::attempt::JobAttempt;
use crate::error::TaskFlowResult;
use crate::job::Job;

/// Persistence contract for jobs, most notably `acquire_next_due_job`'s
/// atomicity requirement: one call, one job, to one caller.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Persist a new job. Must fail with `TaskFlowError::JobAlreadyExists`
    /// on a primary-key collision.
    async fn insert(&mut self, job: Job) -> TaskFlowResult<Job>;

    /// Fetch a job by id, or `None` if it does not exist. Never partial.
    async fn get_by_id(&mut self, id: Uuid) -> TaskFlowResult<Option<Job>>;

    /// Write all mutable columns of an existing job. Fails with
    /// `TaskFlowError::Repository` if the row no longer exists.
    async fn update(&mut self, job: Job) -> TaskFlowResult<Job>;

    /// The atomic core: select the single highest-priority due job in
    /// `queue`, lock it (skipping rows concurrently locked elsewhere),
    /// transition it to RUNNING, and return the updated value. Returns
    /// `None` when nothing is due. Must never hand the same job to two
    /// concurrent callers.
    async fn acquire_next_due_job(
        &mut self,
        queue: &str,
        now: DateTime<Utc>,
        worker_id: &str,
    ) -> TaskFlowResult<Option<Job>>;
}

/// Persistence contract for the append-only attempt history.
#[async_trait]
pub trait JobAttemptRepository: Send + Sync {
    /// Persist a new attempt row.
    async fn insert(&mut self, attempt: JobAttempt) -> TaskFlowResult<JobAttempt>;

    /// All attempts for a job, ordered by `attempt_number` ascending. Empty
    /// when the job has never been attempted.
    async fn list_for_job(&mut self, job_id: Uuid) -> TaskFlowResult<Vec<JobAttempt>>;
}

/// A scoped transactional boundary bundling both repositories.
///
/// Every use case opens exactly one `UnitOfWork` so that a job mutation and
/// its attempt insertion commit atomically. Implementations commit on a
/// clean `Ok` return from the closure passed to [`UnitOfWorkFactory::begin`]
/// and roll back on `Err` — see that trait for the actual scoping mechanism,
/// since Rust has no `async` equivalent of Python's `async with`.
#[async_trait]
pub trait UnitOfWork: Send {
    fn jobs(&mut self) -> &mut dyn JobRepository;
    fn job_attempts(&mut self) -> &mut dyn JobAttemptRepository;
}

/// Opens a new [`UnitOfWork`]. This is the Rust shape of the source's
/// `uow_factory: Callable[[], UnitOfWork]` constructor argument threaded
/// through every use case (`original_source/application/use_cases/*.py`).
///
/// Commit-or-rollback is the factory's responsibility: `with_transaction`
/// commits when `f` returns `Ok`, rolls back when it returns `Err`, and
/// always releases the underlying connection/session — mirroring
/// `UnitOfWork.__aenter__`/`__aexit__` without needing an async-drop.
#[async_trait]
pub trait UnitOfWorkFactory: Send + Sync {
    type Uow: UnitOfWork;

    async fn with_transaction<F, Fut, T>(&self, f: F) -> TaskFlowResult<T>
    where
        F: FnOnce(&mut Self::Uow) -> Fut + Send,
        Fut: std::future::Future<Output = TaskFlowResult<T>> + Send,
        T: Send;
}
