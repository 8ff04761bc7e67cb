//! In-memory fakes of `taskflow-core`'s repository ports.
//!
//! Use-case-level tests substitute these fakes for a real database so they
//! run fast and without any external service. They are intentionally
//! coarse-grained — a single `tokio::sync::Mutex` around the whole store
//! stands in for a real transaction's isolation, which is adequate for
//! exercising use-case orchestration but not a substitute for the
//! `FOR UPDATE SKIP LOCKED` concurrency tests that belong in
//! `taskflow-postgres`.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use taskflow_core::attempt::JobAttempt;
use taskflow_core::error::{TaskFlowError, TaskFlowResult};
use taskflow_core::job::Job;
use taskflow_core::ports::{JobAttemptRepository, JobRepository, UnitOfWork, UnitOfWorkFactory};

#[derive(Debug, Clone, Default)]
struct Store {
    jobs: HashMap<Uuid, Job>,
    attempts: HashMap<Uuid, Vec<JobAttempt>>,
}

/// A single in-memory "transaction": a working copy of the store that is
/// only written back to the shared state if the closure it was handed to
/// returns `Ok`.
pub struct InMemoryUnitOfWork {
    store: Store,
}

#[async_trait]
impl JobRepository for InMemoryUnitOfWork {
    async fn insert(&mut self, job: Job) -> TaskFlowResult<Job> {
        if self.store.jobs.contains_key(&job.id) {
            return Err(TaskFlowError::job_already_exists(job.id));
        }
        self.store.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn get_by_id(&mut self, id: Uuid) -> TaskFlowResult<Option<Job>> {
        Ok(self.store.jobs.get(&id).cloned())
    }

    async fn update(&mut self, job: Job) -> TaskFlowResult<Job> {
        if !self.store.jobs.contains_key(&job.id) {
            return Err(TaskFlowError::repository(
                format!("job {} does not exist", job.id),
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing row"),
            ));
        }
        self.store.jobs.insert(job.id, job.clone());
        Ok(job)
    }

    async fn acquire_next_due_job(
        &mut self,
        queue: &str,
        now: DateTime<Utc>,
        worker_id: &str,
    ) -> TaskFlowResult<Option<Job>> {
        let candidate_id = self
            .store
            .jobs
            .values()
            .filter(|job| job.queue == queue && job.is_runnable_at(now))
            .min_by(|a, b| {
                // priority DESC, created_at ASC
                b.priority
                    .cmp(&a.priority)
                    .then_with(|| a.created_at.cmp(&b.created_at))
            })
            .map(|job| job.id);

        let Some(id) = candidate_id else {
            return Ok(None);
        };

        let job = self.store.jobs.get(&id).expect("just located by id").clone();
        let acquired = job.mark_running(worker_id, now);
        self.store.jobs.insert(id, acquired.clone());
        Ok(Some(acquired))
    }
}

#[async_trait]
impl JobAttemptRepository for InMemoryUnitOfWork {
    async fn insert(&mut self, attempt: JobAttempt) -> TaskFlowResult<JobAttempt> {
        self.store
            .attempts
            .entry(attempt.job_id)
            .or_default()
            .push(attempt.clone());
        Ok(attempt)
    }

    async fn list_for_job(&mut self, job_id: Uuid) -> TaskFlowResult<Vec<JobAttempt>> {
        let mut attempts = self.store.attempts.get(&job_id).cloned().unwrap_or_default();
        attempts.sort_by_key(|a| a.attempt_number);
        Ok(attempts)
    }
}

#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    fn jobs(&mut self) -> &mut dyn JobRepository {
        self
    }

    fn job_attempts(&mut self) -> &mut dyn JobAttemptRepository {
        self
    }
}

/// Shared backing store behind an [`InMemoryUnitOfWork`]. Clone it to hand
/// the same backing data to multiple use cases in a test.
#[derive(Clone, Default)]
pub struct InMemoryUnitOfWorkFactory {
    store: Arc<Mutex<Store>>,
}

impl InMemoryUnitOfWorkFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot all jobs currently in the store, for assertions in tests
    /// that don't want to go through `GetJobById`.
    pub async fn all_jobs(&self) -> Vec<Job> {
        self.store.lock().await.jobs.values().cloned().collect()
    }

    pub async fn attempts_for(&self, job_id: Uuid) -> Vec<JobAttempt> {
        let mut attempts = self
            .store
            .lock()
            .await
            .attempts
            .get(&job_id)
            .cloned()
            .unwrap_or_default();
        attempts.sort_by_key(|a| a.attempt_number);
        attempts
    }
}

#[async_trait]
impl UnitOfWorkFactory for InMemoryUnitOfWorkFactory {
    type Uow = InMemoryUnitOfWork;

    async fn with_transaction<F, Fut, T>(&self, f: F) -> TaskFlowResult<T>
    where
        F: FnOnce(&mut Self::Uow) -> Fut + Send,
        Fut: Future<Output = TaskFlowResult<T>> + Send,
        T: Send,
    {
        let mut guard = self.store.lock().await;
        let mut uow = InMemoryUnitOfWork {
            store: guard.clone(),
        };

        let result = f(&mut uow).await;

        if result.is_ok() {
            *guard = uow.store;
        }

        result
    }
}
