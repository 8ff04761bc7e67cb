//! PostgreSQL adapter for `taskflow-core`'s repository ports.
//!
//! Claiming does the state transition directly inside the
//! `UPDATE ... RETURNING` under `FOR UPDATE SKIP LOCKED`, rather than
//! load-mutate-save, so a claim is one round trip under lock.
//!
//! # Schema
//!
//! See `migrations/` for the authoritative DDL. Summary:
//!
//! ```sql
//! CREATE TYPE job_state AS ENUM
//!     ('PENDING', 'SCHEDULED', 'RUNNING', 'SUCCEEDED', 'FAILED', 'DEAD');
//! CREATE TYPE retry_strategy AS ENUM ('FIXED', 'EXPONENTIAL');
//!
//! CREATE TABLE jobs (
//!     id UUID PRIMARY KEY,
//!     queue TEXT NOT NULL,
//!     name TEXT NOT NULL,
//!     tenant_id TEXT,
//!     payload JSONB NOT NULL,
//!     state job_state NOT NULL,
//!     priority SMALLINT NOT NULL,
//!     created_at TIMESTAMPTZ NOT NULL,
//!     updated_at TIMESTAMPTZ NOT NULL,
//!     scheduled_at TIMESTAMPTZ,
//!     next_run_at TIMESTAMPTZ,
//!     last_run_at TIMESTAMPTZ,
//!     attempts INTEGER NOT NULL,
//!     max_attempts INTEGER NOT NULL,
//!     archived BOOLEAN NOT NULL DEFAULT FALSE,
//!     locked_by TEXT,
//!     locked_at TIMESTAMPTZ,
//!     retry_strategy retry_strategy NOT NULL,
//!     retry_base_delay_seconds INTEGER NOT NULL
//! );
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use taskflow_core::attempt::JobAttempt;
use taskflow_core::error::{TaskFlowError, TaskFlowResult};
use taskflow_core::job::{Job, JobState};
use taskflow_core::ports::{JobAttemptRepository, JobRepository, UnitOfWork, UnitOfWorkFactory};
use taskflow_core::retry::{RetryPolicy, RetryStrategy};

fn job_state_to_str(state: JobState) -> &'static str {
    match state {
        JobState::Pending => "PENDING",
        JobState::Scheduled => "SCHEDULED",
        JobState::Running => "RUNNING",
        JobState::Succeeded => "SUCCEEDED",
        JobState::Failed => "FAILED",
        JobState::Dead => "DEAD",
    }
}

fn job_state_from_str(s: &str) -> TaskFlowResult<JobState> {
    match s {
        "PENDING" => Ok(JobState::Pending),
        "SCHEDULED" => Ok(JobState::Scheduled),
        "RUNNING" => Ok(JobState::Running),
        "SUCCEEDED" => Ok(JobState::Succeeded),
        "FAILED" => Ok(JobState::Failed),
        "DEAD" => Ok(JobState::Dead),
        other => Err(TaskFlowError::internal(format!("unknown job state in database: {other}"))),
    }
}

fn retry_strategy_to_str(strategy: RetryStrategy) -> &'static str {
    match strategy {
        RetryStrategy::Fixed => "FIXED",
        RetryStrategy::Exponential => "EXPONENTIAL",
    }
}

fn retry_strategy_from_str(s: &str) -> TaskFlowResult<RetryStrategy> {
    match s {
        "FIXED" => Ok(RetryStrategy::Fixed),
        "EXPONENTIAL" => Ok(RetryStrategy::Exponential),
        other => Err(TaskFlowError::internal(format!(
            "unknown retry strategy in database: {other}"
        ))),
    }
}

fn row_to_job(row: PgRow) -> TaskFlowResult<Job> {
    let state: String = row.try_get("state").map_err(db_err)?;
    let strategy: String = row.try_get("retry_strategy").map_err(db_err)?;
    let attempts: i32 = row.try_get("attempts").map_err(db_err)?;
    let max_attempts: i32 = row.try_get("max_attempts").map_err(db_err)?;
    let base_delay_seconds: i32 = row.try_get("retry_base_delay_seconds").map_err(db_err)?;

    Ok(Job {
        id: row.try_get("id").map_err(db_err)?,
        queue: row.try_get("queue").map_err(db_err)?,
        name: row.try_get("name").map_err(db_err)?,
        tenant_id: row.try_get("tenant_id").map_err(db_err)?,
        payload: row.try_get("payload").map_err(db_err)?,
        state: job_state_from_str(&state)?,
        priority: row.try_get("priority").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
        updated_at: row.try_get("updated_at").map_err(db_err)?,
        scheduled_at: row.try_get("scheduled_at").map_err(db_err)?,
        next_run_at: row.try_get("next_run_at").map_err(db_err)?,
        last_run_at: row.try_get("last_run_at").map_err(db_err)?,
        attempts: attempts as u32,
        max_attempts: max_attempts as u32,
        archived: row.try_get("archived").map_err(db_err)?,
        locked_by: row.try_get("locked_by").map_err(db_err)?,
        locked_at: row.try_get("locked_at").map_err(db_err)?,
        retry_policy: RetryPolicy::new(retry_strategy_from_str(&strategy)?, base_delay_seconds as u32),
    })
}

fn row_to_attempt(row: PgRow) -> TaskFlowResult<JobAttempt> {
    let attempt_number: i32 = row.try_get("attempt_number").map_err(db_err)?;
    Ok(JobAttempt {
        id: row.try_get("id").map_err(db_err)?,
        job_id: row.try_get("job_id").map_err(db_err)?,
        attempt_number: attempt_number as u32,
        started_at: row.try_get("started_at").map_err(db_err)?,
        finished_at: row.try_get("finished_at").map_err(db_err)?,
        success: row.try_get("success").map_err(db_err)?,
        error_type: row.try_get("error_type").map_err(db_err)?,
        error_message: row.try_get("error_message").map_err(db_err)?,
        worker_id: row.try_get("worker_id").map_err(db_err)?,
    })
}

fn db_err(err: sqlx::Error) -> TaskFlowError {
    TaskFlowError::repository("database operation failed", err)
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// A single database transaction, bundling both repositories the way
/// [`taskflow_core::ports::UnitOfWork`] requires. Holds a
/// `Transaction<'static, Postgres>` — `sqlx::Pool::begin` already hands back
/// a `'static` transaction, so no self-referential lifetime juggling is
/// needed here.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl JobRepository for PgUnitOfWork {
    async fn insert(&mut self, job: Job) -> TaskFlowResult<Job> {
        let row = sqlx::query(
            r#"
            INSERT INTO jobs (
                id, queue, name, tenant_id, payload, state, priority,
                created_at, updated_at, scheduled_at, next_run_at, last_run_at,
                attempts, max_attempts, archived, locked_by, locked_at,
                retry_strategy, retry_base_delay_seconds
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.queue)
        .bind(&job.name)
        .bind(&job.tenant_id)
        .bind(&job.payload)
        .bind(job_state_to_str(job.state))
        .bind(job.priority)
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(job.scheduled_at)
        .bind(job.next_run_at)
        .bind(job.last_run_at)
        .bind(job.attempts as i32)
        .bind(job.max_attempts as i32)
        .bind(job.archived)
        .bind(&job.locked_by)
        .bind(job.locked_at)
        .bind(retry_strategy_to_str(job.retry_policy.strategy))
        .bind(job.retry_policy.base_delay_seconds as i32)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|err| {
            if is_unique_violation(&err) {
                TaskFlowError::job_already_exists(job.id)
            } else {
                db_err(err)
            }
        })?;

        row_to_job(row)
    }

    async fn get_by_id(&mut self, id: Uuid) -> TaskFlowResult<Option<Job>> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(db_err)?;

        row.map(row_to_job).transpose()
    }

    async fn update(&mut self, job: Job) -> TaskFlowResult<Job> {
        let row = sqlx::query(
            r#"
            UPDATE jobs SET
                queue = $2, name = $3, tenant_id = $4, payload = $5, state = $6,
                priority = $7, updated_at = $8, scheduled_at = $9, next_run_at = $10,
                last_run_at = $11, attempts = $12, max_attempts = $13, archived = $14,
                locked_by = $15, locked_at = $16, retry_strategy = $17,
                retry_base_delay_seconds = $18
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(job.id)
        .bind(&job.queue)
        .bind(&job.name)
        .bind(&job.tenant_id)
        .bind(&job.payload)
        .bind(job_state_to_str(job.state))
        .bind(job.priority)
        .bind(job.updated_at)
        .bind(job.scheduled_at)
        .bind(job.next_run_at)
        .bind(job.last_run_at)
        .bind(job.attempts as i32)
        .bind(job.max_attempts as i32)
        .bind(job.archived)
        .bind(&job.locked_by)
        .bind(job.locked_at)
        .bind(retry_strategy_to_str(job.retry_policy.strategy))
        .bind(job.retry_policy.base_delay_seconds as i32)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        match row {
            Some(row) => row_to_job(row),
            None => Err(TaskFlowError::repository(
                format!("job {} does not exist", job.id),
                sqlx::Error::RowNotFound,
            )),
        }
    }

    async fn acquire_next_due_job(
        &mut self,
        queue: &str,
        now: DateTime<Utc>,
        worker_id: &str,
    ) -> TaskFlowResult<Option<Job>> {
        let row = sqlx::query(
            r#"
            WITH claimable AS (
                SELECT id
                FROM jobs
                WHERE queue = $1
                  AND archived = false
                  AND state IN ('PENDING', 'SCHEDULED')
                  AND (next_run_at IS NULL OR next_run_at <= $2)
                ORDER BY priority DESC, created_at ASC
                LIMIT 1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE jobs
            SET state = 'RUNNING',
                locked_by = $3,
                locked_at = $2,
                last_run_at = $2,
                attempts = attempts + 1,
                updated_at = $2
            WHERE id IN (SELECT id FROM claimable)
            RETURNING *
            "#,
        )
        .bind(queue)
        .bind(now)
        .bind(worker_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row.map(row_to_job).transpose()
    }
}

#[async_trait]
impl JobAttemptRepository for PgUnitOfWork {
    async fn insert(&mut self, attempt: JobAttempt) -> TaskFlowResult<JobAttempt> {
        let row = sqlx::query(
            r#"
            INSERT INTO job_attempts (
                id, job_id, attempt_number, started_at, finished_at, success,
                error_type, error_message, worker_id
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(attempt.id)
        .bind(attempt.job_id)
        .bind(attempt.attempt_number as i32)
        .bind(attempt.started_at)
        .bind(attempt.finished_at)
        .bind(attempt.success)
        .bind(&attempt.error_type)
        .bind(&attempt.error_message)
        .bind(&attempt.worker_id)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(db_err)?;

        row_to_attempt(row)
    }

    async fn list_for_job(&mut self, job_id: Uuid) -> TaskFlowResult<Vec<JobAttempt>> {
        let rows = sqlx::query("SELECT * FROM job_attempts WHERE job_id = $1 ORDER BY attempt_number ASC")
            .bind(job_id)
            .fetch_all(&mut *self.tx)
            .await
            .map_err(db_err)?;

        rows.into_iter().map(row_to_attempt).collect()
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    fn jobs(&mut self) -> &mut dyn JobRepository {
        self
    }

    fn job_attempts(&mut self) -> &mut dyn JobAttemptRepository {
        self
    }
}

/// Opens a [`PgUnitOfWork`] per call, committing on `Ok` and rolling back on
/// `Err`, via an explicit `pool.begin()` / `tx.commit()` scope.
#[derive(Clone)]
pub struct PgUnitOfWorkFactory {
    pool: PgPool,
}

impl PgUnitOfWorkFactory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UnitOfWorkFactory for PgUnitOfWorkFactory {
    type Uow = PgUnitOfWork;

    async fn with_transaction<F, Fut, T>(&self, f: F) -> TaskFlowResult<T>
    where
        F: FnOnce(&mut Self::Uow) -> Fut + Send,
        Fut: std::future::Future<Output = TaskFlowResult<T>> + Send,
        T: Send,
    {
        let tx = self.pool.begin().await.map_err(db_err)?;
        let mut uow = PgUnitOfWork { tx };

        match f(&mut uow).await {
            Ok(value) => {
                uow.tx.commit().await.map_err(db_err)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = uow.tx.rollback().await {
                    tracing::warn!(error = %rollback_err, "rollback failed after use case error");
                }
                Err(err)
            }
        }
    }
}
