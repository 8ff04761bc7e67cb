//! Integration tests against a real Postgres instance, covering what the
//! in-memory fakes in `taskflow-testing` can't: row-level locking semantics.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

use taskflow_core::job::{Job, NewJob};
use taskflow_core::ports::{JobRepository, UnitOfWork, UnitOfWorkFactory};
use taskflow_core::retry::RetryPolicy;
use taskflow_postgres::PgUnitOfWorkFactory;

fn new_job(name: &str, queue: &str, priority: i16) -> Job {
    Job::new(
        NewJob {
            id: None,
            name: name.to_string(),
            payload: json!({}),
            queue: queue.to_string(),
            tenant_id: None,
            priority,
            scheduled_at: None,
            max_attempts: 3,
            retry_policy: RetryPolicy::exponential(10),
        },
        Utc::now(),
    )
}

#[sqlx::test(migrations = "../migrations")]
async fn insert_then_get_by_id_round_trips(db: PgPool) {
    let factory = PgUnitOfWorkFactory::new(db);
    let job = new_job("send-email", "default", 0);
    let job_id = job.id;

    factory
        .with_transaction(|uow| {
            let job = job.clone();
            async move { uow.jobs().insert(job).await }
        })
        .await
        .unwrap();

    let fetched = factory
        .with_transaction(|uow| async move { uow.jobs().get_by_id(job_id).await })
        .await
        .unwrap()
        .expect("job should exist");

    assert_eq!(fetched.id, job_id);
    assert_eq!(fetched.name, "send-email");
    assert_eq!(fetched.attempts, 0);
}

#[sqlx::test(migrations = "../migrations")]
async fn get_by_id_returns_none_for_unknown_job(db: PgPool) {
    let factory = PgUnitOfWorkFactory::new(db);
    let fetched = factory
        .with_transaction(|uow| async move { uow.jobs().get_by_id(Uuid::new_v4()).await })
        .await
        .unwrap();

    assert!(fetched.is_none());
}

#[sqlx::test(migrations = "../migrations")]
async fn inserting_duplicate_id_fails_with_job_already_exists(db: PgPool) {
    let factory = PgUnitOfWorkFactory::new(db);
    let job = new_job("send-email", "default", 0);

    factory
        .with_transaction(|uow| {
            let job = job.clone();
            async move { uow.jobs().insert(job).await }
        })
        .await
        .unwrap();

    let err = factory
        .with_transaction(|uow| {
            let job = job.clone();
            async move { uow.jobs().insert(job).await }
        })
        .await
        .unwrap_err();

    assert_eq!(err.kind(), taskflow_core::error::ErrorKind::JobAlreadyExists);
}

#[sqlx::test(migrations = "../migrations")]
async fn acquire_next_due_job_respects_priority_and_age(db: PgPool) {
    let factory = PgUnitOfWorkFactory::new(db);

    let low = new_job("low", "default", 0);
    let high_a = new_job("high-a", "default", 5);
    let high_b = new_job("high-b", "default", 5);

    for job in [&low, &high_a, &high_b] {
        let job = job.clone();
        factory
            .with_transaction(|uow| async move { uow.jobs().insert(job).await })
            .await
            .unwrap();
    }

    let now = Utc::now();
    let first = factory
        .with_transaction(|uow| async move { uow.jobs().acquire_next_due_job("default", now, "w1").await })
        .await
        .unwrap()
        .expect("a job should be claimable");
    let second = factory
        .with_transaction(|uow| async move { uow.jobs().acquire_next_due_job("default", now, "w1").await })
        .await
        .unwrap()
        .expect("a job should be claimable");
    let third = factory
        .with_transaction(|uow| async move { uow.jobs().acquire_next_due_job("default", now, "w1").await })
        .await
        .unwrap()
        .expect("a job should be claimable");

    assert_eq!(first.id, high_a.id);
    assert_eq!(second.id, high_b.id);
    assert_eq!(third.id, low.id);
    assert_eq!(first.attempts, 1);
    assert_eq!(first.locked_by.as_deref(), Some("w1"));

    let fourth = factory
        .with_transaction(|uow| async move { uow.jobs().acquire_next_due_job("default", now, "w1").await })
        .await
        .unwrap();
    assert!(fourth.is_none());
}

/// N concurrent acquisitions against M runnable jobs must yield exactly
/// `min(N, M)` distinct jobs and never hand the same job to two callers —
/// the property `FOR UPDATE SKIP LOCKED` exists to guarantee.
#[sqlx::test(migrations = "../migrations")]
async fn concurrent_acquisition_never_double_claims(db: PgPool) {
    let factory = Arc::new(PgUnitOfWorkFactory::new(db));

    let job_count = 10;
    let mut job_ids = Vec::with_capacity(job_count);
    for i in 0..job_count {
        let job = new_job(&format!("job-{i}"), "default", 0);
        job_ids.push(job.id);
        let job_for_insert = job.clone();
        factory
            .with_transaction(|uow| async move { uow.jobs().insert(job_for_insert).await })
            .await
            .unwrap();
    }

    let worker_count = 25;
    let now = Utc::now();
    let mut handles = Vec::with_capacity(worker_count);
    for i in 0..worker_count {
        let factory = factory.clone();
        let worker_id = format!("w{i}");
        handles.push(tokio::spawn(async move {
            factory
                .with_transaction(|uow| {
                    let worker_id = worker_id.clone();
                    async move { uow.jobs().acquire_next_due_job("default", now, &worker_id).await }
                })
                .await
                .unwrap()
        }));
    }

    let mut claimed = Vec::new();
    for handle in handles {
        if let Some(job) = handle.await.unwrap() {
            claimed.push(job.id);
        }
    }

    assert_eq!(claimed.len(), job_count);
    let distinct: HashSet<_> = claimed.iter().collect();
    assert_eq!(distinct.len(), job_count, "no job should be claimed twice");
    for id in &job_ids {
        assert!(claimed.contains(id));
    }
}

#[sqlx::test(migrations = "../migrations")]
async fn failed_transaction_rolls_back(db: PgPool) {
    let factory = PgUnitOfWorkFactory::new(db);
    let job = new_job("send-email", "default", 0);
    let job_id = job.id;

    let result = factory
        .with_transaction(|uow| {
            let job = job.clone();
            async move {
                uow.jobs().insert(job).await?;
                Err(taskflow_core::error::TaskFlowError::internal("boom")) as taskflow_core::error::TaskFlowResult<Job>
            }
        })
        .await;
    assert!(result.is_err());

    let fetched = factory
        .with_transaction(|uow| async move { uow.jobs().get_by_id(job_id).await })
        .await
        .unwrap();
    assert!(fetched.is_none(), "insert should have been rolled back");
}
