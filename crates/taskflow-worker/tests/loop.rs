use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use taskflow_core::commands::ScheduleJobCommand;
use taskflow_core::job::JobState;
use taskflow_core::use_cases::{GetJobById, ScheduleJob};
use taskflow_testing::InMemoryUnitOfWorkFactory;
use taskflow_worker::handler::{Handler, HandlerError};
use taskflow_worker::{run_worker_loop, HandlerRegistry};

struct AlwaysSucceeds;

#[async_trait]
impl Handler for AlwaysSucceeds {
    async fn call(&self, _payload: Value) -> Result<(), HandlerError> {
        Ok(())
    }
}

struct AlwaysFails;

#[async_trait]
impl Handler for AlwaysFails {
    async fn call(&self, _payload: Value) -> Result<(), HandlerError> {
        Err(HandlerError::new("boom", "simulated failure"))
    }
}

#[tokio::test]
async fn worker_loop_completes_a_successful_job_then_stops() {
    let factory = Arc::new(InMemoryUnitOfWorkFactory::new());
    let schedule = ScheduleJob::new(factory.clone());
    let get = GetJobById::new(factory.clone());

    let mut cmd = ScheduleJobCommand::new("noop");
    cmd.payload = json!({});
    let created = schedule.execute(cmd).await.unwrap();

    let handlers = HandlerRegistry::new().register("noop", Arc::new(AlwaysSucceeds));
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    let loop_handle = tokio::spawn(run_worker_loop(
        factory.clone(),
        "default",
        handlers,
        shutdown,
        Duration::from_millis(5),
    ));

    // Give the loop a moment to pick up and finish the job, then stop it.
    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_clone.store(true, Ordering::Relaxed);
    tokio::time::timeout(Duration::from_secs(1), loop_handle)
        .await
        .expect("loop should stop promptly after shutdown is requested")
        .unwrap();

    let job = get.execute(created.id).await.unwrap();
    assert_eq!(job.state, JobState::Succeeded);
}

#[tokio::test]
async fn worker_loop_fails_job_without_a_registered_handler() {
    let factory = Arc::new(InMemoryUnitOfWorkFactory::new());
    let schedule = ScheduleJob::new(factory.clone());
    let get = GetJobById::new(factory.clone());

    let mut cmd = ScheduleJobCommand::new("mystery");
    cmd.max_attempts = 1;
    let created = schedule.execute(cmd).await.unwrap();

    let handlers = HandlerRegistry::new();
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    let loop_handle = tokio::spawn(run_worker_loop(
        factory.clone(),
        "default",
        handlers,
        shutdown,
        Duration::from_millis(5),
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_clone.store(true, Ordering::Relaxed);
    tokio::time::timeout(Duration::from_secs(1), loop_handle)
        .await
        .expect("loop should stop promptly after shutdown is requested")
        .unwrap();

    let job = get.execute(created.id).await.unwrap();
    assert_eq!(job.state, JobState::Dead);

    let attempts = factory.attempts_for(created.id).await;
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].error_type.as_deref(), Some("no_handler"));
}

#[tokio::test]
async fn worker_loop_retries_then_dead_letters_on_repeated_failure() {
    let factory = Arc::new(InMemoryUnitOfWorkFactory::new());
    let schedule = ScheduleJob::new(factory.clone());
    let get = GetJobById::new(factory.clone());

    let mut cmd = ScheduleJobCommand::new("flaky");
    cmd.max_attempts = 1;
    let created = schedule.execute(cmd).await.unwrap();

    let handlers = HandlerRegistry::new().register("flaky", Arc::new(AlwaysFails));
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_clone = shutdown.clone();

    let loop_handle = tokio::spawn(run_worker_loop(
        factory.clone(),
        "default",
        handlers,
        shutdown,
        Duration::from_millis(5),
    ));

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown_clone.store(true, Ordering::Relaxed);
    tokio::time::timeout(Duration::from_secs(1), loop_handle)
        .await
        .expect("loop should stop promptly after shutdown is requested")
        .unwrap();

    let job = get.execute(created.id).await.unwrap();
    assert_eq!(job.state, JobState::Dead);
}
