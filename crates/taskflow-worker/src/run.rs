//! The worker loop itself. Grounded in `original_source/worker/runner.py`'s
//! `worker_loop`: acquire, sleep if idle, dispatch by name, record outcome,
//! repeat — generalized here to a generic [`UnitOfWorkFactory`] so it runs
//! identically against Postgres or the in-memory fakes.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};
use uuid::Uuid;

use taskflow_core::use_cases::{AcquireNextJob, CompleteJob, FailJob};
use taskflow_core::ports::UnitOfWorkFactory;

use crate::handler::HandlerRegistry;

/// How long to sleep between polls when a queue has nothing due.
pub const DEFAULT_IDLE_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Runs the worker loop against `queue` until `shutdown` is set. Returns
/// once the current iteration (acquire-dispatch-record, or the idle sleep)
/// finishes — never mid-handler.
pub async fn run_worker_loop<F>(
    factory: Arc<F>,
    queue: &str,
    handlers: HandlerRegistry,
    shutdown: Arc<AtomicBool>,
    idle_poll_interval: Duration,
) where
    F: UnitOfWorkFactory + 'static,
{
    let worker_id = format!("worker-{}", Uuid::new_v4());
    let acquire = AcquireNextJob::new(factory.clone());
    let complete = CompleteJob::new(factory.clone());
    let fail = FailJob::new(factory.clone());

    info!(%worker_id, %queue, "worker started");

    while !shutdown.load(Ordering::Relaxed) {
        let job = match acquire.execute(queue, &worker_id).await {
            Ok(job) => job,
            Err(err) => {
                error!(%worker_id, %queue, error = %err, "failed to acquire next job");
                tokio::time::sleep(idle_poll_interval).await;
                continue;
            }
        };

        let Some(job) = job else {
            tokio::time::sleep(idle_poll_interval).await;
            continue;
        };

        info!(%worker_id, job_id = %job.id, job_name = %job.name, "processing job");
        let started_at = Utc::now();

        let outcome = match handlers.get(&job.name) {
            Some(handler) => handler.call(job.payload.clone()).await,
            None => Err(crate::handler::HandlerError::new(
                "no_handler",
                format!("no handler registered for job name '{}'", job.name),
            )),
        };

        let finished_at = Utc::now();

        match outcome {
            Ok(()) => {
                if let Err(err) = complete.execute(job.id, started_at, finished_at, &worker_id).await {
                    error!(job_id = %job.id, error = %err, "failed to record job completion");
                }
            }
            Err(handler_err) => {
                warn!(job_id = %job.id, error = %handler_err, "job handler failed");
                if let Err(err) = fail
                    .execute(
                        job.id,
                        started_at,
                        finished_at,
                        &worker_id,
                        &handler_err.error_type,
                        &handler_err.message,
                    )
                    .await
                {
                    error!(job_id = %job.id, error = %err, "failed to record job failure");
                }
            }
        }
    }

    info!(%worker_id, %queue, "worker shutting down");
}
