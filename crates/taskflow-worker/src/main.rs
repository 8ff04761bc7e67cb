use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use envconfig::Envconfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use taskflow_postgres::PgUnitOfWorkFactory;
use taskflow_worker::config::Config;
use taskflow_worker::handlers::{ProcessImage, SendEmail};
use taskflow_worker::{run_worker_loop, HandlerRegistry};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = Config::init_from_env().expect("failed to load configuration from env");

    let pool = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let factory = Arc::new(PgUnitOfWorkFactory::new(pool));

    let handlers = HandlerRegistry::new()
        .register("send-email", Arc::new(SendEmail))
        .register("process-image", Arc::new(ProcessImage));

    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_for_signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received, finishing current iteration");
            shutdown_for_signal.store(true, Ordering::Relaxed);
        }
    });

    info!(
        queue = %config.queue,
        app_name = %config.app_name,
        environment = %config.environment,
        "starting taskflow worker"
    );

    run_worker_loop(
        factory,
        &config.queue,
        handlers,
        shutdown,
        Duration::from_millis(config.idle_poll_interval_ms),
    )
    .await;

    info!("worker exited cleanly");
}
