//! Environment configuration, `TASKFLOW_`-prefixed. Grounded in the pack's
//! `hook-janitor::config::Config` (`envconfig`, per-field `#[envconfig]`
//! attributes with defaults).

use envconfig::Envconfig;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "TASKFLOW_DATABASE_URL")]
    pub database_url: String,

    #[envconfig(from = "TASKFLOW_WORKER_QUEUE", default = "default")]
    pub queue: String,

    #[envconfig(from = "TASKFLOW_WORKER_POLL_INTERVAL_MS", default = "1000")]
    pub idle_poll_interval_ms: u64,

    #[envconfig(from = "TASKFLOW_DB_MAX_CONNECTIONS", default = "5")]
    pub db_max_connections: u32,

    #[envconfig(from = "TASKFLOW_APP_NAME", default = "taskflow")]
    pub app_name: String,

    #[envconfig(from = "TASKFLOW_ENVIRONMENT", default = "local")]
    pub environment: String,

    /// Accepted for compatibility with deployments that set it; nothing in
    /// this crate reads it today.
    #[envconfig(from = "TASKFLOW_BROKER_URL", default = "redis://localhost:6379/0")]
    pub broker_url: String,
}
