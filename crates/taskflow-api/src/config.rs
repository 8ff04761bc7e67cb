use envconfig::Envconfig;

#[derive(Envconfig)]
pub struct Config {
    #[envconfig(from = "TASKFLOW_DATABASE_URL")]
    pub database_url: String,

    #[envconfig(from = "TASKFLOW_API_HOST", default = "0.0.0.0")]
    pub host: String,

    #[envconfig(from = "TASKFLOW_API_PORT", default = "8080")]
    pub port: u16,

    #[envconfig(from = "TASKFLOW_DB_MAX_CONNECTIONS", default = "10")]
    pub db_max_connections: u32,

    #[envconfig(from = "TASKFLOW_APP_NAME", default = "taskflow")]
    pub app_name: String,

    #[envconfig(from = "TASKFLOW_ENVIRONMENT", default = "local")]
    pub environment: String,

    #[envconfig(from = "TASKFLOW_ENABLE_METRICS", default = "false")]
    pub enable_metrics: bool,

    /// Accepted for compatibility with deployments that set it; nothing in
    /// this crate reads it today.
    #[envconfig(from = "TASKFLOW_BROKER_URL", default = "redis://localhost:6379/0")]
    pub broker_url: String,
}

impl Config {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
