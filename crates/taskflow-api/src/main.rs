use std::sync::Arc;

use envconfig::Envconfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

use taskflow_api::config::Config;
use taskflow_postgres::PgUnitOfWorkFactory;

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
    let app = taskflow_api::app(factory, config.enable_metrics);

    let bind = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind)
        .await
        .unwrap_or_else(|err| panic!("failed to bind {bind}: {err}"));

    info!(
        %bind,
        app_name = %config.app_name,
        environment = %config.environment,
        metrics = config.enable_metrics,
        "starting taskflow api"
    );
    axum::serve(listener, app)
        .await
        .expect("server exited unexpectedly");
}
