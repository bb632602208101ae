use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::database::DatabaseManager;
use crate::server;

pub async fn serve(in_memory: bool) -> anyhow::Result<()> {
    let config = config::config().clone();
    server::init_tracing(&config);

    let state = server::build_state(config, in_memory).await?;
    server::run(state).await
}

pub async fn migrate(output_format: &OutputFormat) -> anyhow::Result<()> {
    let mut database = config::config().database.clone();
    // `connect` would migrate on its own when enabled; run it explicitly once.
    database.run_migrations = false;

    let pool = DatabaseManager::connect(&database).await?;
    DatabaseManager::migrate(&pool).await?;
    pool.close().await;

    utils::output_success(output_format, "Database migrations applied", None)
}
