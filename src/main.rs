use asset_inventory::{config, server};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, AZURE_*, etc.
    let _ = dotenvy::dotenv();

    let config = config::config().clone();
    server::init_tracing(&config);

    let state = server::build_state(config, false).await?;
    server::run(state).await
}
