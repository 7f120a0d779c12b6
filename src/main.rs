use std::path::Path;

use tracing_subscriber::EnvFilter;

use curator_api::{
    api::{create_router, AppState},
    config::Config,
    engine::Snapshot,
    ingest,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    // The initial snapshot is built before the listener comes up, so the
    // service never answers from an empty state.
    let data = ingest::load_dir(Path::new(&config.data_dir))?;
    let snapshot = Snapshot::build(data.users, data.items, data.events)?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config, snapshot);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "recommendation service listening");
    axum::serve(listener, app).await?;

    Ok(())
}
