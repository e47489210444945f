use std::sync::Arc;

use common::storage::FilesystemMediaStore;
use tracing::{Level, info};

use schoolsite_server::config::AppConfig;
use schoolsite_server::state::AppState;
use schoolsite_server::{build_router, database, error, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    let config = AppConfig::load()?;
    error::expose_error_detail(config.server.is_development());

    let db = database::init_db(&config.database.url).await?;
    seed::seed_bootstrap_admin(&db, &config.auth).await?;

    let storage = &config.storage;
    let media = FilesystemMediaStore::new(
        storage.media_dir.clone(),
        &storage.public_base_url,
        storage.max_photo_size.max(storage.max_media_size),
    )
    .await?;
    info!(dir = %storage.media_dir.display(), "Media store ready");

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        config,
        media: Arc::new(media),
    };
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
