use std::sync::Arc;

use anyhow::Context;
use discoverfin_metadata::tmdb::TmdbClient;
use discoverfin_server::config::ServerConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    if config.json_logs {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!(db_path = %config.db_path, "connecting to database");
    let pool = discoverfin_db::connect(&config.db_path)
        .await
        .context("failed to connect to database")?;

    discoverfin_db::migrate::run(&pool)
        .await
        .context("failed to run migrations")?;
    info!("migrations complete");

    let tmdb = Arc::new(TmdbClient::new().context("failed to build TMDB client")?);

    let genre_rows = discoverfin_db::repo::genres::count(&pool)
        .await
        .context("failed to count genres")?;
    match (genre_rows, config.tmdb_key.clone()) {
        (0, Some(key)) => {
            let pool = pool.clone();
            let tmdb = tmdb.clone();
            let languages = config.genre_languages.clone();
            tokio::spawn(async move {
                if let Err(e) =
                    discoverfin_metadata::genres::sync_genres(&tmdb, &pool, &languages, &key).await
                {
                    warn!(error = %e, "genre sync failed");
                }
            });
        }
        (0, None) => warn!("genre table is empty and DISCOVERFIN_TMDB_KEY is not set"),
        _ => {}
    }

    let app_state = discoverfin_server::state::AppState::new(pool, tmdb, &config)
        .context("failed to build application state")?;
    let app = discoverfin_server::routes::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind_addr, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
