use axum::extract::{Path, State};
use axum::http::Uri;
use axum::routing::get;
use axum::{Json, Router};
use discoverfin_core::error::ApiError;
use discoverfin_core::types::{Kind, NormalizedMeta};
use discoverfin_metadata::assemble::{AssemblyConfig, WatchedButton};
use discoverfin_metadata::catalog::{CatalogExtras, CatalogId};
use discoverfin_metadata::config::AddonConfig;
use discoverfin_metadata::provider::DiscoverQuery;
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/{config}/catalog/{kind}/{id}", get(catalog))
        .route("/{config}/catalog/{kind}/{id}/{extra}", get(catalog_with_extra))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

#[derive(Debug, Serialize)]
pub struct CatalogResponse {
    pub metas: Vec<NormalizedMeta>,
}

async fn catalog(
    State(state): State<AppState>,
    Path((config, kind, id)): Path<(String, String, String)>,
) -> Result<Json<CatalogResponse>, AppError> {
    serve_catalog(&state, &config, &kind, &id, None).await
}

/// Extras are read from the raw request path. `Path` has already decoded
/// `%26`, which would split a genre such as "Action & Adventure".
async fn catalog_with_extra(
    State(state): State<AppState>,
    Path((config, kind, id, _)): Path<(String, String, String, String)>,
    uri: Uri,
) -> Result<Json<CatalogResponse>, AppError> {
    let raw_extra = uri.path().rsplit('/').next().unwrap_or_default();
    serve_catalog(&state, &config, &kind, &id, Some(raw_extra)).await
}

async fn serve_catalog(
    state: &AppState,
    raw_config: &str,
    kind: &str,
    id: &str,
    extra: Option<&str>,
) -> Result<Json<CatalogResponse>, AppError> {
    let kind = Kind::from_content_type(kind)
        .ok_or_else(|| ApiError::BadRequest(format!("unsupported catalog type `{kind}`")))?;
    let catalog: CatalogId = strip_json(id).parse()?;
    let extras = extra
        .map(|e| CatalogExtras::parse(strip_json(e)))
        .unwrap_or_default();
    let addon = AddonConfig::decode(raw_config);

    let api_key = resolve_tmdb_api_key(state)
        .await?
        .or_else(|| addon.tmdb_key.clone())
        .ok_or_else(|| ApiError::BadRequest("no TMDB API key configured".into()))?;

    let genre = match extras.genre.as_deref() {
        Some(name) => {
            let id = state.genres.genre_id(name, kind).await?;
            if id.is_none() {
                debug!(genre = name, "unknown genre filter ignored");
            }
            id
        }
        None => None,
    };

    let language = addon.language_or_default();
    let query = DiscoverQuery {
        kind,
        providers: catalog.provider_ids.clone(),
        age_rating: addon.age_rating.clone(),
        sort_by: catalog.sort.sort_by(kind).to_string(),
        genre,
        language: language.to_string(),
        offset: extras.skip,
        region: addon.region_or_default().to_string(),
    };

    let items = state.media.discover(&query, &api_key).await.map_err(|e| {
        warn!(catalog = %id, error = %e, "discover request failed");
        AppError::from(e)
    })?;

    let assembly = AssemblyConfig {
        rating_key: addon.rpdbkey.clone(),
        logo_key: addon.logo_key.clone(),
        external_id_key: Some(addon.tmdb_key.clone().unwrap_or_else(|| api_key.clone())),
        watched: Some(WatchedButton {
            enabled: addon.show_watched_button,
            hide_watched: addon.hide_watched,
            username: addon.username.clone(),
            base_url: state.public_url.clone(),
        }),
    };

    let metas = state
        .assembler
        .resolve_batch(&items, kind, language, &assembly)
        .await?;

    Ok(Json(CatalogResponse { metas }))
}

fn strip_json(segment: &str) -> &str {
    segment.strip_suffix(".json").unwrap_or(segment)
}

/// The `tmdb_api_key` setting wins over the process environment.
async fn resolve_tmdb_api_key(state: &AppState) -> Result<Option<String>, AppError> {
    let db_key = discoverfin_db::repo::settings::get(&state.db, "tmdb_api_key")
        .await
        .map_err(|e| ApiError::Internal(format!("failed to read tmdb_api_key: {e}")))?
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty());

    Ok(db_key.or_else(|| state.tmdb_key.clone()))
}
