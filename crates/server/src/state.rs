use std::sync::Arc;

use discoverfin_metadata::MetadataError;
use discoverfin_metadata::assemble::MetaAssembler;
use discoverfin_metadata::poster::PosterPipeline;
use discoverfin_metadata::provider::{GenreLookup, MediaDatabase};
use discoverfin_metadata::store::{SqliteGenreLookup, SqlitePosterCache};
use discoverfin_metadata::tmdb::TmdbClient;
use sqlx::SqlitePool;

use crate::config::ServerConfig;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub media: Arc<dyn MediaDatabase>,
    pub genres: Arc<dyn GenreLookup>,
    pub assembler: Arc<MetaAssembler>,
    /// Key from the process environment; the `tmdb_api_key` setting overrides it.
    pub tmdb_key: Option<String>,
    pub public_url: String,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        tmdb: Arc<TmdbClient>,
        config: &ServerConfig,
    ) -> Result<Self, MetadataError> {
        // Genre names fall back to the first synced language.
        let mut genre_lookup = SqliteGenreLookup::new(db.clone());
        if let Some(language) = config.genre_languages.first() {
            genre_lookup = genre_lookup.with_fallback_language(language.clone());
        }
        let genres: Arc<dyn GenreLookup> = Arc::new(genre_lookup);

        let pipeline = PosterPipeline::from_config(
            &config.posters,
            Arc::new(SqlitePosterCache::new(db.clone())),
        )?;
        let assembler = MetaAssembler::new(tmdb.clone(), tmdb.clone(), genres.clone(), pipeline);

        Ok(Self {
            db,
            media: tmdb,
            genres,
            assembler: Arc::new(assembler),
            tmdb_key: config.tmdb_key.clone(),
            public_url: config.public_url.clone(),
        })
    }
}
