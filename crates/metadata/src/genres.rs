use discoverfin_core::types::Kind;
use futures::future::join_all;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::MetadataError;
use crate::provider::GenreLookup;
use crate::tmdb::TmdbClient;

/// Resolve genre ids to names concurrently, in input order. Ids that are
/// unknown or whose lookup fails are left out.
pub async fn resolve_genre_names(
    lookup: &dyn GenreLookup,
    genre_ids: &[i64],
    kind: Kind,
    language: &str,
) -> Vec<String> {
    let lookups = genre_ids
        .iter()
        .map(|&id| async move { (id, lookup.genre_name(id, kind, language).await) });

    join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(name) => name,
            Err(e) => {
                debug!(genre_id = id, error = %e, "genre lookup failed");
                None
            }
        })
        .collect()
}

/// Fetch TMDB genre lists for every language and both kinds into the
/// reference table. Returns the number of rows written.
pub async fn sync_genres(
    client: &TmdbClient,
    pool: &SqlitePool,
    languages: &[String],
    api_key: &str,
) -> Result<usize, MetadataError> {
    let mut written = 0;
    for language in languages {
        for kind in [Kind::Movies, Kind::Series] {
            let genres = match client.genre_list(kind, language, api_key).await {
                Ok(genres) => genres,
                Err(e) => {
                    warn!(language = %language, kind = %kind, error = %e, "genre list fetch failed");
                    continue;
                }
            };
            for genre in genres {
                discoverfin_db::repo::genres::upsert(
                    pool,
                    &discoverfin_db::repo::genres::GenreRow {
                        genre_id: genre.id,
                        media_type: kind.media_type().to_string(),
                        language: language.clone(),
                        name: genre.name,
                    },
                )
                .await?;
                written += 1;
            }
        }
    }
    info!(rows = written, "genre reference data synced");
    Ok(written)
}
