//! Genre reference data, keyed by (genre id, media type, language).
//!
//! `media_type` uses the TMDB vocabulary (`movie` / `tv`).

use sqlx::SqlitePool;

#[derive(Debug, Clone, PartialEq)]
pub struct GenreRow {
    pub genre_id: i64,
    pub media_type: String,
    pub language: String,
    pub name: String,
}

/// Localized name for a genre id. An exact language tag match wins, otherwise
/// any row sharing the primary subtag (`en` matches `en-US`) is used.
pub async fn lookup_name(
    pool: &SqlitePool,
    genre_id: i64,
    media_type: &str,
    language: &str,
) -> Result<Option<String>, sqlx::Error> {
    let primary = language.split(['-', '_']).next().unwrap_or(language);
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT name FROM genre \
         WHERE genre_id = ?1 AND media_type = ?2 \
           AND (language = ?3 OR language = ?4 OR language LIKE ?4 || '-%') \
         ORDER BY language = ?3 DESC, language \
         LIMIT 1",
    )
    .bind(genre_id)
    .bind(media_type)
    .bind(language)
    .bind(primary)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(name,)| name))
}

/// Reverse lookup by display name in any language (case-insensitive).
pub async fn lookup_id(
    pool: &SqlitePool,
    name: &str,
    media_type: &str,
) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT genre_id FROM genre WHERE media_type = ? AND name = ? COLLATE NOCASE LIMIT 1",
    )
    .bind(media_type)
    .bind(name)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id,)| id))
}

/// Insert or replace a genre row.
pub async fn upsert(pool: &SqlitePool, row: &GenreRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO genre (genre_id, media_type, language, name) VALUES (?, ?, ?, ?) \
         ON CONFLICT(genre_id, media_type, language) DO UPDATE SET name = excluded.name",
    )
    .bind(row.genre_id)
    .bind(&row.media_type)
    .bind(&row.language)
    .bind(&row.name)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let (n,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM genre")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(genre_id: i64, media_type: &str, language: &str, name: &str) -> GenreRow {
        GenreRow {
            genre_id,
            media_type: media_type.into(),
            language: language.into(),
            name: name.into(),
        }
    }

    #[tokio::test]
    async fn lookup_by_id_and_name() {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();

        upsert(&pool, &row(28, "movie", "en", "Action")).await.unwrap();
        upsert(&pool, &row(28, "movie", "fr", "Action")).await.unwrap();
        upsert(&pool, &row(18, "tv", "en", "Drama")).await.unwrap();
        upsert(&pool, &row(18, "tv", "de", "Drama")).await.unwrap();
        upsert(&pool, &row(35, "movie", "de", "Komödie")).await.unwrap();

        assert_eq!(
            lookup_name(&pool, 28, "movie", "en").await.unwrap().as_deref(),
            Some("Action")
        );
        assert_eq!(lookup_name(&pool, 28, "tv", "en").await.unwrap(), None);
        assert_eq!(lookup_name(&pool, 99, "movie", "en").await.unwrap(), None);

        assert_eq!(lookup_id(&pool, "drama", "tv").await.unwrap(), Some(18));
        assert_eq!(lookup_id(&pool, "Komödie", "movie").await.unwrap(), Some(35));
        assert_eq!(lookup_id(&pool, "Drama", "movie").await.unwrap(), None);

        assert_eq!(count(&pool).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn lookup_name_falls_back_to_primary_subtag() {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();

        upsert(&pool, &row(28, "movie", "en-US", "Action")).await.unwrap();
        upsert(&pool, &row(28, "movie", "fr-FR", "Action (fr)")).await.unwrap();
        upsert(&pool, &row(28, "movie", "fr-CA", "Action (ca)")).await.unwrap();

        assert_eq!(
            lookup_name(&pool, 28, "movie", "en").await.unwrap().as_deref(),
            Some("Action")
        );
        assert_eq!(
            lookup_name(&pool, 28, "movie", "en-GB").await.unwrap().as_deref(),
            Some("Action")
        );
        assert_eq!(
            lookup_name(&pool, 28, "movie", "fr-CA").await.unwrap().as_deref(),
            Some("Action (ca)")
        );
        assert_eq!(lookup_name(&pool, 28, "movie", "de-DE").await.unwrap(), None);
        // `e` is not a prefix match for `en-US`
        assert_eq!(lookup_name(&pool, 28, "movie", "e").await.unwrap(), None);
    }

    #[tokio::test]
    async fn upsert_replaces_name() {
        let pool = crate::connect(":memory:").await.unwrap();
        crate::migrate::run(&pool).await.unwrap();

        upsert(&pool, &row(10765, "tv", "en", "Sci-Fi")).await.unwrap();
        upsert(&pool, &row(10765, "tv", "en", "Sci-Fi & Fantasy")).await.unwrap();

        assert_eq!(
            lookup_name(&pool, 10765, "tv", "en").await.unwrap().as_deref(),
            Some("Sci-Fi & Fantasy")
        );
        assert_eq!(count(&pool).await.unwrap(), 1);
    }
}
