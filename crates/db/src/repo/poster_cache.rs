//! Persisted poster URL cache. Entries have no TTL.

use sqlx::SqlitePool;

pub async fn get(pool: &SqlitePool, key: &str) -> Result<Option<String>, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as("SELECT url FROM poster_cache WHERE key = ?")
        .bind(key)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(url,)| url))
}

/// Store a resolved URL (upsert).
pub async fn set(pool: &SqlitePool, key: &str, url: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO poster_cache (key, url, created_ts) VALUES (?, ?, ?) \
         ON CONFLICT(key) DO UPDATE SET url = excluded.url, created_ts = excluded.created_ts",
    )
    .bind(key)
    .bind(url)
    .bind(chrono::Utc::now().timestamp())
    .execute(pool)
    .await?;
    Ok(())
}
