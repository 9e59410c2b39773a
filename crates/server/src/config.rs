use std::time::Duration;

use discoverfin_metadata::config::PosterConfig;

/// Process configuration, read from `DISCOVERFIN_*` environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db_path: String,
    pub bind_addr: String,
    pub tmdb_key: Option<String>,
    /// Externally reachable base URL of this server.
    pub public_url: String,
    pub posters: PosterConfig,
    /// Languages whose genre names are synced into the reference table.
    pub genre_languages: Vec<String>,
    pub json_logs: bool,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let millis = |key: &str, default: Duration| {
            var(key)
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(default)
        };

        let bind_addr = var("DISCOVERFIN_BIND").unwrap_or_else(|| "0.0.0.0:7000".to_string());
        let defaults = PosterConfig::default();
        let render_base_url =
            var("DISCOVERFIN_RENDER_URL").unwrap_or_else(|| defaults.render_base_url.clone());

        Self {
            db_path: var("DISCOVERFIN_DB").unwrap_or_else(|| "discoverfin.db".to_string()),
            tmdb_key: var("DISCOVERFIN_TMDB_KEY"),
            public_url: var("DISCOVERFIN_PUBLIC_URL")
                .unwrap_or_else(|| "http://127.0.0.1:7000".to_string()),
            posters: PosterConfig {
                store_base_url: var("DISCOVERFIN_POSTER_STORE_URL")
                    .unwrap_or_else(|| format!("{}/posters", render_base_url.trim_end_matches('/'))),
                render_base_url,
                probe_timeout: millis("DISCOVERFIN_PROBE_TIMEOUT_MS", defaults.probe_timeout),
                render_timeout: millis("DISCOVERFIN_RENDER_TIMEOUT_MS", defaults.render_timeout),
                store_timeout: defaults.store_timeout,
            },
            genre_languages: var("DISCOVERFIN_GENRE_LANGUAGES")
                .map(|v| {
                    v.split(',')
                        .map(|l| l.trim().to_string())
                        .filter(|l| !l.is_empty())
                        .collect()
                })
                .unwrap_or_else(|| vec!["en-US".to_string()]),
            json_logs: var("DISCOVERFIN_LOG_FORMAT").as_deref() == Some("json"),
            bind_addr,
        }
    }
}
