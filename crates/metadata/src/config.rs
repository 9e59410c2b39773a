use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

/// Endpoints and timeouts for poster resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct PosterConfig {
    /// Base address of the rated-poster render service.
    pub render_base_url: String,
    /// Public base address rendered posters are served from.
    pub store_base_url: String,
    pub probe_timeout: Duration,
    pub render_timeout: Duration,
    pub store_timeout: Duration,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            render_base_url: "http://127.0.0.1:7000".to_string(),
            store_base_url: "http://127.0.0.1:7000/posters".to_string(),
            probe_timeout: Duration::from_secs(5),
            render_timeout: Duration::from_secs(20),
            store_timeout: Duration::from_secs(5),
        }
    }
}

/// Per-user settings carried in the catalog URL as a percent-encoded JSON blob.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddonConfig {
    pub language: Option<String>,
    /// Rating poster service key.
    #[serde(alias = "rpdbKey")]
    pub rpdbkey: Option<String>,
    /// Logo service key.
    pub logo_key: Option<String>,
    /// Key used for external id lookups.
    pub tmdb_key: Option<String>,
    pub country_code: Option<String>,
    pub age_rating: Option<String>,
    pub show_watched_button: bool,
    pub hide_watched: bool,
    pub username: Option<String>,
}

impl AddonConfig {
    /// Decode a config path segment, either raw JSON or percent-encoded JSON.
    /// Malformed input yields the empty config.
    pub fn decode(raw: &str) -> Self {
        let decoded = if raw.trim_start().starts_with('{') {
            raw.to_string()
        } else {
            match urlencoding::decode(raw) {
                Ok(s) => s.into_owned(),
                Err(e) => {
                    warn!(error = %e, "config segment is not valid percent-encoding");
                    return Self::default();
                }
            }
        };
        match serde_json::from_str::<Self>(&decoded) {
            Ok(config) => config.normalized(),
            Err(e) => {
                warn!(error = %e, "failed to parse config blob, using defaults");
                Self::default()
            }
        }
    }

    fn normalized(mut self) -> Self {
        for field in [
            &mut self.language,
            &mut self.rpdbkey,
            &mut self.logo_key,
            &mut self.tmdb_key,
            &mut self.country_code,
            &mut self.age_rating,
            &mut self.username,
        ] {
            *field = field
                .take()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());
        }
        self
    }

    pub fn language_or_default(&self) -> &str {
        self.language.as_deref().unwrap_or("en-US")
    }

    pub fn region_or_default(&self) -> &str {
        self.country_code.as_deref().unwrap_or("US")
    }
}
