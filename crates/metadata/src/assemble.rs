//! Batch metadata assembly.
//!
//! Items are resolved concurrently; within an item the poster, logo, external
//! id and genre names are resolved concurrently. Optional fields degrade to
//! `None` on upstream failure. An item that cannot be turned into a record is
//! logged and left out of the batch.

use std::sync::Arc;

use discoverfin_core::types::{BehaviorHints, CatalogItem, Kind, MetaLink, NormalizedMeta};
use futures::future::join_all;
use tracing::{debug, error, warn};

use crate::MetadataError;
use crate::genres::resolve_genre_names;
use crate::poster::{PosterOutcome, PosterPipeline, PosterRequest};
use crate::provider::{GenreLookup, LogoProvider, MediaDatabase};
use crate::tmdb::IMAGE_BASE;

/// Outcome of an optional enrichment step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved<T> {
    Found(T),
    /// The lookup ran and failed; the reason was logged.
    Degraded(String),
    /// Not configured, or the upstream has no value.
    Absent,
}

impl<T> Resolved<T> {
    pub fn from_lookup(result: Result<Option<T>, MetadataError>) -> Self {
        match result {
            Ok(Some(v)) => Self::Found(v),
            Ok(None) => Self::Absent,
            Err(e) => Self::Degraded(e.to_string()),
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(v) => Some(v),
            Self::Degraded(_) | Self::Absent => None,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }
}

/// "Mark as watched" action button settings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WatchedButton {
    pub enabled: bool,
    pub hide_watched: bool,
    pub username: Option<String>,
    /// Public base URL of the watched-marking endpoint.
    pub base_url: String,
}

impl WatchedButton {
    fn link(&self, kind: Kind, id: &str) -> Option<MetaLink> {
        if !self.enabled || !self.hide_watched {
            return None;
        }
        let username = self.username.as_deref().filter(|u| !u.is_empty())?;
        Some(MetaLink {
            name: "Mark as watched".to_string(),
            category: "actions".to_string(),
            url: format!(
                "{}/watched/{}/{}/{}",
                self.base_url.trim_end_matches('/'),
                urlencoding::encode(username),
                kind.as_str(),
                urlencoding::encode(id)
            ),
        })
    }
}

/// Keys and settings that shape a batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssemblyConfig {
    pub rating_key: Option<String>,
    pub logo_key: Option<String>,
    pub external_id_key: Option<String>,
    pub watched: Option<WatchedButton>,
}

/// Per-item results before they are flattened into a [`NormalizedMeta`].
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub poster: PosterOutcome,
    pub logo: Resolved<String>,
    pub external_id: Resolved<String>,
    pub genres: Vec<String>,
}

pub struct MetaAssembler {
    media: Arc<dyn MediaDatabase>,
    logos: Arc<dyn LogoProvider>,
    genres: Arc<dyn GenreLookup>,
    posters: PosterPipeline,
}

impl MetaAssembler {
    pub fn new(
        media: Arc<dyn MediaDatabase>,
        logos: Arc<dyn LogoProvider>,
        genres: Arc<dyn GenreLookup>,
        posters: PosterPipeline,
    ) -> Self {
        Self {
            media,
            logos,
            genres,
            posters,
        }
    }

    /// Resolve a batch of catalog items. Failing items are dropped; the
    /// surviving records keep their input order.
    pub async fn resolve_batch(
        &self,
        items: &[CatalogItem],
        kind: Kind,
        language: &str,
        config: &AssemblyConfig,
    ) -> Result<Vec<NormalizedMeta>, MetadataError> {
        if language.trim().is_empty() {
            return Err(MetadataError::InvalidRequest(
                "language tag must not be empty".into(),
            ));
        }

        let results = join_all(
            items
                .iter()
                .map(|item| self.resolve_meta(item, kind, language, config)),
        )
        .await;

        let metas: Vec<NormalizedMeta> = results
            .into_iter()
            .zip(items)
            .filter_map(|(result, item)| match result {
                Ok(meta) => Some(meta),
                Err(e) => {
                    error!(id = item.id, error = %e, "dropping catalog item");
                    None
                }
            })
            .collect();

        debug!(requested = items.len(), resolved = metas.len(), kind = %kind, "batch resolved");
        Ok(metas)
    }

    pub async fn resolve_meta(
        &self,
        item: &CatalogItem,
        kind: Kind,
        language: &str,
        config: &AssemblyConfig,
    ) -> Result<NormalizedMeta, MetadataError> {
        let title = item
            .display_title()
            .ok_or_else(|| MetadataError::InvalidItem {
                id: item.id,
                reason: "missing title".into(),
            })?
            .to_string();

        let resolved = self.resolve_item(item, kind, language, config).await;

        let id = match resolved.external_id {
            Resolved::Found(imdb_id) => imdb_id,
            _ => format!("tmdb:{}", item.id),
        };
        let links = config
            .watched
            .as_ref()
            .and_then(|w| w.link(kind, &id))
            .map(|link| vec![link]);

        Ok(NormalizedMeta {
            kind: kind.content_type().to_string(),
            name: title,
            poster: resolved.poster.into_url(),
            background: item
                .backdrop_path
                .as_deref()
                .filter(|p| !p.is_empty())
                .map(|p| format!("{IMAGE_BASE}/original{p}")),
            logo: resolved.logo.into_option(),
            description: item.overview.clone().unwrap_or_default(),
            release_info: item.release_year(kind),
            imdb_rating: item.formatted_rating(),
            genres: resolved.genres,
            links,
            behavior_hints: BehaviorHints {
                default_video_id: id.clone(),
            },
            id,
        })
    }

    pub async fn resolve_item(
        &self,
        item: &CatalogItem,
        kind: Kind,
        language: &str,
        config: &AssemblyConfig,
    ) -> ResolvedItem {
        let poster_request = PosterRequest {
            content_id: item.id,
            poster_path: item.poster_path.as_deref(),
            rating: item.vote_average,
            kind,
            language,
            rating_key: config.rating_key.as_deref(),
        };

        let (poster, logo, external_id, genres) = tokio::join!(
            self.posters.resolve(&poster_request),
            self.resolve_logo(item.id, kind, language, config.logo_key.as_deref()),
            self.resolve_external_id(item.id, kind, config.external_id_key.as_deref()),
            resolve_genre_names(self.genres.as_ref(), &item.genre_ids, kind, language),
        );

        ResolvedItem {
            poster,
            logo,
            external_id,
            genres,
        }
    }

    async fn resolve_logo(
        &self,
        id: i64,
        kind: Kind,
        language: &str,
        key: Option<&str>,
    ) -> Resolved<String> {
        let Some(key) = key else {
            return Resolved::Absent;
        };
        let logo = Resolved::from_lookup(self.logos.fetch_logo(kind, id, language, key).await);
        if let Resolved::Degraded(reason) = &logo {
            warn!(id, error = %reason, "logo lookup failed");
        }
        logo
    }

    async fn resolve_external_id(
        &self,
        id: i64,
        kind: Kind,
        key: Option<&str>,
    ) -> Resolved<String> {
        let Some(key) = key else {
            return Resolved::Absent;
        };
        let external = Resolved::from_lookup(self.media.external_id(kind, id, key).await);
        if let Resolved::Degraded(reason) = &external {
            warn!(id, error = %reason, "external id lookup failed");
        }
        external
    }
}
