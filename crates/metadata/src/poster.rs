//! Poster resolution.
//!
//! Tiers, first success wins:
//! 1. rating poster service (only with a key), cached under `poster:<id>`
//!    and trusted without re-validation once cached;
//! 2. a rated poster rendered into the cloud store, looked up by
//!    `<id>-<rating>` and created on a miss;
//! 3. the raw TMDB image.
//!
//! Only an item without a poster path resolves to nothing. Every failure past
//! that point degrades to the next tier.

use std::sync::Arc;

use discoverfin_core::types::{Kind, format_rating};
use tracing::{debug, warn};

use crate::MetadataError;
use crate::cloud::{HttpPosterStore, cloud_key};
use crate::config::PosterConfig;
use crate::provider::{CloudPosterStore, PosterCache, PosterProbe};
use crate::rating_poster::{self, HttpProbe};
use crate::tmdb::IMAGE_BASE;

/// Size prefix of the raw fallback image.
pub const FALLBACK_SIZE: &str = "w500";

#[derive(Debug, Clone, Copy)]
pub struct PosterRequest<'a> {
    pub content_id: i64,
    pub poster_path: Option<&'a str>,
    pub rating: Option<f64>,
    pub kind: Kind,
    pub language: &'a str,
    pub rating_key: Option<&'a str>,
}

/// Resolved poster and the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PosterOutcome {
    /// The item has no source poster.
    Missing,
    /// Rating-service URL from the poster cache.
    Cached(String),
    /// Rating-service URL confirmed by the probe.
    RatingService(String),
    /// Previously rendered rated poster.
    CloudHit(String),
    /// Rated poster rendered by this request.
    Rendered(String),
    /// Raw source image.
    Fallback(String),
}

impl PosterOutcome {
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Missing => None,
            Self::Cached(u)
            | Self::RatingService(u)
            | Self::CloudHit(u)
            | Self::Rendered(u)
            | Self::Fallback(u) => Some(u),
        }
    }

    pub fn into_url(self) -> Option<String> {
        match self {
            Self::Missing => None,
            Self::Cached(u)
            | Self::RatingService(u)
            | Self::CloudHit(u)
            | Self::Rendered(u)
            | Self::Fallback(u) => Some(u),
        }
    }
}

pub fn cache_key(content_id: i64) -> String {
    format!("poster:{content_id}")
}

pub fn fallback_url(poster_path: &str) -> String {
    format!("{IMAGE_BASE}/{FALLBACK_SIZE}{poster_path}")
}

pub struct PosterPipeline {
    cache: Arc<dyn PosterCache>,
    probe: Arc<dyn PosterProbe>,
    store: Arc<dyn CloudPosterStore>,
}

impl PosterPipeline {
    pub fn new(
        cache: Arc<dyn PosterCache>,
        probe: Arc<dyn PosterProbe>,
        store: Arc<dyn CloudPosterStore>,
    ) -> Self {
        Self {
            cache,
            probe,
            store,
        }
    }

    /// HTTP probe and render-service store built from `config`.
    pub fn from_config(
        config: &PosterConfig,
        cache: Arc<dyn PosterCache>,
    ) -> Result<Self, MetadataError> {
        Ok(Self::new(
            cache,
            Arc::new(HttpProbe::new(config.probe_timeout)?),
            Arc::new(HttpPosterStore::new(config)?),
        ))
    }

    pub async fn resolve(&self, req: &PosterRequest<'_>) -> PosterOutcome {
        let Some(poster_path) = req.poster_path.filter(|p| !p.is_empty()) else {
            return PosterOutcome::Missing;
        };

        if let Some(key) = req.rating_key {
            if let Some(outcome) = self.try_rating_service(req, key).await {
                return outcome;
            }
        }

        let fallback = fallback_url(poster_path);
        let rating = format_rating(req.rating);
        let key = cloud_key(req.content_id, &rating);

        match self.store.existing_url(&key).await {
            Ok(Some(url)) => return PosterOutcome::CloudHit(url),
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "rated poster lookup failed"),
        }

        match self.store.create_rated_poster(&fallback, &rating, &key).await {
            Ok(resp) => match (resp.success, resp.url) {
                (true, Some(url)) => {
                    debug!(key = %key, "rendered rated poster");
                    PosterOutcome::Rendered(url)
                }
                _ => {
                    warn!(key = %key, "render service reported failure");
                    PosterOutcome::Fallback(fallback)
                }
            },
            Err(e) => {
                warn!(key = %key, error = %e, "rated poster render failed");
                PosterOutcome::Fallback(fallback)
            }
        }
    }

    async fn try_rating_service(
        &self,
        req: &PosterRequest<'_>,
        api_key: &str,
    ) -> Option<PosterOutcome> {
        let cache_key = cache_key(req.content_id);
        match self.cache.get(&cache_key).await {
            Ok(Some(url)) => return Some(PosterOutcome::Cached(url)),
            Ok(None) => {}
            Err(e) => warn!(key = %cache_key, error = %e, "poster cache read failed"),
        }

        let url = rating_poster::poster_url(api_key, req.kind, req.content_id, req.language);
        match self.probe.exists(&url).await {
            Ok(true) => {
                if let Err(e) = self.cache.set(&cache_key, &url).await {
                    warn!(key = %cache_key, error = %e, "poster cache write failed");
                }
                Some(PosterOutcome::RatingService(url))
            }
            Ok(false) => {
                warn!(id = req.content_id, "rating poster not available");
                None
            }
            Err(e) => {
                warn!(id = req.content_id, error = %e, "rating poster probe failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::{FakeCache, FakeProbe, FakeStore, ProbeBehavior, RenderBehavior};

    struct Harness {
        cache: Arc<FakeCache>,
        probe: Arc<FakeProbe>,
        store: Arc<FakeStore>,
        pipeline: PosterPipeline,
    }

    fn harness(cache: FakeCache, probe: ProbeBehavior, store: FakeStore) -> Harness {
        let cache = Arc::new(cache);
        let probe = Arc::new(FakeProbe::new(probe));
        let store = Arc::new(store);
        let pipeline = PosterPipeline::new(cache.clone(), probe.clone(), store.clone());
        Harness {
            cache,
            probe,
            store,
            pipeline,
        }
    }

    fn request<'a>(rating_key: Option<&'a str>) -> PosterRequest<'a> {
        PosterRequest {
            content_id: 550,
            poster_path: Some("/fc.jpg"),
            rating: Some(8.433),
            kind: Kind::Movies,
            language: "en-US",
            rating_key,
        }
    }

    #[tokio::test]
    async fn missing_poster_path_touches_nothing() {
        let h = harness(
            FakeCache::default(),
            ProbeBehavior::Found,
            FakeStore::new(RenderBehavior::Errors),
        );
        let req = PosterRequest {
            poster_path: None,
            ..request(Some("t2-key"))
        };

        assert_eq!(h.pipeline.resolve(&req).await, PosterOutcome::Missing);
        assert_eq!(h.cache.calls(), 0);
        assert_eq!(h.probe.calls(), 0);
        assert_eq!(h.store.lookups(), 0);
        assert!(h.store.render_calls().is_empty());
    }

    #[tokio::test]
    async fn without_key_the_probe_is_never_used() {
        let h = harness(
            FakeCache::default(),
            ProbeBehavior::Found,
            FakeStore::new(RenderBehavior::Succeeds("https://cdn/550-8.4.jpg".into())),
        );

        let outcome = h.pipeline.resolve(&request(None)).await;
        assert_eq!(outcome, PosterOutcome::Rendered("https://cdn/550-8.4.jpg".into()));
        assert_eq!(h.probe.calls(), 0);
        assert_eq!(h.cache.calls(), 0);
    }

    #[tokio::test]
    async fn probe_success_is_cached_and_reused() {
        let h = harness(
            FakeCache::default(),
            ProbeBehavior::Found,
            FakeStore::new(RenderBehavior::Errors),
        );
        let req = request(Some("t2-key"));

        let first = h.pipeline.resolve(&req).await;
        let second = h.pipeline.resolve(&req).await;

        let expected = "https://api.ratingposterdb.com/t2-key/tmdb/poster-default/movie-550.jpg?fallback=true&lang=en";
        assert_eq!(first, PosterOutcome::RatingService(expected.into()));
        assert_eq!(second, PosterOutcome::Cached(expected.into()));
        assert_eq!(first.url(), second.url());
        assert_eq!(h.probe.calls(), 1);
        assert_eq!(h.store.lookups(), 0);
    }

    #[tokio::test]
    async fn cached_url_is_trusted_without_probing() {
        let cache = FakeCache::default();
        cache
            .entries
            .lock()
            .unwrap()
            .insert("poster:550".into(), "https://stale.example/550.jpg".into());
        let h = harness(cache, ProbeBehavior::Missing, FakeStore::new(RenderBehavior::Errors));

        let outcome = h.pipeline.resolve(&request(Some("t1-key"))).await;
        assert_eq!(outcome, PosterOutcome::Cached("https://stale.example/550.jpg".into()));
        assert_eq!(h.probe.calls(), 0);
    }

    #[tokio::test]
    async fn every_tier_failing_yields_raw_fallback() {
        let h = harness(
            FakeCache::default(),
            ProbeBehavior::Missing,
            FakeStore::new(RenderBehavior::Errors),
        );

        let outcome = h.pipeline.resolve(&request(Some("t2-key"))).await;
        assert_eq!(
            outcome,
            PosterOutcome::Fallback("https://image.tmdb.org/t/p/w500/fc.jpg".into())
        );
        assert_eq!(h.probe.calls(), 1);
        assert_eq!(h.cache.sets.load(std::sync::atomic::Ordering::SeqCst), 0);
        assert_eq!(
            h.store.render_calls(),
            vec![(
                "https://image.tmdb.org/t/p/w500/fc.jpg".to_string(),
                "8.4".to_string(),
                "550-8.4".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn render_reporting_failure_yields_raw_fallback() {
        let h = harness(
            FakeCache::default(),
            ProbeBehavior::NetworkError,
            FakeStore::new(RenderBehavior::ReportsFailure),
        );

        let outcome = h.pipeline.resolve(&request(Some("t2-key"))).await;
        assert_eq!(
            outcome,
            PosterOutcome::Fallback("https://image.tmdb.org/t/p/w500/fc.jpg".into())
        );
    }

    #[tokio::test]
    async fn cloud_hit_skips_render() {
        let h = harness(
            FakeCache::default(),
            ProbeBehavior::Missing,
            FakeStore::new(RenderBehavior::Succeeds("https://cdn/new.jpg".into()))
                .with_existing("550-8.4", "https://cdn/550-8.4.jpg"),
        );

        let outcome = h.pipeline.resolve(&request(Some("t2-key"))).await;
        assert_eq!(outcome, PosterOutcome::CloudHit("https://cdn/550-8.4.jpg".into()));
        assert!(h.store.render_calls().is_empty());
    }

    #[tokio::test]
    async fn unrated_items_use_the_not_rated_key() {
        let h = harness(
            FakeCache::default(),
            ProbeBehavior::Missing,
            FakeStore::new(RenderBehavior::Succeeds("https://cdn/550-na.jpg".into())),
        );
        let req = PosterRequest {
            rating: None,
            ..request(None)
        };

        h.pipeline.resolve(&req).await;
        let calls = h.store.render_calls();
        assert_eq!(calls[0].1, "N/A");
        assert_eq!(calls[0].2, "550-N/A");
    }

    #[tokio::test]
    async fn cache_read_errors_fall_through_to_probe() {
        let cache = FakeCache {
            fail_reads: true,
            ..Default::default()
        };
        let h = harness(cache, ProbeBehavior::Found, FakeStore::new(RenderBehavior::Errors));

        let outcome = h.pipeline.resolve(&request(Some("t0-key"))).await;
        assert_eq!(
            outcome,
            PosterOutcome::RatingService(
                "https://api.ratingposterdb.com/t0-key/tmdb/poster-default/movie-550.jpg?fallback=true"
                    .into()
            )
        );
        assert_eq!(h.probe.calls(), 1);
    }

    #[tokio::test]
    async fn series_probe_uses_series_type() {
        let h = harness(
            FakeCache::default(),
            ProbeBehavior::Missing,
            FakeStore::new(RenderBehavior::Errors),
        );
        let req = PosterRequest {
            kind: Kind::Series,
            language: "de-DE",
            ..request(Some("t3-key"))
        };

        h.pipeline.resolve(&req).await;
        let probed = h.probe.last_url.lock().unwrap().clone().unwrap();
        assert!(probed.contains("/series-550.jpg"));
        assert!(probed.ends_with("&lang=de"));
    }
}
