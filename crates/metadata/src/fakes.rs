//! In-memory collaborators with call counters for pipeline and assembly tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use discoverfin_core::types::{CatalogItem, Kind};

use crate::MetadataError;
use crate::provider::{
    CloudPosterStore, DiscoverQuery, GenreLookup, LogoProvider, MediaDatabase, PosterCache,
    PosterProbe, RenderResponse,
};

#[derive(Default)]
pub struct FakeCache {
    pub entries: Mutex<HashMap<String, String>>,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub fail_reads: bool,
}

impl FakeCache {
    pub fn calls(&self) -> usize {
        self.gets.load(Ordering::SeqCst) + self.sets.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PosterCache for FakeCache {
    async fn get(&self, key: &str) -> Result<Option<String>, MetadataError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(MetadataError::Provider("cache unavailable".into()));
        }
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, url: &str) -> Result<(), MetadataError> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), url.to_string());
        Ok(())
    }
}

pub enum ProbeBehavior {
    Found,
    Missing,
    NetworkError,
}

pub struct FakeProbe {
    pub behavior: ProbeBehavior,
    pub calls: AtomicUsize,
    pub last_url: Mutex<Option<String>>,
}

impl FakeProbe {
    pub fn new(behavior: ProbeBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl PosterProbe for FakeProbe {
    async fn exists(&self, url: &str) -> Result<bool, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());
        match self.behavior {
            ProbeBehavior::Found => Ok(true),
            ProbeBehavior::Missing => Ok(false),
            ProbeBehavior::NetworkError => Err(MetadataError::Network("timed out".into())),
        }
    }
}

pub enum RenderBehavior {
    Succeeds(String),
    ReportsFailure,
    Errors,
}

pub struct FakeStore {
    pub existing: HashMap<String, String>,
    pub render: RenderBehavior,
    pub lookups: AtomicUsize,
    pub renders: Mutex<Vec<(String, String, String)>>,
}

impl FakeStore {
    pub fn new(render: RenderBehavior) -> Self {
        Self {
            existing: HashMap::new(),
            render,
            lookups: AtomicUsize::new(0),
            renders: Mutex::new(Vec::new()),
        }
    }

    pub fn with_existing(mut self, key: &str, url: &str) -> Self {
        self.existing.insert(key.to_string(), url.to_string());
        self
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn render_calls(&self) -> Vec<(String, String, String)> {
        self.renders.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl CloudPosterStore for FakeStore {
    async fn existing_url(&self, cloud_key: &str) -> Result<Option<String>, MetadataError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.existing.get(cloud_key).cloned())
    }

    async fn create_rated_poster(
        &self,
        source_url: &str,
        rating: &str,
        cloud_key: &str,
    ) -> Result<RenderResponse, MetadataError> {
        self.renders.lock().unwrap().push((
            source_url.to_string(),
            rating.to_string(),
            cloud_key.to_string(),
        ));
        match &self.render {
            RenderBehavior::Succeeds(url) => Ok(RenderResponse {
                success: true,
                url: Some(url.clone()),
            }),
            RenderBehavior::ReportsFailure => Ok(RenderResponse {
                success: false,
                url: None,
            }),
            RenderBehavior::Errors => Err(MetadataError::Network("connection refused".into())),
        }
    }
}

/// Genre names keyed by id; ids listed in `failing` return a lookup error.
#[derive(Default)]
pub struct FakeGenres {
    pub names: HashMap<i64, String>,
    pub failing: Vec<i64>,
}

impl FakeGenres {
    pub fn with(names: &[(i64, &str)]) -> Self {
        Self {
            names: names.iter().map(|(id, n)| (*id, n.to_string())).collect(),
            failing: Vec::new(),
        }
    }
}

#[async_trait::async_trait]
impl GenreLookup for FakeGenres {
    async fn genre_name(
        &self,
        genre_id: i64,
        _kind: Kind,
        _language: &str,
    ) -> Result<Option<String>, MetadataError> {
        if self.failing.contains(&genre_id) {
            return Err(MetadataError::Provider("reference table offline".into()));
        }
        Ok(self.names.get(&genre_id).cloned())
    }

    async fn genre_id(&self, name: &str, _kind: Kind) -> Result<Option<i64>, MetadataError> {
        Ok(self
            .names
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(id, _)| *id))
    }
}

/// Media database returning fixed external ids; ids in `failing` error.
#[derive(Default)]
pub struct FakeMediaDb {
    pub items: Vec<CatalogItem>,
    pub imdb_ids: HashMap<i64, String>,
    pub failing: Vec<i64>,
    pub external_calls: AtomicUsize,
}

#[async_trait::async_trait]
impl MediaDatabase for FakeMediaDb {
    async fn discover(
        &self,
        _query: &DiscoverQuery,
        _api_key: &str,
    ) -> Result<Vec<CatalogItem>, MetadataError> {
        Ok(self.items.clone())
    }

    async fn external_id(
        &self,
        _kind: Kind,
        id: i64,
        _api_key: &str,
    ) -> Result<Option<String>, MetadataError> {
        self.external_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&id) {
            return Err(MetadataError::Network("reset by peer".into()));
        }
        Ok(self.imdb_ids.get(&id).cloned())
    }
}

#[derive(Default)]
pub struct FakeLogos {
    pub logos: HashMap<i64, String>,
    pub failing: Vec<i64>,
    pub calls: AtomicUsize,
}

#[async_trait::async_trait]
impl LogoProvider for FakeLogos {
    async fn fetch_logo(
        &self,
        _kind: Kind,
        id: i64,
        _language: &str,
        _api_key: &str,
    ) -> Result<Option<String>, MetadataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&id) {
            return Err(MetadataError::Provider("logo service returned 503".into()));
        }
        Ok(self.logos.get(&id).cloned())
    }
}
