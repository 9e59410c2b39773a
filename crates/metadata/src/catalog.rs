//! Catalog identifiers (`<provider>.<sort>`) and catalog extras.

use discoverfin_core::types::Kind;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogIdError {
    #[error("catalog id `{0}` is not of the form <provider>.<sort>")]
    Malformed(String),
    #[error("unknown streaming provider `{0}`")]
    UnknownProvider(String),
    #[error("unknown sort `{0}`")]
    UnknownSort(String),
}

/// Short provider codes and their TMDB watch-provider ids.
const PROVIDERS: &[(&str, &[u32])] = &[
    ("nfx", &[8]),
    ("dnp", &[337]),
    ("amp", &[9, 119]),
    ("hbm", &[1899]),
    ("atp", &[350]),
    ("hlu", &[15]),
    ("pmp", &[531]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogSort {
    Popular,
    New,
}

impl CatalogSort {
    pub fn sort_by(self, kind: Kind) -> &'static str {
        match (self, kind) {
            (Self::Popular, _) => "popularity.desc",
            (Self::New, Kind::Movies) => "primary_release_date.desc",
            (Self::New, Kind::Series) => "first_air_date.desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogId {
    pub provider: String,
    pub provider_ids: Vec<u32>,
    pub sort: CatalogSort,
}

impl std::str::FromStr for CatalogId {
    type Err = CatalogIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (provider, sort) = s
            .split_once('.')
            .filter(|(p, s)| !p.is_empty() && !s.is_empty())
            .ok_or_else(|| CatalogIdError::Malformed(s.to_string()))?;

        let provider_ids = PROVIDERS
            .iter()
            .find(|(code, _)| *code == provider)
            .map(|(_, ids)| ids.to_vec())
            .ok_or_else(|| CatalogIdError::UnknownProvider(provider.to_string()))?;

        let sort = match sort {
            "popular" => CatalogSort::Popular,
            "new" => CatalogSort::New,
            other => return Err(CatalogIdError::UnknownSort(other.to_string())),
        };

        Ok(Self {
            provider: provider.to_string(),
            provider_ids,
            sort,
        })
    }
}

/// Optional catalog arguments, e.g. `genre=Action&skip=40`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogExtras {
    pub genre: Option<String>,
    pub skip: u32,
}

impl CatalogExtras {
    /// Parse a still percent-encoded extras segment; each value is decoded once
    /// after splitting. Unknown keys and unparsable values are ignored.
    pub fn parse(raw: &str) -> Self {
        let mut extras = Self::default();
        for pair in raw.split('&') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = urlencoding::decode(value)
                .map(|v| v.into_owned())
                .unwrap_or_else(|_| value.to_string());
            match key {
                "genre" if !value.is_empty() => extras.genre = Some(value),
                "skip" => extras.skip = value.parse().unwrap_or(0),
                _ => {}
            }
        }
        extras
    }
}
