use serde::{Deserialize, Serialize};

/// Rating token used when an item has no vote average. Shared by the cloud
/// poster key and the rating shown to clients, so both must agree.
pub const NOT_RATED: &str = "N/A";

/// Catalog media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    Movies,
    Series,
}

impl Kind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movies => "movies",
            Self::Series => "series",
        }
    }

    /// Media type vocabulary of the TMDB API and the genre reference table.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Movies => "movie",
            Self::Series => "tv",
        }
    }

    /// Type name used by catalog clients and the rating poster service.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Movies => "movie",
            Self::Series => "series",
        }
    }

    /// Parse the client-facing type name (`movie` / `series`).
    pub fn from_content_type(s: &str) -> Option<Self> {
        match s {
            "movie" => Some(Self::Movies),
            "series" => Some(Self::Series),
            _ => None,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw discover result. Movies carry `title`/`release_date`, series carry
/// `name`/`first_air_date`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogItem {
    pub id: i64,
    pub title: Option<String>,
    pub name: Option<String>,
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub vote_average: Option<f64>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    pub genre_ids: Vec<i64>,
}

impl CatalogItem {
    pub fn display_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    /// Four-digit release year for the date field matching `kind`, or empty.
    pub fn release_year(&self, kind: Kind) -> String {
        let date = match kind {
            Kind::Movies => self.release_date.as_deref(),
            Kind::Series => self.first_air_date.as_deref(),
        };
        date.and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
            .map(str::to_string)
            .unwrap_or_default()
    }

    pub fn formatted_rating(&self) -> String {
        format_rating(self.vote_average)
    }
}

/// One decimal place with ties rounded away from zero (`7.25` -> `7.3`), or
/// [`NOT_RATED`]. The result is part of the rendered-poster key, so it must
/// match the render service's formatting.
pub fn format_rating(vote_average: Option<f64>) -> String {
    match vote_average {
        Some(v) if v.is_finite() => format!("{:.1}", (v * 10.0).round() / 10.0),
        _ => NOT_RATED.to_string(),
    }
}

/// Primary subtag of a language tag: `en-US` -> `en`.
pub fn primary_subtag(language: &str) -> &str {
    language
        .split(['-', '_'])
        .next()
        .unwrap_or(language)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetaLink {
    pub name: String,
    pub category: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorHints {
    pub default_video_id: String,
}

/// Metadata record returned to catalog clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedMeta {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub poster: Option<String>,
    pub background: Option<String>,
    pub logo: Option<String>,
    pub description: String,
    pub release_info: String,
    pub imdb_rating: String,
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub links: Option<Vec<MetaLink>>,
    pub behavior_hints: BehaviorHints,
}
