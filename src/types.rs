use serde::{Deserialize, Serialize};

/// Media kind, assigned once at ingestion time from the API's own
/// `media_type` discriminator. Field-presence inference (`title` vs `name`)
/// is the fallback for endpoints that omit the discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Path segment used by the TMDB API for this kind
    pub fn as_path(&self) -> &'static str {
        match self {
            MediaType::Movie => "movie",
            MediaType::Tv => "tv",
        }
    }

    /// Short label for display
    pub fn label(&self) -> &'static str {
        match self {
            MediaType::Movie => "Movie",
            MediaType::Tv => "TV",
        }
    }
}

/// One movie or TV show as returned by the search/trending endpoints,
/// normalized into a single shape regardless of kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub genre_ids: Vec<u64>,
    pub popularity: f64,
}

/// Raw record shape shared by the TMDB list endpoints. Movies carry
/// `title`/`release_date`, TV shows carry `name`/`first_air_date`.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMediaRecord {
    pub id: Option<u64>,
    pub media_type: Option<String>,
    pub title: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub popularity: Option<f64>,
}

impl MediaItem {
    /// Normalize a raw record into a tagged item.
    ///
    /// Returns `None` for records that are not a movie or TV show (the
    /// multi-search endpoint also returns people) or that lack an id.
    pub fn from_record(raw: RawMediaRecord) -> Option<MediaItem> {
        let id = raw.id?;

        let media_type = match raw.media_type.as_deref() {
            Some("movie") => MediaType::Movie,
            Some("tv") => MediaType::Tv,
            Some(_) => return None,
            // Fallback: movies have `title`, TV shows have `name`
            None if raw.title.is_some() => MediaType::Movie,
            None if raw.name.is_some() => MediaType::Tv,
            None => return None,
        };

        let title = raw.title.or(raw.name)?;

        Some(MediaItem {
            id,
            media_type,
            title,
            overview: raw.overview.unwrap_or_default(),
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            release_date: raw.release_date.or(raw.first_air_date),
            vote_average: raw.vote_average.unwrap_or(0.0),
            genre_ids: raw.genre_ids,
            popularity: raw.popularity.unwrap_or(0.0),
        })
    }

    /// Release year for display, if a date is present
    pub fn year(&self) -> Option<&str> {
        self.release_date.as_deref().and_then(|d| d.get(0..4))
    }

    /// Full poster URL, combining the fixed image host with the path fragment
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .map(|p| format!("{}{}", IMG_BASE_URL, p))
    }
}

/// Extended record returned by the details endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct MediaDetails {
    pub id: u64,
    pub title: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    pub runtime: Option<u64>,
    #[serde(default)]
    pub episode_run_time: Vec<u64>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub tagline: Option<String>,
    pub status: Option<String>,
}

impl MediaDetails {
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unknown")
    }

    /// Runtime in minutes; TV shows report per-episode runtimes
    pub fn runtime_minutes(&self) -> Option<u64> {
        self.runtime.or_else(|| self.episode_run_time.first().copied())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

/// Search lifecycle as observed by the UI. The four states are mutually
/// exclusive; `items` is only meaningful in `Success`.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchStatus {
    Loading,
    Success,
    Empty,
    Error { message: String },
}

/// The externally observable result of one settled query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub query: String,
    pub status: SearchStatus,
    pub items: Vec<MediaItem>,
}

impl SearchOutcome {
    pub fn loading(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            status: SearchStatus::Loading,
            items: Vec::new(),
        }
    }

    pub fn from_items(query: impl Into<String>, items: Vec<MediaItem>) -> Self {
        let status = if items.is_empty() {
            SearchStatus::Empty
        } else {
            SearchStatus::Success
        };
        Self {
            query: query.into(),
            status,
            items,
        }
    }

    pub fn from_error(query: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            status: SearchStatus::Error {
                message: message.into(),
            },
            items: Vec::new(),
        }
    }
}

pub const IMG_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// TMDB genre ids shown in the filter UI
pub const GENRES: &[(u64, &str)] = &[
    (28, "Action"),
    (12, "Adventure"),
    (16, "Animation"),
    (35, "Comedy"),
    (80, "Crime"),
    (99, "Documentary"),
    (18, "Drama"),
    (10751, "Family"),
    (14, "Fantasy"),
    (36, "History"),
    (27, "Horror"),
    (10402, "Music"),
    (9648, "Mystery"),
    (10749, "Romance"),
    (878, "Sci-Fi"),
    (53, "Thriller"),
];

/// Look up a genre name by TMDB id
pub fn genre_name(id: u64) -> Option<&'static str> {
    GENRES
        .iter()
        .find(|(gid, _)| *gid == id)
        .map(|(_, name)| *name)
}
