//! TMDB API client and fetch pipeline
//!
//! Every request flows through `fetch`: build the full request URL (which
//! doubles as the cache key), consult the response cache, and only on a
//! miss go out over the transport. A successful fetch always warms the
//! cache for its own key before returning. Failed fetches surface their
//! error unchanged; no retries happen at this layer.

pub mod error;
pub mod transport;

use std::sync::{Arc, Mutex};

use reqwest::Url;
use serde_json::Value;

use crate::cache::ResponseCache;
use crate::types::{MediaDetails, MediaItem, MediaType, RawMediaRecord};

pub use error::ApiError;
pub use transport::{HttpTransport, Transport, TransportResponse};

pub const TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

/// Which kinds the trending feed should cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TrendingFilter {
    #[default]
    All,
    Movie,
    Tv,
}

impl TrendingFilter {
    pub fn as_path(&self) -> &'static str {
        match self {
            TrendingFilter::All => "all",
            TrendingFilter::Movie => "movie",
            TrendingFilter::Tv => "tv",
        }
    }

    /// Path segment for the search endpoint family, where the unrestricted
    /// variant is called `multi` rather than `all`
    pub fn as_search_path(&self) -> &'static str {
        match self {
            TrendingFilter::All => "multi",
            TrendingFilter::Movie => "movie",
            TrendingFilter::Tv => "tv",
        }
    }
}

/// Trending aggregation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TimeWindow {
    Day,
    #[default]
    Week,
}

impl TimeWindow {
    pub fn as_path(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// TMDB client owning the response cache.
///
/// Cheap to share behind an `Arc`; the cache mutex is only held for the
/// duration of a lookup or store, never across a network call.
pub struct TmdbClient {
    transport: Arc<dyn Transport>,
    cache: Mutex<ResponseCache>,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, transport: Arc<dyn Transport>, cache: ResponseCache) -> Self {
        Self {
            transport,
            cache: Mutex::new(cache),
            base_url: TMDB_BASE_URL.to_string(),
            api_key: api_key.into(),
        }
    }

    /// Override the API base URL (tests point this at a scripted transport)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Core fetch pipeline: cache lookup, network on miss, warm on success
    pub async fn fetch(&self, url: Url) -> Result<Value, ApiError> {
        let key = url.as_str().to_string();

        if let Some(payload) = self.lock_cache().lookup(&key) {
            return Ok(payload);
        }

        log::debug!("cache miss, fetching: {}", key);
        let response = self.transport.get(&key).await?;

        if !(200..300).contains(&response.status) {
            return Err(ApiError::Http {
                status: response.status,
            });
        }

        let payload: Value =
            serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))?;

        self.lock_cache().store(key, payload.clone());

        Ok(payload)
    }

    /// Multi-search across movies and TV shows, sorted by popularity.
    ///
    /// People returned by the endpoint are dropped during normalization.
    pub async fn search_multi(&self, query: &str) -> Result<Vec<MediaItem>, ApiError> {
        self.search(TrendingFilter::All, query).await
    }

    /// Search restricted to one kind, sorted by popularity. The movie and
    /// TV endpoints omit the `media_type` discriminator, so normalization
    /// falls back to field-presence tagging for their records.
    pub async fn search(
        &self,
        filter: TrendingFilter,
        query: &str,
    ) -> Result<Vec<MediaItem>, ApiError> {
        let path = format!("search/{}", filter.as_search_path());
        let url = self.endpoint(&path, &[("query", query)])?;
        let payload = self.fetch(url).await?;

        let mut items = collect_items(&payload);
        items.sort_by(|a, b| {
            b.popularity
                .partial_cmp(&a.popularity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        Ok(items)
    }

    /// Trending feed for the given kind filter and time window
    pub async fn trending(
        &self,
        filter: TrendingFilter,
        window: TimeWindow,
    ) -> Result<Vec<MediaItem>, ApiError> {
        let path = format!("trending/{}/{}", filter.as_path(), window.as_path());
        let url = self.endpoint(&path, &[])?;
        let payload = self.fetch(url).await?;
        Ok(collect_items(&payload))
    }

    /// Extended record for one title, with credits and videos appended
    pub async fn details(&self, media_type: MediaType, id: u64) -> Result<MediaDetails, ApiError> {
        let path = format!("{}/{}", media_type.as_path(), id);
        let url = self.endpoint(&path, &[("append_to_response", "credits,videos")])?;
        let payload = self.fetch(url).await?;
        serde_json::from_value(payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Titles recommended alongside the given one
    pub async fn recommendations(
        &self,
        media_type: MediaType,
        id: u64,
    ) -> Result<Vec<MediaItem>, ApiError> {
        let path = format!("{}/{}/recommendations", media_type.as_path(), id);
        let url = self.endpoint(&path, &[])?;
        let payload = self.fetch(url).await?;
        Ok(collect_items(&payload))
    }

    /// Drop all cached responses
    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cache_stats(&self) -> crate::cache::CacheStats {
        self.lock_cache().stats()
    }

    /// Build a fully-qualified endpoint URL. The api_key parameter comes
    /// first so identical requests always produce identical cache keys.
    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/{}", self.base_url, path))
            .map_err(|e| ApiError::InvalidUrl(e.to_string()))?;

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("api_key", &self.api_key);
            for (name, value) in params {
                pairs.append_pair(name, value);
            }
        }

        Ok(url)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, ResponseCache> {
        // Lock poisoning would require a panic mid-lookup; treat as unrecoverable
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Pull the `results` array out of a list response and normalize each
/// record. A missing or malformed array yields an empty list.
fn collect_items(payload: &Value) -> Vec<MediaItem> {
    payload
        .get("results")
        .and_then(Value::as_array)
        .map(|records| {
            records
                .iter()
                .filter_map(|record| {
                    serde_json::from_value::<RawMediaRecord>(record.clone())
                        .ok()
                        .and_then(MediaItem::from_record)
                })
                .collect()
        })
        .unwrap_or_default()
}
