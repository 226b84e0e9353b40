//! Watchlist and watched-list persistence
//!
//! Two flat lists of saved titles, serialized as one JSON document in the
//! user's data directory. Loaded once at startup, written back after every
//! mutation. A missing or unreadable file loads as an empty store; there
//! is no schema versioning.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{MediaItem, MediaType};

/// A title saved to one of the lists, with the moment it was added
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedItem {
    pub id: u64,
    pub media_type: MediaType,
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: f64,
    pub added_at: DateTime<Utc>,
}

impl SavedItem {
    pub fn from_media(item: &MediaItem) -> Self {
        Self {
            id: item.id,
            media_type: item.media_type,
            title: item.title.clone(),
            poster_path: item.poster_path.clone(),
            release_date: item.release_date.clone(),
            vote_average: item.vote_average,
            added_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreData {
    #[serde(default)]
    watchlist: Vec<SavedItem>,
    #[serde(default)]
    watched: Vec<SavedItem>,
}

/// File-backed watchlist store
pub struct WatchlistStore {
    path: PathBuf,
    data: StoreData,
}

impl WatchlistStore {
    /// Load the store from `path`, treating a missing or corrupt file as empty
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(data) => data,
                Err(err) => {
                    log::warn!(
                        "watchlist file {} is corrupt, starting empty: {}",
                        path.display(),
                        err
                    );
                    StoreData::default()
                }
            },
            Err(_) => StoreData::default(),
        };
        Self { path, data }
    }

    /// Default store location under the platform data directory
    pub fn default_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", "reel")
            .context("could not determine a data directory for this platform")?;
        Ok(dirs.data_dir().join("watchlist.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add a title to the watchlist. Adding an already-present id is a no-op.
    pub fn add(&mut self, item: &MediaItem) -> Result<()> {
        if self.contains(item.id) {
            return Ok(());
        }
        self.data.watchlist.push(SavedItem::from_media(item));
        self.save()
    }

    /// Remove a title from the watchlist by id
    pub fn remove(&mut self, id: u64) -> Result<()> {
        self.data.watchlist.retain(|saved| saved.id != id);
        self.save()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.data.watchlist.iter().any(|saved| saved.id == id)
    }

    pub fn is_watched(&self, id: u64) -> bool {
        self.data.watched.iter().any(|saved| saved.id == id)
    }

    /// Add or remove the title from the watchlist depending on presence
    pub fn toggle(&mut self, item: &MediaItem) -> Result<()> {
        if self.contains(item.id) {
            self.remove(item.id)
        } else {
            self.add(item)
        }
    }

    /// Mark a title watched, or unmark it if it already is. Marking a title
    /// watched also removes it from the to-watch list.
    pub fn toggle_watched(&mut self, item: &MediaItem) -> Result<()> {
        if self.is_watched(item.id) {
            self.data.watched.retain(|saved| saved.id != item.id);
        } else {
            self.data.watchlist.retain(|saved| saved.id != item.id);
            self.data.watched.push(SavedItem::from_media(item));
        }
        self.save()
    }

    pub fn clear(&mut self) -> Result<()> {
        self.data.watchlist.clear();
        self.data.watched.clear();
        self.save()
    }

    pub fn watchlist(&self) -> &[SavedItem] {
        &self.data.watchlist
    }

    pub fn watched(&self) -> &[SavedItem] {
        &self.data.watched
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(&self.data)?;
        fs::write(&self.path, contents)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
