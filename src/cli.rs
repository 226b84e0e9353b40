//! Command line interface
//!
//! With no arguments `reel` starts the interactive TUI. A positional query
//! or one of the feed flags runs a one-shot lookup and prints to stdout.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::api::{TimeWindow, TrendingFilter};
use crate::types::MediaType;

#[derive(Debug, Parser)]
#[command(name = "reel", about = "Interactive movie & TV discovery in the terminal")]
pub struct Cli {
    /// One-shot search query (omit to start the TUI)
    pub query: Option<String>,

    /// Print the trending feed and exit
    #[arg(long, conflicts_with = "query")]
    pub trending: bool,

    /// Restrict a search or the trending feed to one kind
    #[arg(long, value_enum, default_value_t)]
    pub media: TrendingFilter,

    /// Trending aggregation window
    #[arg(long, value_enum, default_value_t)]
    pub window: TimeWindow,

    /// Show details for one title and exit
    #[arg(long, value_enum, requires = "id", conflicts_with_all = ["query", "trending"])]
    pub details: Option<MediaTypeArg>,

    /// TMDB id for --details
    #[arg(long)]
    pub id: Option<u64>,

    /// TMDB API key (falls back to the TMDB_API_KEY environment variable)
    #[arg(long, env = "TMDB_API_KEY")]
    pub api_key: String,

    /// Response cache TTL in seconds
    #[arg(long, default_value_t = 300)]
    pub ttl_secs: u64,

    /// Quiet period for search-as-you-type, in milliseconds
    #[arg(long, default_value_t = 300)]
    pub debounce_ms: u64,

    /// Override the watchlist file location
    #[arg(long)]
    pub data_file: Option<PathBuf>,
}

impl Cli {
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

/// Media kind as a CLI value
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum MediaTypeArg {
    Movie,
    Tv,
}

impl From<MediaTypeArg> for MediaType {
    fn from(arg: MediaTypeArg) -> Self {
        match arg {
            MediaTypeArg::Movie => MediaType::Movie,
            MediaTypeArg::Tv => MediaType::Tv,
        }
    }
}
