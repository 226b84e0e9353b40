//! reel - interactive movie & TV discovery in the terminal
//!
//! Usage:
//!   reel                         - interactive TUI (search-as-you-type)
//!   reel "blade runner"          - one-shot search, printed to stdout
//!   reel --trending              - trending feed
//!   reel --details movie --id N  - extended record for one title

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use reel::api::{HttpTransport, TmdbClient};
use reel::cache::ResponseCache;
use reel::cli::Cli;
use reel::tui::run_tui;
use reel::types::{genre_name, MediaDetails, MediaItem};
use reel::watchlist::WatchlistStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never corrupt the TUI
    env_logger::init();

    let cli = Cli::parse();

    let cache = ResponseCache::with_ttl(cli.cache_ttl());
    let client = Arc::new(TmdbClient::new(
        cli.api_key.clone(),
        Arc::new(HttpTransport::new()),
        cache,
    ));

    if let Some(query) = &cli.query {
        let items = client.search(cli.media, query).await?;
        print_items(&items);
        return Ok(());
    }

    if cli.trending {
        let items = client.trending(cli.media, cli.window).await?;
        print_items(&items);
        return Ok(());
    }

    if let (Some(kind), Some(id)) = (cli.details, cli.id) {
        let details = client.details(kind.into(), id).await?;
        print_details(&details);
        return Ok(());
    }

    let path = match &cli.data_file {
        Some(path) => path.clone(),
        None => WatchlistStore::default_path().context("could not locate watchlist storage")?,
    };
    let store = WatchlistStore::load(path);
    log::info!("watchlist file: {}", store.path().display());

    run_tui(client, store, cli.quiet_period()).await
}

fn print_items(items: &[MediaItem]) {
    if items.is_empty() {
        println!("No results.");
        return;
    }
    for item in items {
        let genres: Vec<&str> = item
            .genre_ids
            .iter()
            .filter_map(|&id| genre_name(id))
            .collect();
        println!(
            "{:>8}  {}  ({})  {}  ★ {:.1}  {}",
            item.id,
            item.title,
            item.year().unwrap_or("----"),
            item.media_type.label(),
            item.vote_average,
            genres.join(", "),
        );
    }
}

fn print_details(details: &MediaDetails) {
    println!("{}", details.display_title());
    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        println!("{}", tagline);
    }
    let date = details
        .release_date
        .as_deref()
        .or(details.first_air_date.as_deref())
        .unwrap_or("unknown");
    println!("Released: {}", date);
    if let Some(rating) = details.vote_average {
        println!("Rating: {:.1} / 10", rating);
    }
    if let Some(minutes) = details.runtime_minutes() {
        println!("Runtime: {} min", minutes);
    }
    if !details.genres.is_empty() {
        let names: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        println!("Genres: {}", names.join(", "));
    }
    if let Some(overview) = details.overview.as_deref().filter(|o| !o.is_empty()) {
        println!("\n{}", overview);
    }
}
