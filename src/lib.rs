pub mod api;
pub mod cache;
pub mod cli;
pub mod search;
pub mod tui;
pub mod types;
pub mod watchlist;

pub use api::{ApiError, HttpTransport, TmdbClient, Transport, TransportResponse};
pub use cache::ResponseCache;
pub use search::{QueryDebouncer, SearchCoordinator, SearchEvent};
pub use types::{MediaDetails, MediaItem, MediaType, SearchOutcome, SearchStatus};
pub use watchlist::WatchlistStore;
