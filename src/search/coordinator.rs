//! Search coordination with last-settled-wins ordering
//!
//! Each settled query gets a monotonically increasing generation number.
//! In-flight fetches are not aborted when a newer query settles; their
//! results are simply discarded if their generation is no longer current
//! when the response arrives. The UI therefore always reflects the most
//! recently settled query, never the most recently returned response.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::api::TmdbClient;
use crate::types::SearchOutcome;

/// Events emitted by the coordinator toward the UI state layer
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// The settled query was empty: drop results, show the discovery state
    Reset,
    /// A fetch was dispatched for this settled query
    Started { generation: u64, query: String },
    /// A fetch resolved while still current
    Finished {
        generation: u64,
        outcome: SearchOutcome,
    },
}

/// Dispatches one fetch per settled query and discards stale responses
pub struct SearchCoordinator {
    client: Arc<TmdbClient>,
    events: mpsc::UnboundedSender<SearchEvent>,
    generation: Arc<AtomicU64>,
}

impl SearchCoordinator {
    pub fn new(client: Arc<TmdbClient>) -> (Self, mpsc::UnboundedReceiver<SearchEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let coordinator = Self {
            client,
            events,
            generation: Arc::new(AtomicU64::new(0)),
        };
        (coordinator, receiver)
    }

    /// Handle one settled query from the debouncer.
    ///
    /// Empty and whitespace-only queries never reach the fetch pipeline;
    /// they bump the generation (so stragglers from earlier queries get
    /// discarded) and reset the UI to the discovery state.
    pub fn submit(&self, query: &str) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let query = query.trim().to_string();

        if query.is_empty() {
            let _ = self.events.send(SearchEvent::Reset);
            return;
        }

        log::info!("search dispatched: {:?} (generation {})", query, generation);
        let _ = self.events.send(SearchEvent::Started {
            generation,
            query: query.clone(),
        });

        let client = Arc::clone(&self.client);
        let events = self.events.clone();
        let latest = Arc::clone(&self.generation);

        tokio::spawn(async move {
            let outcome = match client.search_multi(&query).await {
                Ok(items) => SearchOutcome::from_items(query.clone(), items),
                Err(err) => {
                    log::warn!("search failed for {:?}: {}", query, err);
                    SearchOutcome::from_error(query.clone(), err.to_string())
                }
            };

            // Apply only if this query is still the latest settled one
            if latest.load(Ordering::SeqCst) != generation {
                log::debug!(
                    "discarding stale result for {:?} (generation {})",
                    query,
                    generation
                );
                return;
            }

            let _ = events.send(SearchEvent::Finished {
                generation,
                outcome,
            });
        });
    }

    /// Generation of the most recently settled query
    pub fn latest_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }
}
