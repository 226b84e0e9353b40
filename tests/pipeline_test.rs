//! Fetch pipeline integration tests
//!
//! Drives the TMDB client and search coordinator with a scripted transport
//! so network behavior (latency, failures, call counts) is fully controlled.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::timeout;

use reel::api::{ApiError, TmdbClient, Transport, TransportResponse, TrendingFilter};
use reel::cache::ResponseCache;
use reel::search::{QueryDebouncer, SearchCoordinator, SearchEvent};
use reel::tui::state::{AppState, ResultsView};

/// One scripted reply, matched by substring against the request URL
#[derive(Clone)]
struct Route {
    url_fragment: String,
    delay: Duration,
    reply: Result<(u16, String), String>,
}

/// Transport that serves scripted replies and counts outbound calls.
/// Routes are checked in insertion order; keep more specific fragments first.
struct ScriptedTransport {
    routes: Mutex<Vec<Route>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        })
    }

    fn route(&self, url_fragment: &str, status: u16, body: &str) {
        self.route_delayed(url_fragment, status, body, Duration::ZERO);
    }

    fn route_delayed(&self, url_fragment: &str, status: u16, body: &str, delay: Duration) {
        self.routes.lock().unwrap().push(Route {
            url_fragment: url_fragment.to_string(),
            delay,
            reply: Ok((status, body.to_string())),
        });
    }

    fn route_failure(&self, url_fragment: &str, message: &str) {
        self.routes.lock().unwrap().push(Route {
            url_fragment: url_fragment.to_string(),
            delay: Duration::ZERO,
            reply: Err(message.to_string()),
        });
    }

    fn clear_routes(&self) {
        self.routes.lock().unwrap().clear();
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn get(&self, url: &str) -> Result<TransportResponse, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let route = {
            let routes = self.routes.lock().unwrap();
            routes
                .iter()
                .find(|route| url.contains(&route.url_fragment))
                .cloned()
        };

        let route = route.unwrap_or_else(|| panic!("no scripted route for {}", url));

        if !route.delay.is_zero() {
            tokio::time::sleep(route.delay).await;
        }

        match route.reply {
            Ok((status, body)) => Ok(TransportResponse { status, body }),
            Err(message) => Err(ApiError::Transport(message)),
        }
    }
}

fn client_with(transport: Arc<ScriptedTransport>, ttl: Duration) -> Arc<TmdbClient> {
    Arc::new(TmdbClient::new(
        "test-key",
        transport as Arc<dyn Transport>,
        ResponseCache::with_ttl(ttl),
    ))
}

fn results_body(titles: &[(u64, &str)]) -> String {
    let records: Vec<String> = titles
        .iter()
        .map(|(id, title)| {
            format!(
                r#"{{"id": {}, "media_type": "movie", "title": "{}", "popularity": 10.0}}"#,
                id, title
            )
        })
        .collect();
    format!(r#"{{"results": [{}]}}"#, records.join(","))
}

/// Drain coordinator events into the UI state until the channel goes quiet
async fn pump_events(state: &mut AppState, receiver: &mut mpsc::UnboundedReceiver<SearchEvent>) {
    while let Ok(Some(event)) = timeout(Duration::from_millis(200), receiver.recv()).await {
        state.apply_search_event(event);
    }
}

mod cache_short_circuit {
    use super::*;

    #[tokio::test]
    async fn should_issue_exactly_one_network_call_within_ttl() {
        let transport = ScriptedTransport::new();
        transport.route("search/multi", 200, &results_body(&[(1, "Alien")]));
        let client = client_with(transport.clone(), Duration::from_secs(300));

        let first = client.search_multi("alien").await.unwrap();
        let second = client.search_multi("alien").await.unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn should_refetch_once_the_entry_goes_stale() {
        let transport = ScriptedTransport::new();
        transport.route("search/multi", 200, &results_body(&[(1, "Alien")]));
        let client = client_with(transport.clone(), Duration::from_millis(30));

        client.search_multi("alien").await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        client.search_multi("alien").await.unwrap();

        assert_eq!(transport.call_count(), 2);
    }

    #[tokio::test]
    async fn should_cache_recommendation_fetches_like_any_other() {
        let transport = ScriptedTransport::new();
        transport.route(
            "movie/603/recommendations",
            200,
            &results_body(&[(604, "The Matrix Reloaded")]),
        );
        let client = client_with(transport.clone(), Duration::from_secs(300));

        let first = client
            .recommendations(reel::types::MediaType::Movie, 603)
            .await
            .unwrap();
        client
            .recommendations(reel::types::MediaType::Movie, 603)
            .await
            .unwrap();

        assert_eq!(transport.call_count(), 1);
        assert_eq!(first[0].title, "The Matrix Reloaded");
    }

    #[tokio::test]
    async fn should_refetch_after_an_explicit_cache_clear() {
        let transport = ScriptedTransport::new();
        transport.route("search/multi", 200, &results_body(&[(1, "Alien")]));
        let client = client_with(transport.clone(), Duration::from_secs(300));

        client.search_multi("alien").await.unwrap();
        client.clear_cache();
        client.search_multi("alien").await.unwrap();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(client.cache_stats().entry_count, 1);
    }

    #[tokio::test]
    async fn should_not_share_cache_entries_between_distinct_queries() {
        let transport = ScriptedTransport::new();
        transport.route("query=aliens", 200, &results_body(&[(2, "Aliens")]));
        transport.route("query=alien", 200, &results_body(&[(1, "Alien")]));
        let client = client_with(transport.clone(), Duration::from_secs(300));

        let first = client.search_multi("alien").await.unwrap();
        let second = client.search_multi("aliens").await.unwrap();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(first[0].title, "Alien");
        assert_eq!(second[0].title, "Aliens");
    }
}

mod scoped_search {
    use super::*;

    #[tokio::test]
    async fn should_tag_kind_scoped_results_without_a_discriminator() {
        let transport = ScriptedTransport::new();
        // The tv search endpoint returns records without `media_type`
        transport.route(
            "search/tv",
            200,
            r#"{"results": [{"id": 5, "name": "Severance", "popularity": 80.0}]}"#,
        );
        let client = client_with(transport, Duration::from_secs(300));

        let items = client.search(TrendingFilter::Tv, "severance").await.unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].media_type, reel::types::MediaType::Tv);
        assert_eq!(items[0].title, "Severance");
    }
}

mod error_surfacing {
    use super::*;

    #[tokio::test]
    async fn should_surface_http_status_and_not_warm_the_cache() {
        let transport = ScriptedTransport::new();
        transport.route("search/multi", 500, "Internal Server Error");
        let client = client_with(transport.clone(), Duration::from_secs(300));

        let err = client.search_multi("alien").await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 500 }));
        assert!(!err.to_string().is_empty());

        // The failed response must not have been cached
        transport.clear_routes();
        transport.route("search/multi", 200, &results_body(&[(1, "Alien")]));
        let items = client.search_multi("alien").await.unwrap();

        assert_eq!(transport.call_count(), 2);
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn should_surface_transport_failures_with_a_message() {
        let transport = ScriptedTransport::new();
        transport.route_failure("search/multi", "connection refused");
        let client = client_with(transport.clone(), Duration::from_secs(300));

        let err = client.search_multi("alien").await.unwrap_err();
        match &err {
            ApiError::Transport(message) => assert!(message.contains("connection refused")),
            other => panic!("expected Transport error, got {:?}", other),
        }
        assert_eq!(client.cache_stats().entry_count, 0);
    }

    #[tokio::test]
    async fn should_report_undecodable_bodies_as_decode_errors() {
        let transport = ScriptedTransport::new();
        transport.route("search/multi", 200, "<html>not json</html>");
        let client = client_with(transport.clone(), Duration::from_secs(300));

        let err = client.search_multi("alien").await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
        assert_eq!(client.cache_stats().entry_count, 0);
    }

    #[tokio::test]
    async fn should_put_coordinator_into_error_state_with_message() {
        let transport = ScriptedTransport::new();
        transport.route_failure("search/multi", "offline");
        let client = client_with(transport, Duration::from_secs(300));

        let (coordinator, mut receiver) = SearchCoordinator::new(client);
        let mut state = AppState::new();

        coordinator.submit("alien");
        pump_events(&mut state, &mut receiver).await;

        match &state.view {
            ResultsView::Error { message } => assert!(!message.is_empty()),
            other => panic!("expected Error view, got {:?}", other),
        }
    }
}

mod stale_response_discard {
    use super::*;

    #[tokio::test]
    async fn should_keep_the_newest_settled_query_despite_arrival_order() {
        let transport = ScriptedTransport::new();
        // The older query answers slowly, the newer one quickly
        transport.route_delayed(
            "query=interstellar",
            200,
            &results_body(&[(2, "Interstellar")]),
            Duration::from_millis(10),
        );
        transport.route_delayed(
            "query=inter",
            200,
            &results_body(&[(1, "Inter Alia")]),
            Duration::from_millis(120),
        );
        let client = client_with(transport, Duration::from_secs(300));

        let (coordinator, mut receiver) = SearchCoordinator::new(client);
        let mut state = AppState::new();

        coordinator.submit("inter");
        tokio::time::sleep(Duration::from_millis(20)).await;
        coordinator.submit("interstellar");

        // Give the slow response time to resolve (and get discarded)
        tokio::time::sleep(Duration::from_millis(200)).await;
        pump_events(&mut state, &mut receiver).await;

        assert_eq!(state.view, ResultsView::Results);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].title, "Interstellar");
    }

    #[tokio::test]
    async fn should_discard_in_flight_results_after_a_reset() {
        let transport = ScriptedTransport::new();
        transport.route_delayed(
            "query=alien",
            200,
            &results_body(&[(1, "Alien")]),
            Duration::from_millis(80),
        );
        let client = client_with(transport, Duration::from_secs(300));

        let (coordinator, mut receiver) = SearchCoordinator::new(client);
        let mut state = AppState::new();

        coordinator.submit("alien");
        // The user clears the input before the response lands
        coordinator.submit("");

        tokio::time::sleep(Duration::from_millis(150)).await;
        pump_events(&mut state, &mut receiver).await;

        assert_eq!(state.view, ResultsView::Discover);
        assert!(state.results.is_empty());
    }
}

mod debounced_search {
    use super::*;

    #[tokio::test]
    async fn should_coalesce_rapid_keystrokes_into_one_fetch() {
        let transport = ScriptedTransport::new();
        transport.route("search/multi", 200, &results_body(&[(1, "Interstellar")]));
        let client = client_with(transport.clone(), Duration::from_secs(300));

        let (coordinator, mut receiver) = SearchCoordinator::new(client);
        let mut state = AppState::new();
        let mut debouncer = QueryDebouncer::with_quiet_period(Duration::from_millis(30));

        // Keystrokes arriving well inside the quiet period
        for value in ["i", "in", "int", "inter"] {
            debouncer.note_input(value);
            if let Some(settled) = debouncer.poll_settled() {
                coordinator.submit(&settled);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        // Let the final value settle, then poll like the event loop would
        tokio::time::sleep(Duration::from_millis(40)).await;
        if let Some(settled) = debouncer.poll_settled() {
            coordinator.submit(&settled);
        }

        pump_events(&mut state, &mut receiver).await;

        assert_eq!(transport.call_count(), 1);
        assert_eq!(state.view, ResultsView::Results);
        assert_eq!(state.results[0].title, "Interstellar");
        assert_eq!(coordinator.latest_generation(), 1);
    }

    #[tokio::test]
    async fn should_suppress_whitespace_only_queries_entirely() {
        let transport = ScriptedTransport::new();
        let client = client_with(transport.clone(), Duration::from_secs(300));

        let (coordinator, mut receiver) = SearchCoordinator::new(client);
        let mut state = AppState::new();
        let mut debouncer = QueryDebouncer::with_quiet_period(Duration::from_millis(10));

        debouncer.note_input("   ");
        tokio::time::sleep(Duration::from_millis(20)).await;
        if let Some(settled) = debouncer.poll_settled() {
            coordinator.submit(&settled);
        }

        pump_events(&mut state, &mut receiver).await;

        assert_eq!(transport.call_count(), 0);
        assert_eq!(state.view, ResultsView::Discover);
    }
}
