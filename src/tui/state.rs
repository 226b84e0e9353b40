//! UI state for the TUI application
//!
//! State only, no rendering: the event loop feeds it search events and key
//! input, and executes the actions it returns (dispatching queries, opening
//! details, mutating the watchlist). Keeping this layer pure makes the
//! view-state transitions testable without a terminal.

use crate::search::SearchEvent;
use crate::types::{MediaDetails, MediaItem, MediaType, SearchStatus};
use crate::watchlist::SavedItem;

/// Top-level page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Watchlist,
}

/// What the results area shows. The five states are mutually exclusive
/// and exhaustive; Discover doubles as the trending placeholder before
/// any query has been issued.
#[derive(Debug, Clone, PartialEq)]
pub enum ResultsView {
    Discover,
    Loading,
    Results,
    NoResults,
    Error { message: String },
}

/// Input events after key decoding, independent of crossterm types
#[derive(Debug, Clone, PartialEq)]
pub enum AppInput {
    TypeChar(char),
    Backspace,
    Up,
    Down,
    Select,
    ToggleWatchlist,
    ToggleWatched,
    SwitchPage,
    Escape,
    Quit,
}

/// Side effects for the event loop to carry out
#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    /// The raw query changed; feed it to the debouncer
    QueryChanged(String),
    /// Fetch the extended record for the selection
    OpenDetail { media_type: MediaType, id: u64 },
    ToggleWatchlist(MediaItem),
    ToggleWatched(MediaItem),
    Quit,
}

#[derive(Debug)]
pub struct AppState {
    pub query: String,
    pub page: Page,
    pub view: ResultsView,
    pub results: Vec<MediaItem>,
    pub trending: Vec<MediaItem>,
    pub watchlist: Vec<SavedItem>,
    pub watched: Vec<SavedItem>,
    pub selected_index: usize,
    pub detail: Option<MediaDetails>,
    pub status_message: String,
    pub should_quit: bool,
    latest_generation: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    pub fn new() -> Self {
        Self {
            query: String::new(),
            page: Page::Home,
            view: ResultsView::Discover,
            results: Vec::new(),
            trending: Vec::new(),
            watchlist: Vec::new(),
            watched: Vec::new(),
            selected_index: 0,
            detail: None,
            status_message: "Type to search movies and TV shows".to_string(),
            should_quit: false,
            latest_generation: 0,
        }
    }

    /// Apply a coordinator event. Finished events whose generation is older
    /// than the latest Started are stale and must not touch the UI.
    pub fn apply_search_event(&mut self, event: SearchEvent) {
        match event {
            SearchEvent::Reset => {
                self.results.clear();
                self.selected_index = 0;
                self.view = ResultsView::Discover;
            }
            SearchEvent::Started { generation, query } => {
                self.latest_generation = generation;
                self.view = ResultsView::Loading;
                self.status_message = format!("Searching for {:?}...", query);
            }
            SearchEvent::Finished {
                generation,
                outcome,
            } => {
                if generation != self.latest_generation {
                    log::debug!(
                        "ignoring stale outcome for {:?} (generation {} != {})",
                        outcome.query,
                        generation,
                        self.latest_generation
                    );
                    return;
                }
                self.selected_index = 0;
                match outcome.status {
                    SearchStatus::Success => {
                        self.status_message =
                            format!("{} results for {:?}", outcome.items.len(), outcome.query);
                        self.results = outcome.items;
                        self.view = ResultsView::Results;
                    }
                    SearchStatus::Empty => {
                        self.results.clear();
                        self.view = ResultsView::NoResults;
                        self.status_message = format!("No results for {:?}", outcome.query);
                    }
                    SearchStatus::Error { message } => {
                        self.results.clear();
                        self.status_message = "Search failed".to_string();
                        self.view = ResultsView::Error { message };
                    }
                    SearchStatus::Loading => {
                        self.view = ResultsView::Loading;
                    }
                }
            }
        }
    }

    /// Store the trending feed shown in the discovery state
    pub fn set_trending(&mut self, items: Vec<MediaItem>) {
        self.trending = items;
    }

    /// Mirror the persisted watchlist for rendering
    pub fn set_watchlist(&mut self, watchlist: Vec<SavedItem>, watched: Vec<SavedItem>) {
        self.watchlist = watchlist;
        self.watched = watched;
        let len = self.page_len();
        if self.selected_index >= len {
            self.selected_index = len.saturating_sub(1);
        }
    }

    pub fn apply_detail(&mut self, result: Result<MediaDetails, String>) {
        match result {
            Ok(details) => {
                self.status_message = details.display_title().to_string();
                self.detail = Some(details);
            }
            Err(message) => {
                self.status_message = format!("Failed to load details: {}", message);
            }
        }
    }

    /// Items currently listed on the home page: search results once a query
    /// has settled, the trending feed while discovering
    pub fn home_items(&self) -> &[MediaItem] {
        match self.view {
            ResultsView::Discover => &self.trending,
            _ => &self.results,
        }
    }

    fn page_len(&self) -> usize {
        match self.page {
            Page::Home => self.home_items().len(),
            Page::Watchlist => self.watchlist.len() + self.watched.len(),
        }
    }

    /// Selected item on the home page, if any
    pub fn selected_home_item(&self) -> Option<&MediaItem> {
        self.home_items().get(self.selected_index)
    }

    /// Selected entry on the watchlist page (to-watch list first, then watched)
    pub fn selected_watchlist_item(&self) -> Option<&SavedItem> {
        if self.selected_index < self.watchlist.len() {
            self.watchlist.get(self.selected_index)
        } else {
            self.watched.get(self.selected_index - self.watchlist.len())
        }
    }

    pub fn handle_input(&mut self, input: AppInput) -> Vec<AppAction> {
        let mut actions = Vec::new();

        match input {
            AppInput::Quit => {
                self.should_quit = true;
                actions.push(AppAction::Quit);
            }
            AppInput::SwitchPage => {
                self.page = match self.page {
                    Page::Home => Page::Watchlist,
                    Page::Watchlist => Page::Home,
                };
                self.selected_index = 0;
                self.detail = None;
            }
            AppInput::Up => {
                if self.selected_index > 0 {
                    self.selected_index -= 1;
                }
            }
            AppInput::Down => {
                let len = self.page_len();
                if len > 0 && self.selected_index < len - 1 {
                    self.selected_index += 1;
                }
            }
            AppInput::TypeChar(c) => {
                if self.page == Page::Home {
                    self.query.push(c);
                    actions.push(AppAction::QueryChanged(self.query.clone()));
                }
            }
            AppInput::Backspace => {
                if self.page == Page::Home && self.query.pop().is_some() {
                    actions.push(AppAction::QueryChanged(self.query.clone()));
                }
            }
            AppInput::Escape => {
                if self.detail.is_some() {
                    self.detail = None;
                } else if !self.query.is_empty() {
                    self.query.clear();
                    actions.push(AppAction::QueryChanged(String::new()));
                }
            }
            AppInput::Select => {
                if let Some((media_type, id)) = self.selected_identity() {
                    actions.push(AppAction::OpenDetail { media_type, id });
                }
            }
            AppInput::ToggleWatchlist => {
                if let Some(item) = self.selected_as_media() {
                    actions.push(AppAction::ToggleWatchlist(item));
                }
            }
            AppInput::ToggleWatched => {
                if let Some(item) = self.selected_as_media() {
                    actions.push(AppAction::ToggleWatched(item));
                }
            }
        }

        actions
    }

    fn selected_identity(&self) -> Option<(MediaType, u64)> {
        match self.page {
            Page::Home => self
                .selected_home_item()
                .map(|item| (item.media_type, item.id)),
            Page::Watchlist => self
                .selected_watchlist_item()
                .map(|saved| (saved.media_type, saved.id)),
        }
    }

    /// Selection as a `MediaItem` for watchlist mutations. Saved entries
    /// carry enough fields to rebuild one.
    fn selected_as_media(&self) -> Option<MediaItem> {
        match self.page {
            Page::Home => self.selected_home_item().cloned(),
            Page::Watchlist => self.selected_watchlist_item().map(|saved| MediaItem {
                id: saved.id,
                media_type: saved.media_type,
                title: saved.title.clone(),
                overview: String::new(),
                poster_path: saved.poster_path.clone(),
                backdrop_path: None,
                release_date: saved.release_date.clone(),
                vote_average: saved.vote_average,
                genre_ids: Vec::new(),
                popularity: 0.0,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SearchOutcome;

    fn media(id: u64, title: &str) -> MediaItem {
        MediaItem {
            id,
            media_type: MediaType::Movie,
            title: title.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            release_date: None,
            vote_average: 7.0,
            genre_ids: Vec::new(),
            popularity: 10.0,
        }
    }

    #[test]
    fn test_initial_state_is_discover() {
        let state = AppState::new();
        assert_eq!(state.view, ResultsView::Discover);
        assert_eq!(state.page, Page::Home);
        assert!(!state.should_quit);
    }

    #[test]
    fn test_started_moves_to_loading() {
        let mut state = AppState::new();
        state.apply_search_event(SearchEvent::Started {
            generation: 1,
            query: "alien".to_string(),
        });
        assert_eq!(state.view, ResultsView::Loading);
    }

    #[test]
    fn test_finished_with_items_shows_results() {
        let mut state = AppState::new();
        state.apply_search_event(SearchEvent::Started {
            generation: 1,
            query: "alien".to_string(),
        });
        state.apply_search_event(SearchEvent::Finished {
            generation: 1,
            outcome: SearchOutcome::from_items("alien", vec![media(1, "Alien")]),
        });

        assert_eq!(state.view, ResultsView::Results);
        assert_eq!(state.results.len(), 1);
    }

    #[test]
    fn test_finished_without_items_shows_no_results() {
        let mut state = AppState::new();
        state.apply_search_event(SearchEvent::Started {
            generation: 1,
            query: "zzzz".to_string(),
        });
        state.apply_search_event(SearchEvent::Finished {
            generation: 1,
            outcome: SearchOutcome::from_items("zzzz", Vec::new()),
        });
        assert_eq!(state.view, ResultsView::NoResults);
    }

    #[test]
    fn test_error_outcome_shows_error_view() {
        let mut state = AppState::new();
        state.apply_search_event(SearchEvent::Started {
            generation: 1,
            query: "alien".to_string(),
        });
        state.apply_search_event(SearchEvent::Finished {
            generation: 1,
            outcome: SearchOutcome::from_error("alien", "network request failed: offline"),
        });

        match &state.view {
            ResultsView::Error { message } => {
                assert!(message.contains("offline"));
            }
            other => panic!("expected Error view, got {:?}", other),
        }
    }

    #[test]
    fn test_stale_outcome_is_ignored() {
        let mut state = AppState::new();

        // Query A dispatched, then superseded by query B
        state.apply_search_event(SearchEvent::Started {
            generation: 1,
            query: "inter".to_string(),
        });
        state.apply_search_event(SearchEvent::Started {
            generation: 2,
            query: "interstellar".to_string(),
        });

        // B resolves first
        state.apply_search_event(SearchEvent::Finished {
            generation: 2,
            outcome: SearchOutcome::from_items("interstellar", vec![media(2, "Interstellar")]),
        });
        // A's response arrives late and must not overwrite B's
        state.apply_search_event(SearchEvent::Finished {
            generation: 1,
            outcome: SearchOutcome::from_items("inter", vec![media(1, "Inter Alia")]),
        });

        assert_eq!(state.view, ResultsView::Results);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].title, "Interstellar");
    }

    #[test]
    fn test_reset_returns_to_discover() {
        let mut state = AppState::new();
        state.apply_search_event(SearchEvent::Started {
            generation: 1,
            query: "alien".to_string(),
        });
        state.apply_search_event(SearchEvent::Finished {
            generation: 1,
            outcome: SearchOutcome::from_items("alien", vec![media(1, "Alien")]),
        });

        state.apply_search_event(SearchEvent::Reset);

        assert_eq!(state.view, ResultsView::Discover);
        assert!(state.results.is_empty());
    }

    #[test]
    fn test_typing_emits_query_changed() {
        let mut state = AppState::new();
        let actions = state.handle_input(AppInput::TypeChar('a'));
        assert_eq!(actions, vec![AppAction::QueryChanged("a".to_string())]);

        let actions = state.handle_input(AppInput::TypeChar('l'));
        assert_eq!(actions, vec![AppAction::QueryChanged("al".to_string())]);
    }

    #[test]
    fn test_backspace_on_empty_query_is_silent() {
        let mut state = AppState::new();
        assert!(state.handle_input(AppInput::Backspace).is_empty());
    }

    #[test]
    fn test_navigation_stays_in_bounds() {
        let mut state = AppState::new();
        state.results = vec![media(1, "A"), media(2, "B")];
        state.view = ResultsView::Results;

        state.handle_input(AppInput::Up);
        assert_eq!(state.selected_index, 0);

        state.handle_input(AppInput::Down);
        state.handle_input(AppInput::Down);
        state.handle_input(AppInput::Down);
        assert_eq!(state.selected_index, 1);
    }

    #[test]
    fn test_discover_lists_trending() {
        let mut state = AppState::new();
        state.set_trending(vec![media(1, "Dune"), media(2, "Severance")]);

        assert_eq!(state.home_items().len(), 2);
        assert_eq!(state.selected_home_item().unwrap().title, "Dune");
    }

    #[test]
    fn test_select_opens_detail_for_selection() {
        let mut state = AppState::new();
        state.results = vec![media(603, "The Matrix")];
        state.view = ResultsView::Results;

        let actions = state.handle_input(AppInput::Select);
        assert_eq!(
            actions,
            vec![AppAction::OpenDetail {
                media_type: MediaType::Movie,
                id: 603
            }]
        );
    }

    #[test]
    fn test_escape_closes_detail_before_clearing_query() {
        let mut state = AppState::new();
        state.query = "alien".to_string();
        state.apply_detail(Ok(serde_json::from_value(serde_json::json!({
            "id": 348, "title": "Alien"
        }))
        .unwrap()));
        assert!(state.detail.is_some());

        // First escape: close the detail pane, keep the query
        let actions = state.handle_input(AppInput::Escape);
        assert!(actions.is_empty());
        assert!(state.detail.is_none());
        assert_eq!(state.query, "alien");

        // Second escape: clear the query, which resets results downstream
        let actions = state.handle_input(AppInput::Escape);
        assert_eq!(actions, vec![AppAction::QueryChanged(String::new())]);
        assert!(state.query.is_empty());
    }

    #[test]
    fn test_switch_page_resets_selection() {
        let mut state = AppState::new();
        state.results = vec![media(1, "A"), media(2, "B")];
        state.view = ResultsView::Results;
        state.handle_input(AppInput::Down);

        state.handle_input(AppInput::SwitchPage);
        assert_eq!(state.page, Page::Watchlist);
        assert_eq!(state.selected_index, 0);
    }

    #[test]
    fn test_watchlist_toggle_action_carries_item() {
        let mut state = AppState::new();
        state.results = vec![media(1, "Alien")];
        state.view = ResultsView::Results;

        let actions = state.handle_input(AppInput::ToggleWatchlist);
        match &actions[0] {
            AppAction::ToggleWatchlist(item) => assert_eq!(item.id, 1),
            other => panic!("expected ToggleWatchlist, got {:?}", other),
        }
    }
}
