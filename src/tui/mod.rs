//! Interactive TUI: search-as-you-type with debouncing, trending on the
//! discovery screen, a watchlist page, and a detail pane.
//!
//! Architecture follows a state/loop split: `AppState` (see `state`) holds
//! all UI state and is driven purely by events; this module owns the
//! terminal, translates crossterm keys, polls the debouncer on a tick, and
//! executes the actions the state returns.

pub mod state;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{Event as CrosstermEvent, KeyCode, KeyEvent, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use tokio::sync::mpsc;

use crate::api::{TimeWindow, TmdbClient, TrendingFilter};
use crate::search::{QueryDebouncer, SearchCoordinator, SearchEvent};
use crate::types::{MediaDetails, MediaItem};
use crate::watchlist::WatchlistStore;

use state::{AppAction, AppInput, AppState, Page, ResultsView};

/// How often the loop wakes up to poll the debouncer and redraw
const TICK: Duration = Duration::from_millis(50);
/// Poll timeout for the crossterm input task
const INPUT_POLL: Duration = Duration::from_millis(20);

/// Events multiplexed into the main loop
enum AppEvent {
    Input(AppInput),
    Trending(Result<Vec<MediaItem>, String>),
    Detail(Result<MediaDetails, String>),
}

/// Run the interactive TUI until the user quits
pub async fn run_tui(
    client: Arc<TmdbClient>,
    store: WatchlistStore,
    quiet_period: Duration,
) -> Result<()> {
    enable_raw_mode().context("failed to enable raw mode")?;
    crossterm::execute!(io::stdout(), EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    let result = event_loop(&mut terminal, client, store, quiet_period).await;

    // Always restore the terminal, even when the loop errored
    disable_raw_mode().ok();
    crossterm::execute!(io::stdout(), LeaveAlternateScreen).ok();

    result
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    client: Arc<TmdbClient>,
    mut store: WatchlistStore,
    quiet_period: Duration,
) -> Result<()> {
    let mut state = AppState::new();
    let mut debouncer = QueryDebouncer::with_quiet_period(quiet_period);
    let (coordinator, mut search_rx) = SearchCoordinator::new(Arc::clone(&client));

    state.set_watchlist(store.watchlist().to_vec(), store.watched().to_vec());

    let (events_tx, mut events_rx) = mpsc::unbounded_channel::<AppEvent>();

    spawn_input_task(events_tx.clone());
    spawn_trending_task(Arc::clone(&client), events_tx.clone());

    let mut tick = tokio::time::interval(TICK);

    loop {
        terminal.draw(|frame| draw(frame, &state))?;

        tokio::select! {
            _ = tick.tick() => {
                if let Some(settled) = debouncer.poll_settled() {
                    coordinator.submit(&settled);
                }
            }
            Some(event) = search_rx.recv() => {
                state.apply_search_event(event);
            }
            Some(event) = events_rx.recv() => {
                match event {
                    AppEvent::Input(input) => {
                        for action in state.handle_input(input) {
                            execute_action(
                                action,
                                &mut state,
                                &mut store,
                                &mut debouncer,
                                &coordinator,
                                &client,
                                &events_tx,
                            );
                        }
                    }
                    AppEvent::Trending(Ok(items)) => state.set_trending(items),
                    AppEvent::Trending(Err(message)) => {
                        log::warn!("failed to load trending feed: {}", message);
                    }
                    AppEvent::Detail(result) => state.apply_detail(result),
                }
            }
        }

        if state.should_quit {
            break;
        }
    }

    Ok(())
}

fn execute_action(
    action: AppAction,
    state: &mut AppState,
    store: &mut WatchlistStore,
    debouncer: &mut QueryDebouncer,
    coordinator: &SearchCoordinator,
    client: &Arc<TmdbClient>,
    events_tx: &mpsc::UnboundedSender<AppEvent>,
) {
    match action {
        AppAction::QueryChanged(query) => {
            if query.is_empty() {
                // No quiet period for an explicit clear
                debouncer.cancel();
                coordinator.submit("");
            } else {
                debouncer.note_input(query);
            }
        }
        AppAction::OpenDetail { media_type, id } => {
            let client = Arc::clone(client);
            let events_tx = events_tx.clone();
            tokio::spawn(async move {
                let result = client
                    .details(media_type, id)
                    .await
                    .map_err(|e| e.to_string());
                let _ = events_tx.send(AppEvent::Detail(result));
            });
        }
        AppAction::ToggleWatchlist(item) => {
            if let Err(err) = store.toggle(&item) {
                log::error!("failed to update watchlist: {}", err);
            }
            state.set_watchlist(store.watchlist().to_vec(), store.watched().to_vec());
        }
        AppAction::ToggleWatched(item) => {
            if let Err(err) = store.toggle_watched(&item) {
                log::error!("failed to update watched list: {}", err);
            }
            state.set_watchlist(store.watchlist().to_vec(), store.watched().to_vec());
        }
        AppAction::Quit => {}
    }
}

/// Forward crossterm key events into the loop as `AppInput`
fn spawn_input_task(events_tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        loop {
            if crossterm::event::poll(INPUT_POLL).unwrap_or(false) {
                match crossterm::event::read() {
                    Ok(CrosstermEvent::Key(key)) => {
                        if let Some(input) = map_key(key) {
                            if events_tx.send(AppEvent::Input(input)).is_err() {
                                break;
                            }
                        }
                    }
                    Ok(_) => {}
                    Err(_) => break,
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    });
}

fn spawn_trending_task(client: Arc<TmdbClient>, events_tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        let result = client
            .trending(TrendingFilter::All, TimeWindow::Week)
            .await
            .map_err(|e| e.to_string());
        let _ = events_tx.send(AppEvent::Trending(result));
    });
}

/// Translate a key event into an app input. Plain characters go to the
/// search query; watchlist mutations use Ctrl so they never collide with
/// typing.
fn map_key(key: KeyEvent) -> Option<AppInput> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') => Some(AppInput::Quit),
            KeyCode::Char('w') => Some(AppInput::ToggleWatchlist),
            KeyCode::Char('d') => Some(AppInput::ToggleWatched),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Esc => Some(AppInput::Escape),
        KeyCode::Tab => Some(AppInput::SwitchPage),
        KeyCode::Up => Some(AppInput::Up),
        KeyCode::Down => Some(AppInput::Down),
        KeyCode::Enter => Some(AppInput::Select),
        KeyCode::Backspace => Some(AppInput::Backspace),
        KeyCode::Char(c) => Some(AppInput::TypeChar(c)),
        _ => None,
    }
}

fn draw(frame: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(3),
        ])
        .split(frame.size());

    draw_search_bar(frame, chunks[0], state);
    match state.page {
        Page::Home => draw_home(frame, chunks[1], state),
        Page::Watchlist => draw_watchlist(frame, chunks[1], state),
    }
    draw_status_bar(frame, chunks[2], state);

    if let Some(details) = &state.detail {
        draw_detail_overlay(frame, details);
    }
}

fn draw_search_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = match state.page {
        Page::Home => " Search ",
        Page::Watchlist => " Watchlist ",
    };
    let input = Paragraph::new(state.query.as_str())
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(input, area);
}

fn draw_home(frame: &mut Frame, area: Rect, state: &AppState) {
    match &state.view {
        ResultsView::Loading => {
            draw_message(frame, area, " Results ", "Searching...", Color::Yellow);
        }
        ResultsView::NoResults => {
            draw_message(
                frame,
                area,
                " Results ",
                "No results. Try a different title.",
                Color::DarkGray,
            );
        }
        ResultsView::Error { message } => {
            let text = format!("{}\n\nKeep typing to retry.", message);
            draw_message(frame, area, " Error ", &text, Color::Red);
        }
        ResultsView::Discover | ResultsView::Results => {
            let title = if state.view == ResultsView::Discover {
                " Trending this week "
            } else {
                " Results "
            };
            let items: Vec<ListItem> = state
                .home_items()
                .iter()
                .map(|item| media_row(item, state))
                .collect();
            draw_list(frame, area, title, items, state.selected_index);
        }
    }
}

fn draw_watchlist(frame: &mut Frame, area: Rect, state: &AppState) {
    if state.watchlist.is_empty() && state.watched.is_empty() {
        draw_message(
            frame,
            area,
            " Watchlist ",
            "Nothing saved yet. Ctrl-W on a result adds it.",
            Color::DarkGray,
        );
        return;
    }

    let mut items: Vec<ListItem> = Vec::new();
    for saved in &state.watchlist {
        items.push(saved_row(saved, false));
    }
    for saved in &state.watched {
        items.push(saved_row(saved, true));
    }
    draw_list(frame, area, " Watchlist ", items, state.selected_index);
}

fn media_row<'a>(item: &'a MediaItem, state: &AppState) -> ListItem<'a> {
    let mut spans = vec![
        Span::styled(
            item.title.as_str(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!(" ({})", item.year().unwrap_or("----"))),
        Span::styled(
            format!("  {} ", item.media_type.label()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(" ★ {:.1}", item.vote_average),
            Style::default().fg(Color::Yellow),
        ),
    ];

    if state.watchlist.iter().any(|saved| saved.id == item.id) {
        spans.push(Span::styled(" [watchlist]", Style::default().fg(Color::Green)));
    }
    if state.watched.iter().any(|saved| saved.id == item.id) {
        spans.push(Span::styled(" [watched]", Style::default().fg(Color::Blue)));
    }

    ListItem::new(Line::from(spans))
}

fn saved_row(saved: &crate::watchlist::SavedItem, watched: bool) -> ListItem<'static> {
    let marker = if watched { "✓" } else { "·" };
    let line = Line::from(vec![
        Span::raw(format!("{} ", marker)),
        Span::styled(
            saved.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} ", saved.media_type.label()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!(" ★ {:.1}", saved.vote_average),
            Style::default().fg(Color::Yellow),
        ),
    ]);
    ListItem::new(line)
}

fn draw_list(frame: &mut Frame, area: Rect, title: &str, items: Vec<ListItem>, selected: usize) {
    let mut list_state = ListState::default();
    if !items.is_empty() {
        list_state.select(Some(selected));
    }

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title.to_string()))
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut list_state);
}

fn draw_message(frame: &mut Frame, area: Rect, title: &str, text: &str, color: Color) {
    let paragraph = Paragraph::new(text.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title.to_string()));
    frame.render_widget(paragraph, area);
}

fn draw_status_bar(frame: &mut Frame, area: Rect, state: &AppState) {
    let help = match state.page {
        Page::Home => "Tab watchlist · Enter details · Ctrl-W save · Ctrl-D watched · Ctrl-C quit",
        Page::Watchlist => "Tab home · Enter details · Ctrl-W remove · Ctrl-D watched · Ctrl-C quit",
    };
    let line = Line::from(vec![
        Span::raw(state.status_message.clone()),
        Span::styled(
            format!("  |  {}", help),
            Style::default().fg(Color::DarkGray),
        ),
    ]);
    let paragraph = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_detail_overlay(frame: &mut Frame, details: &MediaDetails) {
    let area = centered_rect(70, 70, frame.size());

    let mut lines = vec![Line::from(Span::styled(
        details.display_title().to_string(),
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    if let Some(tagline) = details.tagline.as_deref().filter(|t| !t.is_empty()) {
        lines.push(Line::from(Span::styled(
            tagline.to_string(),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
    }
    lines.push(Line::from(""));

    let date = details
        .release_date
        .as_deref()
        .or(details.first_air_date.as_deref())
        .unwrap_or("unknown");
    lines.push(Line::from(format!("Released: {}", date)));

    if let Some(rating) = details.vote_average {
        lines.push(Line::from(format!("Rating: {:.1} / 10", rating)));
    }
    if let Some(minutes) = details.runtime_minutes() {
        lines.push(Line::from(format!("Runtime: {} min", minutes)));
    }
    if !details.genres.is_empty() {
        let names: Vec<&str> = details.genres.iter().map(|g| g.name.as_str()).collect();
        lines.push(Line::from(format!("Genres: {}", names.join(", "))));
    }
    if let Some(status) = details.status.as_deref() {
        lines.push(Line::from(format!("Status: {}", status)));
    }

    if let Some(overview) = details.overview.as_deref().filter(|o| !o.is_empty()) {
        lines.push(Line::from(""));
        lines.push(Line::from(overview.to_string()));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc to close",
        Style::default().fg(Color::DarkGray),
    )));

    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(" Details "));

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Centered sub-rectangle taking the given percentage of each dimension
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
