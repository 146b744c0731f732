use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::catalog::Catalog;
use crate::config::Config;
use crate::event::Event;
use crate::loader::ListLoader;
use crate::pager::{Pager, PagerState, Sentinel, Viewport};
use crate::types::{EntrySummary, PageCursor, PokemonDetail};

/// Header, status bar and the list's two border rows
const CHROME_ROWS: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,   // Infinite-scroll catalog
    Detail, // Single entry
}

pub struct App {
    pub screen: Screen,

    // List view
    pub pager: Pager,
    pub selected: usize,
    pub viewport: Viewport,
    sentinel: Sentinel,

    // Detail view
    pub current: Option<PokemonDetail>,
    pub scroll_offset: usize,
    pub loading_detail: bool,
    /// Tag of the detail request whose result is still wanted
    detail_request: u64,

    pub error: Option<String>,
    pub notice: Option<String>,
    pub should_quit: bool,
    catalog: Arc<dyn Catalog>,
    loader: ListLoader,
    action_tx: mpsc::UnboundedSender<Action>,
}

fn list_rows(terminal_rows: u16) -> usize {
    terminal_rows.saturating_sub(CHROME_ROWS) as usize
}

impl App {
    pub fn new(
        catalog: Arc<dyn Catalog>,
        config: &Config,
        action_tx: mpsc::UnboundedSender<Action>,
        terminal_size: (u16, u16),
    ) -> Self {
        let first = catalog.first_page(config.api.page_size);
        Self {
            screen: Screen::List,

            pager: Pager::new(first),
            selected: 0,
            viewport: Viewport {
                offset: 0,
                rows: list_rows(terminal_size.1),
            },
            sentinel: Sentinel::new(config.list.prefetch_rows),

            current: None,
            scroll_offset: 0,
            loading_detail: false,
            detail_request: 0,

            error: None,
            notice: None,
            should_quit: false,
            loader: ListLoader::new(Arc::clone(&catalog)),
            catalog,
            action_tx,
        }
    }

    pub fn entries(&self) -> &[EntrySummary] {
        self.pager.entries()
    }

    pub fn selected_entry(&self) -> Option<&EntrySummary> {
        self.pager.entries().get(self.selected)
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::LoadMore,
            Event::Key(key) => self.handle_key(key),
            Event::Resize(rows) => Action::Resize(rows),
            _ => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc if self.loading_detail => Action::Back,
            KeyCode::Char('q') | KeyCode::Esc => match self.screen {
                Screen::List => Action::Quit,
                Screen::Detail => Action::Back,
            },
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('d') if ctrl => Action::PageDown,
            KeyCode::Char('u') if ctrl => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Enter => Action::Select,
            KeyCode::Char('o') => Action::OpenInBrowser,
            KeyCode::Char('y') => Action::YankUrl,
            KeyCode::Char('r') if self.screen == Screen::List => Action::Retry,
            KeyCode::Char('R') if self.screen == Screen::List => Action::Refresh,
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if action.is_user_input() {
            self.error = None;
            self.notice = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => match self.screen {
                Screen::List if self.loading_detail => {
                    self.cancel_detail();
                }
                Screen::List => {
                    self.should_quit = true;
                }
                Screen::Detail => {
                    self.cancel_detail();
                    self.screen = Screen::List;
                    self.current = None;
                    self.scroll_offset = 0;
                    self.check_sentinel();
                }
            },
            Action::ScrollUp => match self.screen {
                Screen::List => self.select(self.selected.saturating_sub(1)),
                Screen::Detail => self.scroll_offset = self.scroll_offset.saturating_sub(1),
            },
            Action::ScrollDown => match self.screen {
                Screen::List => self.select(self.selected + 1),
                Screen::Detail => self.scroll_offset += 1,
            },
            Action::PageUp => {
                let step = self.viewport.rows.max(1);
                match self.screen {
                    Screen::List => self.select(self.selected.saturating_sub(step)),
                    Screen::Detail => {
                        self.scroll_offset = self.scroll_offset.saturating_sub(step)
                    }
                }
            }
            Action::PageDown => {
                let step = self.viewport.rows.max(1);
                match self.screen {
                    Screen::List => self.select(self.selected + step),
                    Screen::Detail => self.scroll_offset += step,
                }
            }
            Action::GoToTop => match self.screen {
                Screen::List => self.select(0),
                Screen::Detail => self.scroll_offset = 0,
            },
            Action::GoToBottom => match self.screen {
                Screen::List => self.select(usize::MAX),
                Screen::Detail => {}
            },
            Action::Select => {
                if self.screen == Screen::List {
                    if let Some(id) = self.selected_entry().map(|e| e.id) {
                        self.show_entry(id);
                    }
                }
            }
            Action::Resize(rows) => {
                self.viewport.rows = list_rows(rows);
                self.viewport.follow(self.selected);
                self.check_sentinel();
            }

            // List paging
            Action::LoadMore => {
                self.check_sentinel();
            }
            Action::Retry => {
                // Only a failed page is retried unconditionally; otherwise this is a plain visibility check.
                if self.pager.last_error().is_some() {
                    tracing::debug!(cursor = ?self.pager.next_cursor(), "retry requested");
                    if let Some(cursor) = self.pager.trigger(true) {
                        self.spawn_load_page(cursor);
                    }
                } else {
                    self.check_sentinel();
                }
            }
            Action::Refresh => {
                self.pager.reset();
                self.selected = 0;
                self.viewport.offset = 0;
                self.check_sentinel();
            }
            Action::PageLoaded(page, generation) => {
                let count = page.entries.len();
                if self.pager.complete(generation, page) {
                    tracing::info!(
                        count,
                        total = self.pager.len(),
                        exhausted = self.pager.state() == PagerState::Exhausted,
                        "page appended"
                    );
                    self.check_sentinel();
                }
            }
            Action::PageFailed(msg, generation) => {
                if self.pager.fail(generation, msg.clone()) {
                    tracing::warn!(error = %msg, "failed to load more entries");
                    self.error = Some(format!("Failed to load more: {}", msg));
                }
            }

            // Detail view
            Action::ShowEntry(id) => {
                self.show_entry(id);
            }
            Action::DetailLoaded(detail, request) => {
                if !self.wants_detail(request) {
                    tracing::debug!(id = detail.id, request, "dropping stale detail");
                    return;
                }
                self.loading_detail = false;
                self.current = Some(*detail);
                self.scroll_offset = 0;
                self.screen = Screen::Detail;
            }
            Action::DetailFailed(msg, request) => {
                if self.wants_detail(request) {
                    self.loading_detail = false;
                    self.error = Some(msg);
                }
            }

            Action::OpenInBrowser => {
                if let Some(url) = self.focused_artwork_url() {
                    if let Err(e) = open::that(&url) {
                        self.error = Some(format!("Failed to open browser: {}", e));
                    }
                }
            }
            Action::YankUrl => {
                if let Some(url) = self.focused_entry_url() {
                    match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(url.clone())) {
                        Ok(()) => self.notice = Some(format!("Copied {}", url)),
                        Err(e) => self.error = Some(format!("Clipboard unavailable: {}", e)),
                    }
                }
            }

            Action::None => {}
        }
    }

    /// Move the list selection (clamped) and re-check the sentinel.
    fn select(&mut self, index: usize) {
        let len = self.pager.len();
        self.selected = if self.pager.is_empty() {
            0
        } else {
            index.min(len - 1)
        };
        // Reaching the last entry brings the sentinel row on screen with it.
        if self.selected + 1 == len {
            self.viewport.follow(len);
        }
        self.viewport.follow(self.selected);
        self.check_sentinel();
    }

    /// Feed the sentinel's visibility to the pager and start a load if it asks for one.
    fn check_sentinel(&mut self) {
        if self.screen != Screen::List {
            return;
        }
        let visible = self.sentinel.is_visible(self.viewport, self.pager.len());
        if let Some(cursor) = self.pager.trigger(visible) {
            self.spawn_load_page(cursor);
        }
    }

    fn focused_artwork_url(&self) -> Option<String> {
        match self.screen {
            Screen::Detail => self
                .current
                .as_ref()
                .and_then(|d| d.image_url().map(str::to_string)),
            Screen::List => self.selected_entry().map(EntrySummary::artwork_url),
        }
    }

    fn focused_entry_url(&self) -> Option<String> {
        match self.screen {
            Screen::Detail => self.current.as_ref().map(|d| self.catalog.entry_url(d.id)),
            Screen::List => self.selected_entry().map(|e| e.url.clone()),
        }
    }

    fn show_entry(&mut self, id: u32) {
        self.detail_request += 1;
        self.loading_detail = true;
        self.spawn_load_detail(self.catalog.entry_url(id), self.detail_request);
    }

    /// Forget any detail request still in flight.
    fn cancel_detail(&mut self) {
        self.detail_request += 1;
        self.loading_detail = false;
    }

    fn wants_detail(&self, request: u64) -> bool {
        self.loading_detail && request == self.detail_request
    }

    fn spawn_load_page(&self, cursor: PageCursor) {
        let tx = self.action_tx.clone();
        let loader = self.loader.clone();
        let generation = self.pager.generation();
        tracing::debug!(%cursor, generation, "loading page");
        tokio::spawn(async move {
            match loader.load_page(&cursor).await {
                Ok(page) => {
                    tx.send(Action::PageLoaded(page, generation)).ok();
                }
                Err(e) => {
                    tx.send(Action::PageFailed(e.to_string(), generation)).ok();
                }
            }
        });
    }

    fn spawn_load_detail(&self, url: String, request: u64) {
        let tx = self.action_tx.clone();
        let catalog = Arc::clone(&self.catalog);
        tracing::debug!(%url, request, "loading detail");
        tokio::spawn(async move {
            match catalog.fetch_detail(&url).await {
                Ok(detail) => {
                    tx.send(Action::DetailLoaded(Box::new(detail), request)).ok();
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "failed to load detail");
                    tx.send(Action::DetailFailed(e.to_string(), request)).ok();
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::cache::{CachedCatalog, RequestCache};
    use crate::catalog::testing::StubCatalog;
    use crate::types::Page;

    /// 14 terminal rows leave a 10-row list viewport.
    fn app(stub: &Arc<StubCatalog>) -> (App, mpsc::UnboundedReceiver<Action>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut config = Config::default();
        config.list.prefetch_rows = 0;
        let catalog: Arc<dyn Catalog> = stub.clone();
        (App::new(catalog, &config, tx, (80, 14)), rx)
    }

    async fn pump(app: &mut App, rx: &mut mpsc::UnboundedReceiver<Action>) {
        let action = rx.recv().await.expect("action channel closed");
        app.update(action);
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[tokio::test]
    async fn repeated_visibility_issues_one_request() {
        let stub = Arc::new(StubCatalog::with_pages(&[12, 12]));
        let (mut app, mut rx) = app(&stub);

        for _ in 0..10 {
            app.update(Action::LoadMore);
        }
        pump(&mut app, &mut rx).await;

        assert_eq!(stub.page_calls.load(Ordering::SeqCst), 1);
        assert_eq!(app.entries().len(), 12);
        assert_eq!(app.pager.state(), PagerState::Idle);
    }

    #[tokio::test]
    async fn short_pages_keep_loading_until_viewport_is_full() {
        let stub = Arc::new(StubCatalog::with_pages(&[4, 4, 4, 4]));
        let (mut app, mut rx) = app(&stub);

        app.update(Action::LoadMore);
        for _ in 0..3 {
            pump(&mut app, &mut rx).await;
        }

        assert_eq!(app.entries().len(), 12);
        assert_eq!(app.pager.state(), PagerState::Idle);
        assert_eq!(stub.page_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn scrolling_to_the_end_loads_next_page() {
        let stub = Arc::new(StubCatalog::with_pages(&[12, 5]));
        let (mut app, mut rx) = app(&stub);

        app.update(Action::LoadMore);
        pump(&mut app, &mut rx).await;
        assert_eq!(stub.page_calls.load(Ordering::SeqCst), 1);

        app.update(Action::GoToBottom);
        assert_eq!(app.pager.state(), PagerState::Loading);
        pump(&mut app, &mut rx).await;

        assert_eq!(app.entries().len(), 17);
        assert_eq!(app.pager.state(), PagerState::Exhausted);

        for _ in 0..5 {
            app.update(Action::GoToBottom);
            app.update(Action::LoadMore);
        }
        assert_eq!(stub.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failed_page_can_be_retried() {
        let stub = Arc::new(StubCatalog::with_pages(&[4]));
        stub.fail_entry(2);
        let (mut app, mut rx) = app(&stub);

        app.update(Action::LoadMore);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.pager.state(), PagerState::Idle);
        assert!(app.pager.last_error().is_some());
        assert!(app.entries().is_empty());
        assert!(app
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("Failed to load more")));

        stub.heal();
        app.update(Action::Retry);
        assert!(app.error.is_none());
        pump(&mut app, &mut rx).await;

        assert_eq!(app.entries().len(), 4);
        assert_eq!(app.pager.state(), PagerState::Exhausted);
        assert!(app.pager.last_error().is_none());
    }

    #[tokio::test]
    async fn retry_without_error_waits_for_the_sentinel() {
        let stub = Arc::new(StubCatalog::with_pages(&[12, 12, 12]));
        let (mut app, mut rx) = app(&stub);

        app.update(Action::LoadMore);
        pump(&mut app, &mut rx).await;
        assert!(matches!(app.handle_event(key(KeyCode::Char('r'))), Action::Retry));

        for _ in 0..3 {
            app.update(Action::Retry);
        }
        assert_eq!(app.pager.state(), PagerState::Idle);
        assert_eq!(stub.page_calls.load(Ordering::SeqCst), 1);

        // With the sentinel on screen it behaves like any other visibility check.
        app.update(Action::GoToBottom);
        assert_eq!(app.pager.state(), PagerState::Loading);
        app.update(Action::Retry);
        pump(&mut app, &mut rx).await;
        assert_eq!(stub.page_calls.load(Ordering::SeqCst), 2);
        assert_eq!(app.entries().len(), 24);
    }

    #[tokio::test]
    async fn background_results_keep_the_error_visible() {
        let stub = Arc::new(StubCatalog::with_pages(&[4]));
        let (mut app, _rx) = app(&stub);

        app.error = Some("Clipboard unavailable".into());
        app.notice = Some("Copied".into());
        let stale = Page {
            entries: vec![],
            next: None,
        };
        app.update(Action::PageLoaded(stale, 99));
        app.update(Action::DetailFailed("late".into(), 99));
        app.update(Action::Resize(20));
        app.update(Action::None);
        assert_eq!(app.error.as_deref(), Some("Clipboard unavailable"));
        assert_eq!(app.notice.as_deref(), Some("Copied"));

        app.update(Action::ScrollDown);
        assert!(app.error.is_none());
        assert!(app.notice.is_none());
    }

    #[tokio::test]
    async fn refresh_drops_in_flight_page() {
        let stub = Arc::new(StubCatalog::with_pages(&[4]));
        let (mut app, mut rx) = app(&stub);

        app.update(Action::LoadMore);
        app.update(Action::Refresh);
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;

        assert_eq!(app.pager.generation(), 1);
        assert_eq!(app.entries().len(), 4);
        assert_eq!(stub.page_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn select_opens_detail_and_back_returns() {
        let stub = Arc::new(StubCatalog::with_pages(&[4]));
        let (mut app, mut rx) = app(&stub);

        app.update(Action::LoadMore);
        pump(&mut app, &mut rx).await;
        app.update(Action::ScrollDown);
        app.update(Action::Select);
        assert!(app.loading_detail);
        pump(&mut app, &mut rx).await;

        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(app.current.as_ref().map(|d| d.id), Some(2));
        assert!(!app.loading_detail);

        app.update(Action::Back);
        assert_eq!(app.screen, Screen::List);
        assert!(app.current.is_none());
    }

    #[tokio::test]
    async fn failed_detail_sets_error() {
        let stub = Arc::new(StubCatalog::with_pages(&[4]));
        stub.fail_entry(9);
        let (mut app, mut rx) = app(&stub);

        app.update(Action::ShowEntry(9));
        pump(&mut app, &mut rx).await;

        assert_eq!(app.screen, Screen::List);
        assert!(app.error.is_some());
        assert!(!app.loading_detail);
    }

    #[tokio::test]
    async fn latest_detail_request_wins() {
        let stub = Arc::new(StubCatalog::with_pages(&[4]));
        let inner: Arc<dyn Catalog> = stub.clone();
        let catalog: Arc<dyn Catalog> =
            Arc::new(CachedCatalog::new(inner, Arc::new(RequestCache::new())));
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut app = App::new(catalog, &Config::default(), tx, (80, 14));
        app.update(Action::LoadMore);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.pager.state(), PagerState::Exhausted);

        app.update(Action::ShowEntry(2));
        pump(&mut app, &mut rx).await;
        app.update(Action::Back);

        // Entry 2 is cached, so its answer arrives before the uncached entry 1.
        app.update(Action::ShowEntry(1));
        app.update(Action::ShowEntry(2));
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;

        assert_eq!(app.screen, Screen::Detail);
        assert_eq!(app.current.as_ref().map(|d| d.id), Some(2));
        assert!(!app.loading_detail);
        assert_eq!(stub.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn cancelled_detail_is_dropped() {
        let stub = Arc::new(StubCatalog::with_pages(&[4]));
        let (mut app, mut rx) = app(&stub);

        app.update(Action::ShowEntry(3));
        assert!(matches!(app.handle_event(key(KeyCode::Esc)), Action::Back));
        app.update(Action::Back);
        assert!(!app.should_quit);
        assert!(!app.loading_detail);

        pump(&mut app, &mut rx).await;
        assert_eq!(app.screen, Screen::List);
        assert!(app.current.is_none());

        // A failure that lands after the cancel is dropped as well.
        stub.fail_entry(1);
        app.update(Action::ShowEntry(1));
        app.update(Action::Back);
        pump(&mut app, &mut rx).await;
        assert!(app.error.is_none());
        assert_eq!(stub.detail_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn selection_is_clamped() {
        let stub = Arc::new(StubCatalog::with_pages(&[4]));
        let (mut app, mut rx) = app(&stub);

        app.update(Action::LoadMore);
        pump(&mut app, &mut rx).await;
        for _ in 0..10 {
            app.update(Action::ScrollDown);
        }
        assert_eq!(app.selected, 3);
        app.update(Action::PageUp);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn quit_and_back_keys() {
        let stub = Arc::new(StubCatalog::with_pages(&[1]));
        let (mut app, _rx) = app(&stub);

        assert!(matches!(app.handle_event(key(KeyCode::Char('q'))), Action::Quit));
        app.screen = Screen::Detail;
        assert!(matches!(app.handle_event(key(KeyCode::Char('q'))), Action::Back));
        assert!(matches!(app.handle_event(key(KeyCode::Esc)), Action::Back));
        assert!(matches!(app.handle_event(key(KeyCode::Char('r'))), Action::None));
    }

    #[test]
    fn navigation_keys() {
        let stub = Arc::new(StubCatalog::with_pages(&[1]));
        let (app, _rx) = app(&stub);

        assert!(matches!(app.handle_event(key(KeyCode::Char('j'))), Action::ScrollDown));
        assert!(matches!(app.handle_event(key(KeyCode::Up)), Action::ScrollUp));
        assert!(matches!(app.handle_event(key(KeyCode::Char('G'))), Action::GoToBottom));
        assert!(matches!(app.handle_event(key(KeyCode::Char('R'))), Action::Refresh));
        assert!(matches!(
            app.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL))),
            Action::PageDown
        ));
        assert!(matches!(app.handle_event(Event::Init), Action::LoadMore));
        assert!(matches!(
            app.handle_event(Event::Resize(30)),
            Action::Resize(30)
        ));
    }

    #[tokio::test]
    async fn resize_grows_viewport_and_loads() {
        let stub = Arc::new(StubCatalog::with_pages(&[12, 12]));
        let (mut app, mut rx) = app(&stub);

        app.update(Action::LoadMore);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.pager.state(), PagerState::Idle);

        app.update(Action::Resize(40));
        assert_eq!(app.viewport.rows, 36);
        assert_eq!(app.pager.state(), PagerState::Loading);
        pump(&mut app, &mut rx).await;
        assert_eq!(app.entries().len(), 24);
    }
}
