use crate::types::{EntrySummary, Page, PageCursor};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PagerState {
    #[default]
    Idle,
    Loading,
    Exhausted,
}

/// Accumulated list plus the infinite-scroll state machine that grows it.
///
/// At most one page is in flight: `trigger` only hands out a cursor from
/// `Idle`. A failed load drops back to `Idle` with the cursor kept, so the
/// next trigger retries the same page.
#[derive(Debug, Clone)]
pub struct Pager {
    state: PagerState,
    first: PageCursor,
    next: Option<PageCursor>,
    entries: Vec<EntrySummary>,
    generation: u64,
    last_error: Option<String>,
}

impl Pager {
    pub fn new(first: PageCursor) -> Self {
        Self {
            state: PagerState::Idle,
            next: Some(first.clone()),
            first,
            entries: Vec::new(),
            generation: 0,
            last_error: None,
        }
    }

    pub fn state(&self) -> PagerState {
        self.state
    }

    pub fn entries(&self) -> &[EntrySummary] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn next_cursor(&self) -> Option<&PageCursor> {
        self.next.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Visibility signal from the sentinel. Returns the cursor to fetch when
    /// a load should start; the pager is then `Loading`.
    pub fn trigger(&mut self, sentinel_visible: bool) -> Option<PageCursor> {
        if !sentinel_visible || self.state != PagerState::Idle {
            return None;
        }
        let cursor = self.next.clone()?;
        self.state = PagerState::Loading;
        self.last_error = None;
        Some(cursor)
    }

    /// Append a loaded page. Results for another generation, or arriving
    /// while not loading, are dropped and `false` is returned.
    pub fn complete(&mut self, generation: u64, page: Page) -> bool {
        if generation != self.generation || self.state != PagerState::Loading {
            tracing::debug!(generation, current = self.generation, "dropping stale page");
            return false;
        }
        self.entries.extend(page.entries);
        self.next = page.next;
        self.state = if self.next.is_some() {
            PagerState::Idle
        } else {
            PagerState::Exhausted
        };
        true
    }

    /// Record a failed load and return to `Idle` so the page can be retried.
    pub fn fail(&mut self, generation: u64, error: String) -> bool {
        if generation != self.generation || self.state != PagerState::Loading {
            return false;
        }
        self.state = PagerState::Idle;
        self.last_error = Some(error);
        true
    }

    /// Throw away the list and start over from the first page.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.state = PagerState::Idle;
        self.next = Some(self.first.clone());
        self.entries.clear();
        self.last_error = None;
    }
}

/// Row scrolled into the top of the list and number of rows shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    pub offset: usize,
    pub rows: usize,
}

impl Viewport {
    /// Shift `offset` so that `selected` is on screen.
    pub fn follow(&mut self, selected: usize) {
        if selected < self.offset {
            self.offset = selected;
        } else if self.rows > 0 && selected >= self.offset + self.rows {
            self.offset = selected + 1 - self.rows;
        }
    }
}

/// The marker row rendered right after the last entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sentinel {
    /// Rows below the viewport that still count as visible (prefetch).
    pub margin: usize,
}

impl Sentinel {
    pub fn new(margin: usize) -> Self {
        Self { margin }
    }

    /// The sentinel sits at row `len`.
    pub fn is_visible(&self, viewport: Viewport, len: usize) -> bool {
        len < viewport.offset + viewport.rows + self.margin
    }
}
