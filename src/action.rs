use crate::types::{Page, PokemonDetail};

#[derive(Debug, Clone)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    GoToTop,
    GoToBottom,
    Select,
    /// New terminal height in rows
    Resize(u16),

    // List paging
    /// Sentinel may have scrolled into view; ask the pager for the next page.
    LoadMore,
    Retry,
    Refresh,
    PageLoaded(Page, u64),
    PageFailed(String, u64),

    // Detail view
    ShowEntry(u32),
    DetailLoaded(Box<PokemonDetail>, u64),
    DetailFailed(String, u64),

    // Polish
    OpenInBrowser,
    YankUrl,

    None,
}

impl Action {
    /// Actions produced by a key press, as opposed to task results and resizes.
    pub fn is_user_input(&self) -> bool {
        matches!(
            self,
            Action::Quit
                | Action::Back
                | Action::ScrollUp
                | Action::ScrollDown
                | Action::PageUp
                | Action::PageDown
                | Action::GoToTop
                | Action::GoToBottom
                | Action::Select
                | Action::Retry
                | Action::Refresh
                | Action::OpenInBrowser
                | Action::YankUrl
        )
    }
}
