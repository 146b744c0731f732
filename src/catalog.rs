use async_trait::async_trait;

use crate::error::Result;
use crate::types::{PageCursor, PageListing, PokemonDetail};

/// Upstream source of catalog pages and per-entry records.
#[async_trait]
pub trait Catalog: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    /// Cursor for the first page, `limit` entries per page.
    fn first_page(&self, limit: u32) -> PageCursor;

    /// URL of the per-entry resource for `id`.
    fn entry_url(&self, id: u32) -> String;

    async fn fetch_page(&self, cursor: &PageCursor) -> Result<PageListing>;

    /// Type tags for the entry behind `entry_url`.
    async fn fetch_types(&self, entry_url: &str) -> Result<Vec<String>>;

    async fn fetch_detail(&self, entry_url: &str) -> Result<PokemonDetail>;
}
