use std::sync::Arc;

use futures::future::try_join_all;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::types::{entry_id_from_url, EntrySummary, NamedResource, Page, PageCursor};

/// Fetches one listing page and enriches every entry with its type tags.
#[derive(Debug, Clone)]
pub struct ListLoader {
    catalog: Arc<dyn Catalog>,
}

impl ListLoader {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Load the page behind `cursor`. Enrichment requests run concurrently
    /// and the page fails as a whole if any one of them fails.
    pub async fn load_page(&self, cursor: &PageCursor) -> Result<Page> {
        let listing = self.catalog.fetch_page(cursor).await?;
        tracing::debug!(
            %cursor,
            results = listing.results.len(),
            total = listing.count,
            "listing fetched"
        );

        let entries = try_join_all(listing.results.into_iter().map(|r| self.enrich(r))).await?;

        Ok(Page {
            entries,
            next: listing.next.map(PageCursor::new),
        })
    }

    async fn enrich(&self, resource: NamedResource) -> Result<EntrySummary> {
        let id = entry_id_from_url(&resource.url)?;
        let types = self.catalog.fetch_types(&resource.url).await?;
        Ok(EntrySummary {
            id,
            name: resource.name,
            url: resource.url,
            types,
        })
    }
}
