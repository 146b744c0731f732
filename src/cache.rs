use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::catalog::Catalog;
use crate::error::Result;
use crate::types::{PageCursor, PageListing, PokemonDetail};

/// Request memo keyed by URL. Unbounded, lives as long as its owner;
/// nothing is ever evicted.
#[derive(Debug)]
pub struct RequestCache<V> {
    entries: Mutex<HashMap<String, V>>,
}

impl<V> Default for RequestCache<V> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<V: Clone> RequestCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    pub fn insert(&self, key: &str, value: V) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }
}

/// Wraps a catalog so detail records are fetched at most once per URL.
/// Type enrichment is answered from a cached detail when one exists.
#[derive(Debug)]
pub struct CachedCatalog {
    inner: Arc<dyn Catalog>,
    details: Arc<RequestCache<PokemonDetail>>,
}

impl CachedCatalog {
    pub fn new(inner: Arc<dyn Catalog>, details: Arc<RequestCache<PokemonDetail>>) -> Self {
        Self { inner, details }
    }
}

#[async_trait]
impl Catalog for CachedCatalog {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn first_page(&self, limit: u32) -> PageCursor {
        self.inner.first_page(limit)
    }

    fn entry_url(&self, id: u32) -> String {
        self.inner.entry_url(id)
    }

    async fn fetch_page(&self, cursor: &PageCursor) -> Result<PageListing> {
        self.inner.fetch_page(cursor).await
    }

    async fn fetch_types(&self, entry_url: &str) -> Result<Vec<String>> {
        if let Some(detail) = self.details.get(entry_url) {
            return Ok(detail.types);
        }
        self.inner.fetch_types(entry_url).await
    }

    async fn fetch_detail(&self, entry_url: &str) -> Result<PokemonDetail> {
        if let Some(detail) = self.details.get(entry_url) {
            tracing::trace!(%entry_url, "detail cache hit");
            return Ok(detail);
        }
        let detail = self.inner.fetch_detail(entry_url).await?;
        self.details.insert(entry_url, detail.clone());
        tracing::trace!(%entry_url, cached = self.details.len(), "detail cached");
        Ok(detail)
    }
}
