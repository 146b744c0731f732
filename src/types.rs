use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{DexError, Result};

const ARTWORK_BASE: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon/other/official-artwork";

/// Opaque pointer to the next page of a listing (the upstream `next` URL).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageCursor(String);

impl PageCursor {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Cursor for the first page of the `pokemon` listing.
    pub fn first(api_base: &str, limit: u32) -> Self {
        Self(format!(
            "{}/pokemon?limit={}&offset=0",
            api_base.trim_end_matches('/'),
            limit
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageCursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `{ name, url }` pair as returned in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedResource {
    pub name: String,
    pub url: String,
}

/// One raw page of the upstream listing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageListing {
    #[serde(default)]
    pub count: u32,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<NamedResource>,
}

/// Catalog entry shown in the list view
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySummary {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub types: Vec<String>,
}

impl EntrySummary {
    pub fn artwork_url(&self) -> String {
        artwork_url(self.id)
    }
}

/// A page after enrichment: entries in listing order plus the next cursor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub entries: Vec<EntrySummary>,
    pub next: Option<PageCursor>,
}

/// Full record for the detail view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PokemonDetail {
    pub id: u32,
    pub name: String,
    /// Decimetres
    pub height: u32,
    /// Hectograms
    pub weight: u32,
    pub types: Vec<String>,
    pub abilities: Vec<Ability>,
    pub stats: Vec<Stat>,
    pub sprites: Sprites,
}

impl PokemonDetail {
    pub fn height_m(&self) -> f32 {
        self.height as f32 / 10.0
    }

    pub fn weight_kg(&self) -> f32 {
        self.weight as f32 / 10.0
    }

    /// Official artwork, falling back to the default front sprite.
    pub fn image_url(&self) -> Option<&str> {
        self.sprites
            .artwork
            .as_deref()
            .or(self.sprites.front_default.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ability {
    pub name: String,
    pub hidden: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stat {
    pub name: String,
    pub base: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub artwork: Option<String>,
}

/// Parse the trailing numeric path segment of an entry URL.
/// `https://pokeapi.co/api/v2/pokemon/25/` yields `25`.
pub fn entry_id_from_url(url: &str) -> Result<u32> {
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<u32>().ok())
        .ok_or_else(|| DexError::EntryUrl(url.to_string()))
}

pub fn artwork_url(id: u32) -> String {
    format!("{}/{}.png", ARTWORK_BASE, id)
}

/// `#025`
pub fn format_badge(id: u32) -> String {
    format!("#{:03}", id)
}

/// `mr-mime` -> `Mr mime`
pub fn display_name(raw: &str) -> String {
    let spaced = raw.replace('-', " ");
    let mut chars = spaced.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
