use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::catalog::Catalog;
use crate::error::{DexError, Result};
use crate::types::{Ability, PageCursor, PageListing, PokemonDetail, Sprites, Stat};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";

pub struct PokeApi {
    client: Client,
    base: String,
}

impl std::fmt::Debug for PokeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokeApi")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}

impl PokeApi {
    pub fn new(base: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("pokedex/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| DexError::Api(e.to_string()))?;
        let base: String = base.into();

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(%url, "GET");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DexError::Api(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(DexError::Api(format!("PokeAPI {}: {}", status, text)));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| DexError::Api(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| DexError::Decode(format!("{}: {}", url, e)))
    }
}

// PokeAPI response types

#[derive(Deserialize)]
struct ApiNamed {
    name: String,
}

#[derive(Deserialize)]
struct ApiTypesOnly {
    types: Vec<ApiTypeSlot>,
}

#[derive(Deserialize)]
struct ApiPokemon {
    id: u32,
    name: String,
    #[serde(default)]
    height: u32,
    #[serde(default)]
    weight: u32,
    types: Vec<ApiTypeSlot>,
    #[serde(default)]
    abilities: Vec<ApiAbilitySlot>,
    #[serde(default)]
    stats: Vec<ApiStatSlot>,
    #[serde(default)]
    sprites: serde_json::Value,
}

#[derive(Deserialize)]
struct ApiTypeSlot {
    #[serde(default)]
    slot: u8,
    #[serde(rename = "type")]
    type_info: ApiNamed,
}

#[derive(Deserialize)]
struct ApiAbilitySlot {
    ability: ApiNamed,
    #[serde(default)]
    is_hidden: bool,
}

#[derive(Deserialize)]
struct ApiStatSlot {
    base_stat: u32,
    stat: ApiNamed,
}

fn type_names(mut slots: Vec<ApiTypeSlot>) -> Vec<String> {
    slots.sort_by_key(|s| s.slot);
    slots.into_iter().map(|s| s.type_info.name).collect()
}

fn pointer_string(value: &serde_json::Value, pointer: &str) -> Option<String> {
    value
        .pointer(pointer)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
}

impl From<ApiPokemon> for PokemonDetail {
    fn from(p: ApiPokemon) -> Self {
        PokemonDetail {
            id: p.id,
            name: p.name,
            height: p.height,
            weight: p.weight,
            types: type_names(p.types),
            abilities: p
                .abilities
                .into_iter()
                .map(|a| Ability {
                    name: a.ability.name,
                    hidden: a.is_hidden,
                })
                .collect(),
            stats: p
                .stats
                .into_iter()
                .map(|s| Stat {
                    name: s.stat.name,
                    base: s.base_stat,
                })
                .collect(),
            sprites: Sprites {
                front_default: pointer_string(&p.sprites, "/front_default"),
                artwork: pointer_string(&p.sprites, "/other/official-artwork/front_default"),
            },
        }
    }
}

#[async_trait]
impl Catalog for PokeApi {
    fn name(&self) -> &str {
        "PokeAPI"
    }

    fn first_page(&self, limit: u32) -> PageCursor {
        PageCursor::first(&self.base, limit)
    }

    fn entry_url(&self, id: u32) -> String {
        format!("{}/pokemon/{}/", self.base, id)
    }

    async fn fetch_page(&self, cursor: &PageCursor) -> Result<PageListing> {
        self.get_json(cursor.as_str()).await
    }

    async fn fetch_types(&self, entry_url: &str) -> Result<Vec<String>> {
        let pokemon: ApiTypesOnly = self.get_json(entry_url).await?;
        Ok(type_names(pokemon.types))
    }

    async fn fetch_detail(&self, entry_url: &str) -> Result<PokemonDetail> {
        let pokemon: ApiPokemon = self.get_json(entry_url).await?;
        Ok(pokemon.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIKACHU: &str = r#"{
        "id": 25,
        "name": "pikachu",
        "height": 4,
        "weight": 60,
        "types": [{"slot": 1, "type": {"name": "electric", "url": "https://pokeapi.co/api/v2/type/13/"}}],
        "abilities": [
            {"ability": {"name": "static", "url": "x"}, "is_hidden": false, "slot": 1},
            {"ability": {"name": "lightning-rod", "url": "x"}, "is_hidden": true, "slot": 3}
        ],
        "stats": [
            {"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": "x"}},
            {"base_stat": 90, "effort": 2, "stat": {"name": "speed", "url": "x"}}
        ],
        "sprites": {
            "front_default": "https://example.test/25.png",
            "other": {"official-artwork": {"front_default": "https://example.test/art/25.png"}}
        },
        "moves": []
    }"#;

    #[test]
    fn detail_from_wire() {
        let wire: ApiPokemon = serde_json::from_str(PIKACHU).unwrap();
        let detail = PokemonDetail::from(wire);
        assert_eq!(detail.id, 25);
        assert_eq!(detail.types, vec!["electric"]);
        assert_eq!(detail.abilities.len(), 2);
        assert!(detail.abilities[1].hidden);
        assert_eq!(detail.stats[1].name, "speed");
        assert_eq!(detail.stats[1].base, 90);
        assert_eq!(
            detail.sprites.artwork.as_deref(),
            Some("https://example.test/art/25.png")
        );
    }

    #[test]
    fn types_are_ordered_by_slot() {
        let wire: ApiTypesOnly = serde_json::from_str(
            r#"{"types": [
                {"slot": 2, "type": {"name": "poison", "url": "x"}},
                {"slot": 1, "type": {"name": "grass", "url": "x"}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(type_names(wire.types), vec!["grass", "poison"]);
    }

    #[test]
    fn listing_from_wire() {
        let listing: PageListing = serde_json::from_str(
            r#"{
                "count": 1302,
                "next": "https://pokeapi.co/api/v2/pokemon?offset=20&limit=20",
                "previous": null,
                "results": [{"name": "bulbasaur", "url": "https://pokeapi.co/api/v2/pokemon/1/"}]
            }"#,
        )
        .unwrap();
        assert_eq!(listing.count, 1302);
        assert_eq!(listing.results[0].name, "bulbasaur");
        assert!(listing.previous.is_none());
    }

    #[test]
    fn urls_use_trimmed_base() {
        let api = PokeApi::new("https://pokeapi.co/api/v2/", None).unwrap();
        assert_eq!(api.entry_url(25), "https://pokeapi.co/api/v2/pokemon/25/");
        assert_eq!(
            api.first_page(20).as_str(),
            "https://pokeapi.co/api/v2/pokemon?limit=20&offset=0"
        );
    }
}
