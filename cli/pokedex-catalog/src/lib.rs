//! HTTP client for the pokedex service.
//!
//! This crate provides:
//! - a typed client for the `/pokemon` catalog and `/box` collection endpoints
//! - bearer token authentication for the collection endpoints
//! - normalization of error responses into [ClientError]
//! - a [MockClient] answering with canned responses, for SDK tests
//!
//! ## Usage
//!
//! ```ignore
//! use pokedex_catalog::{ClientConfig, ClientTrait, PokedexClient};
//!
//! let config = ClientConfig {
//!     base_url: "https://hw4.cis1962.esinx.net/api/".to_string(),
//!     token: Some(token),
//!     ..Default::default()
//! };
//!
//! let client = PokedexClient::new(config)?;
//! let page = client.list_catalog(10, 0).await?;
//! ```

mod client;
mod config;
mod error;
mod mock;
pub mod types;

pub use client::{Client, ClientTrait, PokedexClient};
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ClientError;
pub use mock::{Call, MockClient, Response};
pub use reqwest::StatusCode;

/// Sample documents for tests.
#[cfg(any(test, feature = "tests"))]
pub mod fixtures {
    use crate::types::*;

    /// A catalog item with plausible values and `moves` long enough to be
    /// truncated by views.
    pub fn pokemon(id: PokemonId, name: &str) -> Pokemon {
        let normal = PokemonType {
            name: "normal".to_string(),
            color: "#A8A878".to_string(),
        };
        Pokemon {
            id,
            name: name.to_string(),
            sprites: Sprites {
                front_default: Some(format!("https://sprites.test/{id}.png")),
                back_default: Some(format!("https://sprites.test/back/{id}.png")),
                front_shiny: Some(format!("https://sprites.test/shiny/{id}.png")),
                back_shiny: None,
            },
            description: format!("{name} is a test pokemon."),
            types: vec![normal.clone()],
            stats: Stats {
                hp: 45,
                attack: 49,
                defense: 49,
                special_attack: 65,
                special_defense: 65,
                speed: 45,
            },
            moves: (0..12)
                .map(|n| Move {
                    name: format!("move-{n}"),
                    move_type: normal.clone(),
                    power: (n % 3 != 0).then_some(10 * n),
                })
                .collect(),
        }
    }

    /// A collection entry for `pokemon_id`.
    pub fn box_entry(id: &str, pokemon_id: PokemonId) -> BoxEntry {
        BoxEntry {
            id: id.to_string(),
            pokemon_id,
            location: "Route 1".to_string(),
            level: 5,
            notes: None,
            created_at: "2024-05-01T12:00:00Z"
                .parse()
                .expect("fixture timestamp is valid"),
        }
    }
}
