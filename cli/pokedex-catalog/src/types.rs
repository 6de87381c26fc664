//! Pokedex service types.
//!
//! These mirror the JSON documents served by the `/pokemon` and `/box`
//! endpoints.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier of a catalog item, assigned by the backend.
pub type PokemonId = u32;

/// Identifier of a collection entry, assigned by the backend.
pub type BoxEntryId = String;

// ---------------------------------------------------------------------------
// Catalog items
// ---------------------------------------------------------------------------

/// A catalog item as served by `GET /pokemon/{name}` and the paginated list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: PokemonId,
    pub name: String,
    pub sprites: Sprites,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub types: Vec<PokemonType>,
    pub stats: Stats,
    #[serde(default)]
    pub moves: Vec<Move>,
}

/// Sprite image URLs.
///
/// The service omits sprites it has no image for.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sprites {
    pub front_default: Option<String>,
    pub back_default: Option<String>,
    pub front_shiny: Option<String>,
    pub back_shiny: Option<String>,
}

impl Sprites {
    /// The sprite used for cards: the normal front sprite, falling back to
    /// the shiny one.
    pub fn main(&self) -> Option<&str> {
        self.front_default
            .as_deref()
            .or(self.front_shiny.as_deref())
    }
}

/// An elemental type tag with its display color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonType {
    pub name: String,
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub name: String,
    #[serde(rename = "type")]
    pub move_type: PokemonType,
    /// Status moves have no power.
    pub power: Option<u32>,
}

// ---------------------------------------------------------------------------
// Collection ("box") entries
// ---------------------------------------------------------------------------

/// A collection entry owned by the authenticated user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxEntry {
    pub id: BoxEntryId,
    pub pokemon_id: PokemonId,
    pub location: String,
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub created_at: DateTime<Utc>,
}

impl BoxEntry {
    /// Overwrite the user editable fields with the values of `update`.
    ///
    /// Fields absent from `update` are left as they are, except `notes`,
    /// which an edit clears when left empty.
    pub fn apply_update(&mut self, update: &UpdateBoxEntry) {
        if let Some(level) = update.level {
            self.level = level;
        }
        if let Some(location) = &update.location {
            self.location = location.clone();
        }
        self.notes = update.notes.clone();
    }
}

/// Body of `POST /box/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertBoxEntry {
    pub created_at: DateTime<Utc>,
    pub level: u32,
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub pokemon_id: PokemonId,
}

/// Body of `PUT /box/{id}`.
///
/// Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBoxEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl From<&InsertBoxEntry> for UpdateBoxEntry {
    /// The creation timestamp and the catalog reference are immutable, so an
    /// update carries the remaining fields only.
    fn from(entry: &InsertBoxEntry) -> Self {
        Self {
            level: Some(entry.level),
            location: Some(entry.location.clone()),
            notes: entry.notes.clone(),
        }
    }
}

/// Parse an ISO 8601 timestamp.
///
/// Timestamps without an offset are taken as UTC, a bare date as midnight UTC.
fn parse_timestamp(timestamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(datetime.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(timestamp, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let timestamp = String::deserialize(deserializer)?;
    parse_timestamp(&timestamp).ok_or_else(|| {
        serde::de::Error::custom(format!("invalid ISO 8601 timestamp '{timestamp}'"))
    })
}

/// Body of error responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) message: Option<String>,
}
