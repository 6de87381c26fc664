//! Validation and payload building for collection entries.
//!
//! The same form serves catching a pokemon and editing an entry. It only
//! builds payloads; sending them is up to the view hosting the form.

use chrono::{DateTime, Utc};
use pokedex_catalog::types::{BoxEntry, InsertBoxEntry, PokemonId};
use thiserror::Error;

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Location is required.")]
    LocationRequired,
    #[error("Level must be between 1 and 100.")]
    LevelOutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Editing keeps the creation timestamp of the entry.
    Edit { created_at: DateTime<Utc> },
}

/// The raw values typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormInput {
    pub location: String,
    /// Kept as typed, parsed at submit time.
    pub level: String,
    pub notes: String,
}

impl Default for FormInput {
    fn default() -> Self {
        Self {
            location: String::new(),
            level: MIN_LEVEL.to_string(),
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionForm {
    pokemon_id: PokemonId,
    mode: FormMode,
    pub input: FormInput,
    error: Option<FormError>,
}

impl CollectionForm {
    /// An empty form catching `pokemon_id`.
    pub fn create(pokemon_id: PokemonId) -> Self {
        Self {
            pokemon_id,
            mode: FormMode::Create,
            input: FormInput::default(),
            error: None,
        }
    }

    /// A form pre-filled with the values of `entry`.
    pub fn edit(entry: &BoxEntry) -> Self {
        Self {
            pokemon_id: entry.pokemon_id,
            mode: FormMode::Edit {
                created_at: entry.created_at,
            },
            input: FormInput {
                location: entry.location.clone(),
                level: entry.level.to_string(),
                notes: entry.notes.clone().unwrap_or_default(),
            },
            error: None,
        }
    }

    /// The validation error of the last submit, shown inline.
    pub fn error(&self) -> Option<FormError> {
        self.error
    }

    /// Validate the input and build the payload.
    ///
    /// `now` becomes the creation timestamp of new entries.
    /// A failure is kept for display until the next submit.
    pub fn submit(&mut self, now: DateTime<Utc>) -> Result<InsertBoxEntry, FormError> {
        let created_at = match self.mode {
            FormMode::Create => now,
            FormMode::Edit { created_at } => created_at,
        };
        let result = build_entry(&self.input, self.pokemon_id, created_at);
        self.error = result.as_ref().err().copied();
        result
    }
}

/// Validate `input`, first failure wins, and build the create payload.
pub fn build_entry(
    input: &FormInput,
    pokemon_id: PokemonId,
    created_at: DateTime<Utc>,
) -> Result<InsertBoxEntry, FormError> {
    let location = input.location.trim();
    if location.is_empty() {
        return Err(FormError::LocationRequired);
    }

    let level = parse_level(&input.level)?;

    let notes = input.notes.trim();
    let notes = (!notes.is_empty()).then(|| notes.to_string());

    Ok(InsertBoxEntry {
        created_at,
        level,
        location: location.to_string(),
        notes,
        pokemon_id,
    })
}

fn parse_level(level: &str) -> Result<u32, FormError> {
    match level.trim().parse::<u32>() {
        Ok(level) if (MIN_LEVEL..=MAX_LEVEL).contains(&level) => Ok(level),
        _ => Err(FormError::LevelOutOfRange),
    }
}
