use std::fmt::Write;

use anyhow::{bail, Result};
use chrono::{Local, Utc};
use inquire::InquireError;
use pokedex_sdk::models::collection_browser::{BoxItem, CollectionBrowser};
use pokedex_sdk::pokedex::Pokedex;

use crate::utils::dialog::{Confirm, Dialog, EntryForm};
use crate::utils::message;

pub(super) fn print_collection(collection: &CollectionBrowser) {
    if let Some(err) = collection.error() {
        message::error(err);
        return;
    }
    println!("{}", format_collection(collection));
}

fn format_collection(collection: &CollectionBrowser) -> String {
    if collection.items().is_empty() {
        return "No Pokémon in your box yet.".to_string();
    }
    collection
        .items()
        .iter()
        .fold(String::from("My Box\n"), |mut out, item| {
            out.push_str(&format_item(item));
            out
        })
}

fn format_item(item: &BoxItem) -> String {
    let entry = &item.entry;
    let caught = entry.created_at.with_timezone(&Local);

    let mut out = String::new();
    let _ = writeln!(out, "  [{}] {}", entry.id, item.pokemon.name);
    if let Some(sprite) = item.pokemon.sprites.main() {
        let _ = writeln!(out, "    Sprite:   {sprite}");
    }
    let _ = writeln!(out, "    Location: {}", entry.location);
    let _ = writeln!(out, "    Level:    {}", entry.level);
    let _ = writeln!(out, "    Caught:   {}", caught.format("%Y-%m-%d %H:%M"));
    if let Some(notes) = &entry.notes {
        let _ = writeln!(out, "    Notes:    {notes}");
    }
    out
}

/// Load the box unless it is open and loaded already.
///
/// Returns `false` after reporting a failed load.
async fn ensure_loaded(pokedex: &mut Pokedex) -> bool {
    if !pokedex.collection.is_active() || pokedex.collection.error().is_some() {
        pokedex.open_collection().await;
    }
    match pokedex.collection.error() {
        Some(err) => {
            message::error(err);
            false
        },
        None => true,
    }
}

/// Edit entry `id` of the box.
pub(super) async fn edit(pokedex: &mut Pokedex, id: &str) -> Result<()> {
    if !ensure_loaded(pokedex).await {
        return Ok(());
    }
    if !pokedex.collection.begin_edit(id) {
        message::error(format!("No entry '{id}' in your box"));
        return Ok(());
    }
    if !Dialog::<EntryForm>::can_prompt() {
        pokedex.collection.cancel_edit();
        bail!("Editing needs an interactive terminal");
    }

    let Some(initial) = pokedex
        .collection
        .editing()
        .map(|session| session.form.input.clone())
    else {
        return Ok(());
    };

    let dialog = Dialog {
        message: &format!("Edit entry {id}"),
        help_message: Some("Level and location are required, notes may be left empty."),
        typed: EntryForm { initial },
    };
    let input = match dialog.prompt().await {
        Ok(input) => input,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            pokedex.collection.cancel_edit();
            return Ok(());
        },
        Err(err) => return Err(err.into()),
    };

    if pokedex.edit_entry(input, Utc::now()).await {
        message::entry_updated(id);
        print_collection(&pokedex.collection);
        return Ok(());
    }

    if let Some(err) = pokedex
        .collection
        .editing()
        .and_then(|session| session.form.error())
    {
        message::error(err);
    }
    pokedex.collection.cancel_edit();
    Ok(())
}

/// Release entry `id` after confirmation.
pub(super) async fn delete(pokedex: &mut Pokedex, id: &str) -> Result<()> {
    if !ensure_loaded(pokedex).await {
        return Ok(());
    }
    if pokedex.collection.get(id).is_none() {
        message::error(format!("No entry '{id}' in your box"));
        return Ok(());
    }
    if !Dialog::<Confirm>::can_prompt() {
        bail!("Releasing needs an interactive terminal");
    }

    let confirmed = Dialog {
        message: "Delete this entry?",
        help_message: None,
        typed: Confirm {
            default: Some(false),
        },
    }
    .prompt()
    .await;

    match confirmed {
        Ok(true) => {},
        Ok(false) | Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            return Ok(());
        },
        Err(err) => return Err(err.into()),
    }

    let name = pokedex
        .collection
        .get(id)
        .map(|item| item.pokemon.name.clone());
    if pokedex.delete_entry(id).await {
        message::entry_released(id, name.as_deref());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use pokedex_catalog::fixtures;

    use super::*;

    #[test]
    fn empty_box() {
        let collection = CollectionBrowser::new();
        assert_eq!(format_collection(&collection), "No Pokémon in your box yet.");
    }

    #[test]
    fn item_shows_entry_fields() {
        let mut entry = fixtures::box_entry("abc", 25);
        entry.notes = Some("shiny".to_string());
        let item = BoxItem {
            entry,
            pokemon: fixtures::pokemon(25, "pikachu"),
        };

        let out = format_item(&item);
        assert!(out.starts_with("  [abc] pikachu\n"));
        assert!(out.contains("Sprite:   https://sprites.test/25.png"));
        assert!(out.contains("Location: Route 1"));
        assert!(out.contains("Level:    5"));
        assert!(out.contains("Notes:    shiny"));
    }

    #[test]
    fn notes_are_omitted_when_absent() {
        let item = BoxItem {
            entry: fixtures::box_entry("abc", 25),
            pokemon: fixtures::pokemon(25, "pikachu"),
        };
        assert!(!format_item(&item).contains("Notes"));
    }

    #[test]
    fn sprite_falls_back_to_shiny() {
        let mut pokemon = fixtures::pokemon(25, "pikachu");
        pokemon.sprites.front_default = None;
        pokemon.sprites.front_shiny = Some("https://sprites.test/shiny/25.png".to_string());
        let item = BoxItem {
            entry: fixtures::box_entry("abc", 25),
            pokemon,
        };
        assert!(format_item(&item).contains("Sprite:   https://sprites.test/shiny/25.png"));

        let mut item = item;
        item.pokemon.sprites.front_shiny = None;
        assert!(!format_item(&item).contains("Sprite"));
    }
}
