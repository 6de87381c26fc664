use std::fmt::Write;

use anyhow::{bail, Result};
use chrono::Utc;
use crossterm::style::{Color, Stylize};
use inquire::InquireError;
use pokedex_catalog::types::{Pokemon, PokemonType};
use pokedex_sdk::models::catalog_browser::CatalogBrowser;
use pokedex_sdk::models::detail_viewer::{DetailView, DetailViewer};
use pokedex_sdk::pokedex::Pokedex;

use super::collection;
use crate::utils::dialog::{Dialog, EntryForm};
use crate::utils::message;

pub(super) fn print_page(catalog: &CatalogBrowser) {
    if let Some(err) = catalog.error() {
        message::error(err);
    }
    println!("{}", format_page(catalog));
}

pub(super) fn print_detail(detail: &DetailViewer) {
    let Some(view) = detail.view() else {
        return;
    };
    if let Some(err) = view.error {
        message::error(err);
        return;
    }
    println!("{}", format_detail(&view));
}

fn format_page(catalog: &CatalogBrowser) -> String {
    let mut out = format!("Page {}\n", u64::from(catalog.page()) + 1);
    if catalog.items().is_empty() && catalog.error().is_none() {
        out.push_str("  No pokemon on this page.\n");
    }
    for pokemon in catalog.items() {
        let types = pokemon
            .types
            .iter()
            .map(type_badge)
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(out, "  #{:<4} {:<16} {types}", pokemon.id, pokemon.name);
    }
    out
}

fn format_detail(view: &DetailView<'_>) -> String {
    let Some(pokemon) = view.pokemon else {
        return format!("Loading {}...", view.name);
    };

    let mut out = String::new();
    let _ = writeln!(out, "{} #{}", pokemon.name.as_str().bold(), pokemon.id);
    let types = pokemon
        .types
        .iter()
        .map(type_badge)
        .collect::<Vec<_>>()
        .join(" ");
    let _ = writeln!(out, "{types}");
    if !pokemon.description.is_empty() {
        let _ = writeln!(out, "{}", pokemon.description);
    }

    out.push_str(&format_sprites(pokemon));

    let stats = &pokemon.stats;
    let _ = writeln!(out, "Stats:");
    for (name, value) in [
        ("HP", stats.hp),
        ("Attack", stats.attack),
        ("Defense", stats.defense),
        ("Sp. Attack", stats.special_attack),
        ("Sp. Defense", stats.special_defense),
        ("Speed", stats.speed),
    ] {
        let _ = writeln!(out, "  {name:<12} {value:>3}");
    }

    let _ = writeln!(out, "Moves:");
    for line in view.moves() {
        let _ = writeln!(
            out,
            "  {:<20} {:<10} {:>3}",
            line.name, line.type_name, line.power
        );
    }
    out
}

fn format_sprites(pokemon: &Pokemon) -> String {
    let sprites = &pokemon.sprites;
    [
        ("front", &sprites.front_default),
        ("back", &sprites.back_default),
        ("shiny front", &sprites.front_shiny),
        ("shiny back", &sprites.back_shiny),
    ]
    .into_iter()
    .filter_map(|(label, url)| Some(format!("  {label}: {}\n", url.as_deref()?)))
    .fold("Sprites:\n".to_string(), |acc, line| acc + &line)
}

/// The type name in its display color, if the color is a valid `#rrggbb`.
fn type_badge(pokemon_type: &PokemonType) -> String {
    match parse_hex_color(&pokemon_type.color) {
        Some(color) => pokemon_type.name.as_str().with(color).to_string(),
        None => pokemon_type.name.clone(),
    }
}

fn parse_hex_color(color: &str) -> Option<Color> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Catch `name`, or the pokemon shown in the details.
///
/// An invalid form is reported and kept, so running `catch` again starts
/// from the previous input.
pub(super) async fn catch(pokedex: &mut Pokedex, name: Option<&str>) -> Result<()> {
    if let Some(name) = name {
        let showing = pokedex.catalog.detail.view().map(|view| view.name);
        if showing != Some(name) {
            pokedex.show_detail(name).await;
        }
        if let Some(err) = pokedex.catalog.detail.view().and_then(|view| view.error) {
            message::error(err);
            return Ok(());
        }
    }

    let Some(name) = pokedex
        .catalog
        .detail
        .view()
        .and_then(|view| view.pokemon)
        .map(|pokemon| pokemon.name.clone())
    else {
        message::error("Name a pokemon or show its details to catch it");
        return Ok(());
    };

    if !Dialog::<EntryForm>::can_prompt() {
        bail!("Catching needs an interactive terminal");
    }

    if pokedex.catalog.detail.catch_form().is_none() {
        pokedex.catalog.detail.start_catch();
    }
    let initial = pokedex
        .catalog
        .detail
        .catch_form()
        .map(|form| form.input.clone())
        .unwrap_or_default();

    let dialog = Dialog {
        message: &format!("Catch {name}"),
        help_message: None,
        typed: EntryForm { initial },
    };
    let input = match dialog.prompt().await {
        Ok(input) => input,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            pokedex.catalog.detail.cancel_catch();
            return Ok(());
        },
        Err(err) => return Err(err.into()),
    };

    if pokedex.catch(input, Utc::now()).await {
        message::pokemon_caught(&name);
        if pokedex.sync_collection().await {
            collection::print_collection(&pokedex.collection);
        }
    } else if let Some(err) = pokedex
        .catalog
        .detail
        .catch_form()
        .and_then(|form| form.error())
    {
        message::error(err);
    }

    Ok(())
}
