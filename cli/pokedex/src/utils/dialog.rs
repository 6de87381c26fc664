use crossterm::tty::IsTty;
use inquire::ui::{Attributes, Color, RenderConfig, StyleSheet, Styled};
use pokedex_sdk::models::collection_form::FormInput;

use super::message;

#[derive(Debug, Clone)]
pub struct Confirm {
    pub default: Option<bool>,
}

/// Prompts for the fields of a collection entry, starting from `initial`.
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub initial: FormInput,
}

#[derive(Debug, Clone)]
pub struct Dialog<'a, Type> {
    pub message: &'a str,
    pub help_message: Option<&'a str>,
    pub typed: Type,
}

impl Dialog<'_, Confirm> {
    pub async fn prompt(self) -> inquire::error::InquireResult<bool> {
        let message = self.message.to_owned();
        let help_message: Option<String> = self.help_message.map(ToOwned::to_owned);
        let default = self.typed.default;

        tokio::task::spawn_blocking(move || {
            let mut dialog = inquire::Confirm::new(&message).with_render_config(pokedex_theme());

            if let Some(default) = default {
                dialog = dialog.with_default(default);
            }

            if let Some(ref help_message) = help_message {
                dialog = dialog.with_help_message(help_message);
            }

            dialog.prompt()
        })
        .await
        .expect("Failed to join blocking dialog")
    }
}

impl Dialog<'_, EntryForm> {
    /// Ask for location, level and notes.
    ///
    /// Values are returned as typed, validation is up to the form.
    pub async fn prompt(self) -> inquire::error::InquireResult<FormInput> {
        let message = self.message.to_owned();
        let help_message: Option<String> = self.help_message.map(ToOwned::to_owned);
        let initial = self.typed.initial;

        tokio::task::spawn_blocking(move || {
            message::plain(&message);
            if let Some(ref help_message) = help_message {
                message::plain(help_message);
            }

            let location = inquire::Text::new("Location:")
                .with_render_config(pokedex_theme())
                .with_initial_value(&initial.location)
                .prompt()?;
            let level = inquire::Text::new("Level (1-100):")
                .with_render_config(pokedex_theme())
                .with_initial_value(&initial.level)
                .prompt()?;
            let notes = inquire::Text::new("Notes:")
                .with_render_config(pokedex_theme())
                .with_initial_value(&initial.notes)
                .with_help_message("optional")
                .prompt()?;

            Ok(FormInput {
                location,
                level,
                notes,
            })
        })
        .await
        .expect("Failed to join blocking dialog")
    }
}

impl<T> Dialog<'_, T> {
    /// Prompts need an interactive terminal on all standard streams.
    pub fn can_prompt() -> bool {
        if std::env::var("POKEDEX_NO_PROMPT").is_ok_and(|v| v == "1") {
            return false;
        }
        std::io::stderr().is_tty() && std::io::stdin().is_tty() && std::io::stdout().is_tty()
    }
}

pub fn pokedex_theme() -> RenderConfig<'static> {
    let mut render_config = RenderConfig::default_colored();
    let accent = Color::LightRed;

    render_config.answered_prompt_prefix = Styled::new(">").with_fg(accent);
    render_config.highlighted_option_prefix = Styled::new(">").with_fg(accent);
    render_config.prompt_prefix = Styled::new("?").with_fg(accent);
    render_config.prompt = StyleSheet::new().with_attr(Attributes::BOLD);
    render_config.answer = Styled::new("").with_fg(accent).style;

    render_config
}
