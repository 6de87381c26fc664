//! The user's collection, with every entry resolved to its catalog item.
//!
//! Deletes and edits patch the loaded list in place instead of reloading it,
//! so the shown list may drift from the service until the next reload.

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use pokedex_catalog::types::{BoxEntry, BoxEntryId, Pokemon, PokemonId, UpdateBoxEntry};
use pokedex_catalog::{ClientError, ClientTrait};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::collection_form::{CollectionForm, FormInput};
use super::id_index::IdNameIndex;
use super::{Activation, Alerts, Outcome};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// An entry references a catalog item whose name is not indexed yet.
    #[error(
        "Missing name for pokemonId {pokemon_id}. Make sure you loaded that Pokémon in the main list."
    )]
    Resolution { pokemon_id: PokemonId },
}

/// A collection entry next to the catalog item it references.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxItem {
    pub entry: BoxEntry,
    pub pokemon: Pokemon,
}

pub type CollectionOutcome = Outcome<Result<Vec<BoxItem>, LoadError>>;

/// Load of the whole collection.
#[derive(Debug)]
pub struct CollectionRequest {
    index: IdNameIndex,
    token: CancellationToken,
}

impl CollectionRequest {
    pub async fn run(self, client: &impl ClientTrait) -> CollectionOutcome {
        let result = load_collection(client, &self.index).await;
        Outcome::new(self.token, result)
    }
}

/// Fetch all entries, then the catalog item of each.
///
/// Fails as a whole if any request fails or any entry cannot be resolved.
#[instrument(skip_all)]
async fn load_collection(
    client: &impl ClientTrait,
    index: &IdNameIndex,
) -> Result<Vec<BoxItem>, LoadError> {
    let ids = client.list_collection_ids().await?;
    let entries = try_join_all(ids.iter().map(|id| client.get_collection_entry(id))).await?;

    let names = entries
        .iter()
        .map(|entry| {
            index
                .get(entry.pokemon_id)
                .ok_or(LoadError::Resolution {
                    pokemon_id: entry.pokemon_id,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let pokemon = try_join_all(names.into_iter().map(|name| client.get_catalog_item(name))).await?;
    debug!(count = entries.len(), "loaded collection");

    Ok(entries
        .into_iter()
        .zip(pokemon)
        .map(|(entry, pokemon)| BoxItem { entry, pokemon })
        .collect())
}

/// An open edit form and the entry it edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub id: BoxEntryId,
    pub form: CollectionForm,
}

#[derive(Debug, Default)]
pub struct CollectionBrowser {
    items: Vec<BoxItem>,
    loading: bool,
    error: Option<String>,
    editing: Option<EditSession>,
    /// Refresh counter value of the last load.
    loaded_for: Option<u64>,
    activation: Activation,
}

impl CollectionBrowser {
    pub fn new() -> Self {
        Self::default()
    }

    /// (Re)load the collection, resolving names through a snapshot of `index`.
    pub fn activate(&mut self, index: &IdNameIndex, refresh: u64) -> CollectionRequest {
        debug!(refresh, "loading collection");
        self.loaded_for = Some(refresh);
        self.loading = true;
        self.error = None;
        CollectionRequest {
            index: index.clone(),
            token: self.activation.renew(),
        }
    }

    /// Reload if `refresh` changed since the last load.
    pub fn sync(&mut self, index: &IdNameIndex, refresh: u64) -> Option<CollectionRequest> {
        if self.loaded_for == Some(refresh) {
            return None;
        }
        Some(self.activate(index, refresh))
    }

    /// Discard the result of any load in flight and stop following the
    /// refresh counter.
    pub fn deactivate(&mut self) {
        self.activation.cancel();
        self.loaded_for = None;
        self.loading = false;
    }

    /// Whether the collection was loaded and not deactivated since.
    pub fn is_active(&self) -> bool {
        self.loaded_for.is_some()
    }

    pub fn apply(&mut self, outcome: CollectionOutcome) -> bool {
        let Some(result) = outcome.into_current() else {
            return false;
        };
        self.loading = false;
        match result {
            Ok(items) => self.items = items,
            Err(err) => {
                debug!(%err, "failed to load collection");
                self.error = Some(err.to_string());
            },
        }
        true
    }

    pub fn items(&self) -> &[BoxItem] {
        &self.items
    }

    pub fn get(&self, id: &str) -> Option<&BoxItem> {
        self.items.iter().find(|item| item.entry.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Delete entry `id` and drop it from the list.
    ///
    /// A failure is reported to `alerts` and leaves the list untouched.
    #[instrument(skip(self, client, alerts))]
    pub async fn delete(&mut self, client: &impl ClientTrait, id: &str, alerts: &dyn Alerts) -> bool {
        match client.delete_collection_entry(id).await {
            Ok(()) => {
                self.items.retain(|item| item.entry.id != id);
                true
            },
            Err(err) => {
                alerts.alert(&err.to_string());
                false
            },
        }
    }

    /// Open the edit form pre-filled with entry `id`.
    ///
    /// Returns `false` if the entry is not in the list.
    pub fn begin_edit(&mut self, id: &str) -> bool {
        let Some(session) = self.get(id).map(|item| EditSession {
            id: item.entry.id.clone(),
            form: CollectionForm::edit(&item.entry),
        }) else {
            return false;
        };
        self.editing = Some(session);
        true
    }

    pub fn editing(&self) -> Option<&EditSession> {
        self.editing.as_ref()
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    /// Submit the edit form with `input`.
    ///
    /// Only level, location and notes are sent. On success the entry is
    /// patched in place and the form closes; failures are reported to
    /// `alerts` and keep the form open.
    pub async fn submit_edit(
        &mut self,
        client: &impl ClientTrait,
        input: FormInput,
        now: DateTime<Utc>,
        alerts: &dyn Alerts,
    ) -> bool {
        let Some(session) = self.editing.as_mut() else {
            return false;
        };
        session.form.input = input;
        let Ok(payload) = session.form.submit(now) else {
            return false;
        };
        let update = UpdateBoxEntry::from(&payload);

        match client.update_collection_entry(&session.id, &update).await {
            Ok(_) => {
                let id = session.id.clone();
                debug!(%id, "updated collection entry");
                if let Some(item) = self.items.iter_mut().find(|item| item.entry.id == id) {
                    item.entry.apply_update(&update);
                }
                self.editing = None;
                true
            },
            Err(err) => {
                alerts.alert(&err.to_string());
                false
            },
        }
    }
}
