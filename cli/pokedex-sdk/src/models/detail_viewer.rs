use chrono::{DateTime, Utc};
use pokedex_catalog::types::{Move, Pokemon};
use pokedex_catalog::{ClientError, ClientTrait};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::collection_form::{CollectionForm, FormInput};
use super::{Activation, Alerts, Outcome};

/// Number of moves shown in the detail view.
pub const MOVES_SHOWN: usize = 10;
/// Shown in place of the power of moves that have none.
pub const UNKNOWN_POWER: &str = "—";

pub type DetailOutcome = Outcome<Result<Pokemon, ClientError>>;

/// Fetch of a single catalog item, issued by [DetailViewer::open].
#[derive(Debug)]
pub struct DetailRequest {
    pub name: String,
    token: CancellationToken,
}

impl DetailRequest {
    pub async fn run(self, client: &impl ClientTrait) -> DetailOutcome {
        let result = client.get_catalog_item(&self.name).await;
        Outcome::new(self.token, result)
    }
}

/// Shows the full record of one catalog item
/// and hosts the form catching it into the collection.
#[derive(Debug, Default)]
pub struct DetailViewer {
    name: Option<String>,
    pokemon: Option<Pokemon>,
    loading: bool,
    error: Option<String>,
    catch_form: Option<CollectionForm>,
    activation: Activation,
}

impl DetailViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the viewer for `name`.
    ///
    /// Any fetch still in flight for a previous name is superseded.
    pub fn open(&mut self, name: impl Into<String>) -> DetailRequest {
        let name = name.into();
        debug!(%name, "opening detail view");
        let token = self.activation.renew();
        self.name = Some(name.clone());
        self.pokemon = None;
        self.loading = true;
        self.error = None;
        self.catch_form = None;
        DetailRequest { name, token }
    }

    /// Close the viewer, discarding the result of any fetch in flight.
    pub fn close(&mut self) {
        self.activation.cancel();
        self.name = None;
        self.pokemon = None;
        self.loading = false;
        self.error = None;
        self.catch_form = None;
    }

    pub fn is_open(&self) -> bool {
        self.name.is_some()
    }

    /// Apply the outcome of a fetch.
    ///
    /// Returns `false` if the outcome was superseded and dropped.
    pub fn apply(&mut self, outcome: DetailOutcome) -> bool {
        let Some(result) = outcome.into_current() else {
            return false;
        };
        self.loading = false;
        match result {
            Ok(pokemon) => {
                self.pokemon = Some(pokemon);
                self.error = None;
            },
            Err(err) => {
                debug!(%err, "failed to load pokemon details");
                self.error = Some(err.to_string());
            },
        }
        true
    }

    /// What to render, `None` while the viewer is closed.
    pub fn view(&self) -> Option<DetailView<'_>> {
        let name = self.name.as_deref()?;
        Some(DetailView {
            name,
            loading: self.loading,
            error: self.error.as_deref(),
            pokemon: self.pokemon.as_ref().filter(|_| !self.loading),
        })
    }

    /// Reveal the catch form for the loaded pokemon.
    ///
    /// Returns `false` if nothing is loaded.
    pub fn start_catch(&mut self) -> bool {
        let Some(pokemon) = self.pokemon.as_ref() else {
            return false;
        };
        self.catch_form = Some(CollectionForm::create(pokemon.id));
        true
    }

    pub fn cancel_catch(&mut self) {
        self.catch_form = None;
    }

    pub fn catch_form(&self) -> Option<&CollectionForm> {
        self.catch_form.as_ref()
    }

    /// Submit the catch form with `input`.
    ///
    /// Validation errors stay on the form. A failed request is reported to
    /// `alerts` and leaves the form open. On success the form closes and
    /// `on_created` is called.
    pub async fn submit_catch(
        &mut self,
        client: &impl ClientTrait,
        input: FormInput,
        now: DateTime<Utc>,
        alerts: &dyn Alerts,
        on_created: impl FnOnce(),
    ) -> bool {
        let Some(form) = self.catch_form.as_mut() else {
            return false;
        };
        form.input = input;
        let Ok(entry) = form.submit(now) else {
            return false;
        };

        match client.create_collection_entry(&entry).await {
            Ok(_) => {
                debug!(pokemon_id = entry.pokemon_id, "caught pokemon");
                self.catch_form = None;
                on_created();
                true
            },
            Err(err) => {
                alerts.alert(&err.to_string());
                false
            },
        }
    }
}

/// Render data of an open [DetailViewer].
#[derive(Debug, Clone, Copy)]
pub struct DetailView<'a> {
    pub name: &'a str,
    pub loading: bool,
    pub error: Option<&'a str>,
    /// Set once loaded.
    pub pokemon: Option<&'a Pokemon>,
}

impl<'a> DetailView<'a> {
    /// The first [MOVES_SHOWN] moves.
    pub fn moves(&self) -> impl Iterator<Item = MoveLine<'a>> {
        self.pokemon
            .into_iter()
            .flat_map(|pokemon| pokemon.moves.iter().take(MOVES_SHOWN))
            .map(MoveLine::from)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveLine<'a> {
    pub name: &'a str,
    pub type_name: &'a str,
    pub power: String,
}

impl<'a> From<&'a Move> for MoveLine<'a> {
    fn from(mv: &'a Move) -> Self {
        Self {
            name: &mv.name,
            type_name: &mv.move_type.name,
            power: mv
                .power
                .map_or_else(|| UNKNOWN_POWER.to_string(), |power| power.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use pokedex_catalog::{fixtures, Call, MockClient, Response, StatusCode};
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::collection_form::FormError;

    fn now() -> DateTime<Utc> {
        "2024-06-01T08:30:00Z".parse().unwrap()
    }

    fn catch_input() -> FormInput {
        FormInput {
            location: "Route 2".to_string(),
            level: "3".to_string(),
            notes: String::new(),
        }
    }

    #[test]
    fn closed_viewer_renders_nothing() {
        let viewer = DetailViewer::new();
        assert!(viewer.view().is_none());
    }

    #[tokio::test]
    async fn open_loads_pokemon() {
        let client = MockClient::new();
        client.push_response(Response::CatalogItem(fixtures::pokemon(25, "pikachu")));

        let mut viewer = DetailViewer::new();
        let request = viewer.open("pikachu");
        assert!(viewer.view().unwrap().loading);

        assert!(viewer.apply(request.run(&client).await));

        let view = viewer.view().unwrap();
        assert!(!view.loading);
        assert_eq!(view.pokemon.map(|p| p.id), Some(25));
        assert_eq!(client.calls(), vec![Call::GetCatalogItem("pikachu".to_string())]);
    }

    #[tokio::test]
    async fn superseded_fetch_is_discarded() {
        let client = MockClient::new();
        client.push_responses([
            Response::CatalogItem(fixtures::pokemon(1, "bulbasaur")),
            Response::CatalogItem(fixtures::pokemon(25, "pikachu")),
        ]);

        let mut viewer = DetailViewer::new();
        let first = viewer.open("bulbasaur");
        let second = viewer.open("pikachu");
        let (first, second) = tokio::join!(first.run(&client), second.run(&client));

        // the newer result arrives first, the stale one must not replace it
        assert!(viewer.apply(second));
        assert!(!viewer.apply(first));

        let view = viewer.view().unwrap();
        assert_eq!(view.name, "pikachu");
        assert_eq!(view.pokemon.map(|p| p.name.as_str()), Some("pikachu"));
    }

    #[tokio::test]
    async fn fetch_resolving_after_close_is_discarded() {
        let client = MockClient::new();
        client.push_response(Response::CatalogItem(fixtures::pokemon(25, "pikachu")));

        let mut viewer = DetailViewer::new();
        let request = viewer.open("pikachu");
        viewer.close();

        assert!(!viewer.apply(request.run(&client).await));
        assert!(viewer.view().is_none());
    }

    #[tokio::test]
    async fn fetch_error_is_shown() {
        let client = MockClient::new();
        client.push_error(ClientError::request(
            StatusCode::NOT_FOUND,
            Some("Pokemon not found".to_string()),
        ));

        let mut viewer = DetailViewer::new();
        let request = viewer.open("missingno");
        viewer.apply(request.run(&client).await);

        let view = viewer.view().unwrap();
        assert_eq!(view.error, Some("Pokemon not found"));
        assert!(view.pokemon.is_none());
    }

    #[test]
    fn moves_are_truncated_with_placeholder_power() {
        let pokemon = fixtures::pokemon(25, "pikachu");
        let view = DetailView {
            name: "pikachu",
            loading: false,
            error: None,
            pokemon: Some(&pokemon),
        };

        let moves = view.moves().collect::<Vec<_>>();
        assert_eq!(moves.len(), MOVES_SHOWN);
        assert_eq!(moves[0], MoveLine {
            name: "move-0",
            type_name: "normal",
            power: UNKNOWN_POWER.to_string(),
        });
        assert_eq!(moves[1].power, "10");
    }

    #[tokio::test]
    async fn catch_creates_entry_and_signals_refresh() {
        let client = MockClient::new();
        client.push_responses([
            Response::CatalogItem(fixtures::pokemon(25, "pikachu")),
            Response::Written(None),
        ]);

        let mut viewer = DetailViewer::new();
        let request = viewer.open("pikachu");
        viewer.apply(request.run(&client).await);
        assert!(viewer.start_catch());

        let alerts = RefCell::new(Vec::<String>::new());
        let record = |message: &str| alerts.borrow_mut().push(message.to_string());
        let mut refreshed = 0;
        let created = viewer
            .submit_catch(&client, catch_input(), now(), &record, || refreshed += 1)
            .await;

        assert!(created);
        assert_eq!(refreshed, 1);
        assert!(viewer.catch_form().is_none());
        assert!(alerts.borrow().is_empty());
        assert_eq!(
            client.calls()[1],
            Call::CreateCollectionEntry(pokedex_catalog::types::InsertBoxEntry {
                created_at: now(),
                level: 3,
                location: "Route 2".to_string(),
                notes: None,
                pokemon_id: 25,
            })
        );
    }

    #[tokio::test]
    async fn invalid_catch_is_not_sent() {
        let client = MockClient::new();
        client.push_response(Response::CatalogItem(fixtures::pokemon(25, "pikachu")));

        let mut viewer = DetailViewer::new();
        let request = viewer.open("pikachu");
        viewer.apply(request.run(&client).await);
        viewer.start_catch();

        let alerts = RefCell::new(Vec::<String>::new());
        let record = |message: &str| alerts.borrow_mut().push(message.to_string());
        let input = FormInput {
            level: "101".to_string(),
            ..catch_input()
        };
        let created = viewer
            .submit_catch(&client, input, now(), &record, || panic!("nothing created"))
            .await;

        assert!(!created);
        // validation errors stay inline
        assert!(alerts.borrow().is_empty());
        assert_eq!(
            viewer.catch_form().and_then(|form| form.error()),
            Some(FormError::LevelOutOfRange)
        );
        assert_eq!(client.calls().len(), 1);
    }

    #[tokio::test]
    async fn failed_catch_alerts_and_keeps_form() {
        let client = MockClient::new();
        client.push_responses([
            Response::CatalogItem(fixtures::pokemon(25, "pikachu")),
            Response::Error(ClientError::MissingToken),
        ]);

        let mut viewer = DetailViewer::new();
        let request = viewer.open("pikachu");
        viewer.apply(request.run(&client).await);
        viewer.start_catch();

        let alerts = RefCell::new(Vec::<String>::new());
        let record = |message: &str| alerts.borrow_mut().push(message.to_string());
        let created = viewer
            .submit_catch(&client, catch_input(), now(), &record, || {
                panic!("nothing created")
            })
            .await;

        assert!(!created);
        assert!(viewer.catch_form().is_some());
        assert_eq!(*alerts.borrow(), vec!["Missing authentication token".to_string()]);
    }
}
