//! A front end session wiring the views to one client.
//!
//! The session owns what the views share: the client with its token, the
//! id to name index filled by the catalog and the refresh counter bumped
//! whenever a pokemon is caught.

use chrono::{DateTime, Utc};
use pokedex_catalog::{Client, ClientTrait};
use tracing::debug;

use crate::models::catalog_browser::CatalogBrowser;
use crate::models::collection_browser::CollectionBrowser;
use crate::models::collection_form::FormInput;
use crate::models::id_index::IdNameIndex;
use crate::models::Alerts;

/// Counts changes to the collection made outside the collection view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshCounter(u64);

impl RefreshCounter {
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    pub fn get(&self) -> u64 {
        self.0
    }
}

pub struct Pokedex<C: ClientTrait = Client> {
    client: C,
    index: IdNameIndex,
    refresh: RefreshCounter,
    pub catalog: CatalogBrowser,
    pub collection: CollectionBrowser,
    alerts: Box<dyn Alerts>,
}

impl<C: ClientTrait> Pokedex<C> {
    pub fn new(client: C, alerts: impl Alerts + 'static) -> Self {
        Self {
            client,
            index: IdNameIndex::new(),
            refresh: RefreshCounter::default(),
            catalog: CatalogBrowser::new(),
            collection: CollectionBrowser::new(),
            alerts: Box::new(alerts),
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut C {
        &mut self.client
    }

    pub fn index(&self) -> &IdNameIndex {
        &self.index
    }

    pub fn refresh_count(&self) -> u64 {
        self.refresh.get()
    }

    /// Load the current catalog page.
    pub async fn show_page(&mut self) {
        let request = self.catalog.activate();
        let outcome = request.run(&self.client).await;
        self.catalog.apply(outcome, &mut self.index);
    }

    pub async fn next_page(&mut self) {
        let request = self.catalog.next();
        let outcome = request.run(&self.client).await;
        self.catalog.apply(outcome, &mut self.index);
    }

    /// Returns `false` on the first page.
    pub async fn previous_page(&mut self) -> bool {
        let Some(request) = self.catalog.previous() else {
            return false;
        };
        let outcome = request.run(&self.client).await;
        self.catalog.apply(outcome, &mut self.index);
        true
    }

    pub async fn go_to_page(&mut self, page: i64) {
        let request = self.catalog.go_to(page);
        let outcome = request.run(&self.client).await;
        self.catalog.apply(outcome, &mut self.index);
    }

    pub async fn show_detail(&mut self, name: &str) {
        let request = self.catalog.select(name);
        let outcome = request.run(&self.client).await;
        self.catalog.detail.apply(outcome);
    }

    pub fn close_detail(&mut self) {
        self.catalog.detail.close();
    }

    /// Catch the pokemon shown in the detail view.
    ///
    /// Opens the catch form if needed. Returns whether an entry was created.
    pub async fn catch(&mut self, input: FormInput, now: DateTime<Utc>) -> bool {
        if self.catalog.detail.catch_form().is_none() && !self.catalog.detail.start_catch() {
            return false;
        }
        let refresh = &mut self.refresh;
        self.catalog
            .detail
            .submit_catch(&self.client, input, now, &*self.alerts, || {
                refresh.bump();
                debug!(refresh = refresh.get(), "collection changed");
            })
            .await
    }

    /// Load the collection.
    pub async fn open_collection(&mut self) {
        let request = self.collection.activate(&self.index, self.refresh.get());
        let outcome = request.run(&self.client).await;
        self.collection.apply(outcome);
    }

    /// Reload the open collection if it changed since the last load.
    ///
    /// Returns whether it was reloaded.
    pub async fn sync_collection(&mut self) -> bool {
        if !self.collection.is_active() {
            return false;
        }
        let Some(request) = self.collection.sync(&self.index, self.refresh.get()) else {
            return false;
        };
        let outcome = request.run(&self.client).await;
        self.collection.apply(outcome);
        true
    }

    pub async fn delete_entry(&mut self, id: &str) -> bool {
        self.collection
            .delete(&self.client, id, &*self.alerts)
            .await
    }

    /// Submit the open edit form of the collection view.
    pub async fn edit_entry(&mut self, input: FormInput, now: DateTime<Utc>) -> bool {
        self.collection
            .submit_edit(&self.client, input, now, &*self.alerts)
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pokedex_catalog::{fixtures, Call, ClientError, MockClient, Response};
    use pretty_assertions::assert_eq;

    use super::*;

    fn now() -> DateTime<Utc> {
        "2024-06-01T08:30:00Z".parse().unwrap()
    }

    fn session() -> (Pokedex<MockClient>, MockClient, Arc<Mutex<Vec<String>>>) {
        let client = MockClient::new();
        let alerts = Arc::new(Mutex::new(Vec::new()));
        let sink = alerts.clone();
        let pokedex = Pokedex::new(client.clone(), move |message: &str| {
            sink.lock().unwrap().push(message.to_string())
        });
        (pokedex, client, alerts)
    }

    #[test]
    fn refresh_counter_bumps() {
        let mut counter = RefreshCounter::default();
        counter.bump();
        counter.bump();
        assert_eq!(counter.get(), 2);
    }

    #[tokio::test]
    async fn catalog_pages_feed_collection_resolution() {
        let (mut pokedex, client, alerts) = session();
        client.push_responses([
            Response::CatalogPage(vec![fixtures::pokemon(25, "pikachu")]),
            Response::CollectionIds(vec!["a".to_string()]),
            Response::CollectionEntry(fixtures::box_entry("a", 25)),
            Response::CatalogItem(fixtures::pokemon(25, "pikachu")),
        ]);

        pokedex.show_page().await;
        pokedex.open_collection().await;

        assert_eq!(pokedex.index().get(25), Some("pikachu"));
        assert_eq!(pokedex.collection.items().len(), 1);
        assert_eq!(pokedex.collection.error(), None);
        assert!(alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn catch_triggers_collection_reload() {
        let (mut pokedex, client, alerts) = session();
        client.push_responses([
            Response::CatalogPage(vec![fixtures::pokemon(25, "pikachu")]),
            Response::CollectionIds(vec![]),
            Response::CatalogItem(fixtures::pokemon(25, "pikachu")),
            Response::Written(None),
            Response::CollectionIds(vec!["a".to_string()]),
            Response::CollectionEntry(fixtures::box_entry("a", 25)),
            Response::CatalogItem(fixtures::pokemon(25, "pikachu")),
        ]);

        pokedex.show_page().await;
        pokedex.open_collection().await;
        assert!(!pokedex.sync_collection().await);

        pokedex.show_detail("pikachu").await;
        let input = FormInput {
            location: "Route 2".to_string(),
            level: "3".to_string(),
            notes: String::new(),
        };
        assert!(pokedex.catch(input, now()).await);
        assert_eq!(pokedex.refresh_count(), 1);

        assert!(pokedex.sync_collection().await);
        assert_eq!(pokedex.collection.items().len(), 1);
        assert_eq!(client.pending_responses(), 0);
        assert!(alerts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_catch_does_not_refresh() {
        let (mut pokedex, client, alerts) = session();
        client.push_responses([
            Response::CatalogItem(fixtures::pokemon(25, "pikachu")),
            Response::Error(ClientError::MissingToken),
        ]);

        pokedex.show_detail("pikachu").await;
        let input = FormInput {
            location: "Route 2".to_string(),
            ..FormInput::default()
        };
        assert!(!pokedex.catch(input, now()).await);

        assert_eq!(pokedex.refresh_count(), 0);
        assert_eq!(*alerts.lock().unwrap(), vec![
            "Missing authentication token".to_string()
        ]);
    }

    #[tokio::test]
    async fn catch_without_detail_does_nothing() {
        let (mut pokedex, client, _) = session();
        assert!(!pokedex.catch(FormInput::default(), now()).await);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn closed_collection_is_not_synced() {
        let (mut pokedex, client, _) = session();
        assert!(!pokedex.sync_collection().await);
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn previous_on_first_page_sends_nothing() {
        let (mut pokedex, client, _) = session();
        client.push_responses([
            Response::CatalogPage(vec![]),
            Response::CatalogPage(vec![]),
        ]);

        assert!(!pokedex.previous_page().await);
        pokedex.go_to_page(-2).await;
        pokedex.next_page().await;

        assert_eq!(client.calls(), vec![
            Call::ListCatalog {
                limit: 10,
                offset: 0
            },
            Call::ListCatalog {
                limit: 10,
                offset: 10
            },
        ]);
    }
}
