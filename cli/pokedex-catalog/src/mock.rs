//! Mock client returning canned responses without HTTP.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::client::ClientTrait;
use crate::error::ClientError;
use crate::types::*;

// Arc allows pushing responses into a client that has already been handed out,
// Mutex allows sharing it across tokio tasks.
type MockField<T> = Arc<Mutex<T>>;

/// A canned response, popped by the next call.
#[derive(Debug)]
pub enum Response {
    CatalogPage(Vec<Pokemon>),
    CatalogItem(Pokemon),
    CollectionIds(Vec<BoxEntryId>),
    CollectionEntry(BoxEntry),
    /// Response to a create or update.
    Written(Option<BoxEntry>),
    Deleted,
    Error(ClientError),
}

/// A call received by the [MockClient], in order of arrival.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    ListCatalog { limit: u32, offset: u32 },
    GetCatalogItem(String),
    ListCollectionIds,
    GetCollectionEntry(BoxEntryId),
    CreateCollectionEntry(InsertBoxEntry),
    UpdateCollectionEntry(BoxEntryId, UpdateBoxEntry),
    DeleteCollectionEntry(BoxEntryId),
}

#[derive(Debug, Clone, Default)]
pub struct MockClient {
    pub mock_responses: MockField<VecDeque<Response>>,
    pub calls: MockField<Vec<Call>>,
    token: Option<String>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a new response into the list of mock responses
    pub fn push_response(&self, response: Response) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .push_back(response);
    }

    /// Push several responses, answered in order
    pub fn push_responses(&self, responses: impl IntoIterator<Item = Response>) {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .extend(responses);
    }

    /// Push an error answered by the next call
    pub fn push_error(&self, err: ClientError) {
        self.push_response(Response::Error(err));
    }

    /// All calls received so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("couldn't acquire mock lock").clone()
    }

    /// Number of responses not consumed yet
    pub fn pending_responses(&self) -> usize {
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .len()
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    fn record(&self, call: Call) -> Option<Response> {
        self.calls
            .lock()
            .expect("couldn't acquire mock lock")
            .push(call);
        self.mock_responses
            .lock()
            .expect("couldn't acquire mock lock")
            .pop_front()
    }
}

impl ClientTrait for MockClient {
    async fn list_catalog(&self, limit: u32, offset: u32) -> Result<Vec<Pokemon>, ClientError> {
        let mock_resp = self.record(Call::ListCatalog { limit, offset });
        match mock_resp {
            Some(Response::CatalogPage(page)) => Ok(page),
            Some(Response::Error(err)) => Err(err),
            _ => panic!("expected catalog page response, found {:?}", &mock_resp),
        }
    }

    async fn get_catalog_item(&self, name: &str) -> Result<Pokemon, ClientError> {
        let mock_resp = self.record(Call::GetCatalogItem(name.to_string()));
        match mock_resp {
            Some(Response::CatalogItem(pokemon)) => Ok(pokemon),
            Some(Response::Error(err)) => Err(err),
            _ => panic!("expected catalog item response, found {:?}", &mock_resp),
        }
    }

    async fn list_collection_ids(&self) -> Result<Vec<BoxEntryId>, ClientError> {
        let mock_resp = self.record(Call::ListCollectionIds);
        match mock_resp {
            Some(Response::CollectionIds(ids)) => Ok(ids),
            Some(Response::Error(err)) => Err(err),
            _ => panic!("expected collection ids response, found {:?}", &mock_resp),
        }
    }

    async fn get_collection_entry(&self, id: &str) -> Result<BoxEntry, ClientError> {
        let mock_resp = self.record(Call::GetCollectionEntry(id.to_string()));
        match mock_resp {
            Some(Response::CollectionEntry(entry)) => Ok(entry),
            Some(Response::Error(err)) => Err(err),
            _ => panic!("expected collection entry response, found {:?}", &mock_resp),
        }
    }

    async fn create_collection_entry(
        &self,
        entry: &InsertBoxEntry,
    ) -> Result<Option<BoxEntry>, ClientError> {
        let mock_resp = self.record(Call::CreateCollectionEntry(entry.clone()));
        match mock_resp {
            Some(Response::Written(entry)) => Ok(entry),
            Some(Response::Error(err)) => Err(err),
            _ => panic!("expected create response, found {:?}", &mock_resp),
        }
    }

    async fn update_collection_entry(
        &self,
        id: &str,
        update: &UpdateBoxEntry,
    ) -> Result<Option<BoxEntry>, ClientError> {
        let mock_resp = self.record(Call::UpdateCollectionEntry(id.to_string(), update.clone()));
        match mock_resp {
            Some(Response::Written(entry)) => Ok(entry),
            Some(Response::Error(err)) => Err(err),
            _ => panic!("expected update response, found {:?}", &mock_resp),
        }
    }

    async fn delete_collection_entry(&self, id: &str) -> Result<(), ClientError> {
        let mock_resp = self.record(Call::DeleteCollectionEntry(id.to_string()));
        match mock_resp {
            Some(Response::Deleted) => Ok(()),
            Some(Response::Error(err)) => Err(err),
            _ => panic!("expected delete response, found {:?}", &mock_resp),
        }
    }
}
