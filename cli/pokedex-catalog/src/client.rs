//! Typed client for the pokedex REST service.

use std::fmt::Debug;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use reqwest::header::{self, HeaderMap};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, trace};
use url::Url;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::mock::MockClient;
use crate::types::*;

/// Either a client for the actual pokedex service,
/// or a mock client for testing.
#[derive(Debug)]
#[enum_dispatch(ClientTrait)]
pub enum Client {
    Pokedex(PokedexClient),
    Mock(MockClient),
}

impl Client {
    /// Replace the bearer token used for the `/box` endpoints.
    pub fn set_token(&mut self, token: Option<String>) {
        match self {
            Client::Pokedex(client) => client.set_token(token),
            Client::Mock(client) => client.set_token(token),
        }
    }
}

/// The complete pokedex API interface.
///
/// Implemented by [`PokedexClient`] for the REST service
/// and by [`MockClient`] for canned responses without HTTP.
#[enum_dispatch]
#[allow(async_fn_in_trait)]
pub trait ClientTrait {
    /// List one page of the catalog. Does not require authentication.
    ///
    /// Paging past the last item yields an empty list.
    async fn list_catalog(&self, limit: u32, offset: u32) -> Result<Vec<Pokemon>, ClientError>;

    /// Get a single catalog item by its name. Does not require authentication.
    async fn get_catalog_item(&self, name: &str) -> Result<Pokemon, ClientError>;

    /// List the ids of all collection entries of the authenticated user.
    async fn list_collection_ids(&self) -> Result<Vec<BoxEntryId>, ClientError>;

    /// Get a single collection entry.
    async fn get_collection_entry(&self, id: &str) -> Result<BoxEntry, ClientError>;

    /// Create a collection entry.
    ///
    /// Returns the created entry unless the service answered without content.
    async fn create_collection_entry(
        &self,
        entry: &InsertBoxEntry,
    ) -> Result<Option<BoxEntry>, ClientError>;

    /// Update the fields set in `update` of the collection entry `id`.
    ///
    /// Returns the updated entry unless the service answered without content.
    async fn update_collection_entry(
        &self,
        id: &str,
        update: &UpdateBoxEntry,
    ) -> Result<Option<BoxEntry>, ClientError>;

    /// Delete the collection entry `id`.
    async fn delete_collection_entry(&self, id: &str) -> Result<(), ClientError>;
}

/// A client for the pokedex service.
///
/// Every call is a single request: no retries, no caching, no timeouts.
pub struct PokedexClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<String>,
    config: ClientConfig,
}

impl Debug for PokedexClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PokedexClient")
            .field("base_url", &self.config.base_url)
            .field("has_token", &self.token.is_some())
            .finish_non_exhaustive()
    }
}

impl PokedexClient {
    /// Create a new pokedex client from configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|_| ClientError::InvalidUrl(config.base_url.clone()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(config.base_url.clone()));
        }

        let http = build_http_client(&config)?;

        Ok(Self {
            http,
            base_url,
            token: config.token.clone(),
            config,
        })
    }

    /// Replace the bearer token used for the `/box` endpoints.
    pub fn set_token(&mut self, token: Option<String>) {
        debug!(has_token = token.is_some(), "updating pokedex token");
        self.token = token;
    }

    /// Build the URL of an endpoint below the base URL.
    ///
    /// Segments are percent-encoded. An empty last segment produces a
    /// trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        trace!(%method, %url, "building request");
        self.http.request(method, url)
    }

    /// Like [Self::request] but attaches the bearer token,
    /// failing before anything is sent if there is none.
    fn authenticated_request(
        &self,
        method: Method,
        url: Url,
    ) -> Result<RequestBuilder, ClientError> {
        let Some(token) = self.token.as_deref() else {
            debug!(%method, %url, "refusing to send request without token");
            return Err(ClientError::MissingToken);
        };
        Ok(self.request(method, url).bearer_auth(token))
    }
}

impl ClientTrait for PokedexClient {
    #[instrument(skip(self))]
    async fn list_catalog(&self, limit: u32, offset: u32) -> Result<Vec<Pokemon>, ClientError> {
        let mut url = self.endpoint(&["pokemon", ""])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string())
            .append_pair("offset", &offset.to_string());

        let page: Vec<Pokemon> = send(self.request(Method::GET, url))
            .await?
            .unwrap_or_default();
        debug!(n_items = page.len(), "received catalog page");
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn get_catalog_item(&self, name: &str) -> Result<Pokemon, ClientError> {
        let url = self.endpoint(&["pokemon", name])?;
        send(self.request(Method::GET, url))
            .await?
            .ok_or(ClientError::EmptyResponse)
    }

    #[instrument(skip(self))]
    async fn list_collection_ids(&self) -> Result<Vec<BoxEntryId>, ClientError> {
        let url = self.endpoint(&["box", ""])?;
        let ids: Vec<BoxEntryId> = send(self.authenticated_request(Method::GET, url)?)
            .await?
            .unwrap_or_default();
        debug!(n_entries = ids.len(), "received collection ids");
        Ok(ids)
    }

    #[instrument(skip(self))]
    async fn get_collection_entry(&self, id: &str) -> Result<BoxEntry, ClientError> {
        let url = self.endpoint(&["box", id])?;
        send(self.authenticated_request(Method::GET, url)?)
            .await?
            .ok_or(ClientError::EmptyResponse)
    }

    #[instrument(skip_all, fields(pokemon_id = entry.pokemon_id))]
    async fn create_collection_entry(
        &self,
        entry: &InsertBoxEntry,
    ) -> Result<Option<BoxEntry>, ClientError> {
        let url = self.endpoint(&["box", ""])?;
        let request = with_json_body(self.authenticated_request(Method::POST, url)?, entry)?;
        let created = send(request).await?;
        debug!("created collection entry");
        Ok(created)
    }

    #[instrument(skip(self, update))]
    async fn update_collection_entry(
        &self,
        id: &str,
        update: &UpdateBoxEntry,
    ) -> Result<Option<BoxEntry>, ClientError> {
        let url = self.endpoint(&["box", id])?;
        let request = with_json_body(self.authenticated_request(Method::PUT, url)?, update)?;
        let updated = send(request).await?;
        debug!("updated collection entry");
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete_collection_entry(&self, id: &str) -> Result<(), ClientError> {
        let url = self.endpoint(&["box", id])?;
        send::<serde_json::Value>(self.authenticated_request(Method::DELETE, url)?).await?;
        debug!("deleted collection entry");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Request / response helpers
// ---------------------------------------------------------------------------

fn with_json_body(
    request: RequestBuilder,
    body: &impl Serialize,
) -> Result<RequestBuilder, ClientError> {
    let body = serde_json::to_vec(body).map_err(|e| ClientError::Other(e.to_string()))?;
    Ok(request.body(body))
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<Option<T>, ClientError> {
    let response = request.send().await.map_err(ClientError::Transport)?;
    handle_response(response).await
}

/// Normalize a response into its decoded body.
///
/// * non-2xx: [ClientError::Request], using the `message` field of a JSON
///   body if present
/// * 204: `Ok(None)`
/// * other 2xx: the body decoded as JSON
async fn handle_response<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<Option<T>, ClientError> {
    let status = response.status();
    trace!(%status, url = %response.url(), "received response");

    if !status.is_success() {
        // The body may be anything from JSON to an HTML error page.
        let message = response
            .bytes()
            .await
            .ok()
            .and_then(|body| serde_json::from_slice::<ErrorBody>(&body).ok())
            .and_then(|body| body.message);
        let err = ClientError::request(status, message);
        debug!(%status, %err, "service returned error response");
        return Err(err);
    }

    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }

    let body = response.bytes().await.map_err(ClientError::Transport)?;
    serde_json::from_slice(&body)
        .map(Some)
        .map_err(ClientError::Decode)
}

// ---------------------------------------------------------------------------
// HTTP client builder
// ---------------------------------------------------------------------------

/// Build the HTTP client shared by all requests.
///
/// The bearer token is not part of the default headers;
/// it is attached per request so it can change after construction.
fn build_http_client(config: &ClientConfig) -> Result<reqwest::Client, ClientError> {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/json"),
    );

    for (key, value) in &config.extra_headers {
        headers.insert(
            header::HeaderName::from_str(key).map_err(
                |e: reqwest::header::InvalidHeaderName| ClientError::Other(e.to_string()),
            )?,
            header::HeaderValue::from_str(value).map_err(
                |e: reqwest::header::InvalidHeaderValue| ClientError::Other(e.to_string()),
            )?,
        );
    }

    debug!(
        base_url = %config.base_url,
        has_token = config.token.is_some(),
        extra_headers = config.extra_headers.len(),
        "building pokedex HTTP client"
    );

    let client_builder = reqwest::Client::builder().default_headers(headers);

    let client_builder = if let Some(ref user_agent) = config.user_agent {
        client_builder.user_agent(user_agent)
    } else {
        client_builder
    };

    client_builder
        .build()
        .map_err(|e| ClientError::Other(e.to_string()))
}
