//! Configuration types for pokedex client construction.

use std::collections::BTreeMap;

/// The public instance of the pokedex service.
pub const DEFAULT_BASE_URL: &str = "https://hw4.cis1962.esinx.net/api/";

/// Configuration for pokedex client construction.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the service, e.g. `https://example.com/api/`.
    pub base_url: String,
    /// Optional bearer token for the `/box` endpoints.
    pub token: Option<String>,
    /// Additional headers to include in requests.
    pub extra_headers: BTreeMap<String, String>,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            token: None,
            extra_headers: BTreeMap::new(),
            user_agent: None,
        }
    }
}
