use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use config::{Config as HierarchicalConfig, Environment, FileFormat};
use pokedex_catalog::{ClientConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use tracing::debug;
use xdg::BaseDirectories;

/// Name of the pokedex config directory
const POKEDEX_DIR_NAME: &str = "pokedex";
pub const POKEDEX_CONFIG_FILE: &str = "pokedex.toml";
/// Overrides the location of the config file
const POKEDEX_CONFIG_FILE_VAR: &str = "POKEDEX_CONFIG_FILE";
const POKEDEX_ENV_PREFIX: &str = "POKEDEX";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the pokedex service
    pub base_url: String,

    /// Bearer token for the collection endpoints
    pub token: Option<String>,

    /// User agent sent with every request
    pub user_agent: Option<String>,

    /// Additional headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Config {
    /// Read the config from, in increasing precedence:
    ///
    /// - built in defaults
    /// - `$POKEDEX_CONFIG_FILE`, or `pokedex/pokedex.toml` in the XDG config dirs
    /// - `POKEDEX_*` environment variables
    pub fn parse() -> Result<Config> {
        let file = match env::var(POKEDEX_CONFIG_FILE_VAR) {
            Ok(file) => {
                debug!("`${POKEDEX_CONFIG_FILE_VAR}` set: {file}");
                Some(PathBuf::from(file))
            },
            Err(_) => BaseDirectories::with_prefix(POKEDEX_DIR_NAME)
                .find_config_file(POKEDEX_CONFIG_FILE),
        };
        Self::parse_with_file(file.as_deref())
    }

    fn parse_with_file(file: Option<&Path>) -> Result<Config> {
        let mut builder = HierarchicalConfig::builder().set_default("base_url", DEFAULT_BASE_URL)?;

        if let Some(file) = file {
            debug!(?file, "reading config file");
            builder = builder.add_source(
                config::File::from(file.to_path_buf())
                    .format(FileFormat::Toml)
                    .required(true),
            );
        }

        let raw_config = builder
            .add_source(Environment::with_prefix(POKEDEX_ENV_PREFIX))
            .build()
            .context("Could not read config")?;

        raw_config
            .try_deserialize()
            .context("Could not parse config")
    }

    /// Client configuration, with `base_url` and `token` overridden if given.
    pub fn client_config(&self, base_url: Option<String>, token: Option<String>) -> ClientConfig {
        ClientConfig {
            base_url: base_url.unwrap_or_else(|| self.base_url.clone()),
            token: token.or_else(|| self.token.clone()),
            extra_headers: self.headers.clone(),
            user_agent: self.user_agent.clone(),
        }
    }
}
