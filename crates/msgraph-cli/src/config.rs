//! Configuration for the msgraph CLI.
//!
//! Settings are layered, lowest priority first:
//! 1. the YAML configuration file
//! 2. `MSGRAPH_*` environment variables
//! 3. command-line flags

use std::path::{Path, PathBuf};

use anyhow::Context;
use msgraph::GraphApi;
use serde::{Deserialize, Serialize};

/// File name looked up in the working directory before the default path.
pub const LOCAL_CONFIG_FILE: &str = "msgraph.yaml";

pub const ENV_TENANT_DOMAIN: &str = "MSGRAPH_TENANT_DOMAIN";
pub const ENV_CLIENT_ID: &str = "MSGRAPH_CLIENT_ID";
pub const ENV_CLIENT_SECRET: &str = "MSGRAPH_CLIENT_SECRET";

/// Connection settings for the Graph API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Tenant domain, e.g. `contoso.onmicrosoft.com`.
    pub tenant_domain: Option<String>,
    /// OAuth2 client ID of the app registration.
    pub client_id: Option<String>,
    /// OAuth2 client secret of the app registration.
    pub client_secret: Option<String>,
    /// Enable debug logging.
    pub debug: bool,
    /// Dump HTTP requests and responses to stderr.
    pub http_debug: bool,
}

/// Values given on the command line; `None`/`false` leave the config as is.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub tenant_domain: Option<String>,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub debug: bool,
    pub http_debug: bool,
}

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/msgraph/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("msgraph")
            .join("config.yaml")
    }

    /// Load the configuration the CLI should use.
    ///
    /// An explicit path must exist and parse. Otherwise `./msgraph.yaml`
    /// is tried, then [`Config::default_path`], then defaults.
    pub fn discover(explicit: Option<&Path>) -> anyhow::Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::load(&local);
        }

        Ok(Self::load_or_default(&Self::default_path()))
    }

    /// Apply `MSGRAPH_*` variables obtained through `var`.
    pub fn with_env(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = var(ENV_TENANT_DOMAIN) {
            self.tenant_domain = Some(value);
        }
        if let Some(value) = var(ENV_CLIENT_ID) {
            self.client_id = Some(value);
        }
        if let Some(value) = var(ENV_CLIENT_SECRET) {
            self.client_secret = Some(value);
        }
        self
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Self {
        if let Some(value) = &overrides.tenant_domain {
            self.tenant_domain = Some(value.clone());
        }
        if let Some(value) = &overrides.client_id {
            self.client_id = Some(value.clone());
        }
        if let Some(value) = &overrides.client_secret {
            self.client_secret = Some(value.clone());
        }
        self.debug |= overrides.debug;
        self.http_debug |= overrides.http_debug;
        self
    }

    /// Build a [`GraphApi`] from these settings.
    ///
    /// Missing values are left empty; the client reports them on first use.
    pub fn into_api(self) -> GraphApi {
        let mut api = GraphApi::new(self.tenant_domain.unwrap_or_default());
        api.set_debug(self.debug);
        api.set_http_debug(self.http_debug);
        api.set_client_id(self.client_id.unwrap_or_default());
        api.set_client_secret(self.client_secret.unwrap_or_default());
        api
    }
}
