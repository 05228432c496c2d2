// config.rs
// Service account configuration for the EWS endpoint

use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use log::debug;
use serde::Deserialize;

use crate::auth::Credentials;
use crate::error::{Error, Result};

const DEFAULT_CONFIG_FILE: &str = "ews.toml";

fn default_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_inbox_names() -> Vec<String> {
    vec!["Inbox".to_string(), "Inkorg".to_string()]
}

/// Settings for the privileged service account and the server it talks to.
#[derive(Clone, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the Exchange server, e.g. `https://mail.example.com`.
    pub url: String,
    pub username: String,
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sent as `RequestServerVersion` when present.
    #[serde(default)]
    pub server_version: Option<String>,
    /// Search base handed to the directory lookup.
    #[serde(default)]
    pub directory_base: String,
    /// Acceptable display names of the inbox, in every locale we deploy to.
    #[serde(default = "default_inbox_names")]
    pub inbox_names: Vec<String>,
}

impl ServiceConfig {
    /// Loads `ews.toml` from the working directory (if any), overridden by
    /// `EWS_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading service configuration from {}", path.display());

        let config = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(
                Environment::with_prefix("EWS")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("inbox_names"),
            )
            .build()?;

        let service_config: ServiceConfig = config.try_deserialize()?;
        service_config.validate()?;
        Ok(service_config)
    }

    pub fn validate(&self) -> Result<()> {
        for (key, value) in [
            ("url", &self.url),
            ("username", &self.username),
            ("password", &self.password),
        ] {
            if value.trim().is_empty() {
                return Err(Error::InvalidInput(format!("{} not configured", key)));
            }
        }
        if self.inbox_names.is_empty() {
            return Err(Error::InvalidInput("inbox_names must not be empty".to_string()));
        }
        Ok(())
    }

    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.username, &self.password)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// Don't print the password in debug output
impl std::fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("url", &self.url)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("server_version", &self.server_version)
            .field("directory_base", &self.directory_base)
            .field("inbox_names", &self.inbox_names)
            .finish()
    }
}
