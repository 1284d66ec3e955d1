use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;

use crate::config::settings::SettingsConfig;
use crate::utils::constants::{API_PATH_SUFFIX, TOKEN_PATH};

/// ================================
/// Full driver configuration
/// ================================
#[derive(Debug, Deserialize, Clone)]
pub struct DriverConfig {
    pub connection: Connection,
    #[serde(default)]
    pub settings: SettingsConfig,
}

/// Engine connection parameters. Immutable once loaded.
#[derive(Deserialize, Clone, Default)]
pub struct Connection {
    /// API base url, e.g. https://engine.example/ovirt-engine/api
    pub url: String,
    /// accept self-signed or otherwise invalid certificates
    #[serde(default)]
    pub insecure: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    /// PEM bundle added to the trusted roots
    pub ca_file: Option<PathBuf>,
    pub scope: Option<String>,
    /// SSO token endpoint; derived from `url` when absent
    pub token_url: Option<String>,
}

impl Connection {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), ..Default::default() }
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    /// Join a path onto the base url without doubling slashes
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), path.trim_start_matches('/'))
    }

    /// SSO token endpoint. The engine serves it next to the API root,
    /// so `.../ovirt-engine/api` maps to `.../ovirt-engine/sso/oauth/token`.
    pub fn token_url(&self) -> String {
        if let Some(token_url) = &self.token_url {
            return token_url.clone();
        }
        let base = self.url.trim_end_matches('/');
        let base = base.strip_suffix(API_PATH_SUFFIX).unwrap_or(base);
        format!("{}/{}", base, TOKEN_PATH)
    }
}

// password stays out of logs
impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("url", &self.url)
            .field("insecure", &self.insecure)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("ca_file", &self.ca_file)
            .field("scope", &self.scope)
            .field("token_url", &self.token_url)
            .finish()
    }
}
