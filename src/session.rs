//! Session aggregate: one connection, one request client, one cached token.

use reqwest::Client;
use tokio::sync::Mutex;

use crate::cache::token::Token;
use crate::config::connection::{Connection, DriverConfig};
use crate::error::Result;
use crate::transport::client::build_client;

/// In-memory aggregate of connection parameters, transport client and cached token.
///
/// The token sits behind a mutex that is held across the whole
/// check-expiry / fetch / overwrite sequence in [`Session::authenticate`],
/// so concurrent callers never refresh twice nor see a half-written token.
#[derive(Debug)]
pub struct Session {
    connection: Connection,
    client: Client,
    pub(crate) token: Mutex<Token>,
}

impl Session {
    /// Session with a never-fetched (expired) token
    pub fn new(connection: Connection, client: Client) -> Self {
        Self::with_token(connection, client, Token::default())
    }

    pub fn with_token(connection: Connection, client: Client, token: Token) -> Self {
        Self { connection, client, token: Mutex::new(token) }
    }

    /// Build the transport from config and wrap it in a fresh session
    pub async fn from_config(driver_config: &DriverConfig) -> Result<Self> {
        let client = build_client(&driver_config.connection, &driver_config.settings.http).await?;
        Ok(Self::new(driver_config.connection.clone(), client))
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Copy of the cached token as it is right now
    pub async fn token(&self) -> Token {
        self.token.lock().await.clone()
    }
}
