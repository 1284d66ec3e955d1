use std::collections::HashMap;

use chrono::Utc;
use http::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::cache::token::Token;
use crate::config::connection::Connection;
use crate::error::{ClientError, Result};
use crate::parser::lenient::opt_u64_from_number_or_string;
use crate::utils::constants::{DEFAULT_SCOPE, DEFAULT_TOKEN_TYPE, GRANT_TYPE_PASSWORD};

const OPERATION: &str = "token fetch";

/// SSO token endpoint payload, success and error shapes share one struct
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    #[serde(default, deserialize_with = "opt_u64_from_number_or_string")]
    expires_in: Option<u64>,
    token_type: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchange the connection credentials for a new token.
///
/// Never touches any cached state; the caller decides what to do with the result.
pub async fn fetch_token(client: &Client, connection: &Connection) -> Result<Token> {
    let url = connection.token_url();

    let mut form: HashMap<&str, &str> = HashMap::new();
    form.insert("grant_type", GRANT_TYPE_PASSWORD);
    form.insert("scope", connection.scope.as_deref().unwrap_or(DEFAULT_SCOPE));
    if let Some(username) = &connection.username {
        form.insert("username", username);
    }
    if let Some(password) = &connection.password {
        form.insert("password", password);
    }

    debug!(url = %url, "requesting token");
    let response = client
        .post(&url)
        .header(ACCEPT, "application/json")
        .form(&form)
        .send()
        .await
        .map_err(|e| ClientError::transport(OPERATION, e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| ClientError::transport(OPERATION, e))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<TokenResponse>(&body)
            .ok()
            .and_then(|r| r.error_description.or(r.error))
            .unwrap_or(body);
        warn!(status = %status, "token endpoint rejected request");
        return Err(ClientError::Auth(format!("HTTP {}: {}", status, detail)));
    }

    parse_token(&body)
}

/// Turn a token endpoint body into a [`Token`] stamped with the current time.
pub fn parse_token(body: &str) -> Result<Token> {
    let parsed: TokenResponse = serde_json::from_str(body)
        .map_err(|e| ClientError::Auth(format!("invalid token response body: {}", e)))?;

    if let Some(error) = parsed.error {
        return Err(ClientError::Auth(format!(
            "{}: {}",
            error,
            parsed.error_description.unwrap_or_default()
        )));
    }

    let access_token = parsed
        .access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ClientError::Auth("token response missing access_token".to_string()))?;
    let expires_in = parsed
        .expires_in
        .ok_or_else(|| ClientError::Auth("token response missing expires_in".to_string()))?;
    let token_type = parsed
        .token_type
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TOKEN_TYPE.to_string());

    Ok(Token::new(access_token, expires_in, token_type, Utc::now()))
}
