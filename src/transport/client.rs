use std::time::Duration;

use reqwest::{Certificate, Client};
use tracing::{debug, warn};

use crate::config::connection::Connection;
use crate::config::settings::HttpConfig;
use crate::error::{ClientError, Result};

/// Build the request client for a connection: bounded timeouts, optional
/// extra CA bundle, optional acceptance of invalid certificates.
pub async fn build_client(connection: &Connection, http: &HttpConfig) -> Result<Client> {
    let mut builder = Client::builder()
        .timeout(Duration::from_millis(http.timeout_ms))
        .connect_timeout(Duration::from_millis(http.connect_timeout_ms));

    if let Some(ca_file) = &connection.ca_file {
        let pem = tokio::fs::read(ca_file)
            .await
            .map_err(|e| ClientError::Config(format!("cannot read ca_file '{}': {}", ca_file.display(), e)))?;
        let certificate = Certificate::from_pem(&pem)
            .map_err(|e| ClientError::Config(format!("invalid ca_file '{}': {}", ca_file.display(), e)))?;
        debug!(ca_file = %ca_file.display(), "adding root certificate");
        builder = builder.add_root_certificate(certificate);
    }

    if connection.insecure {
        warn!(url = %connection.url, "TLS certificate verification disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    builder
        .build()
        .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn builds_insecure_client() {
        let connection = Connection::new("https://engine").insecure(true);
        assert!(build_client(&connection, &HttpConfig::default()).await.is_ok());
    }

    #[tokio::test]
    async fn missing_ca_file_is_config_error() {
        let connection = Connection {
            ca_file: Some("/nonexistent/ca.pem".into()),
            ..Connection::new("https://engine")
        };
        let err = build_client(&connection, &HttpConfig::default()).await.unwrap_err();
        assert!(matches!(err, ClientError::Config(msg) if msg.contains("ca_file")));
    }
}
