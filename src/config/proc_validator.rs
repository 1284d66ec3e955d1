//! Configuration validation with aggregated errors.
//! - Aggregates all issues into Vec<String>
//! - Checks connection url scheme, credential pairing and transport timeouts
//! - Checks logging level names

use tracing::{error, info};

use crate::config::connection::{Connection, DriverConfig};
use crate::config::settings::{HttpConfig, LoggingConfig, SettingsConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Public entrypoint: returns Ok(()) or Err(Vec<String>) containing all issues.
pub fn validate_driver_config(cfg: &DriverConfig) -> Result<(), Vec<String>> {
    let mut errors: Vec<String> = Vec::new();

    validate_connection(&cfg.connection, &mut errors);
    validate_settings(&cfg.settings, &mut errors);

    if errors.is_empty() {
        info!("config validation passed");
        Ok(())
    } else {
        for e in &errors {
            error!("config validation: {}", e);
        }
        Err(errors)
    }
}

fn validate_connection(connection: &Connection, errors: &mut Vec<String>) {
    let url = connection.url.trim();
    if url.is_empty() {
        errors.push("connection.url must not be empty".to_string());
    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
        errors.push(format!(
            "connection.url '{}' must start with http:// or https://",
            url
        ));
    }

    if let Some(token_url) = &connection.token_url {
        let token_url = token_url.trim();
        if !(token_url.starts_with("http://") || token_url.starts_with("https://")) {
            errors.push(format!(
                "connection.token_url '{}' must start with http:// or https://",
                token_url
            ));
        }
    }

    if connection.password.is_some() && connection.username.is_none() {
        errors.push("connection.password is set but connection.username is missing".to_string());
    }
    if let Some(username) = &connection.username {
        if username.trim().is_empty() {
            errors.push("connection.username must not be blank".to_string());
        }
    }

    if let Some(ca_file) = &connection.ca_file {
        if connection.insecure {
            // insecure wins; the bundle is still loaded but never consulted
            info!("connection.ca_file {:?} has no effect while connection.insecure is true", ca_file);
        }
    }
}

fn validate_settings(settings: &SettingsConfig, errors: &mut Vec<String>) {
    validate_http(&settings.http, errors);
    if let Some(logging) = &settings.logging {
        validate_logging(logging, errors);
    }
}

fn validate_http(http: &HttpConfig, errors: &mut Vec<String>) {
    if http.timeout_ms == 0 {
        errors.push("settings.http.timeout_ms must be > 0".to_string());
    }
    if http.connect_timeout_ms == 0 {
        errors.push("settings.http.connect_timeout_ms must be > 0".to_string());
    }
    if http.connect_timeout_ms > http.timeout_ms {
        errors.push(format!(
            "settings.http.connect_timeout_ms ({}) must be <= timeout_ms ({})",
            http.connect_timeout_ms, http.timeout_ms
        ));
    }
}

fn validate_logging(logging: &LoggingConfig, errors: &mut Vec<String>) {
    if !LOG_LEVELS.contains(&logging.level.to_lowercase().as_str()) {
        errors.push(format!(
            "settings.logging.level '{}' must be one of {:?}",
            logging.level, LOG_LEVELS
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::LogFormat;

    fn config(connection: Connection) -> DriverConfig {
        DriverConfig { connection, settings: SettingsConfig::default() }
    }

    #[test]
    fn accepts_minimal_connection() {
        let cfg = config(Connection::new("https://engine/ovirt-engine/api").with_credentials("admin@internal", "pw"));
        assert!(validate_driver_config(&cfg).is_ok());
    }

    #[test]
    fn aggregates_all_issues() {
        let mut cfg = config(Connection {
            url: "ftp://engine".to_string(),
            password: Some("pw".to_string()),
            token_url: Some("sso/oauth/token".to_string()),
            ..Default::default()
        });
        cfg.settings.http.timeout_ms = 0;
        cfg.settings.logging = Some(LoggingConfig::new("loud".to_string(), LogFormat::Json));

        let errors = validate_driver_config(&cfg).unwrap_err();
        assert!(errors.iter().any(|e| e.contains("connection.url")));
        assert!(errors.iter().any(|e| e.contains("connection.token_url")));
        assert!(errors.iter().any(|e| e.contains("username is missing")));
        assert!(errors.iter().any(|e| e.contains("timeout_ms must be > 0")));
        assert!(errors.iter().any(|e| e.contains("logging.level")));
    }

    #[test]
    fn empty_url_is_rejected() {
        let errors = validate_driver_config(&config(Connection::default())).unwrap_err();
        assert_eq!(errors, vec!["connection.url must not be empty".to_string()]);
    }
}
