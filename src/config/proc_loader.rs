use std::path::Path;

use regex::Regex;
use tracing::{debug, error};

use crate::config::connection::DriverConfig;
use crate::config::proc_validator;
use crate::config::settings::LoggingConfig;
use crate::error::{ClientError, Result};

/// Load and validate config from YAML file
pub async fn file_to_config(path: &Path) -> Result<DriverConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ClientError::Config(format!("cannot read config '{}': {}", path.display(), e)))?;

    let expanded = expand_env_vars(&content);
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<DriverConfig> {
    let mut driver_config: DriverConfig = serde_yaml::from_str(content)
        .map_err(|e| {
            error!("parse config error: {}", e);
            ClientError::Config(format!("invalid config format: {}", e))
        })?;

    // Apply defaults
    if driver_config.settings.logging.is_none() {
        driver_config.settings.logging = Some(LoggingConfig::default());
    }

    debug!("validating config ...");
    proc_validator::validate_driver_config(&driver_config)
        .map_err(|errors| ClientError::Config(errors.join("; ")))?;

    Ok(driver_config)
}

/// Replace `${VAR}` and `${VAR:default}` with environment values
fn expand_env_vars(input: &str) -> String {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}").expect("static regex");
    re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}
