use clap::ValueEnum;
use tracing_subscriber::fmt::time::UtcTime;
use tracing_subscriber::{fmt, EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::connection::DriverConfig;
use crate::config::settings::{LogFormat, LoggingConfig};


#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    TRACE,
    DEBUG,
    INFO,
    WARN,
    ERROR,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match *self {
            LogLevel::TRACE => "trace",
            LogLevel::DEBUG => "debug",
            LogLevel::INFO => "info",
            LogLevel::WARN => "warn",
            LogLevel::ERROR => "error",
        }
    }
}


/// Resolve the effective logging config: CLI level beats the file, the file beats defaults.
pub fn resolve(driver_config: &DriverConfig, arg_log_level: Option<LogLevel>) -> LoggingConfig {
    let configured = driver_config
        .settings
        .logging
        .clone()
        .unwrap_or_default();

    match arg_log_level {
        Some(level) => LoggingConfig::new(level.as_str().to_owned(), configured.format),
        None => configured,
    }
}

pub fn run(driver_config: &DriverConfig, arg_log_level: Option<LogLevel>) {
    init_logging(&resolve(driver_config, arg_log_level));
}


/// Initialize tracing with the desired config.
/// Output goes to stderr, stdout carries command results.
pub fn init_logging(cfg: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(&cfg.level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Base layer: filter + writer
    let registry = tracing_subscriber::registry().with(env_filter);

    // Choose format layer
    match cfg.format {
        LogFormat::Json => {
            let layer = fmt::layer()
                .json()
                .with_timer(UtcTime::rfc_3339())
                .flatten_event(true) // flattens fields, good for CRI log parsers
                .with_ansi(false)
                .with_writer(std::io::stderr);

            let _ = registry.with(layer).try_init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_timer(UtcTime::rfc_3339())
                .with_ansi(true)
                .with_writer(std::io::stderr);

            let _ = registry.with(layer).try_init();
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::connection::Connection;
    use crate::config::settings::SettingsConfig;

    fn driver_config(logging: Option<LoggingConfig>) -> DriverConfig {
        DriverConfig {
            connection: Connection::new("http://engine"),
            settings: SettingsConfig { logging, ..Default::default() },
        }
    }

    #[test]
    fn cli_level_overrides_file_level_but_keeps_format() {
        let cfg = driver_config(Some(LoggingConfig::new("warn".into(), LogFormat::Json)));
        let resolved = resolve(&cfg, Some(LogLevel::DEBUG));
        assert_eq!(resolved.level, "debug");
        assert_eq!(resolved.format, LogFormat::Json);
    }

    #[test]
    fn falls_back_to_info_compact() {
        let resolved = resolve(&driver_config(None), None);
        assert_eq!(resolved.level, "info");
        assert_eq!(resolved.format, LogFormat::Compact);
    }
}
