use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ovirt_flexdriver::config::proc_loader::file_to_config;
use ovirt_flexdriver::observability::metrics::get_metrics;
use ovirt_flexdriver::utils::logging::{self, LogLevel};
use ovirt_flexdriver::{AttachRequest, Session, Status};
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, env = "CONFIG", default_value = "ovirt-flexdriver.yaml")]
    config: String,
    #[arg(long, env = "LOG_LEVEL", value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Authenticate against the engine and report the outcome
    Auth,
    /// Attach a disk to a host and print the result as JSON
    Attach {
        #[arg(long)]
        volume: String,
        #[arg(long)]
        device: String,
        #[arg(long, default_value = "ext4")]
        fs_type: String,
        #[arg(long, default_value = "rw")]
        mode: String,
        #[arg(long, default_value = "")]
        extra: String,
        #[arg(long)]
        host: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // -------------------------------
    // 1. Load YAML config, start logging
    // -------------------------------

    let args = Args::parse();
    let driver_config = file_to_config(Path::new(&args.config))
        .await
        .with_context(|| format!("failed to load config '{}'", args.config))?;
    logging::run(&driver_config, args.log_level);

    // -------------------------------
    // 2. Build session (transport + empty token)
    // -------------------------------

    let session = Session::from_config(&driver_config).await?;
    info!(url = %session.connection().url, "session ready");

    // -------------------------------
    // 3. Run command
    // -------------------------------

    let outcome = match args.command {
        Command::Auth => session
            .authenticate()
            .await
            .map(|_| json!({ "status": Status::Success })),
        Command::Attach { volume, device, fs_type, mode, extra, host } => {
            let request = AttachRequest::new(volume, device, fs_type, mode).with_extra(extra);
            session
                .attach(&request, &host)
                .await
                .map(|response| json!(response))
        }
    };

    // -------------------------------
    // 4. Flush metrics, even on failure
    // -------------------------------

    if let Some(textfile) = &driver_config.settings.metrics.textfile {
        if let Err(e) = get_metrics().write_textfile(textfile).await {
            warn!(error = %e, "metrics textfile not written");
        }
    }

    let value = outcome?;
    println!("{}", serde_json::to_string(&value)?);
    Ok(())
}
