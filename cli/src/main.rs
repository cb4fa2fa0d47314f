//! Udhaar command-line client.
//!
//! Plays the part of the app's screens: every command restores the stored
//! session, talks to the live or demo backend, and prints the result.

mod commands;
mod output;
mod parse;
mod run;

use clap::Parser;
use commands::Cli;
use output::Output;
use run::App;
use std::sync::Arc;
use udhaar_client::ClientConfig;
use udhaar_lifecycle::LoanEngine;
use udhaar_session::SessionStore;
use udhaar_storage::{ClientStorage, FileStorage};
use udhaar_types::{Clock, SystemClock};
use udhaar_utils::LogFormat;

/// File settings as the base; flags and env vars override them.
fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let base = match &cli.config {
        Some(path) => {
            let config = ClientConfig::from_toml_file(&path.to_string_lossy())?;
            tracing::info!("Loaded config from {}", path.display());
            config
        }
        None => ClientConfig::default(),
    };
    Ok(ClientConfig {
        mode: cli.mode.unwrap_or(base.mode),
        api_url: cli.api_url.clone().unwrap_or(base.api_url),
        storage_path: cli.storage.clone().unwrap_or(base.storage_path),
        log_level: cli.log_level.clone().unwrap_or(base.log_level),
        log_format: cli.log_format.clone().unwrap_or(base.log_format),
        ..base
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    udhaar_utils::init_logging(LogFormat::parse_or_default(&config.log_format), &config.log_level);

    let storage: Arc<dyn ClientStorage> = Arc::new(FileStorage::new(&config.storage_path));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let backend = udhaar_client::connect(&config, storage.clone(), clock.clone())?;
    tracing::debug!(kind = %backend.kind(), api = %config.api_url, "client ready");

    let session = SessionStore::new(backend.clone(), storage, clock.clone());
    session.hydrate().await?;

    let app = App {
        session,
        backend,
        engine: LoanEngine::new(config.loan_policy.clone()),
        out: Output::new(cli.json, clock.now()),
        clock,
        poll_interval: config.poll_interval(),
    };
    app.run(cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use udhaar_client::BackendMode;

    #[test]
    fn flags_override_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("udhaar.toml");
        std::fs::write(&path, "mode = \"live\"\napi_url = \"http://file/api\"\nlog_level = \"warn\"\n")
            .unwrap();

        let cli = Cli::parse_from([
            "udhaar",
            "--config",
            path.to_str().unwrap(),
            "--mode",
            "demo",
            "whoami",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.mode, BackendMode::Demo);
        assert_eq!(config.api_url, "http://file/api");
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["udhaar", "--config", "/nonexistent/udhaar.toml", "logout"]);
        assert!(resolve_config(&cli).is_err());
    }

    #[test]
    fn parses_nested_commands() {
        let cli = Cli::parse_from([
            "udhaar", "loans", "repay", "loan-active-001", "--amount", "₹5,000", "--method",
            "bank-transfer",
        ]);
        assert!(matches!(
            cli.command,
            commands::Command::Loans {
                action: commands::LoanAction::Repay { .. }
            }
        ));
    }
}
