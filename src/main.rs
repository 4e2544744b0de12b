use anyhow::Context;
use clap::Parser;
use log::info;
use std::path::{Path, PathBuf};

use eduflex_client::client::{SchedulingServiceClient, ServiceOutcome};
use eduflex_client::config::{Cli, Command, ServiceConfig};
use eduflex_client::presenter;
use eduflex_client::server::{self, AppState};
use eduflex_client::session::{self, FormState, SavedForm, SubmitGate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(cli.log_level.as_str()),
    )
    .init();

    match cli.command {
        Command::Serve { bind, service } => {
            let config = ServiceConfig::from(service);
            info!("Forwarding submissions to {}", config.url);
            let client = SchedulingServiceClient::new(&config)?;
            server::run_server(bind, AppState::new(client)).await?;
        }
        Command::Submit { form, output, service } => {
            let config = ServiceConfig::from(service);
            submit_once(&form, output, &config).await?;
        }
    }
    Ok(())
}

async fn submit_once(
    form_path: &Path,
    output: Option<PathBuf>,
    config: &ServiceConfig,
) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(form_path)
        .await
        .with_context(|| format!("reading form {}", form_path.display()))?;
    let saved: SavedForm = serde_json::from_str(&raw)
        .with_context(|| format!("parsing form {}", form_path.display()))?;
    let form = FormState::from(saved);

    let client = SchedulingServiceClient::new(config)?;
    let (payload, outcome) = session::submit(&SubmitGate::new(), &form, &client).await?;

    let (path, bytes) = match outcome {
        ServiceOutcome::Document { bytes, .. } => {
            let path = output.unwrap_or_else(|| PathBuf::from(server::DOCUMENT_FILE_NAME));
            (path, bytes)
        }
        ServiceOutcome::Schedule(result) => {
            for assignment in &result.assignments {
                info!("{}", assignment);
            }
            let html =
                presenter::render_schedule(payload.time_window(), &result, &payload.class_loads);
            (output.unwrap_or_else(|| PathBuf::from("planning.html")), html.into_bytes())
        }
    };

    tokio::fs::write(&path, &bytes)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(())
}
