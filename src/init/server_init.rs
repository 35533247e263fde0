use std::sync::Arc;

use tracing::{error, info, warn};

use super::config::{LogConfig, ServerConfig};
use super::endpoint::VotingEndpoint;
use super::logger::init_tracing;
use super::state::ServerState;

pub async fn server_init_proc(start: tokio::time::Instant) -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();

    let log_config = LogConfig::from_env()?;
    let _guard = init_tracing(&log_config)?;

    match dotenv {
        Ok(path) => info!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => info!("No .env file found; using process environment"),
        Err(e) => warn!(error = %e, "Could not read .env file"),
    }

    let config = ServerConfig::from_env()?;

    let state = Arc::new(
        ServerState::builder()
            .app_name_version(format!(
                "{} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .server_start_time(start)
            .deployment_environment(config.deployment_environment)
            .build()?,
    );

    info!(
        host = %config.host,
        port = config.port,
        env = %config.deployment_environment,
        "Voting endpoint starting..."
    );

    let running = VotingEndpoint::new(config, state).start().await?;

    info!(
        local_addr = %running.local_addr(),
        startup = ?start.elapsed(),
        "Voting endpoint ready"
    );

    running
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Could not listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        })
        .await
}
