use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use axum::Router;
use axum_server::{Handle, tls_rustls::RustlsConfig};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::routers::main_router::build_router;

use super::config::{ServerConfig, TransportSecurity};
use super::state::ServerState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    Stopped,
    Listening,
}

/// A configured endpoint that is not bound yet.
pub struct VotingEndpoint {
    config: ServerConfig,
    state: Arc<ServerState>,
}

impl VotingEndpoint {
    pub fn new(config: ServerConfig, state: Arc<ServerState>) -> Self {
        VotingEndpoint { config, state }
    }

    pub fn state(&self) -> EndpointState {
        EndpointState::Stopped
    }

    /// Binds the configured address and starts serving. Port 0 picks an ephemeral port; the
    /// real one is on the returned handle.
    pub async fn start(self) -> anyhow::Result<RunningEndpoint> {
        let app = build_router(self.state.clone())?;
        self.serve(app).await
    }

    async fn serve(self, app: Router) -> anyhow::Result<RunningEndpoint> {
        let addr = tokio::net::lookup_host((self.config.host.as_str(), self.config.port))
            .await?
            .next()
            .ok_or_else(|| {
                anyhow!(
                    "{}:{} did not resolve to any address",
                    self.config.host,
                    self.config.port
                )
            })?;

        let handle: Handle<SocketAddr> = Handle::new();
        let app = app.into_make_service_with_connect_info::<SocketAddr>();

        let mut server_task: JoinHandle<std::io::Result<()>> = match &self.config.security {
            TransportSecurity::Plaintext => {
                let server = axum_server::bind(addr).handle(handle.clone());
                tokio::spawn(async move { server.serve(app).await })
            }
            TransportSecurity::Tls {
                cert_path,
                key_path,
            } => {
                // rustls will not choose between several compiled-in providers by itself
                let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
                let tls_config = RustlsConfig::from_pem_file(cert_path, key_path).await?;
                let server = axum_server::bind_rustls(addr, tls_config).handle(handle.clone());
                tokio::spawn(async move { server.serve(app).await })
            }
        };

        // a bind failure can be reported before anyone waits on `listening`, so watch the task too
        let listening = tokio::select! {
            local_addr = handle.listening() => local_addr,
            result = &mut server_task => {
                return Err(anyhow!("could not bind {addr}: {}", exit_reason(result?)));
            }
        };

        let local_addr = match listening {
            Some(local_addr) => local_addr,
            None => {
                return Err(anyhow!("could not bind {addr}: {}", exit_reason(server_task.await?)));
            }
        };

        info!(
            local_addr = %local_addr,
            tls = matches!(self.config.security, TransportSecurity::Tls { .. }),
            "Voting endpoint listening"
        );

        Ok(RunningEndpoint {
            local_addr,
            handle,
            server_task,
            shutdown_grace: self.config.shutdown_grace,
        })
    }
}

fn exit_reason(result: std::io::Result<()>) -> String {
    match result {
        Err(e) => e.to_string(),
        Ok(()) => "server exited before listening".to_string(),
    }
}

/// A bound, serving endpoint. Dropping it without `shutdown` leaves the server task running.
pub struct RunningEndpoint {
    local_addr: SocketAddr,
    handle: Handle<SocketAddr>,
    server_task: JoinHandle<std::io::Result<()>>,
    shutdown_grace: Duration,
}

impl RunningEndpoint {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> EndpointState {
        if self.server_task.is_finished() {
            EndpointState::Stopped
        } else {
            EndpointState::Listening
        }
    }

    /// Stops accepting connections and waits for in-flight calls, cutting off whatever is
    /// still running once the grace period elapses.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        info!(
            local_addr = %self.local_addr,
            in_flight_connections = self.handle.connection_count(),
            grace = ?self.shutdown_grace,
            "Voting endpoint shutting down"
        );
        self.handle.graceful_shutdown(Some(self.shutdown_grace));
        self.server_task.await??;
        info!(local_addr = %self.local_addr, "Voting endpoint stopped");
        Ok(())
    }

    /// Serves until `signal` resolves, then shuts down.
    pub async fn run_until<F>(mut self, signal: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()>,
    {
        let exited = tokio::select! {
            result = &mut self.server_task => Some(result),
            _ = signal => None,
        };

        match exited {
            Some(result) => {
                warn!(local_addr = %self.local_addr, "Voting endpoint stopped on its own");
                result??;
                Ok(())
            }
            None => self.shutdown().await,
        }
    }
}
