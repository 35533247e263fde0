use std::sync::atomic::AtomicU64;

use super::deployment_environment::DeploymentEnvironment;
use super::server_state::ServerState;

#[derive(Default)]
pub struct ServerStateBuilder {
    app_name_version: Option<String>,
    server_start_time: Option<tokio::time::Instant>,
    deployment_environment: Option<DeploymentEnvironment>,
}

impl ServerStateBuilder {
    pub fn app_name_version(mut self, app_name_version: String) -> Self {
        self.app_name_version = Some(app_name_version);
        self
    }

    pub fn server_start_time(mut self, server_start_time: tokio::time::Instant) -> Self {
        self.server_start_time = Some(server_start_time);
        self
    }

    pub fn deployment_environment(mut self, deployment_environment: DeploymentEnvironment) -> Self {
        self.deployment_environment = Some(deployment_environment);
        self
    }

    pub fn build(self) -> anyhow::Result<ServerState> {
        Ok(ServerState {
            app_name_version: self
                .app_name_version
                .ok_or_else(|| anyhow::anyhow!("app_name_version is required"))?,
            server_start_time: self
                .server_start_time
                .ok_or_else(|| anyhow::anyhow!("server_start_time is required"))?,
            responses_handled: AtomicU64::new(0u64),
            deployment_environment: self
                .deployment_environment
                .unwrap_or(DeploymentEnvironment::Local),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_requires_name_and_start_time() {
        assert!(ServerStateBuilder::default().build().is_err());
        assert!(
            ServerStateBuilder::default()
                .app_name_version("voting-endpoint 0.1.0".to_string())
                .build()
                .is_err()
        );

        let state = ServerStateBuilder::default()
            .app_name_version("voting-endpoint 0.1.0".to_string())
            .server_start_time(tokio::time::Instant::now())
            .build()
            .unwrap();
        assert_eq!(state.get_deployment_environment(), DeploymentEnvironment::Local);
        assert_eq!(state.get_responses_handled(), 0);
        state.add_responses_handled();
        assert_eq!(state.get_responses_handled(), 1);
    }
}
