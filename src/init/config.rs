use std::path::PathBuf;
use std::time::Duration;

use anyhow::anyhow;

use super::state::DeploymentEnvironment;

pub const DEFAULT_PORT: u16 = 18089;
pub const DEFAULT_CLIENT_ADDR: &str = "localhost:18089";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSecurity {
    Plaintext,
    Tls { cert_path: PathBuf, key_path: PathBuf },
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub security: TransportSecurity,
    pub shutdown_grace: Duration,
    pub deployment_environment: DeploymentEnvironment,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = lookup("VOTING_HOST").unwrap_or_else(|| "0.0.0.0".to_string());

        let port = match lookup("VOTING_PORT") {
            Some(port) => port
                .trim()
                .parse::<u16>()
                .map_err(|e| anyhow!("VOTING_PORT is not a valid port: {e}"))?,
            None => DEFAULT_PORT,
        };

        let security = match (lookup("VOTING_TLS_CERT"), lookup("VOTING_TLS_KEY")) {
            (Some(cert), Some(key)) => TransportSecurity::Tls {
                cert_path: PathBuf::from(cert),
                key_path: PathBuf::from(key),
            },
            (None, None) => TransportSecurity::Plaintext,
            _ => {
                return Err(anyhow!(
                    "VOTING_TLS_CERT and VOTING_TLS_KEY must be set together"
                ));
            }
        };

        let shutdown_grace = Duration::from_millis(parse_millis(
            lookup("VOTING_SHUTDOWN_GRACE_MS"),
            "VOTING_SHUTDOWN_GRACE_MS",
            5_000,
        )?);

        let deployment_environment = match lookup("CURR_ENV") {
            Some(env) => env.parse::<DeploymentEnvironment>()?,
            None => DeploymentEnvironment::Local,
        };

        Ok(ServerConfig {
            host,
            port,
            security,
            shutdown_grace,
            deployment_environment,
        })
    }

    /// Plaintext config on the given host and port, mostly for tests and embedding.
    pub fn plaintext(host: impl Into<String>, port: u16) -> Self {
        ServerConfig {
            host: host.into(),
            port,
            security: TransportSecurity::Plaintext,
            shutdown_grace: Duration::from_secs(5),
            deployment_environment: DeploymentEnvironment::Local,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelSecurity {
    Plaintext,
    Tls {
        ca_cert_path: Option<PathBuf>,
        domain: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub address: String,
    pub security: ChannelSecurity,
    pub connect_timeout: Duration,
    pub deadline: Option<Duration>,
}

impl ClientConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let address = lookup("VOTING_ADDR").unwrap_or_else(|| DEFAULT_CLIENT_ADDR.to_string());

        let tls = match lookup("VOTING_CLIENT_TLS") {
            Some(flag) => parse_bool(&flag)
                .ok_or_else(|| anyhow!("VOTING_CLIENT_TLS must be true or false, got {flag}"))?,
            None => false,
        };
        let security = if tls {
            ChannelSecurity::Tls {
                ca_cert_path: lookup("VOTING_CLIENT_CA").map(PathBuf::from),
                domain: lookup("VOTING_CLIENT_DOMAIN"),
            }
        } else {
            ChannelSecurity::Plaintext
        };

        let connect_timeout = Duration::from_millis(parse_millis(
            lookup("VOTING_CONNECT_TIMEOUT_MS"),
            "VOTING_CONNECT_TIMEOUT_MS",
            3_000,
        )?);

        let deadline = match lookup("VOTING_DEADLINE_MS") {
            Some(ms) => Some(Duration::from_millis(
                ms.trim()
                    .parse::<u64>()
                    .map_err(|e| anyhow!("VOTING_DEADLINE_MS is not a number: {e}"))?,
            )),
            None => None,
        };

        Ok(ClientConfig {
            address,
            security,
            connect_timeout,
            deadline,
        })
    }

    pub fn plaintext(address: impl Into<String>) -> Self {
        ClientConfig {
            address: address.into(),
            security: ChannelSecurity::Plaintext,
            connect_timeout: Duration::from_secs(3),
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl LogConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let is_prod = lookup("CURR_ENV")
            .and_then(|env| env.parse::<DeploymentEnvironment>().ok())
            .map(|env| env == DeploymentEnvironment::Prod)
            .unwrap_or(false);

        let format = match lookup("LOG_FORMAT").map(|f| f.trim().to_lowercase()) {
            Some(f) if f == "json" => LogFormat::Json,
            Some(f) if f == "pretty" || f == "text" => LogFormat::Pretty,
            Some(f) => return Err(anyhow!("LOG_FORMAT must be json or pretty, got {f}")),
            None if is_prod => LogFormat::Json,
            None => LogFormat::Pretty,
        };

        Ok(LogConfig {
            level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            format,
            directory: lookup("LOG_DIR").map(PathBuf::from),
            file_prefix: lookup("LOG_FILE_PREFIX").unwrap_or_else(|| "voting".to_string()),
        })
    }
}

fn parse_millis(value: Option<String>, key: &str, default: u64) -> anyhow::Result<u64> {
    match value {
        Some(ms) => ms
            .trim()
            .parse::<u64>()
            .map_err(|e| anyhow!("{key} is not a number: {e}")),
        None => Ok(default),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
