use std::time::Duration;

use tonic::Status;
use tonic::transport::{Certificate, Channel, ClientTlsConfig, Endpoint};
use tracing::debug;

use crate::domain::vote::VoteDirection;
use crate::init::config::{ChannelSecurity, ClientConfig};
use crate::proto::voting::voting_client::VotingClient;
use crate::proto::voting::voting_request::Vote;
use crate::proto::voting::{VotingRequest, VotingResponse};

/// Thin caller over the generated stub. Every failure comes back as a `tonic::Status`.
#[derive(Debug, Clone)]
pub struct VoteClient {
    inner: VotingClient<Channel>,
    deadline: Option<Duration>,
}

impl VoteClient {
    /// Dials the endpoint now; a refused or timed-out connection is `Unavailable`.
    pub async fn connect(config: &ClientConfig) -> Result<Self, Status> {
        let endpoint = build_endpoint(config)?;
        let channel = endpoint.connect().await.map_err(|e| {
            Status::unavailable(format!(
                "could not connect to {}: {}",
                config.address,
                error_chain(&e)
            ))
        })?;
        debug!(address = %config.address, "Channel connected");
        Ok(VoteClient {
            inner: VotingClient::new(channel),
            deadline: config.deadline,
        })
    }

    /// Builds the channel without dialing; the first call connects.
    pub fn connect_lazy(config: &ClientConfig) -> Result<Self, Status> {
        let channel = build_endpoint(config)?.connect_lazy();
        Ok(VoteClient {
            inner: VotingClient::new(channel),
            deadline: config.deadline,
        })
    }

    pub async fn vote(
        &mut self,
        url: impl Into<String>,
        direction: VoteDirection,
    ) -> Result<VotingResponse, Status> {
        self.send(VotingRequest {
            url: url.into(),
            vote: Vote::from(direction) as i32,
        })
        .await
    }

    /// Sends a request as-is, without client-side validation.
    pub async fn send(&mut self, request: VotingRequest) -> Result<VotingResponse, Status> {
        let call = self.inner.vote(request);
        let response = match self.deadline {
            Some(deadline) => match tokio::time::timeout(deadline, call).await {
                Ok(response) => response,
                Err(_) => {
                    return Err(Status::deadline_exceeded(format!(
                        "no response within {deadline:?}"
                    )));
                }
            },
            None => call.await,
        };
        response.map(tonic::Response::into_inner)
    }
}

// tonic's transport error only says "transport error"; the cause is further down
fn error_chain(e: &(dyn std::error::Error + 'static)) -> String {
    let mut detail = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}

fn build_endpoint(config: &ClientConfig) -> Result<Endpoint, Status> {
    let tls = matches!(config.security, ChannelSecurity::Tls { .. });
    let uri = if config.address.contains("://") {
        config.address.clone()
    } else if tls {
        format!("https://{}", config.address)
    } else {
        format!("http://{}", config.address)
    };

    let endpoint = Endpoint::from_shared(uri)
        .map_err(|e| Status::invalid_argument(format!("bad address {}: {e}", config.address)))?
        .connect_timeout(config.connect_timeout);

    match &config.security {
        ChannelSecurity::Plaintext => Ok(endpoint),
        ChannelSecurity::Tls {
            ca_cert_path,
            domain,
        } => {
            let mut tls_config = ClientTlsConfig::new();
            tls_config = match ca_cert_path {
                Some(path) => {
                    let pem = std::fs::read(path).map_err(|e| {
                        Status::invalid_argument(format!(
                            "could not read CA bundle {}: {e}",
                            path.display()
                        ))
                    })?;
                    tls_config.ca_certificate(Certificate::from_pem(pem))
                }
                None => tls_config.with_webpki_roots(),
            };
            if let Some(domain) = domain {
                tls_config = tls_config.domain_name(domain.clone());
            }
            endpoint
                .tls_config(tls_config)
                .map_err(|e| Status::invalid_argument(format!("bad TLS configuration: {e}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plaintext_address_gets_http_scheme() {
        let endpoint = build_endpoint(&ClientConfig::plaintext("localhost:18089")).unwrap();
        assert_eq!(endpoint.uri().scheme_str(), Some("http"));
        assert_eq!(endpoint.uri().port_u16(), Some(18089));
    }

    #[test]
    fn explicit_scheme_is_kept() {
        let endpoint = build_endpoint(&ClientConfig::plaintext("http://127.0.0.1:9")).unwrap();
        assert_eq!(endpoint.uri().host(), Some("127.0.0.1"));
    }

    #[derive(Debug)]
    struct Opaque(std::io::Error);

    impl std::fmt::Display for Opaque {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("transport error")
        }
    }

    impl std::error::Error for Opaque {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            Some(&self.0)
        }
    }

    #[test]
    fn error_chain_walks_sources() {
        let e = Opaque(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "connection refused",
        ));
        assert_eq!(error_chain(&e), "transport error: connection refused");
    }

    #[test]
    fn garbage_address_is_invalid_argument() {
        let err = build_endpoint(&ClientConfig::plaintext("not a uri")).unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }

    #[test]
    fn missing_ca_bundle_is_invalid_argument() {
        let mut config = ClientConfig::plaintext("votes.example.com:443");
        config.security = ChannelSecurity::Tls {
            ca_cert_path: Some("/nonexistent/ca.pem".into()),
            domain: None,
        };
        let err = build_endpoint(&config).unwrap_err();
        assert_eq!(err.code(), tonic::Code::InvalidArgument);
    }
}
