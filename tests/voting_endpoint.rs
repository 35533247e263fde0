use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tonic::Code;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;

use voting_endpoint::client::voting_client::VoteClient;
use voting_endpoint::domain::vote::VoteDirection;
use voting_endpoint::init::config::{
    ChannelSecurity, ClientConfig, ServerConfig, TransportSecurity,
};
use voting_endpoint::init::endpoint::{EndpointState, RunningEndpoint, VotingEndpoint};
use voting_endpoint::init::state::ServerState;
use voting_endpoint::proto::voting::{VotingRequest, VotingResponse};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

async fn start_endpoint() -> RunningEndpoint {
    start_endpoint_with(TransportSecurity::Plaintext).await
}

async fn start_endpoint_with(security: TransportSecurity) -> RunningEndpoint {
    let state = ServerState::builder()
        .app_name_version("voting-endpoint integration".to_string())
        .server_start_time(tokio::time::Instant::now())
        .build()
        .unwrap();
    let mut config = ServerConfig::plaintext("127.0.0.1", 0);
    config.shutdown_grace = Duration::from_millis(500);
    config.security = security;

    let endpoint = VotingEndpoint::new(config, Arc::new(state));
    assert_eq!(endpoint.state(), EndpointState::Stopped);
    endpoint.start().await.unwrap()
}

async fn client_for(addr: SocketAddr) -> VoteClient {
    VoteClient::connect(&ClientConfig::plaintext(addr.to_string()))
        .await
        .unwrap()
}

async fn raw_unary(addr: SocketAddr, path: &'static str) -> Result<VotingResponse, tonic::Status> {
    let channel = Channel::from_shared(format!("http://{addr}"))
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut grpc = tonic::client::Grpc::new(channel);
    grpc.ready().await.unwrap();
    grpc.unary(
        tonic::Request::new(VotingRequest {
            url: "UrlValue".to_string(),
            vote: 0,
        }),
        PathAndQuery::from_static(path),
        tonic::codec::ProstCodec::<VotingRequest, VotingResponse>::default(),
    )
    .await
    .map(tonic::Response::into_inner)
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn upvote_is_confirmed_end_to_end() {
    let endpoint = start_endpoint().await;
    assert_eq!(endpoint.state(), EndpointState::Listening);

    let mut client = client_for(endpoint.local_addr()).await;
    let response = client.vote("UrlValue", VoteDirection::Up).await.unwrap();
    assert_eq!(
        response.confirmation,
        "Happy to confirm that you upvoted for UrlValue"
    );

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn same_request_gets_same_confirmation() {
    let endpoint = start_endpoint().await;
    let mut client = client_for(endpoint.local_addr()).await;

    let first = client.vote("https://example.com/post/1", VoteDirection::Down).await.unwrap();
    let second = client.vote("https://example.com/post/1", VoteDirection::Down).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.confirmation,
        "Confirmation that you downvoted for https://example.com/post/1"
    );

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn empty_url_is_invalid_argument() {
    let endpoint = start_endpoint().await;
    let mut client = client_for(endpoint.local_addr()).await;

    let status = client
        .send(VotingRequest {
            url: String::new(),
            vote: 1,
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    let status = client
        .send(VotingRequest {
            url: String::new(),
            vote: 7,
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unknown_vote_tag_is_invalid_argument() {
    let endpoint = start_endpoint().await;
    let mut client = client_for(endpoint.local_addr()).await;

    let status = client
        .send(VotingRequest {
            url: "UrlValue".to_string(),
            vote: 7,
        })
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::InvalidArgument);
    assert_eq!(status.metadata().get("x-error-code").unwrap(), "2");

    // the channel is still usable after a rejected call
    let response = client.vote("UrlValue", VoteDirection::Down).await.unwrap();
    assert!(response.confirmation.ends_with("UrlValue"));

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_calls_get_their_own_answers() {
    let endpoint = start_endpoint().await;
    let client = client_for(endpoint.local_addr()).await;

    let mut tasks = Vec::new();
    for i in 0..32 {
        let mut client = client.clone();
        tasks.push(tokio::spawn(async move {
            let url = format!("https://example.com/item/{i}");
            let direction = if i % 2 == 0 {
                VoteDirection::Up
            } else {
                VoteDirection::Down
            };
            let response = client.vote(url.clone(), direction).await.unwrap();
            (url, direction, response.confirmation)
        }));
    }

    for task in tasks {
        let (url, direction, confirmation) = task.await.unwrap();
        let expected = match direction {
            VoteDirection::Up => format!("Happy to confirm that you upvoted for {url}"),
            VoteDirection::Down => format!("Confirmation that you downvoted for {url}"),
        };
        assert_eq!(confirmation, expected);
    }

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn one_channel_serves_many_sequential_calls() {
    let endpoint = start_endpoint().await;
    let mut client = client_for(endpoint.local_addr()).await;

    for i in 0..10 {
        let response = client
            .vote(format!("UrlValue{i}"), VoteDirection::Up)
            .await
            .unwrap();
        assert_eq!(
            response.confirmation,
            format!("Happy to confirm that you upvoted for UrlValue{i}")
        );
    }

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unbound_method_is_unimplemented() {
    let endpoint = start_endpoint().await;

    let status = raw_unary(endpoint.local_addr(), "/voting.Voting/Tally")
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn unknown_service_is_unimplemented() {
    let endpoint = start_endpoint().await;

    let status = raw_unary(endpoint.local_addr(), "/voting.Ballots/Vote")
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unimplemented);

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn silent_server_hits_deadline() {
    // accepts connections and never answers
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let _silent = tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    let config = ClientConfig::plaintext(addr.to_string()).with_deadline(Duration::from_millis(100));
    let mut client = VoteClient::connect_lazy(&config).unwrap();

    let started = std::time::Instant::now();
    let status = client.vote("UrlValue", VoteDirection::Up).await.unwrap_err();
    assert_eq!(status.code(), Code::DeadlineExceeded);
    assert!(started.elapsed() < Duration::from_millis(150));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn closed_port_is_unavailable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let status = VoteClient::connect(&ClientConfig::plaintext(addr.to_string()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
    // the underlying cause is kept, not just "transport error"
    assert!(status.message().to_lowercase().contains("refused"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn shutdown_stops_accepting_connections() {
    let endpoint = start_endpoint().await;
    let addr = endpoint.local_addr();

    let mut client = client_for(addr).await;
    client.vote("UrlValue", VoteDirection::Up).await.unwrap();
    drop(client);

    endpoint.shutdown().await.unwrap();

    let status = VoteClient::connect(&ClientConfig::plaintext(addr.to_string()))
        .await
        .unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);
}

fn tls_server() -> TransportSecurity {
    TransportSecurity::Tls {
        cert_path: fixture("server.pem"),
        key_path: fixture("server.key"),
    }
}

fn tls_client(addr: SocketAddr, ca_cert_path: Option<PathBuf>) -> ClientConfig {
    let mut config = ClientConfig::plaintext(addr.to_string());
    config.security = ChannelSecurity::Tls {
        ca_cert_path,
        domain: Some("localhost".to_string()),
    };
    config
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tls_round_trip_with_private_ca() {
    let endpoint = start_endpoint_with(tls_server()).await;

    let config = tls_client(endpoint.local_addr(), Some(fixture("ca.pem")));
    let mut client = VoteClient::connect(&config).await.unwrap();
    let response = client.vote("UrlValue", VoteDirection::Up).await.unwrap();
    assert_eq!(
        response.confirmation,
        "Happy to confirm that you upvoted for UrlValue"
    );

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn tls_rejects_untrusted_certificate() {
    let endpoint = start_endpoint_with(tls_server()).await;

    // public roots only; the fixture CA is not among them
    let config = tls_client(endpoint.local_addr(), None);
    let status = VoteClient::connect(&config).await.unwrap_err();
    assert_eq!(status.code(), Code::Unavailable);

    endpoint.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn reflection_lists_and_describes_voting_service() {
    use tonic_reflection::pb::v1::{
        ServerReflectionRequest, server_reflection_client::ServerReflectionClient,
        server_reflection_request::MessageRequest, server_reflection_response::MessageResponse,
    };

    let endpoint = start_endpoint().await;
    let channel = Channel::from_shared(format!("http://{}", endpoint.local_addr()))
        .unwrap()
        .connect()
        .await
        .unwrap();
    let mut client = ServerReflectionClient::new(channel);

    let request = |message_request| ServerReflectionRequest {
        host: String::new(),
        message_request: Some(message_request),
    };

    let mut stream = client
        .server_reflection_info(tokio_stream::once(request(MessageRequest::ListServices(
            String::new(),
        ))))
        .await
        .unwrap()
        .into_inner();
    let reply = stream.message().await.unwrap().unwrap();
    let Some(MessageResponse::ListServicesResponse(list)) = reply.message_response else {
        panic!("unexpected reflection reply");
    };
    assert!(list.service.iter().any(|service| service.name == "voting.Voting"));

    let mut stream = client
        .server_reflection_info(tokio_stream::once(request(
            MessageRequest::FileContainingSymbol("voting.Voting".to_string()),
        )))
        .await
        .unwrap()
        .into_inner();
    let reply = stream.message().await.unwrap().unwrap();
    let Some(MessageResponse::FileDescriptorResponse(files)) = reply.message_response else {
        panic!("unexpected reflection reply");
    };
    assert_eq!(files.file_descriptor_proto.len(), 1);
    let file = &files.file_descriptor_proto[0];
    assert!(file.windows(b"VotingRequest".len()).any(|w| w == b"VotingRequest"));

    endpoint.shutdown().await.unwrap();
}
