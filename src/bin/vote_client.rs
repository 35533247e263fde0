use mimalloc::MiMalloc;
use voting_endpoint::client::voting_client::VoteClient;
use voting_endpoint::init::config::{ClientConfig, LogConfig};
use voting_endpoint::init::logger::init_tracing;
use voting_endpoint::proto::voting::{VotingRequest, voting_request::Vote};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const USAGE: &str = "usage: vote_client [URL] [UP|DOWN]";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let _guard = init_tracing(&LogConfig::from_env()?)?;

    let mut args = std::env::args().skip(1);
    let url = args.next().unwrap_or_else(|| "UrlValue".to_string());
    let vote = match args.next() {
        Some(name) => Vote::from_str_name(&name.to_uppercase())
            .ok_or_else(|| anyhow::anyhow!("unknown vote {name}; {USAGE}"))?,
        None => Vote::Up,
    };

    let config = ClientConfig::from_env()?;
    let mut client = VoteClient::connect(&config).await?;

    let response = client
        .send(VotingRequest {
            url,
            vote: vote as i32,
        })
        .await?;

    println!("Greeter client received: {}", response.confirmation);

    Ok(())
}
