use mimalloc::MiMalloc;
use voting_endpoint::init::server_init::server_init_proc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

// main function
#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let start = tokio::time::Instant::now();

    server_init_proc(start).await?;

    Ok(())
}
