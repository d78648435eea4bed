#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mint_dapp::run().await
}
