#[tokio::main]
async fn main() -> anyhow::Result<()> {
    attune_cli::run().await?;
    Ok(())
}
