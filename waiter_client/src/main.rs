#[tokio::main]
async fn main() -> std::io::Result<()> {
    waiter_client::run_with_config().await
}
