#[tokio::main]
async fn main() -> std::io::Result<()> {
    playback_server::run_with_config().await
}
