use parking_reminder::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting parking reminder service");

    // Load configuration
    let config = startup::load_config()?;

    // Serve until shut down
    startup::start_server(config).await
}
