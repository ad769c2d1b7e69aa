use anyhow::Context;

use news_digest::config::get_configuration;
use news_digest::startup::Application;
use news_digest::telemetry::{get_subscriber, init_subscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = get_subscriber(
        String::from("news_digest"),
        String::from("info"),
        std::io::stdout,
    );

    init_subscriber(subscriber);

    let config = get_configuration().context("Failed to load the configuration.")?;
    let application = Application::build(config)
        .await
        .context("Failed to start the news digest.")?;

    tracing::info!(
        subscriptions_found = application.subscriptions_found(),
        ">>>>>>>> Starting news digest batch"
    );

    let stats = application.run_until_complete().await;

    tracing::info!(?stats, "<<<<<<<< Exiting after processing complete");

    Ok(())
}
