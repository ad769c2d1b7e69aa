use crate::batch::{BatchRunner, BatchStats};
use crate::config::{ApplicationSettings, DigestSettings, Settings};
use crate::digest::{DigestComposer, HtmlFileDump};
use crate::domain::Subscriber;
use crate::email_client::{ConnectError, SmtpEmailClient};
use crate::news_client::NewsClient;
use crate::subscribers::{load_subscribers, SubscriberSourceError};
use crate::subscription::SubscriptionProcessor;

#[derive(thiserror::Error, Debug)]
pub enum StartupError {
    #[error("Failed to load the subscribers.")]
    Subscribers(#[from] SubscriberSourceError),
    #[error("Failed to build the news API client.")]
    NewsClient(#[source] reqwest::Error),
    #[error("Failed to open the mail connection.")]
    Mail(#[from] ConnectError),
}

/// Everything one batch run needs, with the mail session already open.
pub struct Application {
    subscribers: Vec<Subscriber>,
    news_client: NewsClient,
    composer: DigestComposer,
    digest: DigestSettings,
    email_client: SmtpEmailClient,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, StartupError> {
        let subscribers = load_subscribers(&config.subscribers.path)?;
        let news_client =
            NewsClient::from_settings(&config.news_api).map_err(StartupError::NewsClient)?;
        let composer = build_composer(&config.application);
        // The email settings, password included, are consumed here
        let email_client = SmtpEmailClient::connect(config.email_client).await?;

        Ok(Self {
            subscribers,
            news_client,
            composer,
            digest: config.digest,
            email_client,
        })
    }

    pub fn subscriptions_found(&self) -> usize {
        self.subscribers.len()
    }

    pub async fn run_until_complete(mut self) -> BatchStats {
        let processor = SubscriptionProcessor::new(&self.news_client, &self.composer, &self.digest);

        BatchRunner::new(processor)
            .run(&self.subscribers, &mut self.email_client)
            .await
    }
}

/// Debug runs also write every rendered digest to `digest_dump_path`.
pub fn build_composer(settings: &ApplicationSettings) -> DigestComposer {
    if settings.debug {
        let dump = HtmlFileDump::new(settings.digest_dump_path.clone());
        DigestComposer::with_dump(Box::new(dump))
    } else {
        DigestComposer::new()
    }
}
