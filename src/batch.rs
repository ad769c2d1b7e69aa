use std::ops::AddAssign;

use uuid::Uuid;

use crate::domain::Subscriber;
use crate::email_client::MailTransport;
use crate::news_client::NewsSource;
use crate::subscription::{SubscriberResult, SubscriptionProcessor};

/// Totals over every subscriber of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub subscriptions_found: usize,
    pub subscriptions_processed_ok: usize,
    pub topics_requested: usize,
    pub topics_retrieved: usize,
    pub articles_retrieved: usize,
}

impl AddAssign<&SubscriberResult> for BatchStats {
    fn add_assign(&mut self, result: &SubscriberResult) {
        if result.email_sent {
            self.subscriptions_processed_ok += 1;
        }
        self.topics_requested += result.topics_requested;
        self.topics_retrieved += result.topics_retrieved;
        self.articles_retrieved += result.articles_retrieved;
    }
}

pub struct BatchRunner<'a, N> {
    processor: SubscriptionProcessor<'a, N>,
}

impl<'a, N: NewsSource> BatchRunner<'a, N> {
    pub fn new(processor: SubscriptionProcessor<'a, N>) -> Self {
        Self { processor }
    }

    /// Processes every subscriber in order, then closes the mail session.
    #[tracing::instrument(
        name = "Running the news digest batch",
        skip(self, subscribers, mailer),
        fields(run_id = %Uuid::new_v4(), subscriptions_found = subscribers.len())
    )]
    pub async fn run<M: MailTransport>(self, subscribers: &[Subscriber], mailer: &mut M) -> BatchStats {
        let mut stats = BatchStats {
            subscriptions_found: subscribers.len(),
            ..BatchStats::default()
        };

        for subscriber in subscribers {
            let result = self.processor.process(subscriber, mailer).await;
            stats += &result;
        }

        mailer.close().await;

        tracing::info!(
            subscriptions_found = stats.subscriptions_found,
            subscriptions_processed_ok = stats.subscriptions_processed_ok,
            topics_requested = stats.topics_requested,
            topics_retrieved = stats.topics_retrieved,
            articles_retrieved = stats.articles_retrieved,
            "Batch complete"
        );

        stats
    }
}
