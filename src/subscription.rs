use crate::config::DigestSettings;
use crate::digest::DigestComposer;
use crate::domain::{Subscriber, TopicResult};
use crate::email_client::MailTransport;
use crate::news_client::{NewsQuery, NewsSource};

pub const NEWS_EMAIL_SUBJECT: &str = "Your daily NewsFeed";

/// Outcome of processing one subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberResult {
    pub email_sent: bool,
    pub error_message: Option<String>,
    /// Topics the subscriber asked for, before the topic cap.
    pub topics_requested: usize,
    /// Topics actually looked up, after the topic cap.
    pub topics_retrieved: usize,
    pub articles_retrieved: usize,
}

/// Turns one subscriber into one digest email.
pub struct SubscriptionProcessor<'a, N> {
    news_source: &'a N,
    composer: &'a DigestComposer,
    max_topics_per_subscription: usize,
    query: NewsQuery,
}

impl<'a, N: NewsSource> SubscriptionProcessor<'a, N> {
    pub fn new(news_source: &'a N, composer: &'a DigestComposer, settings: &DigestSettings) -> Self {
        Self {
            news_source,
            composer,
            max_topics_per_subscription: settings.max_topics_per_subscription(),
            query: NewsQuery::from_settings(settings),
        }
    }

    #[tracing::instrument(
        name = "Processing a subscription",
        skip(self, subscriber, mailer),
        fields(subscriber_email = %subscriber.email)
    )]
    pub async fn process<M: MailTransport>(
        &self,
        subscriber: &Subscriber,
        mailer: &mut M,
    ) -> SubscriberResult {
        let selection = subscriber.topics.select(self.max_topics_per_subscription);
        let mut topic_results = Vec::with_capacity(selection.kept.len());

        for topic in &selection.kept {
            let result = match self.news_source.fetch(topic, &self.query).await {
                Ok(result) => result,
                Err(err) => {
                    tracing::warn!(error = ?err, "Skipping topic after a failed fetch");
                    TopicResult::empty(topic)
                }
            };
            topic_results.push(result);
        }

        let articles_retrieved: usize = topic_results.iter().map(TopicResult::len).sum();
        let html_body = self.composer.compose(subscriber, &selection, &topic_results);

        let send_result = mailer
            .send_html(
                std::slice::from_ref(&subscriber.email),
                NEWS_EMAIL_SUBJECT,
                &html_body,
            )
            .await;
        let error_message = match send_result {
            Ok(()) => None,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to send the digest");
                Some(error_chain(&err))
            }
        };

        tracing::info!(
            topics_retrieved = topic_results.len(),
            topics_requested = selection.requested(),
            articles_retrieved,
            "Done with subscription"
        );

        SubscriberResult {
            email_sent: error_message.is_none(),
            error_message,
            topics_requested: selection.requested(),
            topics_retrieved: topic_results.len(),
            articles_retrieved,
        }
    }
}

/// Renders an error followed by each of its causes.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
