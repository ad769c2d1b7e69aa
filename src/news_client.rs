use chrono::NaiveDate;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::time;

use crate::config::{DigestSettings, NewsApiSettings};
use crate::domain::{Article, SortPreference, TopicResult};

const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);
const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_SEARCH_IN: &str = "description";

/// Anything able to answer "what are the top articles for this topic".
pub trait NewsSource {
    async fn fetch(&self, topic: &str, query: &NewsQuery) -> Result<TopicResult, NewsFetchError>;
}

/// Per-batch search parameters shared by every topic lookup.
#[derive(Debug, Clone)]
pub struct NewsQuery {
    pub from: NaiveDate,
    pub sort_by: SortPreference,
    pub page_size: usize,
}

impl NewsQuery {
    pub fn from_settings(settings: &DigestSettings) -> Self {
        Self {
            from: settings.get_reference_date(),
            sort_by: settings.sort_by,
            page_size: settings.max_articles_per_topic(),
        }
    }
}

pub struct NewsClient {
    http_client: Client,
    base_url: String,
    api_key: Secret<String>,
    language: String,
    search_in: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    total_results: u64,
    articles: Vec<Article>,
}

#[derive(thiserror::Error)]
#[error("Failed to fetch news for topic `{topic}`")]
pub struct NewsFetchError {
    pub topic: String,
    #[source]
    pub cause: FetchFailure,
}

#[derive(thiserror::Error, Debug)]
pub enum FetchFailure {
    #[error("Request to the news API failed.")]
    Transport(#[source] reqwest::Error),
    #[error("News API answered with status {status}: {message}")]
    Status { status: StatusCode, message: String },
    #[error("News API response could not be decoded.")]
    Body(#[source] serde_json::Error),
}

impl std::fmt::Debug for NewsFetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\nCaused by:\n\t({})", self, self.cause)
    }
}

impl NewsFetchError {
    fn new(topic: &str, cause: FetchFailure) -> Self {
        Self {
            topic: topic.to_string(),
            cause,
        }
    }
}

impl NewsClient {
    pub fn new(
        base_url: String,
        api_key: Secret<String>,
        timeout: Option<time::Duration>,
    ) -> Result<NewsClient, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(timeout.unwrap_or(REQUEST_TIMEOUT))
            .build()?;

        Ok(NewsClient {
            http_client,
            base_url,
            api_key,
            language: String::from(DEFAULT_LANGUAGE),
            search_in: String::from(DEFAULT_SEARCH_IN),
        })
    }

    pub fn from_settings(settings: &NewsApiSettings) -> Result<NewsClient, reqwest::Error> {
        let client = NewsClient::new(
            settings.base_url.clone(),
            settings.api_key.clone(),
            Some(settings.get_timeout()),
        )?;

        Ok(client.with_search(settings.language.clone(), settings.search_in.clone()))
    }

    pub fn with_search(mut self, language: String, search_in: String) -> Self {
        self.language = language;
        self.search_in = search_in;
        self
    }
}

impl NewsSource for NewsClient {
    #[tracing::instrument(
        name = "Fetching news for a topic",
        skip(self, topic, query),
        fields(topic = %topic, sort_by = query.sort_by.as_str())
    )]
    async fn fetch(&self, topic: &str, query: &NewsQuery) -> Result<TopicResult, NewsFetchError> {
        let url = format!("{}/everything", self.base_url);
        let from = query.from.format("%Y-%m-%d").to_string();
        let page_size = query.page_size.to_string();

        // The API key travels as a query parameter, so request errors are stripped of their URL
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("q", topic),
                ("from", from.as_str()),
                ("language", self.language.as_str()),
                ("searchIn", self.search_in.as_str()),
                ("sortBy", query.sort_by.as_str()),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.expose_secret().as_str()),
            ])
            .send()
            .await
            .map_err(|err| NewsFetchError::new(topic, FetchFailure::Transport(err.without_url())))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| NewsFetchError::new(topic, FetchFailure::Transport(err.without_url())))?;

        if !status.is_success() {
            return Err(NewsFetchError::new(
                topic,
                FetchFailure::Status {
                    status,
                    message: body,
                },
            ));
        }

        let search: SearchResponse = serde_json::from_str(&body)
            .map_err(|err| NewsFetchError::new(topic, FetchFailure::Body(err)))?;
        let mut articles = search.articles;
        articles.truncate(query.page_size);

        tracing::debug!(
            status = status.as_u16(),
            total_results = search.total_results,
            retrieved = articles.len(),
            "News API request completed"
        );

        Ok(TopicResult {
            topic: topic.to_string(),
            articles,
            total_results: search.total_results,
        })
    }
}
