use serde::Deserialize;

/// A single search hit as returned by the news API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Article {
    pub title: String,
    // The API sends `null` for articles without a summary.
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
    #[serde(default)]
    pub source: Option<ArticleSource>,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArticleSource {
    #[serde(default)]
    pub name: Option<String>,
}

/// Articles retrieved for one topic, in the order the API ranked them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicResult {
    pub topic: String,
    pub articles: Vec<Article>,
    /// Total hits reported by the API, which is usually larger than `articles.len()`.
    pub total_results: u64,
}

impl TopicResult {
    /// Placeholder used when the fetch for a topic failed.
    pub fn empty(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            articles: Vec::new(),
            total_results: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }
}
