use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::time;

use chrono::{Duration, NaiveDate, Utc};
use config::{Config, ConfigError, File};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;

use crate::domain::{SortPreference, SubscriberEmail};

const DEFAULT_DUMP_PATH: &str = "output_files/test_news.html";

/// Keys each section understands. Anything else is ignored with a warning.
const KNOWN_KEYS: &[(&str, &[&str])] = &[
    ("application", &["debug", "digest_dump_path"]),
    (
        "email_client",
        &[
            "smtp_host",
            "smtp_port",
            "sender_email",
            "password",
            "timeout_milliseconds",
        ],
    ),
    (
        "news_api",
        &[
            "base_url",
            "api_key",
            "language",
            "search_in",
            "timeout_milliseconds",
        ],
    ),
    (
        "digest",
        &[
            "max_articles_per_topic",
            "max_topics_per_subscription",
            "sort_by",
            "reference_date",
        ],
    ),
    ("subscribers", &["path"]),
    // Picked up from APP_ENVIRONMENT by the environment source.
    ("environment", &[]),
];

#[derive(Debug)]
pub enum Environment {
    Development,
    Production,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub email_client: EmailClientSettings,
    pub news_api: NewsApiSettings,
    pub digest: DigestSettings,
    pub subscribers: SubscriberSourceSettings,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct ApplicationSettings {
    #[serde(default)]
    pub debug: bool,
    #[serde(default = "default_dump_path")]
    pub digest_dump_path: PathBuf,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct EmailClientSettings {
    pub smtp_host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub smtp_port: u16,
    pub sender_email: String,
    // secrecy protects secret information and prevents them to be exposed (eg: via logs)
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct NewsApiSettings {
    pub base_url: String,
    pub api_key: Secret<String>,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_search_in")]
    pub search_in: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_milliseconds: u64,
}

/// Limits and ordering applied while building each digest.
#[derive(serde::Deserialize, Clone, Debug)]
pub struct DigestSettings {
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_articles_per_topic: NonZeroUsize,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub max_topics_per_subscription: NonZeroUsize,
    #[serde(default)]
    pub sort_by: SortPreference,
    // The free news API tier only serves articles at least one day old.
    #[serde(default)]
    pub reference_date: Option<NaiveDate>,
}

#[derive(serde::Deserialize, Clone, Debug)]
pub struct SubscriberSourceSettings {
    pub path: PathBuf,
}

fn default_dump_path() -> PathBuf {
    PathBuf::from(DEFAULT_DUMP_PATH)
}

fn default_language() -> String {
    String::from("en")
}

fn default_search_in() -> String {
    String::from("description")
}

impl Settings {
    pub fn is_debug(&self) -> bool {
        self.application.debug
    }
}

impl EmailClientSettings {
    pub fn get_sender_email(&self) -> Result<SubscriberEmail, String> {
        SubscriberEmail::parse(self.sender_email.clone())
    }

    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl NewsApiSettings {
    pub fn get_timeout(&self) -> time::Duration {
        time::Duration::from_millis(self.timeout_milliseconds)
    }
}

impl DigestSettings {
    pub fn max_articles_per_topic(&self) -> usize {
        self.max_articles_per_topic.get()
    }

    pub fn max_topics_per_subscription(&self) -> usize {
        self.max_topics_per_subscription.get()
    }

    /// Articles are requested from this date onwards. Defaults to yesterday.
    pub fn get_reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| Utc::now().date_naive() - Duration::days(1))
    }
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            unknown_env => Err(format!(
                "{} is not supported environment. Use either 'development' or 'production'.",
                unknown_env
            )),
        }
    }
}

pub fn get_configuration() -> Result<Settings, ConfigError> {
    let root_path = std::env::current_dir().map_err(|err| {
        ConfigError::Message(format!("Failed to determine the current directory: {}", err))
    })?;
    // Uses development environment by default
    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "development".into())
        .try_into()
        .map_err(ConfigError::Message)?;

    get_configuration_from(root_path.join("config"), environment)
}

pub fn get_configuration_from(
    config_directory: PathBuf,
    environment: Environment,
) -> Result<Settings, ConfigError> {
    let config_base_filepath = config_directory.join("base");
    let config_env_filepath = config_directory.join(environment.as_str());

    // It merges the base configuration file with the one from the specific environment (development or production)
    let settings = Config::builder()
        .add_source(File::from(config_base_filepath).required(true))
        .add_source(File::from(config_env_filepath).required(true))
        // Merge settings from environment variables with a prefix of APP and "__" separator
        // E.g APP_DIGEST__MAX_TOPICS_PER_SUBSCRIPTION would set Settings.digest.max_topics_per_subscription
        .add_source(config::Environment::with_prefix("app").separator("__"))
        .build()?;

    tracing::info!("Application environment = {:?}", environment);

    for key in unknown_keys(&settings) {
        tracing::warn!(key = %key, "Ignoring unknown configuration key");
    }

    // Try to convert the value from the configuration file into a Settings type
    settings.try_deserialize()
}

/// Dotted paths of every key that no settings section reads.
fn unknown_keys(settings: &Config) -> Vec<String> {
    let Ok(table) = settings
        .clone()
        .try_deserialize::<serde_json::Map<String, serde_json::Value>>()
    else {
        return Vec::new();
    };
    let mut unknown = Vec::new();

    for (section, value) in &table {
        let Some((_, known)) = KNOWN_KEYS.iter().find(|(name, _)| name == section) else {
            unknown.push(section.clone());
            continue;
        };

        if let Some(entries) = value.as_object() {
            unknown.extend(
                entries
                    .keys()
                    .filter(|key| !known.contains(&key.as_str()))
                    .map(|key| format!("{}.{}", section, key)),
            );
        }
    }

    unknown.sort();
    unknown
}
