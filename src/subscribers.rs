use std::path::{Path, PathBuf};

use crate::domain::{Subscriber, SubscriberRecord};

#[derive(thiserror::Error, Debug)]
pub enum SubscriberSourceError {
    #[error("Failed to read the subscriber source {}.", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Subscriber source {} is not a valid list of subscribers.", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Loads the subscriber list from a YAML file.
///
/// Rows that fail validation are skipped with a warning so one bad row does
/// not cancel everybody else's digest.
#[tracing::instrument(name = "Loading subscribers", skip(path), fields(path = %path.display()))]
pub fn load_subscribers(path: &Path) -> Result<Vec<Subscriber>, SubscriberSourceError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SubscriberSourceError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let subscribers = parse_subscribers(&raw).map_err(|source| SubscriberSourceError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::info!(subscriptions_found = subscribers.len(), "Subscribers loaded");

    Ok(subscribers)
}

pub fn parse_subscribers(raw: &str) -> Result<Vec<Subscriber>, serde_yaml::Error> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    let records: Vec<SubscriberRecord> = serde_yaml::from_str(raw)?;

    let subscribers = records
        .into_iter()
        .enumerate()
        .filter_map(|(row, record)| match Subscriber::try_from(record) {
            Ok(subscriber) => Some(subscriber),
            Err(err) => {
                tracing::warn!(row, error = %err, "Skipping invalid subscriber record");
                None
            }
        })
        .collect();

    Ok(subscribers)
}
