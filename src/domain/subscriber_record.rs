use serde::Deserialize;

use crate::domain::subscriber::Subscriber;
use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;
use crate::domain::topics::TopicList;

/// One row of the subscriber source file, before validation.
#[derive(Deserialize, Debug)]
pub struct SubscriberRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub topics: TopicsField,
}

/// Topics may be written as a comma-separated string or as a list.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum TopicsField {
    Delimited(String),
    List(Vec<String>),
}

impl TryFrom<SubscriberRecord> for Subscriber {
    type Error = String;

    fn try_from(record: SubscriberRecord) -> Result<Self, Self::Error> {
        let first_name = SubscriberName::parse(record.first_name)?;
        let last_name = SubscriberName::parse(record.last_name)?;
        let email = SubscriberEmail::parse(record.email)?;
        let topics = match record.topics {
            TopicsField::Delimited(raw) => TopicList::parse_delimited(&raw),
            TopicsField::List(topics) => TopicList::from_topics(topics),
        };

        Ok(Subscriber {
            first_name,
            last_name,
            email,
            topics,
        })
    }
}
