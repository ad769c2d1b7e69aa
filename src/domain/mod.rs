pub mod article;
pub mod sort_preference;
pub mod subscriber;
pub mod subscriber_email;
pub mod subscriber_name;
pub mod subscriber_record;
pub mod topics;

pub use article::{Article, ArticleSource, TopicResult};
pub use sort_preference::SortPreference;
pub use subscriber::Subscriber;
pub use subscriber_email::SubscriberEmail;
pub use subscriber_name::SubscriberName;
pub use subscriber_record::{SubscriberRecord, TopicsField};
pub use topics::{TopicList, TopicSelection};
