use crate::domain::subscriber_email::SubscriberEmail;
use crate::domain::subscriber_name::SubscriberName;
use crate::domain::topics::TopicList;

#[derive(Debug, Clone)]
pub struct Subscriber {
    pub first_name: SubscriberName,
    pub last_name: SubscriberName,
    pub email: SubscriberEmail,
    pub topics: TopicList,
}
