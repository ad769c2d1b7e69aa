/// Ordered topics of interest for one subscriber, already trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicList(Vec<String>);

/// The outcome of applying the topic cap to a [`TopicList`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicSelection {
    pub kept: Vec<String>,
    pub dropped: Vec<String>,
    pub cap: usize,
}

impl TopicList {
    /// Splits a delimited free-text field such as `"Tesla, Ford ,Powerwall"`.
    pub fn parse_delimited(raw: &str) -> Self {
        Self::from_topics(raw.split(','))
    }

    /// Trims every topic and discards the blank ones. Order and duplicates are kept.
    pub fn from_topics<I, S>(topics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let topics = topics
            .into_iter()
            .map(|topic| topic.as_ref().trim().to_string())
            .filter(|topic| !topic.is_empty())
            .collect();

        Self(topics)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Keeps the first `cap` topics and returns the tail separately.
    /// The list itself is left untouched.
    pub fn select(&self, cap: usize) -> TopicSelection {
        let split_at = cap.min(self.0.len());
        let (kept, dropped) = self.0.split_at(split_at);

        TopicSelection {
            kept: kept.to_vec(),
            dropped: dropped.to_vec(),
            cap,
        }
    }
}

impl TopicSelection {
    /// Number of topics the subscriber asked for, before the cap.
    pub fn requested(&self) -> usize {
        self.kept.len() + self.dropped.len()
    }

    pub fn is_truncated(&self) -> bool {
        !self.dropped.is_empty()
    }
}
