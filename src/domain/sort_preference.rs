/// Ordering the news API applies to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Deserialize)]
#[serde(try_from = "String")]
pub enum SortPreference {
    #[default]
    Relevancy,
    Popularity,
    PublishedAt,
}

impl SortPreference {
    pub fn parse(value: &str) -> Result<SortPreference, String> {
        match value {
            "relevancy" => Ok(SortPreference::Relevancy),
            "popularity" => Ok(SortPreference::Popularity),
            "publishedAt" => Ok(SortPreference::PublishedAt),
            unknown => Err(format!(
                "{} is not a supported sort order. Use either 'relevancy', 'popularity' or 'publishedAt'.",
                unknown
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortPreference::Relevancy => "relevancy",
            SortPreference::Popularity => "popularity",
            SortPreference::PublishedAt => "publishedAt",
        }
    }
}

impl TryFrom<String> for SortPreference {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SortPreference::parse(&value)
    }
}

impl AsRef<str> for SortPreference {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
