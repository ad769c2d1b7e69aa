//! Renders one subscriber's retrieved articles into the digest email body.
//!
//! The document is assembled in a fixed order: head, opening (greeting and
//! an optional warning about skipped topics), the headline table and the
//! closing signature.

use std::fmt::Write;
use std::path::PathBuf;

use crate::domain::{Article, Subscriber, TopicResult, TopicSelection};

const BODY_HEAD: &str = concat!(
    r#"<html><head><meta charset="UTF-8"><style>body {background-color: lightyellow}"#,
    "\n",
    "table, th, td {border:1px solid coral; border-collapse: collapse; padding:4px; ",
    "background-color: mintcream;} th {background-color: papayawhip;} ",
    "table {margin-right:40px; margin-left:40px}</style></head>\n",
);

const TABLE_HEADER: &str = concat!(
    "<table><tr>",
    r#"<th style="width:15%">Topic</th>"#,
    r#"<th style="width:30%">Headline</th>"#,
    "<th>Summary</th></tr>\n",
);

pub const NO_ARTICLES_PLACEHOLDER: &str = "No articles found for today";

const CLOSING_BOILERPLATE: &str = concat!(
    "<p>That's it for today!  We'll be back tomorrow with more headlines for you.  ",
    "If you liked this, please let us know by emailing the editors.</p><br/>",
    "<p>Regards,</p><p>Marvin",
    r#"<img src="https://icons.iconarchive.com/icons/sykonist/looney-tunes/256/Marvin-Martian-icon.png""#,
    r#" style="width:100px; height:100px;"></p>"#,
    r#"<a href="mailto:editors@ournewsroom.com"><i>editors@ournewsroom.com</i></a>"#,
    "</body></html>",
);

/// Receives every rendered digest when diagnostics are enabled.
pub trait DigestDump {
    fn dump(&self, subscriber: &Subscriber, html: &str);
}

/// Overwrites a single file with the most recently rendered digest.
pub struct HtmlFileDump {
    path: PathBuf,
}

impl HtmlFileDump {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl DigestDump for HtmlFileDump {
    fn dump(&self, subscriber: &Subscriber, html: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                tracing::warn!(path = %parent.display(), error = %err, "Failed to create digest dump directory");
                return;
            }
        }

        match std::fs::write(&self.path, html) {
            Ok(()) => tracing::debug!(
                path = %self.path.display(),
                subscriber_email = %subscriber.email,
                "Digest written for inspection"
            ),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "Failed to write digest dump")
            }
        }
    }
}

#[derive(Default)]
pub struct DigestComposer {
    dump: Option<Box<dyn DigestDump + Send + Sync>>,
}

impl DigestComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dump(dump: Box<dyn DigestDump + Send + Sync>) -> Self {
        Self { dump: Some(dump) }
    }

    /// Builds the full HTML document. `topic_results` is rendered in the given order.
    pub fn compose(
        &self,
        subscriber: &Subscriber,
        selection: &TopicSelection,
        topic_results: &[TopicResult],
    ) -> String {
        let mut body = String::from(BODY_HEAD);

        add_opening(&mut body, subscriber, selection);
        add_news_table(&mut body, topic_results);
        body.push_str(CLOSING_BOILERPLATE);

        if let Some(dump) = &self.dump {
            dump.dump(subscriber, &body);
        }

        body
    }
}

fn add_opening(body: &mut String, subscriber: &Subscriber, selection: &TopicSelection) {
    let _ = write!(
        body,
        "<body><p>Good day, {}!</p>\n\
         <p>Welcome to your daily news headline feed.  We've found the top news items \
         for your topics of interest.</p>\n",
        html_escape(subscriber.first_name.as_ref())
    );

    if selection.is_truncated() {
        let _ = write!(
            body,
            "<p>Just one bit of warning.  Currently, you've expressed interest in {} topics, \
             but we only support up to {}.  So, we skipped the following topics for you:</p><ul>",
            selection.requested(),
            selection.cap
        );
        for topic in &selection.dropped {
            let _ = write!(body, "<li>{}</li>", html_escape(topic));
        }
        body.push_str("</ul>\n");
    }

    body.push_str("<p>Now, let's get started!</p>\n");
}

fn add_news_table(body: &mut String, topic_results: &[TopicResult]) {
    body.push_str(TABLE_HEADER);

    for result in topic_results {
        let topic = html_escape(&result.topic);

        if result.is_empty() {
            let _ = writeln!(
                body,
                "<tr><td><b>{}</b></td><td><i>{}</i></td><td></td></tr>",
                topic, NO_ARTICLES_PLACEHOLDER
            );
            continue;
        }

        for (index, article) in result.articles.iter().enumerate() {
            // Only the first row of a group names the topic
            if index == 0 {
                let _ = write!(body, "<tr><td><b>{}</b></td>", topic);
            } else {
                body.push_str("<tr><td></td>");
            }
            add_article_cells(body, article);
        }
    }

    body.push_str("</table>\n");
}

fn add_article_cells(body: &mut String, article: &Article) {
    let _ = writeln!(
        body,
        r#"<td>{}</td><td>{} - <a href="{}"><i>go to article</i></a></td></tr>"#,
        html_escape(&article.title),
        html_escape(article.description.as_deref().unwrap_or_default()),
        html_escape(&article.url),
    );
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
