use news_digest::digest::NO_ARTICLES_PLACEHOLDER;
use news_digest::subscription::NEWS_EMAIL_SUBJECT;

use crate::helpers::{subscriber, table_rows, TestApp};

#[tokio::test]
async fn every_topic_within_the_cap_is_fetched() {
    let mut app = TestApp::spawn(3, 5).await;
    app.mount_topic("Tesla", &["t1", "t2"]).await;
    app.mount_topic("Ford", &["f1"]).await;

    let result = app
        .process(&subscriber("Steven", "steven@example.com", &["Tesla", "Ford"]))
        .await;

    assert!(result.email_sent);
    assert_eq!(result.error_message, None);
    assert_eq!(result.topics_requested, 2);
    assert_eq!(result.topics_retrieved, 2);
    assert_eq!(result.articles_retrieved, 3);
}

#[tokio::test]
async fn topics_beyond_the_cap_are_never_searched_and_are_listed_as_skipped() {
    let mut app = TestApp::spawn(1, 5).await;
    app.mount_topic("A", &["a1"]).await;
    app.forbid_topic("B").await;

    let result = app
        .process(&subscriber("Steven", "steven@example.com", &["A", "B"]))
        .await;

    assert_eq!(result.topics_requested, 2);
    assert_eq!(result.topics_retrieved, 1);
    assert_eq!(app.searched_topics().await, vec!["A"]);

    let html = &app.mailer.sent[0].html;
    assert!(html.contains("<ul><li>B</li></ul>"));
    assert!(!table_rows(html).iter().any(|row| row.contains("<b>B</b>")));
}

#[tokio::test]
async fn topics_are_searched_in_subscriber_order() {
    let mut app = TestApp::spawn(4, 5).await;
    for topic in ["Whipped Cream", "Butterscotch", "Marshmallows"] {
        app.mount_topic(topic, &[]).await;
    }

    app.process(&subscriber(
        "Steven",
        "steven@example.com",
        &["Whipped Cream", "Butterscotch", "Marshmallows"],
    ))
    .await;

    assert_eq!(
        app.searched_topics().await,
        vec!["Whipped Cream", "Butterscotch", "Marshmallows"]
    );
}

#[tokio::test]
async fn failing_topic_is_shown_as_empty_and_the_digest_is_still_sent() {
    let mut app = TestApp::spawn(3, 5).await;
    app.mount_failing_topic("X", 500).await;
    app.mount_topic("Y", &["y1", "y2"]).await;

    let result = app
        .process(&subscriber("Steven", "steven@example.com", &["X", "Y"]))
        .await;

    assert!(result.email_sent);
    assert_eq!(result.topics_retrieved, 2);
    assert_eq!(result.articles_retrieved, 2);

    let rows = table_rows(&app.mailer.sent[0].html);
    assert_eq!(rows.len(), 3);
    assert!(rows[0].contains("<b>X</b>"));
    assert!(rows[0].contains(NO_ARTICLES_PLACEHOLDER));
    assert!(!rows[0].contains("href"));
    assert!(rows[1].starts_with("<td><b>Y</b></td><td>y1</td>"));
    assert!(rows[2].starts_with("<td></td><td>y2</td>"));
}

#[tokio::test]
async fn articles_beyond_the_article_cap_are_not_rendered() {
    let mut app = TestApp::spawn(3, 2).await;
    app.mount_topic("Tesla", &["t1", "t2", "t3"]).await;

    let result = app
        .process(&subscriber("Steven", "steven@example.com", &["Tesla"]))
        .await;

    assert_eq!(result.articles_retrieved, 2);
    assert_eq!(table_rows(&app.mailer.sent[0].html).len(), 2);
}

#[tokio::test]
async fn digest_is_sent_to_the_subscriber_only() {
    let mut app = TestApp::spawn(3, 5).await;
    app.mount_topic("Tesla", &["t1"]).await;

    app.process(&subscriber("Steven", "steven@example.com", &["Tesla"]))
        .await;

    let sent = &app.mailer.sent[0];
    assert_eq!(sent.recipients, vec!["steven@example.com"]);
    assert_eq!(sent.subject, NEWS_EMAIL_SUBJECT);
    assert!(sent.html.contains("Good day, Steven!"));
}

#[tokio::test]
async fn failed_send_is_recorded_without_losing_the_counts() {
    let mut app = TestApp::spawn(3, 5).await;
    app.mount_topic("Tesla", &["t1", "t2"]).await;
    app.mailer.reject("steven@example.com");

    let result = app
        .process(&subscriber("Steven", "steven@example.com", &["Tesla"]))
        .await;

    assert!(!result.email_sent);
    assert!(!result.error_message.unwrap_or_default().is_empty());
    assert_eq!(result.topics_requested, 1);
    assert_eq!(result.topics_retrieved, 1);
    assert_eq!(result.articles_retrieved, 2);
    assert!(app.mailer.sent.is_empty());
}

#[tokio::test]
async fn subscriber_without_topics_still_gets_a_digest() {
    let mut app = TestApp::spawn(3, 5).await;

    let result = app
        .process(&subscriber("Steven", "steven@example.com", &[]))
        .await;

    assert!(result.email_sent);
    assert_eq!(result.topics_requested, 0);
    assert!(table_rows(&app.mailer.sent[0].html).is_empty());
    assert!(app.searched_topics().await.is_empty());
}
