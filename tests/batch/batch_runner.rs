use news_digest::batch::BatchStats;

use crate::helpers::{subscriber, TestApp};

#[tokio::test]
async fn failed_send_does_not_stop_the_next_subscriber() {
    let mut app = TestApp::spawn(3, 5).await;
    app.mount_topic("Tesla", &["t1", "t2"]).await;
    app.mount_topic("Ford", &["f1"]).await;
    app.mailer.reject("bad@example.com");

    let stats = app
        .run_batch(&[
            subscriber("Bugs", "bad@example.com", &["Tesla"]),
            subscriber("Daffy", "daffy@example.com", &["Ford", "Tesla"]),
        ])
        .await;

    assert_eq!(
        stats,
        BatchStats {
            subscriptions_found: 2,
            subscriptions_processed_ok: 1,
            topics_requested: 3,
            topics_retrieved: 3,
            articles_retrieved: 5,
        }
    );
    assert_eq!(app.mailer.sent.len(), 1);
    assert_eq!(app.mailer.sent[0].recipients, vec!["daffy@example.com"]);
}

#[tokio::test]
async fn totals_are_the_sum_of_every_subscriber() {
    let mut app = TestApp::spawn(2, 5).await;
    app.mount_topic("A", &["a1", "a2", "a3"]).await;
    app.mount_topic("B", &["b1"]).await;
    app.mount_topic("C", &[]).await;
    app.forbid_topic("D").await;

    let stats = app
        .run_batch(&[
            subscriber("Bugs", "bugs@example.com", &["A", "B", "D"]),
            subscriber("Daffy", "daffy@example.com", &["C"]),
            subscriber("Porky", "porky@example.com", &["B", "A"]),
        ])
        .await;

    assert_eq!(stats.subscriptions_found, 3);
    assert_eq!(stats.subscriptions_processed_ok, 3);
    assert_eq!(stats.topics_requested, 6);
    assert_eq!(stats.topics_retrieved, 5);
    assert_eq!(stats.articles_retrieved, 8);
}

#[tokio::test]
async fn failing_fetch_for_one_subscriber_does_not_affect_the_next() {
    let mut app = TestApp::spawn(3, 5).await;
    app.mount_failing_topic("Broken", 503).await;
    app.mount_topic("Tesla", &["t1"]).await;

    let stats = app
        .run_batch(&[
            subscriber("Bugs", "bugs@example.com", &["Broken"]),
            subscriber("Daffy", "daffy@example.com", &["Tesla"]),
        ])
        .await;

    assert_eq!(stats.subscriptions_processed_ok, 2);
    assert_eq!(stats.articles_retrieved, 1);
    assert_eq!(app.searched_topics().await, vec!["Broken", "Tesla"]);
}

#[tokio::test]
async fn subscribers_are_processed_in_input_order() {
    let mut app = TestApp::spawn(3, 5).await;
    app.mount_topic("Tesla", &["t1"]).await;

    app.run_batch(&[
        subscriber("Porky", "porky@example.com", &["Tesla"]),
        subscriber("Bugs", "bugs@example.com", &["Tesla"]),
        subscriber("Daffy", "daffy@example.com", &["Tesla"]),
    ])
    .await;

    let recipients: Vec<_> = app
        .mailer
        .sent
        .iter()
        .map(|sent| sent.recipients[0].as_str())
        .collect();
    assert_eq!(
        recipients,
        vec!["porky@example.com", "bugs@example.com", "daffy@example.com"]
    );
}

#[tokio::test]
async fn mail_session_is_closed_once_after_the_batch() {
    let mut app = TestApp::spawn(3, 5).await;
    app.mount_topic("Tesla", &["t1"]).await;
    app.mailer.reject("bugs@example.com");

    app.run_batch(&[
        subscriber("Bugs", "bugs@example.com", &["Tesla"]),
        subscriber("Daffy", "daffy@example.com", &["Tesla"]),
    ])
    .await;

    assert_eq!(app.mailer.close_calls, 1);
}

#[tokio::test]
async fn empty_batch_still_closes_the_mail_session() {
    let mut app = TestApp::spawn(3, 5).await;

    let stats = app.run_batch(&[]).await;

    assert_eq!(stats, BatchStats::default());
    assert_eq!(app.mailer.close_calls, 1);
}
