pub mod batch;
pub mod config;
pub mod digest;
pub mod domain;
pub mod email_client;
pub mod news_client;
pub mod startup;
pub mod subscribers;
pub mod subscription;
pub mod telemetry;
