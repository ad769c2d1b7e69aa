use std::time;

use lettre::address::AddressError;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{AsyncSmtpConnection, TlsParameters};
use lettre::transport::smtp::commands::{Data, Mail, Rcpt, Rset};
use lettre::transport::smtp::extension::{ClientId, Extension, MailBodyParameter, MailParameter};
use lettre::Message;
use secrecy::ExposeSecret;

use crate::config::EmailClientSettings;
use crate::domain::SubscriberEmail;

/// A mail session able to deliver HTML messages until it is closed.
pub trait MailTransport {
    async fn send_html(
        &mut self,
        recipients: &[SubscriberEmail],
        subject: &str,
        html_content: &str,
    ) -> Result<(), SendError>;

    /// Releases the session. Calling it again is a no-op.
    async fn close(&mut self);
}

/// One authenticated SMTP session shared by every send of a batch.
///
/// A refused message only resets the current transaction. The session is
/// dropped when the server stops answering within `timeout` or the
/// connection itself fails, since it cannot be reopened without the password.
pub struct SmtpEmailClient {
    connection: Option<AsyncSmtpConnection>,
    sender: SubscriberEmail,
    timeout: time::Duration,
    broken: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum ConnectError {
    #[error("Sender email is not valid: {0}")]
    InvalidSender(String),
    #[error("Failed to open an SMTP connection to {host}:{port}.")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: smtp::Error,
    },
    #[error("SMTP authentication was refused.")]
    Authentication(#[source] smtp::Error),
    #[error("The SMTP server did not answer within {0:?}.")]
    Timeout(time::Duration),
}

#[derive(thiserror::Error, Debug)]
pub enum SendError {
    #[error("{address} is not a valid mailbox.")]
    InvalidAddress {
        address: String,
        #[source]
        source: AddressError,
    },
    #[error("Failed to build the email message.")]
    Build(#[source] lettre::error::Error),
    #[error("The SMTP server did not accept the message.")]
    Transport(#[source] smtp::Error),
    #[error("The SMTP server did not answer within {0:?}.")]
    Timeout(time::Duration),
    #[error("The SMTP connection is no longer usable.")]
    ConnectionBroken,
    #[error("The SMTP connection has already been closed.")]
    ConnectionClosed,
}

impl SmtpEmailClient {
    /// Opens and authenticates the session. The settings are consumed so the
    /// password is dropped as soon as authentication is over.
    #[tracing::instrument(
        name = "Opening the SMTP connection",
        skip(settings),
        fields(
            smtp_host = %settings.smtp_host,
            smtp_port = settings.smtp_port,
            sender_email = %settings.sender_email
        )
    )]
    pub async fn connect(settings: EmailClientSettings) -> Result<SmtpEmailClient, ConnectError> {
        let sender = settings
            .get_sender_email()
            .map_err(ConnectError::InvalidSender)?;
        let timeout = settings.get_timeout();
        let connect_error = |source| ConnectError::Connect {
            host: settings.smtp_host.clone(),
            port: settings.smtp_port,
            source,
        };

        let tls_parameters = TlsParameters::new(settings.smtp_host.clone()).map_err(connect_error)?;
        let client_id = ClientId::default();
        let connecting = AsyncSmtpConnection::connect_tokio1(
            (settings.smtp_host.as_str(), settings.smtp_port),
            Some(timeout),
            &client_id,
            Some(tls_parameters),
            None,
        );
        // lettre only bounds the TCP connect, the greeting and EHLO need their own limit
        let mut connection = tokio::time::timeout(timeout, connecting)
            .await
            .map_err(|_| ConnectError::Timeout(timeout))?
            .map_err(connect_error)?;

        let credentials = Credentials::new(
            String::from(sender.as_ref()),
            settings.password.expose_secret().to_owned(),
        );
        tokio::time::timeout(
            timeout,
            connection.auth(&[Mechanism::Plain, Mechanism::Login], &credentials),
        )
        .await
        .map_err(|_| ConnectError::Timeout(timeout))?
        .map_err(ConnectError::Authentication)?;

        tracing::info!("SMTP connection established");

        Ok(SmtpEmailClient::new(connection, sender, timeout))
    }

    fn new(connection: AsyncSmtpConnection, sender: SubscriberEmail, timeout: time::Duration) -> Self {
        Self {
            connection: Some(connection),
            sender,
            timeout,
            broken: false,
        }
    }

    /// Clears a refused transaction so the next message starts clean.
    async fn reset(&mut self) {
        let Some(connection) = self.connection.as_mut() else {
            return;
        };

        let outcome = tokio::time::timeout(self.timeout, connection.command(Rset)).await;
        match outcome {
            Ok(Ok(_)) => {}
            Ok(Err(err)) => {
                tracing::warn!(error = ?err, "SMTP server refused RSET");
                self.discard_connection();
            }
            Err(_) => {
                tracing::warn!("SMTP server did not answer RSET in time");
                self.discard_connection();
            }
        }
    }

    fn discard_connection(&mut self) {
        self.connection = None;
        self.broken = true;
    }
}

impl MailTransport for SmtpEmailClient {
    async fn send_html(
        &mut self,
        recipients: &[SubscriberEmail],
        subject: &str,
        html_content: &str,
    ) -> Result<(), SendError> {
        let message = build_html_message(&self.sender, recipients, subject, html_content)?;

        if self.broken {
            return Err(SendError::ConnectionBroken);
        }
        let connection = self.connection.as_mut().ok_or(SendError::ConnectionClosed)?;
        if connection.has_broken() {
            self.discard_connection();
            return Err(SendError::ConnectionBroken);
        }

        let outcome = tokio::time::timeout(self.timeout, send_transaction(connection, &message)).await;
        let result = match outcome {
            Ok(result) => result,
            Err(_) => {
                self.discard_connection();
                return Err(SendError::Timeout(self.timeout));
            }
        };
        let Err(err) = result else {
            return Ok(());
        };

        if err.is_permanent() || err.is_transient() {
            self.reset().await;
        } else {
            self.discard_connection();
        }

        Err(SendError::Transport(err))
    }

    async fn close(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };

        let outcome = tokio::time::timeout(self.timeout, connection.quit()).await;
        match outcome {
            Ok(Ok(_)) => tracing::info!("Email connection closed"),
            Ok(Err(err)) => tracing::warn!(error = ?err, "SMTP connection did not close cleanly"),
            Err(_) => tracing::warn!("SMTP server did not answer QUIT in time"),
        }
    }
}

/// Runs one MAIL / RCPT / DATA exchange. Negative replies are returned
/// without tearing the connection down.
async fn send_transaction(
    connection: &mut AsyncSmtpConnection,
    message: &Message,
) -> Result<(), smtp::Error> {
    let envelope = message.envelope();
    let mut mail_parameters = Vec::new();
    if connection
        .server_info()
        .supports_feature(Extension::EightBitMime)
    {
        mail_parameters.push(MailParameter::Body(MailBodyParameter::EightBitMime));
    }

    connection
        .command(Mail::new(envelope.from().cloned(), mail_parameters))
        .await?;
    for recipient in envelope.to() {
        connection
            .command(Rcpt::new(recipient.clone(), Vec::new()))
            .await?;
    }
    connection.command(Data).await?;
    connection.message(&message.formatted()).await?;

    Ok(())
}

/// Builds a `text/html` message addressed to every recipient.
pub fn build_html_message(
    sender: &SubscriberEmail,
    recipients: &[SubscriberEmail],
    subject: &str,
    html_content: &str,
) -> Result<Message, SendError> {
    let mut builder = Message::builder()
        .from(parse_mailbox(sender)?)
        .subject(subject)
        .header(ContentType::TEXT_HTML);

    for recipient in recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    builder
        .body(String::from(html_content))
        .map_err(SendError::Build)
}

fn parse_mailbox(email: &SubscriberEmail) -> Result<Mailbox, SendError> {
    email
        .as_ref()
        .parse()
        .map_err(|source| SendError::InvalidAddress {
            address: email.to_string(),
            source,
        })
}
