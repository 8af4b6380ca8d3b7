use crate::config::types::{MailConfig, SmtpSecurity};
use crate::report::render::Document;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum SendError {
    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("failed to send email: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

/// Delivers a rendered report.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, document: &Document) -> Result<(), SendError>;
}

/// SMTP delivery to the fixed recipient list from [`MailConfig`].
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, SendError> {
        let builder = match config.security {
            SmtpSecurity::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?,
            SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
            SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
        };

        let transport = builder
            .port(config.port)
            .credentials(Credentials::new(config.username.clone(), config.password.clone()))
            .build();

        Ok(Self {
            transport,
            from: parse_mailbox(&config.from)?,
            to: config.to.iter().map(|a| parse_mailbox(a)).collect::<Result<_, _>>()?,
            cc: config.cc.iter().map(|a| parse_mailbox(a)).collect::<Result<_, _>>()?,
        })
    }

    pub fn build_message(&self, subject: &str, document: &Document) -> Result<Message, SendError> {
        build_message(&self.from, &self.to, &self.cc, subject, document)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, document: &Document) -> Result<(), SendError> {
        let message = self.build_message(subject, document)?;
        self.transport.send(message).await?;
        info!(to = self.to.len(), cc = self.cc.len(), "Email sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, SendError> {
    address.parse().map_err(|source| SendError::Address {
        address: address.to_string(),
        source,
    })
}

fn build_message(
    from: &Mailbox,
    to: &[Mailbox],
    cc: &[Mailbox],
    subject: &str,
    document: &Document,
) -> Result<Message, SendError> {
    let mut builder = Message::builder().from(from.clone()).subject(subject);
    for mailbox in to {
        builder = builder.to(mailbox.clone());
    }
    for mailbox in cc {
        builder = builder.cc(mailbox.clone());
    }

    Ok(builder
        .header(ContentType::TEXT_HTML)
        .body(document.html.clone())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mail_config() -> MailConfig {
        MailConfig {
            host: "smtp.example.com".to_string(),
            port: 587,
            security: SmtpSecurity::Starttls,
            username: "reports@example.com".to_string(),
            password: "secret".to_string(),
            from: "reports@example.com".to_string(),
            to: vec!["manager@example.com".to_string()],
            cc: vec!["ops@example.com".to_string(), "Audit <audit@example.com>".to_string()],
        }
    }

    #[tokio::test]
    async fn test_message_carries_recipients_and_html() {
        let notifier = SmtpNotifier::new(&mail_config()).unwrap();
        let document = Document {
            html: "<h2>After-Hours Summary Report</h2>".to_string(),
        };

        let message = notifier.build_message("After-Hours Summary Report", &document).unwrap();
        let envelope = message.envelope();
        assert_eq!(envelope.from().map(|a| a.to_string()), Some("reports@example.com".to_string()));
        assert_eq!(envelope.to().len(), 3);

        let formatted = String::from_utf8(message.formatted()).unwrap();
        assert!(formatted.contains("Subject: After-Hours Summary Report"));
        assert!(formatted.contains("To: manager@example.com"));
        assert!(formatted.contains("Cc: ops@example.com"));
        assert!(formatted.contains("Content-Type: text/html"));
        assert!(formatted.contains("<h2>After-Hours Summary Report</h2>"));
    }

    #[tokio::test]
    async fn test_invalid_recipient_is_rejected() {
        let mut config = mail_config();
        config.to = vec!["nobody".to_string()];

        let err = SmtpNotifier::new(&config).err().unwrap();
        assert!(matches!(err, SendError::Address { ref address, .. } if address == "nobody"));
    }
}
