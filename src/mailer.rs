use std::env;
use std::fmt::{Debug, Display};
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use uuid::Uuid;

/// One message, ready for transport. The sender identity belongs to the
/// mailer, not the message.
#[derive(Clone, Debug)]
pub struct OutboundEmail {
    pub to: String,
    pub to_name: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Clone, Debug)]
pub struct DeliveryReceipt {
    pub message_id: Option<String>,
}

/// Single-attempt mail transport. Retry and timeout policy live in the
/// dispatch orchestrator.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailerError>;
}

#[derive(Clone, Debug)]
pub enum MailerError {
    MissingConfiguration(String),
    InvalidAddress(String),
    Transport(String),
    TimedOut { after: Duration },
}

impl Display for MailerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            MailerError::MissingConfiguration(what) => {
                write!(f, "missing mailer configuration: {}", what)
            }
            MailerError::InvalidAddress(address) => {
                write!(f, "invalid email address: {}", address)
            }
            MailerError::Transport(message) => write!(f, "transport error: {}", message),
            MailerError::TimedOut { after } => {
                write!(f, "send timed out after {}s", after.as_secs())
            }
        }
    }
}

impl std::error::Error for MailerError {}

/// SMTP transport backed by lettre, configured from `SMTP_*` environment
/// variables the way the original service read its relay credentials.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpMailer {
    /// Reads `SMTP_HOST`, `SMTP_FROM`, and optionally `SMTP_PORT`,
    /// `SMTP_USERNAME`, `SMTP_PASSWORD`, `SMTP_TLS` ("starttls", "tls", or
    /// "none").
    pub fn from_env() -> Result<SmtpMailer, MailerError> {
        let host = env::var("SMTP_HOST")
            .map_err(|_| MailerError::MissingConfiguration("SMTP_HOST".to_string()))?;
        let from = env::var("SMTP_FROM")
            .map_err(|_| MailerError::MissingConfiguration("SMTP_FROM".to_string()))?;
        let port = match env::var("SMTP_PORT") {
            Ok(port) => port
                .parse()
                .map_err(|_| MailerError::MissingConfiguration("SMTP_PORT".to_string()))?,
            Err(_) => 587,
        };
        let credentials = match (env::var("SMTP_USERNAME"), env::var("SMTP_PASSWORD")) {
            (Ok(username), Ok(password)) => Some(Credentials::new(username, password)),
            _ => None,
        };
        let tls = env::var("SMTP_TLS").unwrap_or_else(|_| "starttls".to_string());

        SmtpMailer::new(&host, port, credentials, &tls, &from)
    }

    pub fn new(
        host: &str,
        port: u16,
        credentials: Option<Credentials>,
        tls: &str,
        from: &str,
    ) -> Result<SmtpMailer, MailerError> {
        let from: Mailbox = from
            .parse()
            .map_err(|_| MailerError::InvalidAddress(from.to_string()))?;

        let mut builder = match tls {
            "none" => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host),
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(host)
                .map_err(|e| MailerError::Transport(e.to_string()))?,
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
                .map_err(|e| MailerError::Transport(e.to_string()))?,
        };

        builder = builder.port(port);
        if let Some(credentials) = credentials {
            builder = builder.credentials(credentials);
        }

        Ok(SmtpMailer {
            transport: builder.build(),
            from,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutboundEmail) -> Result<DeliveryReceipt, MailerError> {
        let address = email
            .to
            .parse()
            .map_err(|_| MailerError::InvalidAddress(email.to.clone()))?;
        let to = Mailbox::new(email.to_name.clone(), address);

        let message_id = format!("<{}@outreach>", Uuid::new_v4());
        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&email.subject)
            .message_id(Some(message_id.clone()))
            .body(email.body.clone())
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;

        Ok(DeliveryReceipt {
            message_id: Some(message_id),
        })
    }
}
