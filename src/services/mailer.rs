//! SMTP mail transport
//!
//! One authenticated transport, one configured sender identity. Handlers see
//! the `Mailer` trait so tests can capture outbound mail instead of talking
//! to an SMTP relay.

use crate::config::EmailConfig;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

pub type MailResult<T> = Result<T, MailError>;

#[derive(Debug, Clone, Error)]
pub enum MailError {
    #[error("Mail transport not configured: {message}")]
    NotConfigured { message: String },

    #[error("Invalid email address: {address}")]
    InvalidAddress { address: String },

    #[error("Mail transport error: {message}")]
    Transport { message: String },
}

impl From<MailError> for crate::error::AppError {
    fn from(err: MailError) -> Self {
        use crate::error::AppError;

        match err {
            MailError::NotConfigured { message } => AppError::configuration(message),
            other => AppError::upstream("Mail", other.to_string()),
        }
    }
}

/// Body variants for the two message kinds the shop sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailBody {
    Text(String),
    Html(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundEmail {
    pub to: String,
    pub reply_to: String,
    pub subject: String,
    pub body: EmailBody,
}

/// Transport acknowledgment for one accepted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    pub message_id: Option<String>,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, email: OutboundEmail) -> MailResult<SendReceipt>;
}

/// Authenticated STARTTLS SMTP transport.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender: String,
}

impl SmtpMailer {
    pub fn from_config(config: &EmailConfig) -> MailResult<Self> {
        let (user, password) = match (&config.user, &config.password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u.clone(), p.clone()),
            _ => {
                return Err(MailError::NotConfigured {
                    message: "EMAIL_USER or EMAIL_PASSWORD missing".to_string(),
                })
            }
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailError::Transport {
                message: format!("failed to initialize SMTP transport: {}", e),
            })?
            .port(config.smtp_port)
            .credentials(Credentials::new(user.clone(), password))
            .build();

        Ok(Self {
            transport,
            sender: user,
        })
    }

    fn mailbox(address: &str) -> MailResult<Mailbox> {
        address.parse().map_err(|_| MailError::InvalidAddress {
            address: address.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: OutboundEmail) -> MailResult<SendReceipt> {
        let (content_type, body) = match email.body {
            EmailBody::Text(body) => (ContentType::TEXT_PLAIN, body),
            EmailBody::Html(body) => (ContentType::TEXT_HTML, body),
        };

        let message = Message::builder()
            .from(Self::mailbox(&self.sender)?)
            .reply_to(Self::mailbox(&email.reply_to)?)
            .to(Self::mailbox(&email.to)?)
            .subject(email.subject)
            .header(content_type)
            .body(body)
            .map_err(|e| MailError::Transport {
                message: format!("failed to build message: {}", e),
            })?;

        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailError::Transport {
                message: format!("SMTP send failed: {}", e),
            })?;

        if !response.is_positive() {
            return Err(MailError::Transport {
                message: format!("SMTP relay rejected message: {}", response.code()),
            });
        }

        let acknowledgment = response.message().collect::<Vec<_>>().join(" ");
        Ok(SendReceipt {
            message_id: (!acknowledgment.is_empty()).then_some(acknowledgment),
        })
    }
}

/// Stand-in used when SMTP credentials are absent: every send fails with an
/// explicit configuration error instead of silently doing nothing.
pub struct UnconfiguredMailer;

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(&self, _email: OutboundEmail) -> MailResult<SendReceipt> {
        Err(MailError::NotConfigured {
            message: "EMAIL_USER or EMAIL_PASSWORD missing".to_string(),
        })
    }
}
