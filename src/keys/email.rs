//! # Activation Email
//!
//! Delivery of activation links to people who requested a key.

use std::sync::{Arc, RwLock};

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::errors::{KeyError, KeyResult};

/// SMTP settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP server host
    pub smtp_host: String,

    /// SMTP server port
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    /// SMTP username; empty means no authentication
    #[serde(default)]
    pub smtp_user: String,

    #[serde(default)]
    pub smtp_password: String,

    pub from_email: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "People Groups API".to_string()
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            smtp_host: "localhost".to_string(),
            smtp_port: 1025,
            smtp_user: String::new(),
            smtp_password: String::new(),
            from_email: "noreply@localhost".to_string(),
            from_name: default_from_name(),
        }
    }
}

/// What the owner of a new key needs to activate it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationNotice {
    pub email: String,
    pub owner_name: String,
    pub activation_link: String,
}

/// Activation notice delivery
pub trait ActivationNotifier: Send + Sync {
    fn notify(&self, notice: &ActivationNotice) -> KeyResult<()>;
}

/// Notifier that records notices instead of sending them
#[derive(Debug, Default)]
pub struct MockActivationNotifier {
    sent: RwLock<Vec<ActivationNotice>>,
    fail: bool,
}

impl MockActivationNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every delivery fails
    pub fn failing() -> Self {
        Self {
            sent: RwLock::new(Vec::new()),
            fail: true,
        }
    }

    pub fn sent_count(&self) -> usize {
        self.sent.read().map(|s| s.len()).unwrap_or(0)
    }

    /// Most recent notice
    pub fn last(&self) -> Option<ActivationNotice> {
        self.sent.read().ok().and_then(|s| s.last().cloned())
    }
}

impl ActivationNotifier for MockActivationNotifier {
    fn notify(&self, notice: &ActivationNotice) -> KeyResult<()> {
        if self.fail {
            return Err(KeyError::NotificationError("mock delivery failure".to_string()));
        }
        info!(email = %notice.email, "activation notice recorded");
        self.sent
            .write()
            .map_err(|_| KeyError::NotificationError("Lock poisoned".to_string()))?
            .push(notice.clone());
        Ok(())
    }
}

/// SMTP notifier
///
/// The message is built synchronously so address errors surface to the
/// caller; the SMTP exchange runs on the Tokio runtime in the background.
pub struct SmtpActivationNotifier {
    config: EmailConfig,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpActivationNotifier {
    pub fn new(config: EmailConfig) -> KeyResult<Self> {
        let mailer = if config.smtp_user.is_empty() {
            // Local development servers without TLS or auth
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build()
        } else {
            let creds = Credentials::new(config.smtp_user.clone(), config.smtp_password.clone());
            AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)
                .map_err(|e| KeyError::NotificationError(format!("SMTP relay error: {}", e)))?
                .credentials(creds)
                .port(config.smtp_port)
                .build()
        };

        Ok(Self { config, mailer })
    }

    fn render(&self, notice: &ActivationNotice) -> (String, String) {
        let subject = "Activate your API key".to_string();
        let body = format!(
            "Hello {},\n\n\
             Thank you for requesting an API key. Activate it by visiting:\n\n\
             {}\n\n\
             If you did not request a key, you can ignore this email.\n",
            notice.owner_name, notice.activation_link
        );
        (subject, body)
    }

    fn build_message(&self, notice: &ActivationNotice) -> KeyResult<Message> {
        let (subject, body) = self.render(notice);

        Message::builder()
            .from(
                format!("{} <{}>", self.config.from_name, self.config.from_email)
                    .parse()
                    .map_err(|e| {
                        KeyError::NotificationError(format!("Invalid from address: {}", e))
                    })?,
            )
            .to(notice
                .email
                .parse()
                .map_err(|e| KeyError::NotificationError(format!("Invalid to address: {}", e)))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body)
            .map_err(|e| KeyError::NotificationError(format!("Failed to build email: {}", e)))
    }
}

impl ActivationNotifier for SmtpActivationNotifier {
    fn notify(&self, notice: &ActivationNotice) -> KeyResult<()> {
        let message = self.build_message(notice)?;

        let handle = tokio::runtime::Handle::try_current().map_err(|_| {
            KeyError::NotificationError("No async runtime available for SMTP".to_string())
        })?;

        let mailer = self.mailer.clone();
        let to = notice.email.clone();
        handle.spawn(async move {
            match mailer.send(message).await {
                Ok(_) => info!(email = %to, "activation email sent"),
                Err(e) => warn!(email = %to, error = %e, "activation email failed"),
            }
        });

        Ok(())
    }
}

/// SMTP notifier when configured, otherwise the recording mock
pub fn create_notifier(config: Option<EmailConfig>) -> KeyResult<Arc<dyn ActivationNotifier>> {
    match config {
        Some(cfg) => Ok(Arc::new(SmtpActivationNotifier::new(cfg)?)),
        None => Ok(Arc::new(MockActivationNotifier::new())),
    }
}
