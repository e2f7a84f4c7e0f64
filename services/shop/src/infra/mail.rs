//! Outgoing mail over SMTP, or into the log when no relay is configured.

use anyhow::Context as _;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::ShopConfig;
use crate::domain::repository::Mailer;
use crate::domain::types::OutgoingMail;
use crate::error::ShopError;

#[derive(Clone)]
pub enum MailTransport {
    Smtp {
        transport: AsyncSmtpTransport<Tokio1Executor>,
        sender: Mailbox,
    },
    /// Development fallback: mails are logged at `info` and dropped.
    Log,
}

impl MailTransport {
    /// Build the transport from `SMTP_*` settings. Without `SMTP_HOST` mail is logged.
    pub fn from_config(config: &ShopConfig) -> anyhow::Result<Self> {
        let Some(host) = config.smtp_host.as_deref() else {
            return Ok(Self::Log);
        };
        let sender: Mailbox = config
            .smtp_sender
            .parse()
            .with_context(|| format!("invalid SMTP_SENDER: {}", config.smtp_sender))?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
            .with_context(|| format!("invalid SMTP relay {host}"))?
            .port(config.smtp_port);
        if let (Some(user), Some(password)) = (&config.smtp_user, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self::Smtp {
            transport: builder.build(),
            sender,
        })
    }
}

impl Mailer for MailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), ShopError> {
        match self {
            Self::Smtp { transport, sender } => {
                let to: Mailbox = mail
                    .to
                    .parse()
                    .with_context(|| format!("invalid recipient {}", mail.to))?;
                let message = Message::builder()
                    .from(sender.clone())
                    .to(to)
                    .subject(mail.subject.clone())
                    .header(ContentType::TEXT_PLAIN)
                    .body(mail.body.clone())
                    .context("build mail")?;
                transport.send(message).await.context("send mail")?;
                tracing::debug!(to = %mail.to, subject = %mail.subject, "mail sent");
            }
            Self::Log => {
                tracing::info!(
                    to = %mail.to,
                    subject = %mail.subject,
                    body = %mail.body,
                    "mail transport disabled, logging mail"
                );
            }
        }
        Ok(())
    }
}
