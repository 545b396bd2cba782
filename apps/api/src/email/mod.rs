//! Email Dispatcher — SMTP delivery of practitioner report PDFs.
//!
//! Delivery policy: the practitioner copy is sent only when a recipient was
//! selected; an admin copy goes out on every dispatch regardless. The two
//! sends fail independently and the overall result is the AND of both.

pub mod handlers;

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::{error, info};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("invalid mailbox '{0}'")]
    Mailbox(String),
    #[error("smtp connection setup failed: {0}")]
    Connect(lettre::transport::smtp::Error),
    #[error("message build failed: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("attachment content type rejected: {0}")]
    ContentType(String),
    #[error("smtp send failed: {0}")]
    Send(lettre::transport::smtp::Error),
}

/// Cheap to clone; the SMTP transport pools connections internally.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    admin: Mailbox,
}

impl Mailer {
    /// STARTTLS transport from the SMTP settings in [`Config`].
    pub fn from_config(config: &Config) -> Result<Self, DispatchError> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(DispatchError::Connect)?
            .port(config.smtp_port)
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.clone(),
            ))
            .build();
        Self::with_transport(config, transport)
    }

    /// Plaintext transport for local development and tests.
    pub fn unencrypted_localhost(config: &Config) -> Result<Self, DispatchError> {
        let transport =
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
                .port(config.smtp_port)
                .build();
        Self::with_transport(config, transport)
    }

    fn with_transport(
        config: &Config,
        transport: AsyncSmtpTransport<Tokio1Executor>,
    ) -> Result<Self, DispatchError> {
        let from: Mailbox = config
            .email_from
            .parse()
            .map_err(|_| DispatchError::Mailbox(config.email_from.clone()))?;
        let admin: Mailbox = config
            .admin_email
            .parse()
            .map_err(|_| DispatchError::Mailbox(config.admin_email.clone()))?;
        Ok(Self {
            transport,
            from,
            admin,
        })
    }

    /// Sends the practitioner report, with the unconditional admin copy.
    /// Returns whether every attempted send succeeded; failures are logged,
    /// never propagated, since dispatch runs detached from the request.
    pub async fn send_practitioner_report(
        &self,
        practitioner_email: Option<&str>,
        first_name: &str,
        pdf: &[u8],
    ) -> bool {
        let mut success = true;
        let name = filename_safe(first_name);

        if let Some(practitioner) = practitioner_email {
            let subject = format!("Neuro Change Method™ - Practitioner Report for {first_name}");
            let text = format!(
                "Dear Practitioner,\n\nAttached is the practitioner report for {first_name} \
                 generated using the Neuro Change Method™.\n\nBest regards,\nDreamScape AI Team"
            );
            let html = format!(
                "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
                 <h2 style=\"color: #6633CC;\">Neuro Change Method™ - Practitioner Report</h2>\
                 <p>Dear Practitioner,</p>\
                 <p>Attached is the practitioner report for <strong>{first_name}</strong> \
                 generated using the Neuro Change Method™.</p>\
                 <p>This report contains a comprehensive analysis of the client's responses and \
                 recommendations for their transformation journey.</p>\
                 <p style=\"margin-top: 20px;\">Best regards,</p>\
                 <p><strong>DreamScape AI Team</strong></p></div>"
            );
            match self
                .send_one(
                    practitioner,
                    &subject,
                    &text,
                    &html,
                    &format!("Practitioner_Report_{name}.pdf"),
                    pdf,
                )
                .await
            {
                Ok(()) => info!(to = practitioner, "practitioner report sent"),
                Err(err) => {
                    success = false;
                    error!(to = practitioner, %err, "failed to send practitioner report");
                }
            }
        }

        let selected = practitioner_email.unwrap_or("None");
        let admin_to = self.admin.to_string();
        let subject =
            format!("[COPY] Neuro Change Method™ - Practitioner Report for {first_name}");
        let text = format!(
            "Admin Copy - Practitioner Report\n\nAttached is the practitioner report for \
             {first_name} generated using the Neuro Change Method™.\n\nSelected practitioner: \
             {selected}\n\nBest regards,\nDreamScape AI Team"
        );
        let html = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2 style=\"color: #6633CC;\">[ADMIN COPY] Neuro Change Method™ - Practitioner Report</h2>\
             <p>This is an admin copy of the practitioner report.</p>\
             <p>Attached is the practitioner report for <strong>{first_name}</strong> \
             generated using the Neuro Change Method™.</p>\
             <p><strong>Selected practitioner:</strong> {selected}</p>\
             <p style=\"margin-top: 20px;\">Best regards,</p>\
             <p><strong>DreamScape AI Team</strong></p></div>"
        );
        match self
            .send_one(
                &admin_to,
                &subject,
                &text,
                &html,
                &format!("Admin_Copy_Practitioner_Report_{name}.pdf"),
                pdf,
            )
            .await
        {
            Ok(()) => info!(to = %admin_to, "admin copy sent"),
            Err(err) => {
                success = false;
                error!(to = %admin_to, %err, "failed to send admin copy");
            }
        }

        success
    }

    async fn send_one(
        &self,
        to: &str,
        subject: &str,
        text_body: &str,
        html_body: &str,
        filename: &str,
        pdf: &[u8],
    ) -> Result<(), DispatchError> {
        let to: Mailbox = to
            .parse()
            .map_err(|_| DispatchError::Mailbox(to.to_string()))?;
        let content_type = ContentType::parse("application/pdf")
            .map_err(|e| DispatchError::ContentType(e.to_string()))?;

        let message = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::mixed()
                    .multipart(MultiPart::alternative_plain_html(
                        text_body.to_string(),
                        html_body.to_string(),
                    ))
                    .singlepart(
                        Attachment::new(filename.to_string()).body(pdf.to_vec(), content_type),
                    ),
            )?;

        self.transport
            .send(message)
            .await
            .map_err(DispatchError::Send)?;
        Ok(())
    }
}

/// Restricts a client name to filename-safe characters.
fn filename_safe(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if cleaned.is_empty() {
        "Client".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            openai_api_key: "test-key".to_string(),
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: "user".to_string(),
            smtp_password: "pass".to_string(),
            email_from: "DreamScape AI <noreply@dreamscapeai.com>".to_string(),
            admin_email: "admin@dreamscapeai.com".to_string(),
            practitioner_emails: vec!["practice@example.com".to_string()],
            port: 0,
            rust_log: "info".to_string(),
        }
    }

    // Building the transport spawns its pool task, so even construction-only
    // tests need a runtime.
    #[tokio::test]
    async fn test_mailer_builds_from_config() {
        let mailer = Mailer::unencrypted_localhost(&config()).expect("mailer");
        assert_eq!(mailer.admin.email.to_string(), "admin@dreamscapeai.com");
    }

    #[tokio::test]
    async fn test_bad_from_address_is_rejected() {
        let mut cfg = config();
        cfg.email_from = "not an address".to_string();
        assert!(matches!(
            Mailer::unencrypted_localhost(&cfg),
            Err(DispatchError::Mailbox(_))
        ));
    }

    #[test]
    fn test_filename_safe_strips_path_chars() {
        assert_eq!(filename_safe("Ana"), "Ana");
        assert_eq!(filename_safe("../Ana"), "Ana");
        assert_eq!(filename_safe("!!"), "Client");
    }

    #[tokio::test]
    async fn test_unreachable_smtp_reports_failure_not_panic() {
        // Nothing listens on this port; both sends fail and the result is false.
        let mailer = Mailer::unencrypted_localhost(&config()).expect("mailer");
        let sent = mailer
            .send_practitioner_report(Some("practice@example.com"), "Ana", b"%PDF-1.4 test")
            .await;
        assert!(!sent);
    }
}
