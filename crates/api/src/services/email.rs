//! Outbound email.
//!
//! Services talk to a [`Notifier`]. In production that is [`EmailService`]
//! (SMTP via lettre with Askama HTML and text templates); without SMTP
//! credentials it is [`LogNotifier`], which only records that a message would
//! have been sent.

use askama::Template;
use async_trait::async_trait;
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{MultiPart, SinglePart, header::ContentType},
    transport::smtp::{Error as SmtpError, authentication::Credentials},
};
use secrecy::ExposeSecret;
use thiserror::Error;

use cleanpro_core::{Email, OtpCode};

use crate::config::EmailConfig;
use crate::models::{OrderSummary, SummaryLine};

/// Minutes an emailed code stays valid, as printed in the messages.
const OTP_VALID_MINUTES: i64 = 10;

/// HTML template for the login verification code email.
#[derive(Template)]
#[template(path = "email/otp.html")]
struct OtpEmailHtml<'a> {
    name: &'a str,
    code: &'a str,
    minutes: i64,
}

/// Plain text template for the login verification code email.
#[derive(Template)]
#[template(path = "email/otp.txt")]
struct OtpEmailText<'a> {
    name: &'a str,
    code: &'a str,
    minutes: i64,
}

/// HTML template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.html")]
struct PasswordResetEmailHtml<'a> {
    name: &'a str,
    code: &'a str,
    minutes: i64,
}

/// Plain text template for the password reset email.
#[derive(Template)]
#[template(path = "email/password_reset.txt")]
struct PasswordResetEmailText<'a> {
    name: &'a str,
    code: &'a str,
    minutes: i64,
}

/// HTML template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.html")]
struct OrderConfirmationHtml<'a> {
    name: &'a str,
    order: &'a OrderSummary,
    lines: &'a [SummaryLine],
}

/// Plain text template for the order confirmation email.
#[derive(Template)]
#[template(path = "email/order_confirmation.txt")]
struct OrderConfirmationText<'a> {
    name: &'a str,
    order: &'a OrderSummary,
    lines: &'a [SummaryLine],
}

/// HTML template for the ready-for-pickup email.
#[derive(Template)]
#[template(path = "email/order_ready.html")]
struct OrderReadyHtml<'a> {
    name: &'a str,
    order: &'a OrderSummary,
}

/// Plain text template for the ready-for-pickup email.
#[derive(Template)]
#[template(path = "email/order_ready.txt")]
struct OrderReadyText<'a> {
    name: &'a str,
    order: &'a OrderSummary,
}

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// The channel refused the message for another reason.
    #[error("Notification unavailable: {0}")]
    Unavailable(String),
}

/// Outbound transactional messages.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name of the delivery channel, reported by the health check.
    fn channel(&self) -> &'static str;

    /// Send a login verification code.
    async fn send_otp(&self, to: &Email, name: &str, code: &OtpCode) -> Result<(), NotifyError>;

    /// Send a password reset code.
    async fn send_password_reset(
        &self,
        to: &Email,
        name: &str,
        code: &OtpCode,
    ) -> Result<(), NotifyError>;

    /// Confirm a newly created order to the client.
    async fn send_order_confirmation(
        &self,
        to: &Email,
        name: &str,
        order: &OrderSummary,
    ) -> Result<(), NotifyError>;

    /// Tell the client their order is ready for pickup.
    async fn send_order_ready(
        &self,
        to: &Email,
        name: &str,
        order: &OrderSummary,
    ) -> Result<(), NotifyError>;
}

/// Email service for sending transactional emails over SMTP.
#[derive(Clone)]
pub struct EmailService {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from_address: String,
}

impl EmailService {
    /// Create a new email service from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid.
    pub fn new(config: &EmailConfig) -> Result<Self, SmtpError> {
        let credentials = Credentials::new(
            config.smtp_username.clone(),
            config.smtp_password.expose_secret().to_string(),
        );

        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(credentials)
            .timeout(Some(config.timeout))
            .build();

        Ok(Self {
            mailer,
            from_address: config.from_address.clone(),
        })
    }

    /// Open a connection to the relay and authenticate.
    ///
    /// Called once at startup; a failure is logged and the service keeps running.
    ///
    /// # Errors
    ///
    /// Returns error if the relay cannot be reached or rejects the credentials.
    pub async fn test_connection(&self) -> Result<bool, NotifyError> {
        Ok(self.mailer.test_connection().await?)
    }

    /// Send a multipart email with both plain text and HTML versions.
    async fn send_multipart_email(
        &self,
        to: &Email,
        subject: &str,
        text_body: String,
        html_body: String,
    ) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                self.from_address
                    .parse()
                    .map_err(|_| NotifyError::InvalidAddress(self.from_address.clone()))?,
            )
            .to(to
                .as_str()
                .parse()
                .map_err(|_| NotifyError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body),
                    ),
            )?;

        self.mailer.send(email).await?;

        tracing::info!(to = %to, subject = %subject, "Email sent successfully");
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailService {
    fn channel(&self) -> &'static str {
        "smtp"
    }

    async fn send_otp(&self, to: &Email, name: &str, code: &OtpCode) -> Result<(), NotifyError> {
        let code = code.as_str();
        let minutes = OTP_VALID_MINUTES;
        let html = OtpEmailHtml {
            name,
            code,
            minutes,
        }
        .render()?;
        let text = OtpEmailText {
            name,
            code,
            minutes,
        }
        .render()?;

        self.send_multipart_email(to, "Your CleanPro Verification Code", text, html)
            .await
    }

    async fn send_password_reset(
        &self,
        to: &Email,
        name: &str,
        code: &OtpCode,
    ) -> Result<(), NotifyError> {
        let code = code.as_str();
        let minutes = OTP_VALID_MINUTES;
        let html = PasswordResetEmailHtml {
            name,
            code,
            minutes,
        }
        .render()?;
        let text = PasswordResetEmailText {
            name,
            code,
            minutes,
        }
        .render()?;

        self.send_multipart_email(to, "Reset Your CleanPro Password", text, html)
            .await
    }

    async fn send_order_confirmation(
        &self,
        to: &Email,
        name: &str,
        order: &OrderSummary,
    ) -> Result<(), NotifyError> {
        let lines = order.lines.as_slice();
        let html = OrderConfirmationHtml { name, order, lines }.render()?;
        let text = OrderConfirmationText { name, order, lines }.render()?;
        let subject = format!("CleanPro Order Confirmation - {}", order.order_code);

        self.send_multipart_email(to, &subject, text, html).await
    }

    async fn send_order_ready(
        &self,
        to: &Email,
        name: &str,
        order: &OrderSummary,
    ) -> Result<(), NotifyError> {
        let html = OrderReadyHtml { name, order }.render()?;
        let text = OrderReadyText { name, order }.render()?;
        let subject = format!("Your CleanPro Order {} is Ready for Pickup", order.order_code);

        self.send_multipart_email(to, &subject, text, html).await
    }
}

/// Notifier used when SMTP is not configured.
///
/// Logs the recipient and kind of message. Codes are never written to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn channel(&self) -> &'static str {
        "log"
    }

    async fn send_otp(&self, to: &Email, _name: &str, _code: &OtpCode) -> Result<(), NotifyError> {
        tracing::info!(to = %to, kind = "otp", "Email disabled, verification code not sent");
        Ok(())
    }

    async fn send_password_reset(
        &self,
        to: &Email,
        _name: &str,
        _code: &OtpCode,
    ) -> Result<(), NotifyError> {
        tracing::info!(to = %to, kind = "password_reset", "Email disabled, reset code not sent");
        Ok(())
    }

    async fn send_order_confirmation(
        &self,
        to: &Email,
        _name: &str,
        order: &OrderSummary,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            to = %to,
            order_code = %order.order_code,
            kind = "order_confirmation",
            "Email disabled, confirmation not sent"
        );
        Ok(())
    }

    async fn send_order_ready(
        &self,
        to: &Email,
        _name: &str,
        order: &OrderSummary,
    ) -> Result<(), NotifyError> {
        tracing::info!(
            to = %to,
            order_code = %order.order_code,
            kind = "order_ready",
            "Email disabled, ready notice not sent"
        );
        Ok(())
    }
}
