use lettre::{
    Message, SmtpTransport, Transport, message::Mailbox,
    transport::smtp::authentication::Credentials,
};

use crate::error::ApiError;

#[derive(Clone)]
pub struct EmailService {
    transport: SmtpTransport,
    from: Mailbox,
    frontend_url: String,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("from", &self.from.to_string())
            .field("frontend_url", &self.frontend_url)
            .finish_non_exhaustive()
    }
}

impl EmailService {
    pub fn new(
        smtp_host: &str,
        smtp_username: &str,
        smtp_password: &str,
        from_email: &str,
        from_name: &str,
        frontend_url: &str,
    ) -> Result<Self, ApiError> {
        let from: Mailbox = format!("{from_name} <{from_email}>")
            .parse()
            .map_err(|e| ApiError::Email(format!("Invalid from email: {e}")))?;

        let credentials = Credentials::new(smtp_username.to_string(), smtp_password.to_string());
        let transport = SmtpTransport::relay(smtp_host)
            .map_err(|e| ApiError::Email(format!("Failed to create SMTP transport: {e}")))?
            .credentials(credentials)
            .build();

        Ok(Self {
            transport,
            from,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        })
    }

    /// Link the user follows to pick a new password.
    pub fn reset_url(&self, reset_token: &str) -> String {
        reset_link(&self.frontend_url, reset_token)
    }

    fn send(&self, to_email: &str, subject: &str, body: String) -> Result<(), ApiError> {
        let to: Mailbox = to_email
            .parse()
            .map_err(|e| ApiError::Email(format!("Invalid recipient email: {e}")))?;

        let email = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(subject)
            .body(body)
            .map_err(|e| ApiError::Email(format!("Failed to build email: {e}")))?;

        self.transport
            .send(&email)
            .map_err(|e| ApiError::Email(format!("Failed to send email: {e}")))?;

        Ok(())
    }

    pub fn send_password_reset_email(
        &self,
        to_email: &str,
        username: &str,
        reset_token: &str,
    ) -> Result<(), ApiError> {
        let body = format!(
            "Hi {username},\n\nYou requested a password reset for your flashcards account.\n\nChoose a new password here:\n{}\n\nThis link can be used once and expires soon.\n\nIf you didn't request this, you can safely ignore this email.",
            self.reset_url(reset_token)
        );
        self.send(to_email, "Password reset", body)
    }

    pub fn send_password_changed_email(&self, to_email: &str, username: &str) -> Result<(), ApiError> {
        let body = format!(
            "Hi {username},\n\nThe password of your flashcards account was just changed.\n\nIf this wasn't you, reset your password right away."
        );
        self.send(to_email, "Your password was changed", body)
    }
}

fn reset_link(frontend_url: &str, reset_token: &str) -> String {
    format!("{frontend_url}/users/password_reset/confirm/?token={reset_token}")
}
