use lettre::{
    message::header::ContentType,
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use thiserror::Error;

use crate::config::Config;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Sends the post-purchase delivery-link email over STARTTLS SMTP.
#[derive(Clone)]
pub struct Mailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl Mailer {
    /// Returns `Ok(None)` when SMTP credentials are not configured; the
    /// service then runs with fulfillment emails disabled.
    pub fn from_config(config: &Config) -> Result<Option<Self>, MailError> {
        let (Some(user), Some(pass)) = (config.email_user.clone(), config.email_pass.clone())
        else {
            return Ok(None);
        };

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.email_host)?
            .port(config.email_port)
            .credentials(Credentials::new(user.clone(), pass))
            .build();

        Ok(Some(Self { transport, from: user }))
    }

    pub async fn send_delivery_link(&self, to: &str, link: &str) -> Result<(), MailError> {
        let message = Message::builder()
            .from(self.from.parse()?)
            .to(to.parse()?)
            .subject("Your Course Access Link - Thank You for Your Purchase!")
            .header(ContentType::TEXT_HTML)
            .body(delivery_body(link))?;

        self.transport.send(message).await?;
        Ok(())
    }
}

fn delivery_body(link: &str) -> String {
    format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <h2 style="color: #4F46E5;">Thank You for Your Purchase!</h2>
  <p>Your course materials are ready for access.</p>
  <div style="margin: 20px 0; padding: 15px; background-color: #F3F4F6; border-radius: 8px;">
    <p style="margin: 0; font-weight: bold;">Your Course Access Link:</p>
    <a href="{link}" style="color: #4F46E5; text-decoration: none; word-break: break-all;">{link}</a>
  </div>
  <p style="color: #6B7280; font-size: 14px;">
    Note: Please bookmark this link for future reference. If you have any issues
    accessing the materials, please contact our support team.
  </p>
</div>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_embeds_the_link() {
        let body = delivery_body("https://drive.example.com/folder/abc");
        assert!(body.contains("https://drive.example.com/folder/abc"));
    }
}
