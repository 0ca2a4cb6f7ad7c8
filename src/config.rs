use anyhow::{Context, Result};
use std::env;

/// Environment configuration, read once at startup and passed into
/// `AppState::new`. Secrets (JWT key, gateway secret, SMTP password) stay
/// server-side; only `razorpay_key_id` is ever sent to clients.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub razorpay_key_id: String,
    pub razorpay_key_secret: String,
    pub email_host: String,
    pub email_port: u16,
    pub email_user: Option<String>,
    pub email_pass: Option<String>,
    /// Global delivery link used when a course has no drive_link of its own.
    pub fallback_drive_link: Option<String>,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL not set")?,
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET not set")?,
            razorpay_key_id: env::var("RAZORPAY_KEY_ID").context("RAZORPAY_KEY_ID not set")?,
            razorpay_key_secret: env::var("RAZORPAY_KEY_SECRET")
                .context("RAZORPAY_KEY_SECRET not set")?,
            email_host: env::var("EMAIL_HOST").unwrap_or_else(|_| "smtp.gmail.com".into()),
            email_port: env::var("EMAIL_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(587),
            email_user: env::var("EMAIL_USER").ok(),
            email_pass: env::var("EMAIL_PASS").ok(),
            fallback_drive_link: env::var("GOOGLE_DRIVE_LINK").ok(),
            port: env::var("PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(5000),
        })
    }
}
