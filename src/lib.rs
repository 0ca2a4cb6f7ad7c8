use std::sync::Arc;

pub mod auth;
pub mod config;
pub mod courses;
pub mod db;
pub mod error;
pub mod mailer;
pub mod models;
pub mod payments;
pub mod razorpay;
pub mod routes;

use config::Config;
use mailer::Mailer;
use razorpay::RazorpayClient;

/// Shared handler state. Every external client is constructed once here and
/// injected, so handlers never reach for process-global singletons.
#[derive(Clone)]
pub struct AppState {
    pub db: db::Db,
    pub config: Arc<Config>,
    pub razorpay: RazorpayClient,
    pub mailer: Option<Mailer>,
}

impl AppState {
    pub fn new(db: db::Db, config: Config) -> Self {
        let razorpay = RazorpayClient::new(
            config.razorpay_key_id.clone(),
            config.razorpay_key_secret.clone(),
        );
        let mailer = match Mailer::from_config(&config) {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(error = %e, "mail transport unavailable; fulfillment emails disabled");
                None
            }
        };
        Self {
            db,
            config: Arc::new(config),
            razorpay,
            mailer,
        }
    }
}
