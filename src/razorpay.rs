use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

const RAZORPAY_API_BASE: &str = "https://api.razorpay.com";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("gateway api error status={status} body={body}")]
    Api { status: u16, body: String },
    #[error("invalid gateway response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Serialize)]
pub struct OrderRequest {
    pub amount: i64, // paise
    pub currency: String,
    pub receipt: String,
    pub notes: Value,
}

#[derive(Debug, Deserialize)]
pub struct Order {
    pub id: String,
    pub amount: i64,
    pub currency: String,
    pub receipt: Option<String>,
    pub status: String,
}

/// Minimal client for the Razorpay Orders API.
/// Authorization: HTTP basic auth with key id / key secret.
#[derive(Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    base_url: String,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String) -> Self {
        Self::with_base_url(key_id, key_secret, RAZORPAY_API_BASE.to_string())
    }

    pub fn with_base_url(key_id: String, key_secret: String, base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id,
            key_secret,
            base_url,
        }
    }

    pub async fn create_order(&self, req: &OrderRequest) -> Result<Order, GatewayError> {
        let resp = self
            .http
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(req)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str::<Order>(&body)
            .map_err(|e| GatewayError::InvalidResponse(format!("{e}; body={body}")))
    }
}
