use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// Never derives Serialize: the bcrypt hash must not leave the server.
#[derive(sqlx::FromRow, Debug, Clone)]
pub struct Admin {
    pub id: Uuid,
    pub username: String,
    pub password: String,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub price: i64, // paise
    pub original_price: Option<i64>,
    pub poster: Option<String>,
    pub video_url: Option<String>,
    pub drive_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct Purchase {
    pub id: Uuid,
    pub customer: Value,
    pub amount: i64,
    pub currency: String,
    pub status: String,
    pub razorpay_order_id: Option<String>,
    pub payment_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Buyer details collected by the checkout form. Stored as-is in jsonb.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Customer {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RegisterReq {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoginReq {
    pub username: Option<String>,
    pub password: Option<String>,
}

// The admin form posts camelCase field names (originalPrice, driveLink, ...).
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CourseUpsertReq {
    pub id: Option<Uuid>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub original_price: Option<i64>,
    pub poster: Option<String>,
    pub video_url: Option<String>,
    pub drive_link: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CreateOrderReq {
    pub amount: Option<i64>, // paise
    pub currency: Option<String>,
    pub customer: Option<Customer>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct VerifyPaymentReq {
    pub razorpay_order_id: Option<String>,
    pub razorpay_payment_id: Option<String>,
    pub razorpay_signature: Option<String>,
    pub customer: Option<Customer>,
    pub amount: Option<i64>,
    #[serde(rename = "purchaseId")]
    pub purchase_id: Option<Uuid>,
    #[serde(rename = "courseId")]
    pub course_id: Option<Uuid>,
}
