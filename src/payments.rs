use axum::{extract::State, Json};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{CreateOrderReq, Purchase, VerifyPaymentReq},
    razorpay::OrderRequest,
    AppState,
};

/// The gateway rejects receipts longer than 40 characters, so truncation is
/// a correctness requirement here.
pub const RECEIPT_MAX_LEN: usize = 40;

pub fn receipt_for(purchase_id: Option<Uuid>, fallback_millis: i64) -> String {
    let mut receipt = match purchase_id {
        // UUIDs like xxxxxxxx-xxxx-... -> first segment keeps it short.
        Some(id) => {
            let id = id.to_string();
            let short = id.split('-').next().unwrap_or(&id).to_string();
            format!("purchase_{short}")
        }
        None => format!("receipt_{fallback_millis}"),
    };
    receipt.truncate(RECEIPT_MAX_LEN);
    receipt
}

/// Hex HMAC-SHA256 over `"{order_id}|{payment_id}"`, exactly what the
/// gateway signs in its checkout callback.
pub fn expected_signature(secret: &str, order_id: &str, payment_id: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(format!("{order_id}|{payment_id}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

pub fn signature_matches(secret: &str, order_id: &str, payment_id: &str, supplied: &str) -> bool {
    expected_signature(secret, order_id, payment_id) == supplied
}

// POST /api/create-order
pub async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<CreateOrderReq>,
) -> Result<Json<Value>, ApiError> {
    let Some(amount) = req.amount else {
        return Err(ApiError::BadRequest("amount required (in paise)".into()));
    };
    let currency = req.currency.unwrap_or_else(|| "INR".to_string());
    let customer = req.customer.unwrap_or_default();
    let customer_json = serde_json::to_value(&customer).unwrap_or_else(|_| json!({}));

    // Pre-purchase row is best-effort; checkout continues even if it fails.
    let purchase_id = match sqlx::query_as::<_, Purchase>(
        r#"
        INSERT INTO purchases (customer, amount, currency, status)
        VALUES ($1, $2, $3, 'pending')
        RETURNING id, customer, amount, currency, status,
                  razorpay_order_id, payment_id, created_at
        "#,
    )
    .bind(&customer_json)
    .bind(amount)
    .bind(&currency)
    .fetch_one(&state.db)
    .await
    {
        Ok(purchase) => Some(purchase.id),
        Err(e) => {
            tracing::warn!(error = %e, "failed to save purchase");
            None
        }
    };

    let receipt = receipt_for(purchase_id, Utc::now().timestamp_millis());
    tracing::info!(%receipt, "creating gateway order");

    let order = state
        .razorpay
        .create_order(&OrderRequest {
            amount,
            currency,
            receipt,
            notes: customer_json,
        })
        .await?;

    if let Some(purchase_id) = purchase_id {
        if let Err(e) = sqlx::query("UPDATE purchases SET razorpay_order_id = $1 WHERE id = $2")
            .bind(&order.id)
            .bind(purchase_id)
            .execute(&state.db)
            .await
        {
            tracing::warn!(error = %e, %purchase_id, "failed to record gateway order id");
        }
    }

    Ok(Json(json!({
        "success": true,
        "orderId": order.id,
        "razorpayKey": state.config.razorpay_key_id,
        "purchaseId": purchase_id,
    })))
}

// POST /api/verify-payment
//
// The signature check is the sole gate between a forged "payment succeeded"
// callback and paid content; everything after it is fulfillment.
pub async fn verify_payment(
    State(state): State<AppState>,
    Json(req): Json<VerifyPaymentReq>,
) -> Result<Json<Value>, ApiError> {
    let (Some(order_id), Some(payment_id), Some(signature)) = (
        req.razorpay_order_id.as_deref(),
        req.razorpay_payment_id.as_deref(),
        req.razorpay_signature.as_deref(),
    ) else {
        return Err(ApiError::BadRequest("Missing payment parameters".into()));
    };

    if !signature_matches(&state.config.razorpay_key_secret, order_id, payment_id, signature) {
        return Err(ApiError::BadRequest("Invalid signature".into()));
    }

    // Course-specific drive link wins over the globally configured fallback.
    let mut drive_link = state
        .config
        .fallback_drive_link
        .clone()
        .unwrap_or_default();
    if let Some(course_id) = req.course_id {
        match sqlx::query_scalar::<_, Option<String>>("SELECT drive_link FROM courses WHERE id = $1")
            .bind(course_id)
            .fetch_optional(&state.db)
            .await
        {
            Ok(Some(Some(link))) if !link.trim().is_empty() => {
                drive_link = link.trim().to_string();
            }
            Ok(_) => tracing::info!(%course_id, "no course-specific drive link"),
            Err(e) => tracing::warn!(error = %e, %course_id, "failed to resolve course drive link"),
        }
    }
    if drive_link.is_empty() {
        tracing::error!("no delivery link configured for verified payment");
    }

    let customer = req.customer.clone().unwrap_or_default();
    let customer_json = serde_json::to_value(&customer).unwrap_or_else(|_| json!({}));

    // Append-only audit row, best-effort.
    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO payments (order_id, payment_id, customer, amount, purchase_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(order_id)
    .bind(payment_id)
    .bind(&customer_json)
    .bind(req.amount)
    .bind(req.purchase_id)
    .execute(&state.db)
    .await
    {
        tracing::warn!(error = %e, "failed to record payment audit row");
    }

    // Compare-and-swap pending -> paid. The email only fires when this call
    // actually flipped the row, so a concurrent duplicate verification
    // cannot double-send.
    let mut fulfilled = true;
    if let Some(purchase_id) = req.purchase_id {
        match sqlx::query(
            r#"
            UPDATE purchases
            SET status = 'paid', payment_id = $1
            WHERE id = $2 AND status = 'pending'
            "#,
        )
        .bind(payment_id)
        .bind(purchase_id)
        .execute(&state.db)
        .await
        {
            Ok(result) => {
                fulfilled = result.rows_affected() > 0;
                if !fulfilled {
                    tracing::info!(%purchase_id, "purchase already paid; skipping fulfillment email");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, %purchase_id, "failed to mark purchase paid");
                fulfilled = false;
            }
        }
    }

    if fulfilled && !drive_link.is_empty() {
        if let (Some(mailer), Some(email)) = (&state.mailer, customer.email.as_deref()) {
            match mailer.send_delivery_link(email, &drive_link).await {
                Ok(()) => tracing::info!(to = email, "fulfillment email sent"),
                Err(e) => tracing::warn!(error = %e, "failed to send fulfillment email"),
            }
        }
    }

    let (redirect, message) = if drive_link.is_empty() {
        ("/".to_string(), "Payment verified")
    } else {
        (drive_link, "Payment verified, redirecting to course materials")
    };
    Ok(Json(json!({ "success": true, "redirect": redirect, "message": message })))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "rzp_test_secret";

    #[test]
    fn matching_signature_is_accepted() {
        let sig = expected_signature(SECRET, "order_abc", "pay_123");
        assert!(signature_matches(SECRET, "order_abc", "pay_123", &sig));
    }

    #[test]
    fn tampered_fields_are_rejected() {
        let sig = expected_signature(SECRET, "order_abc", "pay_123");
        assert!(!signature_matches(SECRET, "order_abd", "pay_123", &sig));
        assert!(!signature_matches(SECRET, "order_abc", "pay_124", &sig));

        let mut flipped = sig.into_bytes();
        flipped[0] = if flipped[0] == b'0' { b'1' } else { b'0' };
        let flipped = String::from_utf8(flipped).unwrap();
        assert!(!signature_matches(SECRET, "order_abc", "pay_123", &flipped));
    }

    #[test]
    fn different_secrets_disagree() {
        let sig = expected_signature(SECRET, "order_abc", "pay_123");
        assert!(!signature_matches("other_secret", "order_abc", "pay_123", &sig));
    }

    #[test]
    fn receipt_uses_first_uuid_segment() {
        let id = Uuid::parse_str("a1b2c3d4-0000-4000-8000-000000000000").unwrap();
        let receipt = receipt_for(Some(id), 0);
        assert_eq!(receipt, "purchase_a1b2c3d4");
        assert!(receipt.len() <= RECEIPT_MAX_LEN);
    }

    #[test]
    fn receipt_falls_back_to_timestamp() {
        let receipt = receipt_for(None, 1_700_000_000_000);
        assert_eq!(receipt, "receipt_1700000000000");
        assert!(receipt.len() <= RECEIPT_MAX_LEN);
    }

    #[test]
    fn receipt_never_exceeds_gateway_cap() {
        for id in [None, Some(Uuid::new_v4())] {
            assert!(receipt_for(id, i64::MAX).len() <= RECEIPT_MAX_LEN);
        }
    }
}
