use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::{auth, courses, payments, AppState};

pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(health))
        .route("/admin/register", post(auth::register))
        .route("/admin/login", post(auth::login))
        .route("/api/courses", get(courses::list_courses))
        .route("/api/create-order", post(payments::create_order))
        .route("/api/verify-payment", post(payments::verify_payment));

    // Course mutations sit behind the bearer-token gate.
    let admin = Router::new()
        .route("/admin/course", post(courses::upsert_course))
        .route("/admin/course/:id", delete(courses::delete_course))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ));

    Router::new().merge(public).merge(admin).with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "Server running" }))
}
