use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Course, CourseUpsertReq},
    AppState,
};

// GET /api/courses (public)
pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, price, original_price, poster,
               video_url, drive_link, created_at, updated_at
        FROM courses
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await?;

    Ok(Json(json!({ "success": true, "courses": courses })))
}

// POST /admin/course — create when no id is given, update otherwise.
pub async fn upsert_course(
    State(state): State<AppState>,
    Json(req): Json<CourseUpsertReq>,
) -> Result<Json<Value>, ApiError> {
    let (Some(title), Some(description), Some(price)) = (req.title, req.description, req.price)
    else {
        return Err(ApiError::BadRequest(
            "Title, description, and price are required".into(),
        ));
    };
    if price < 0 {
        return Err(ApiError::BadRequest("price must be non-negative".into()));
    }

    // Pasted links tend to carry stray whitespace.
    let drive_link = req.drive_link.map(|s| s.trim().to_string());

    if let Some(id) = req.id {
        let result = sqlx::query(
            r#"
            UPDATE courses
            SET title = $1, description = $2, price = $3, original_price = $4,
                poster = $5, video_url = $6, drive_link = $7, updated_at = now()
            WHERE id = $8
            "#,
        )
        .bind(&title)
        .bind(&description)
        .bind(price)
        .bind(req.original_price)
        .bind(&req.poster)
        .bind(&req.video_url)
        .bind(&drive_link)
        .bind(id)
        .execute(&state.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::BadRequest("course not found".into()));
        }
        tracing::info!(course_id = %id, "course updated");
        return Ok(Json(json!({ "success": true, "id": id })));
    }

    let id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO courses (title, description, price, original_price, poster, video_url, drive_link)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING id
        "#,
    )
    .bind(&title)
    .bind(&description)
    .bind(price)
    .bind(req.original_price)
    .bind(&req.poster)
    .bind(&req.video_url)
    .bind(&drive_link)
    .fetch_one(&state.db)
    .await?;

    tracing::info!(course_id = %id, %title, "course created");
    Ok(Json(json!({ "success": true, "id": id })))
}

// DELETE /admin/course/:id — unconditional, no soft-delete.
pub async fn delete_course(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    sqlx::query("DELETE FROM courses WHERE id = $1")
        .bind(id)
        .execute(&state.db)
        .await?;

    Ok(Json(json!({ "success": true })))
}
