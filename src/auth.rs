use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    Json,
};
use axum_extra::headers::{authorization::Bearer, Authorization};
use axum_extra::TypedHeader;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Admin, LoginReq, RegisterReq},
    AppState,
};

const TOKEN_VALIDITY_SECS: i64 = 12 * 3600;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub id: Uuid,
    pub username: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(
    secret: &str,
    id: Uuid,
    username: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let iat = Utc::now().timestamp();
    let claims = Claims {
        id,
        username: username.to_string(),
        iat,
        exp: iat + TOKEN_VALIDITY_SECS,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
}

// POST /admin/register (one-time bootstrap)
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterReq>,
) -> Result<Json<Value>, ApiError> {
    let (username, password) = match (req.username, req.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => return Err(ApiError::BadRequest("username and password required".into())),
    };

    let existing: i64 = sqlx::query_scalar("SELECT count(*) FROM admins WHERE username = $1")
        .bind(&username)
        .fetch_one(&state.db)
        .await?;
    if existing > 0 {
        return Err(ApiError::BadRequest("Admin already exists".into()));
    }

    let hashed = bcrypt::hash(&password, bcrypt::DEFAULT_COST)?;
    let id: Uuid =
        sqlx::query_scalar("INSERT INTO admins (username, password) VALUES ($1, $2) RETURNING id")
            .bind(&username)
            .bind(&hashed)
            .fetch_one(&state.db)
            .await?;

    Ok(Json(json!({ "success": true, "id": id })))
}

// POST /admin/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginReq>,
) -> Result<Json<Value>, ApiError> {
    let (username, password) = match (req.username, req.password) {
        (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => (u, p),
        _ => return Err(ApiError::BadRequest("Username and password are required".into())),
    };

    // Unknown username and wrong password are indistinguishable to the caller.
    let admin = sqlx::query_as::<_, Admin>(
        "SELECT id, username, password FROM admins WHERE username = $1",
    )
    .bind(&username)
    .fetch_optional(&state.db)
    .await?;

    let Some(admin) = admin else {
        return Err(ApiError::Unauthorized("Invalid username or password".into()));
    };

    if !bcrypt::verify(&password, &admin.password)? {
        return Err(ApiError::Unauthorized("Invalid username or password".into()));
    }

    let token = issue_token(&state.config.jwt_secret, admin.id, &admin.username)?;
    tracing::info!(username = %admin.username, "admin login");

    Ok(Json(json!({
        "success": true,
        "message": "Login successful",
        "token": token,
        "admin": { "id": admin.id, "username": admin.username },
    })))
}

/// Bearer-token gate for course mutations. Verified claims are attached to
/// the request extensions for downstream handlers.
pub async fn require_admin(
    State(state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(bearer)) = bearer else {
        return Err(ApiError::Unauthorized("Missing auth token".into()));
    };

    let claims = decode_token(&state.config.jwt_secret, bearer.token())
        .map_err(|_| ApiError::Unauthorized("Invalid token".into()))?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let id = Uuid::new_v4();
        let token = issue_token("s3cret", id, "admin").unwrap();
        let claims = decode_token("s3cret", &token).unwrap();
        assert_eq!(claims.id, id);
        assert_eq!(claims.username, "admin");
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token("s3cret", Uuid::new_v4(), "admin").unwrap();
        assert!(decode_token("other", &token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: Uuid::new_v4(),
            username: "admin".into(),
            iat: now - 13 * 3600,
            exp: now - 3600,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"s3cret"),
        )
        .unwrap();
        assert!(decode_token("s3cret", &token).is_err());
    }

    #[test]
    fn password_hash_verifies_only_the_original() {
        let hash = bcrypt::hash("hunter2", 4).unwrap();
        assert!(bcrypt::verify("hunter2", &hash).unwrap());
        assert!(!bcrypt::verify("hunter3", &hash).unwrap());
    }
}
