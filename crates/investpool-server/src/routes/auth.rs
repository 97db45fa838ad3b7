// Mock sign-in: any well-formed credentials succeed. Tokens only name an
// in-memory session.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::models::{Role, User},
    error::{AppError, Result},
    middleware::auth::AuthUser,
    services::sessions::SESSION_TTL_DAYS,
    AppState,
};

/// Public routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

/// Routes that need a signed-in session.
pub fn session_router() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user id
    pub sid: String, // session id
    pub email: String,
    pub name: String,
    pub role: Role,
    pub exp: usize,
}

fn create_token(user: &User, session_id: &str, secret: &str) -> Result<String> {
    let expiration = Utc::now()
        .checked_add_signed(chrono::Duration::days(SESSION_TTL_DAYS))
        .ok_or_else(|| AppError::Internal("Token expiry out of range".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user.id.clone(),
        sid: session_id.to_string(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AppError::Internal("Failed to create token".to_string()))
}

fn validate_email(email: &str) -> Result<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    Ok(())
}

async fn start_session(state: &AppState, user: User) -> Result<AuthResponse> {
    let session_id = state.sessions.create(user.clone()).await;
    let token = create_token(&user, &session_id, &state.config.jwt_secret)?;

    tracing::info!(user_id = %user.id, role = %user.role, "session started");

    Ok(AuthResponse { token, user })
}

async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>> {
    validate_email(&body.email)?;
    if body.name.trim().is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if body.password.len() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    // New accounts always start as investors
    let user = User {
        id: Uuid::new_v4().to_string(),
        name: body.name.trim().to_string(),
        email: body.email,
        role: Role::Investor,
    };

    Ok(Json(start_session(&state, user).await?))
}

async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    validate_email(&body.email)?;
    if body.password.is_empty() {
        return Err(AppError::Unauthorized);
    }

    // Known investors sign in under their table name
    let name = sqlx::query_scalar::<_, String>("SELECT name FROM investors WHERE email = ?")
        .bind(&body.email)
        .fetch_optional(&state.db.pool)
        .await?
        .unwrap_or_else(|| {
            body.email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string()
        });

    let user = User {
        id: Uuid::new_v4().to_string(),
        name,
        role: Role::for_email(&body.email),
        email: body.email,
    };

    Ok(Json(start_session(&state, user).await?))
}

async fn logout(State(state): State<AppState>, user: AuthUser) -> Result<Json<()>> {
    state.sessions.remove(&user.session_id).await;
    tracing::info!(user_id = %user.id, "session ended");
    Ok(Json(()))
}

async fn me(user: AuthUser) -> Json<User> {
    Json(user.user())
}
