use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{Timelike, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::models::{Comment, CommentAuthor, TIMESTAMP_FORMAT},
    error::{AppError, Result},
    middleware::auth::AuthUser,
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/investment/:investment_id", get(list_comments))
        .route("/", post(create_comment))
}

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub investment_id: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CommentsListResponse {
    pub comments: Vec<Comment>,
}

// Helper to check the investment exists
async fn check_investment(pool: &sqlx::SqlitePool, investment_id: &str) -> Result<()> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM investments WHERE id = ?")
        .bind(investment_id)
        .fetch_one(pool)
        .await?;

    if exists == 0 {
        return Err(AppError::NotFound("Investment not found".to_string()));
    }
    Ok(())
}

async fn list_comments(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(investment_id): Path<String>,
) -> Result<Json<CommentsListResponse>> {
    check_investment(&state.db.pool, &investment_id).await?;

    let comments = state.db.comments(&investment_id).await?;

    Ok(Json(CommentsListResponse { comments }))
}

async fn create_comment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateCommentRequest>,
) -> Result<Json<Comment>> {
    check_investment(&state.db.pool, &body.investment_id).await?;

    let text = body.text.trim();
    if text.is_empty() {
        return Err(AppError::Validation(
            "Comment text is required".to_string(),
        ));
    }

    let comment_id = Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();
    let is_admin = user.is_admin();

    sqlx::query(
        "INSERT INTO comments (id, investment_id, author_name, is_admin, content, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&comment_id)
    .bind(&body.investment_id)
    .bind(&user.name)
    .bind(is_admin)
    .bind(text)
    .bind(now.format(TIMESTAMP_FORMAT).to_string())
    .execute(&state.db.pool)
    .await?;

    Ok(Json(Comment {
        id: comment_id,
        investment_id: body.investment_id,
        text: text.to_string(),
        author: CommentAuthor::new(&user.name),
        is_admin,
        // Stored at second precision
        timestamp: now.with_nanosecond(0).unwrap_or(now),
    }))
}
