use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{
        self,
        models::{Investor, InvestorStatus},
    },
    error::{AppError, Result},
    middleware::auth::AuthUser,
    services::investors::{search_and_sort, InvestorField, InvestorSummary, SortState},
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_investors).post(add_investor))
        .route("/sort", post(click_sort))
}

#[derive(Debug, Default, Deserialize)]
pub struct InvestorListQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvestorListResponse {
    pub investors: Vec<Investor>,
    pub sort: SortState,
    pub summary: InvestorSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<&'static str>,
}

async fn investor_table(state: &AppState, search: &str, sort: SortState) -> Result<InvestorListResponse> {
    let all = state.db.investors().await?;
    let investors: Vec<Investor> = search_and_sort(&all, search, sort)
        .into_iter()
        .cloned()
        .collect();

    Ok(InvestorListResponse {
        summary: InvestorSummary::new(&all, investors.len()),
        empty_state: investors.is_empty().then_some("No investors found"),
        investors,
        sort,
    })
}

async fn list_investors(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<InvestorListQuery>,
) -> Result<Json<InvestorListResponse>> {
    let sort = state.sessions.investor_sort(&user.session_id).await?;
    let search = params.search.unwrap_or_default();
    Ok(Json(investor_table(&state, &search, sort).await?))
}

#[derive(Debug, Deserialize)]
pub struct SortClickRequest {
    pub field: String,
    pub search: Option<String>,
}

async fn click_sort(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<SortClickRequest>,
) -> Result<Json<InvestorListResponse>> {
    let field: InvestorField = body.field.parse()?;
    let sort = state
        .sessions
        .click_investor_sort(&user.session_id, field)
        .await?;

    tracing::debug!(?sort, "investor table sort changed");

    let search = body.search.unwrap_or_default();
    Ok(Json(investor_table(&state, &search, sort).await?))
}

#[derive(Debug, Deserialize)]
pub struct AddInvestorRequest {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub total_contribution: i64,
}

async fn add_investor(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<AddInvestorRequest>,
) -> Result<Json<Investor>> {
    let name = body.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    if body.email.is_empty() || !body.email.contains('@') {
        return Err(AppError::Validation("Invalid email address".to_string()));
    }
    if body.total_contribution < 0 {
        return Err(AppError::Validation(
            "Contribution cannot be negative".to_string(),
        ));
    }

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM investors WHERE email = ?")
        .bind(&body.email)
        .fetch_one(&state.db.pool)
        .await?;

    if existing > 0 {
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    let today = Utc::now().date_naive();
    let investor = Investor {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: body.email,
        total_contribution: body.total_contribution,
        join_date: today,
        status: InvestorStatus::Active,
        last_activity: today,
        investment_count: 0,
        avatar: None,
    };

    db::insert_investor(&state.db.pool, &investor).await?;

    tracing::info!(investor_id = %investor.id, added_by = %user.id, "investor added");

    Ok(Json(investor))
}
