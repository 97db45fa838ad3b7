use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    db::{
        self,
        models::{
            Investment, InvestmentDetail, InvestmentStatus, InvestmentType, RiskLevel,
            TypeDetails, Votes,
        },
    },
    error::{AppError, Result},
    middleware::auth::AuthUser,
    services::{
        query::{parse_filter, InvestmentQuery, SortKey},
        voting::{remaining_voting_days, VoteSummary},
    },
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_investments).post(create_investment))
        .route("/:type", get(list_investments_of_type))
        .route("/:type/:id", get(get_investment))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    #[serde(rename = "type")]
    pub investment_type: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct InvestmentCard {
    #[serde(flatten)]
    pub investment: Investment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting: Option<VoteSummary>,
    pub link: String,
}

impl From<&Investment> for InvestmentCard {
    fn from(investment: &Investment) -> Self {
        Self {
            voting: investment.votes.map(|v| v.summary()),
            link: format!("/investments/{}/{}", investment.investment_type, investment.id),
            investment: investment.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EmptyState {
    pub title: String,
    pub hint: &'static str,
}

impl EmptyState {
    pub fn for_filters(what: &str) -> Self {
        Self {
            title: format!("No {what} found"),
            hint: "Try adjusting your filters or search query",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InvestmentListResponse {
    pub title: String,
    pub investments: Vec<InvestmentCard>,
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
}

fn page_title(investment_type: Option<InvestmentType>) -> String {
    investment_type.map_or_else(|| "All Investments".to_string(), |kind| kind.label().to_string())
}

async fn run_list_query(state: &AppState, query: InvestmentQuery) -> Result<InvestmentListResponse> {
    let source = state.db.investments().await?;
    let investments: Vec<InvestmentCard> = query
        .apply(&source)
        .into_iter()
        .map(InvestmentCard::from)
        .collect();

    tracing::debug!(
        matched = investments.len(),
        total = source.len(),
        sort = ?query.sort,
        "investment list query"
    );

    Ok(InvestmentListResponse {
        title: page_title(query.investment_type),
        empty_state: investments
            .is_empty()
            .then(|| EmptyState::for_filters("investments")),
        total: source.len(),
        investments,
    })
}

fn build_query(params: &ListQuery, investment_type: Option<InvestmentType>) -> Result<InvestmentQuery> {
    Ok(InvestmentQuery {
        investment_type,
        status: parse_filter(params.status.as_deref())?,
        search: params.search.clone().unwrap_or_default(),
        sort: params
            .sort
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or(SortKey::Newest),
    })
}

async fn list_investments(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<ListQuery>,
) -> Result<Json<InvestmentListResponse>> {
    let investment_type = parse_filter(params.investment_type.as_deref())?;
    let query = build_query(&params, investment_type)?;
    Ok(Json(run_list_query(&state, query).await?))
}

// Unknown categories in the path are a missing page, not a bad filter
fn path_type(value: &str) -> Result<Option<InvestmentType>> {
    parse_filter(Some(value)).map_err(|_| AppError::NotFound("Investment category not found".to_string()))
}

async fn list_investments_of_type(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(investment_type): Path<String>,
    Query(params): Query<ListQuery>,
) -> Result<Json<InvestmentListResponse>> {
    let query = build_query(&params, path_type(&investment_type)?)?;
    Ok(Json(run_list_query(&state, query).await?))
}

#[derive(Debug, Serialize)]
pub struct VotingStatus {
    #[serde(flatten)]
    pub summary: VoteSummary,
    pub remaining_days: i64,
    pub has_voted: bool,
}

#[derive(Debug, Serialize)]
pub struct InvestmentDetailResponse {
    #[serde(flatten)]
    pub investment: Investment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<InvestmentDetail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voting: Option<VotingStatus>,
}

async fn get_investment(
    State(state): State<AppState>,
    user: AuthUser,
    Path((investment_type, id)): Path<(String, String)>,
) -> Result<Json<InvestmentDetailResponse>> {
    let not_found = || AppError::NotFound("Investment not found".to_string());

    let investment = state.db.investment(&id).await?.ok_or_else(not_found)?;
    if let Some(kind) = path_type(&investment_type)? {
        if kind != investment.investment_type {
            return Err(not_found());
        }
    }

    let detail = state.db.investment_detail(&id).await?;

    let voting = if investment.status == InvestmentStatus::Proposed {
        let votes = investment.votes.unwrap_or(Votes { total: 0, positive: 0 });
        Some(VotingStatus {
            summary: votes.summary(),
            remaining_days: remaining_voting_days(investment.start_date, Utc::now().date_naive()),
            has_voted: state.sessions.has_voted(&user.session_id, &id).await,
        })
    } else {
        None
    };

    Ok(Json(InvestmentDetailResponse {
        investment,
        detail,
        voting,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CreateInvestmentRequest {
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
    pub title: String,
    pub amount: i64,
    pub description: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub expected_return: Option<f64>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default = "default_is_proposal")]
    pub is_proposal: bool,
    pub image_src: Option<String>,
    pub type_details: Option<TypeDetails>,
}

fn default_is_proposal() -> bool {
    true
}

impl CreateInvestmentRequest {
    fn validate(&self) -> Result<f64> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Investment title is required".to_string()));
        }
        if self.description.trim().is_empty() {
            return Err(AppError::Validation("Description is required".to_string()));
        }
        if self.amount <= 0 {
            return Err(AppError::Validation("Amount must be greater than zero".to_string()));
        }
        if self.end_date.is_some_and(|end| end < self.start_date) {
            return Err(AppError::Validation(
                "End date cannot be before the start date".to_string(),
            ));
        }
        if let Some(details) = &self.type_details {
            if details.investment_type() != self.investment_type {
                return Err(AppError::Validation(format!(
                    "Details do not apply to {} investments",
                    self.investment_type.label()
                )));
            }
        }
        self.expected_return
            .ok_or_else(|| AppError::Validation("Expected return is required".to_string()))
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedInvestmentResponse {
    #[serde(flatten)]
    pub card: InvestmentCard,
    pub detail: InvestmentDetail,
}

async fn create_investment(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<CreateInvestmentRequest>,
) -> Result<Json<CreatedInvestmentResponse>> {
    user.require_admin()?;
    let expected_return = body.validate()?;

    let (status, votes) = if body.is_proposal {
        (InvestmentStatus::Proposed, Some(Votes { total: 0, positive: 0 }))
    } else {
        (InvestmentStatus::Active, None)
    };

    let investment = Investment {
        id: Uuid::new_v4().to_string(),
        title: body.title.trim().to_string(),
        investment_type: body.investment_type,
        amount: body.amount,
        profit: None,
        profit_percentage: None,
        status,
        start_date: body.start_date,
        end_date: body.end_date,
        votes,
        image_src: body.image_src,
    };

    let detail = InvestmentDetail {
        description: body.description.trim().to_string(),
        expected_return,
        risk_level: body.risk_level,
        funding_stage: None,
        location: None,
        team: Vec::new(),
        documents: Vec::new(),
        milestones: Vec::new(),
        type_details: body.type_details,
    };

    let mut tx = state.db.pool.begin().await?;
    db::insert_investment(&mut *tx, &investment).await?;
    db::insert_investment_detail(&mut *tx, &investment.id, &detail).await?;
    tx.commit().await?;

    tracing::info!(
        investment_id = %investment.id,
        status = %investment.status,
        created_by = %user.id,
        "investment created"
    );

    Ok(Json(CreatedInvestmentResponse {
        card: InvestmentCard::from(&investment),
        detail,
    }))
}
