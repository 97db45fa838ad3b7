use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::{
    db::models::{Investment, InvestmentStatus, Votes},
    error::{AppError, Result},
    middleware::auth::AuthUser,
    routes::investments::{EmptyState, InvestmentCard, ListQuery},
    services::{
        query::{parse_filter, InvestmentQuery, SortKey},
        voting::VoteSummary,
    },
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_proposals))
        .route("/:id/vote", post(cast_vote))
}

#[derive(Debug, Serialize)]
pub struct ProposalListResponse {
    pub proposals: Vec<InvestmentCard>,
    pub total: usize,
    /// Proposals this session has not voted on yet.
    pub awaiting_vote: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_state: Option<EmptyState>,
}

async fn list_proposals(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListQuery>,
) -> Result<Json<ProposalListResponse>> {
    let query = InvestmentQuery {
        investment_type: parse_filter(params.investment_type.as_deref())?,
        status: Some(InvestmentStatus::Proposed),
        search: params.search.unwrap_or_default(),
        sort: params
            .sort
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or(SortKey::Votes),
    };

    let all: Vec<Investment> = state
        .db
        .investments()
        .await?
        .into_iter()
        .filter(|inv| inv.status == InvestmentStatus::Proposed)
        .collect();

    let mut awaiting_vote = 0;
    for proposal in &all {
        if !state.sessions.has_voted(&user.session_id, &proposal.id).await {
            awaiting_vote += 1;
        }
    }

    let proposals: Vec<InvestmentCard> = query
        .apply(&all)
        .into_iter()
        .map(InvestmentCard::from)
        .collect();

    Ok(Json(ProposalListResponse {
        empty_state: proposals
            .is_empty()
            .then(|| EmptyState::for_filters("proposals")),
        total: all.len(),
        awaiting_vote,
        proposals,
    }))
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub approve: bool,
}

#[derive(Debug, Serialize)]
pub struct VoteResponse {
    pub investment_id: String,
    pub approve: bool,
    pub has_voted: bool,
    pub voting: VoteSummary,
}

// Votes only set the session's has-voted flag; tallies are fixed demo data.
async fn cast_vote(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<VoteRequest>,
) -> Result<Json<VoteResponse>> {
    let investment = state
        .db
        .investment(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Proposal not found".to_string()))?;

    if investment.status != InvestmentStatus::Proposed {
        return Err(AppError::Validation(
            "Only proposed investments accept votes".to_string(),
        ));
    }

    state.sessions.record_vote(&user.session_id, &id).await?;

    tracing::info!(investment_id = %id, user_id = %user.id, approve = body.approve, "vote cast");

    let votes = investment.votes.unwrap_or(Votes { total: 0, positive: 0 });

    Ok(Json(VoteResponse {
        investment_id: id,
        approve: body.approve,
        has_voted: true,
        voting: votes.summary(),
    }))
}
