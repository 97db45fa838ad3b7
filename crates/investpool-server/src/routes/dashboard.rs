use axum::{extract::State, routing::get, Json, Router};
use chrono::{NaiveDate, Utc};
use serde::Serialize;

use crate::{
    db::models::{ProfitPoint, User},
    error::Result,
    middleware::auth::AuthUser,
    routes::{events::EventView, investments::InvestmentCard},
    services::{
        calendar::upcoming,
        dashboard::{category_distribution, CategoryShare, InvestorStats, PortfolioTotals, StatCard},
        query::{InvestmentQuery, SortKey},
    },
    AppState,
};

const RECENT_INVESTMENTS: usize = 4;
const UPCOMING_EVENTS: usize = 5;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(get_dashboard))
}

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub user: User,
    pub totals: PortfolioTotals,
    pub stats: Vec<StatCard>,
    pub profit_history: Vec<ProfitPoint>,
    pub categories: Vec<CategoryShare>,
    pub recent_investments: Vec<InvestmentCard>,
    pub upcoming_events: Vec<EventView>,
    pub investor_stats: InvestorStats,
}

async fn get_dashboard(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardResponse>> {
    Ok(Json(build_dashboard(&state, user.user(), Utc::now().date_naive()).await?))
}

pub async fn build_dashboard(state: &AppState, user: User, today: NaiveDate) -> Result<DashboardResponse> {
    let investments = state.db.investments().await?;
    let investors = state.db.investors().await?;
    let events = state.db.events().await?;

    let totals = PortfolioTotals::new(&investments, today);

    let recent = InvestmentQuery {
        sort: SortKey::Newest,
        ..Default::default()
    };

    Ok(DashboardResponse {
        user,
        stats: totals.stat_cards(),
        totals,
        profit_history: state.db.profit_history().await?,
        categories: category_distribution(&investments),
        recent_investments: recent
            .apply(&investments)
            .into_iter()
            .take(RECENT_INVESTMENTS)
            .map(InvestmentCard::from)
            .collect(),
        upcoming_events: upcoming(&events, today, UPCOMING_EVENTS)
            .into_iter()
            .map(EventView::from)
            .collect(),
        investor_stats: InvestorStats::new(&investors, today),
    })
}
