use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    db::models::{Event, DATE_FORMAT},
    error::{AppError, Result},
    middleware::auth::AuthUser,
    services::{
        calendar::{events_on, parse_month, CalendarView, EventQuery},
        query::parse_filter,
    },
    AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events))
        .route("/day/:date", get(events_for_day))
}

#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub view: Option<String>,
    pub month: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl From<&Event> for EventView {
    fn from(event: &Event) -> Self {
        Self {
            label: event.event_type.label(),
            link: event.link(),
            event: event.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EventListResponse {
    pub month: String,
    pub events: Vec<EventView>,
}

async fn list_events(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<EventListQuery>,
) -> Result<Json<EventListResponse>> {
    let anchor = match params.month.as_deref() {
        Some(month) => parse_month(month)?,
        None => Utc::now().date_naive(),
    };

    let query = EventQuery {
        event_type: parse_filter(params.event_type.as_deref())?,
        view: params
            .view
            .as_deref()
            .map(str::parse)
            .transpose()?
            .unwrap_or(CalendarView::Month),
        anchor,
    };

    let all = state.db.events().await?;
    let events = query.apply(&all).into_iter().map(EventView::from).collect();

    Ok(Json(EventListResponse {
        month: anchor.format("%Y-%m").to_string(),
        events,
    }))
}

#[derive(Debug, Serialize)]
pub struct DayEventsResponse {
    pub date: NaiveDate,
    pub events: Vec<EventView>,
}

async fn events_for_day(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(date): Path<String>,
) -> Result<Json<DayEventsResponse>> {
    let date = NaiveDate::parse_from_str(&date, DATE_FORMAT)
        .map_err(|_| AppError::Validation(format!("Invalid date '{date}'")))?;

    let all = state.db.events().await?;
    let events = events_on(&all, date).into_iter().map(EventView::from).collect();

    Ok(Json(DayEventsResponse { date, events }))
}
