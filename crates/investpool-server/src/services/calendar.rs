use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::{
    db::models::{Event, EventType},
    error::{AppError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CalendarView {
    #[default]
    Month,
    List,
}

impl FromStr for CalendarView {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "month" => Ok(CalendarView::Month),
            "list" => Ok(CalendarView::List),
            other => Err(AppError::Validation(format!("Unknown calendar view '{other}'"))),
        }
    }
}

/// Parses a `YYYY-MM` month into its first day.
pub fn parse_month(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(&format!("{value}-01"), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("Month must look like 2024-06, got '{value}'")))
}

#[derive(Debug, Clone)]
pub struct EventQuery {
    pub event_type: Option<EventType>,
    pub view: CalendarView,
    /// Any day inside the month shown by the month view.
    pub anchor: NaiveDate,
}

impl EventQuery {
    pub fn matches(&self, event: &Event) -> bool {
        if self.event_type.is_some_and(|kind| event.event_type != kind) {
            return false;
        }

        match self.view {
            CalendarView::Month => {
                event.date.year() == self.anchor.year() && event.date.month() == self.anchor.month()
            }
            CalendarView::List => true,
        }
    }

    pub fn apply<'a>(&self, events: &'a [Event]) -> Vec<&'a Event> {
        let mut results: Vec<&Event> = events.iter().filter(|e| self.matches(e)).collect();
        results.sort_by_key(|e| e.date);
        results
    }
}

pub fn events_on(events: &[Event], day: NaiveDate) -> Vec<&Event> {
    events.iter().filter(|e| e.date == day).collect()
}

/// Events on or after `today`, soonest first.
pub fn upcoming(events: &[Event], today: NaiveDate, limit: usize) -> Vec<&Event> {
    let mut results: Vec<&Event> = events.iter().filter(|e| e.date >= today).collect();
    results.sort_by_key(|e| e.date);
    results.truncate(limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: &str, date: (i32, u32, u32), kind: EventType) -> Event {
        Event {
            id: id.to_string(),
            title: id.to_uppercase(),
            date: NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap(),
            event_type: kind,
            description: None,
            investment: None,
        }
    }

    fn july() -> Vec<Event> {
        vec![
            event("valuation", (2023, 7, 5), EventType::Valuation),
            event("inspection", (2023, 7, 12), EventType::Maintenance),
            event("income", (2023, 7, 15), EventType::Payment),
            event("deadline", (2023, 7, 25), EventType::Deadline),
            event("rent", (2024, 6, 5), EventType::Payment),
        ]
    }

    fn ids(events: &[&Event]) -> Vec<String> {
        events.iter().map(|e| e.id.clone()).collect()
    }

    #[test]
    fn month_view_keeps_anchor_month_only() {
        let events = july();
        let query = EventQuery {
            event_type: None,
            view: CalendarView::Month,
            anchor: parse_month("2023-07").unwrap(),
        };
        assert_eq!(
            ids(&query.apply(&events)),
            ["valuation", "inspection", "income", "deadline"]
        );
    }

    #[test]
    fn type_filter_applies_in_list_view() {
        let events = july();
        let query = EventQuery {
            event_type: Some(EventType::Payment),
            view: CalendarView::List,
            anchor: parse_month("2023-07").unwrap(),
        };
        assert_eq!(ids(&query.apply(&events)), ["income", "rent"]);
    }

    #[test]
    fn same_month_other_year_is_excluded() {
        let events = vec![event("old", (2022, 7, 5), EventType::Valuation)];
        let query = EventQuery {
            event_type: None,
            view: CalendarView::Month,
            anchor: parse_month("2023-07").unwrap(),
        };
        assert!(query.apply(&events).is_empty());
    }

    #[test]
    fn day_lookup_and_upcoming() {
        let events = july();
        let day = NaiveDate::from_ymd_opt(2023, 7, 12).unwrap();
        assert_eq!(ids(&events_on(&events, day)), ["inspection"]);

        let soon = upcoming(&events, day, 2);
        assert_eq!(ids(&soon), ["inspection", "income"]);
    }

    #[test]
    fn rejects_malformed_month() {
        assert!(parse_month("July").is_err());
        assert!(parse_month("2023-13").is_err());
    }
}
