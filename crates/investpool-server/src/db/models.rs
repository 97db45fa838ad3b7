use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

// Text-backed enums. Rows store the wire name, so the same string is used for
// JSON, query parameters and the database.
macro_rules! string_enum {
    ($(#[$meta:meta])* $name:ident ($noun:literal) { $($variant:ident => $text:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = AppError;

            fn from_str(s: &str) -> Result<Self> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(AppError::Validation(format!(
                        concat!("Unknown ", $noun, " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

string_enum! {
    InvestmentType ("investment type") {
        Wine => "wine",
        RealEstate => "realestate",
        Cars => "cars",
        HighRisk => "highrisk",
        Rentals => "rentals",
        Companies => "companies",
        Websites => "websites",
    }
}

impl InvestmentType {
    pub fn label(self) -> &'static str {
        match self {
            InvestmentType::Wine => "Wine",
            InvestmentType::RealEstate => "Real Estate",
            InvestmentType::Cars => "Cars",
            InvestmentType::HighRisk => "High Risk",
            InvestmentType::Rentals => "Rentals",
            InvestmentType::Companies => "Companies",
            InvestmentType::Websites => "Websites",
        }
    }

    /// Chart colour used by the category distribution.
    pub fn color(self) -> &'static str {
        match self {
            InvestmentType::Wine => "#7E2553",
            InvestmentType::RealEstate => "#5D4037",
            InvestmentType::Cars => "#1976D2",
            InvestmentType::HighRisk => "#D32F2F",
            InvestmentType::Rentals => "#388E3C",
            InvestmentType::Companies => "#303F9F",
            InvestmentType::Websites => "#00796B",
        }
    }
}

string_enum! {
    InvestmentStatus ("investment status") {
        Active => "active",
        Proposed => "proposed",
        Completed => "completed",
    }
}

string_enum! {
    InvestorStatus ("investor status") {
        Active => "active",
        Inactive => "inactive",
    }
}

string_enum! {
    Role ("role") {
        Investor => "investor",
        Admin => "admin",
    }
}

impl Role {
    /// The mock login grants admin to any email mentioning "admin".
    pub fn for_email(email: &str) -> Self {
        if email.contains("admin") {
            Role::Admin
        } else {
            Role::Investor
        }
    }
}

string_enum! {
    EventType ("event type") {
        Completion => "completion",
        VoteDeadline => "vote_deadline",
        Payment => "payment",
        Valuation => "valuation",
        Maintenance => "maintenance",
        Showcase => "event",
        Deadline => "deadline",
    }
}

impl EventType {
    pub fn label(self) -> &'static str {
        match self {
            EventType::Completion => "Investment End",
            EventType::VoteDeadline => "Vote Deadline",
            EventType::Payment => "Payment",
            EventType::Valuation => "Valuation",
            EventType::Maintenance => "Maintenance",
            EventType::Showcase => "Event",
            EventType::Deadline => "Deadline",
        }
    }
}

string_enum! {
    RiskLevel ("risk level") {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

impl Default for RiskLevel {
    fn default() -> Self {
        RiskLevel::Medium
    }
}

string_enum! {
    PropertyType ("property type") {
        Residential => "residential",
        Commercial => "commercial",
        Mixed => "mixed",
        Land => "land",
    }
}

string_enum! {
    RentalPeriod ("rental period") {
        Hourly => "hourly",
        Daily => "daily",
        Weekly => "weekly",
        Monthly => "monthly",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Votes {
    pub total: u32,
    pub positive: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investment {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
    pub amount: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_percentage: Option<f64>,
    pub status: InvestmentStatus,
    pub start_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub votes: Option<Votes>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_src: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvestmentRow {
    pub id: String,
    pub title: String,
    pub investment_type: String,
    pub amount: i64,
    pub profit: Option<i64>,
    pub profit_percentage: Option<f64>,
    pub status: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub votes_total: Option<i64>,
    pub votes_positive: Option<i64>,
    pub image_src: Option<String>,
}

impl TryFrom<InvestmentRow> for Investment {
    type Error = AppError;

    fn try_from(row: InvestmentRow) -> Result<Self> {
        let votes = match (row.votes_total, row.votes_positive) {
            (Some(total), Some(positive)) => Some(Votes {
                total: count_column(total)?,
                positive: count_column(positive)?,
            }),
            _ => None,
        };

        Ok(Self {
            investment_type: stored(&row.investment_type)?,
            status: stored(&row.status)?,
            start_date: parse_date(&row.start_date)?,
            end_date: row.end_date.as_deref().map(parse_date).transpose()?,
            id: row.id,
            title: row.title,
            amount: row.amount,
            profit: row.profit,
            profit_percentage: row.profit_percentage,
            votes,
            image_src: row.image_src,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub name: String,
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Milestone {
    pub title: String,
    pub date: NaiveDate,
}

/// Fields only some investment types collect.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDetails {
    RealEstate {
        property_type: PropertyType,
        is_fully_rented: bool,
        purchase_price: Option<i64>,
        monthly_income: Option<i64>,
    },
    Rental {
        item_name: String,
        rental_price: Option<i64>,
        rental_period: RentalPeriod,
        breakeven_rentals: Option<u32>,
    },
}

impl TypeDetails {
    pub fn investment_type(&self) -> InvestmentType {
        match self {
            TypeDetails::RealEstate { .. } => InvestmentType::RealEstate,
            TypeDetails::Rental { .. } => InvestmentType::Rentals,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentDetail {
    pub description: String,
    pub expected_return: f64,
    pub risk_level: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub team: Vec<TeamMember>,
    pub documents: Vec<Document>,
    pub milestones: Vec<Milestone>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_details: Option<TypeDetails>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvestmentDetailRow {
    pub description: String,
    pub expected_return: f64,
    pub risk_level: String,
    pub funding_stage: Option<String>,
    pub location: Option<String>,
    pub team: String,
    pub documents: String,
    pub milestones: String,
    pub type_details: Option<String>,
}

impl TryFrom<InvestmentDetailRow> for InvestmentDetail {
    type Error = AppError;

    fn try_from(row: InvestmentDetailRow) -> Result<Self> {
        Ok(Self {
            risk_level: stored(&row.risk_level)?,
            team: json_column(&row.team)?,
            documents: json_column(&row.documents)?,
            milestones: json_column(&row.milestones)?,
            type_details: row.type_details.as_deref().map(json_column).transpose()?,
            description: row.description,
            expected_return: row.expected_return,
            funding_stage: row.funding_stage,
            location: row.location,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Investor {
    pub id: String,
    pub name: String,
    pub email: String,
    pub total_contribution: i64,
    pub join_date: NaiveDate,
    pub status: InvestorStatus,
    pub last_activity: NaiveDate,
    pub investment_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InvestorRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub total_contribution: i64,
    pub join_date: String,
    pub status: String,
    pub last_activity: String,
    pub investment_count: i64,
    pub avatar: Option<String>,
}

impl TryFrom<InvestorRow> for Investor {
    type Error = AppError;

    fn try_from(row: InvestorRow) -> Result<Self> {
        Ok(Self {
            join_date: parse_date(&row.join_date)?,
            status: stored(&row.status)?,
            last_activity: parse_date(&row.last_activity)?,
            id: row.id,
            name: row.name,
            email: row.email,
            total_contribution: row.total_contribution,
            investment_count: row.investment_count,
            avatar: row.avatar,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInvestment {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub investment: Option<EventInvestment>,
}

impl Event {
    /// Dashboard route of the linked investment.
    pub fn link(&self) -> Option<String> {
        self.investment
            .as_ref()
            .map(|inv| format!("/investments/{}/{}", inv.investment_type, inv.id))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EventRow {
    pub id: String,
    pub title: String,
    pub event_date: String,
    pub event_type: String,
    pub description: Option<String>,
    pub investment_id: Option<String>,
    pub investment_title: Option<String>,
    pub investment_type: Option<String>,
}

impl TryFrom<EventRow> for Event {
    type Error = AppError;

    fn try_from(row: EventRow) -> Result<Self> {
        let investment = match (row.investment_id, row.investment_title, row.investment_type) {
            (Some(id), Some(title), Some(kind)) => Some(EventInvestment {
                id,
                title,
                investment_type: stored(&kind)?,
            }),
            _ => None,
        };

        Ok(Self {
            date: parse_date(&row.event_date)?,
            event_type: stored(&row.event_type)?,
            id: row.id,
            title: row.title,
            description: row.description,
            investment,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentAuthor {
    pub name: String,
    pub initials: String,
}

impl CommentAuthor {
    pub fn new(name: &str) -> Self {
        let initials = name
            .split_whitespace()
            .filter_map(|part| part.chars().next())
            .flat_map(char::to_uppercase)
            .take(2)
            .collect();

        Self {
            name: name.to_string(),
            initials,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub investment_id: String,
    pub text: String,
    pub author: CommentAuthor,
    pub is_admin: bool,
    pub timestamp: NaiveDateTime,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CommentRow {
    pub id: String,
    pub investment_id: String,
    pub author_name: String,
    pub is_admin: bool,
    pub content: String,
    pub created_at: String,
}

impl TryFrom<CommentRow> for Comment {
    type Error = AppError;

    fn try_from(row: CommentRow) -> Result<Self> {
        let timestamp = NaiveDateTime::parse_from_str(&row.created_at, TIMESTAMP_FORMAT)
            .map_err(|e| AppError::Internal(format!("Bad stored timestamp '{}': {e}", row.created_at)))?;

        Ok(Self {
            author: CommentAuthor::new(&row.author_name),
            id: row.id,
            investment_id: row.investment_id,
            text: row.content,
            is_admin: row.is_admin,
            timestamp,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProfitPoint {
    pub label: String,
    pub profit: i64,
}

/// Signed-in user. Lives only in the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
        .map_err(|e| AppError::Internal(format!("Bad stored date '{value}': {e}")))
}

// A stored enum that fails to parse means the table is corrupt, not that the
// caller sent bad input.
fn stored<T: std::str::FromStr<Err = AppError>>(value: &str) -> Result<T> {
    value.parse().map_err(|e: AppError| AppError::Internal(e.to_string()))
}

fn count_column(value: i64) -> Result<u32> {
    u32::try_from(value).map_err(|_| AppError::Internal(format!("Bad stored vote count {value}")))
}

fn json_column<T: serde::de::DeserializeOwned>(value: &str) -> Result<T> {
    serde_json::from_str(value)
        .map_err(|e| AppError::Internal(format!("Bad stored JSON column: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn investment_type_round_trips_wire_names() {
        for kind in InvestmentType::ALL {
            assert_eq!(kind.as_str().parse::<InvestmentType>().unwrap(), *kind);
        }
        assert!("boats".parse::<InvestmentType>().is_err());
    }

    #[test]
    fn admin_role_comes_from_email() {
        assert_eq!(Role::for_email("admin@pool.io"), Role::Admin);
        assert_eq!(Role::for_email("jane@pool.io"), Role::Investor);
    }

    #[test]
    fn comment_initials_use_first_two_words() {
        assert_eq!(CommentAuthor::new("Emily Johnson").initials, "EJ");
        assert_eq!(CommentAuthor::new("cher").initials, "C");
    }

    #[test]
    fn row_without_votes_or_profit_converts() {
        let row = InvestmentRow {
            id: "2".into(),
            title: "Downtown Apartment".into(),
            investment_type: "realestate".into(),
            amount: 250_000,
            profit: None,
            profit_percentage: None,
            status: "active".into(),
            start_date: "2022-03-10".into(),
            end_date: None,
            votes_total: None,
            votes_positive: Some(3),
            image_src: None,
        };

        let investment = Investment::try_from(row).unwrap();
        assert_eq!(investment.investment_type, InvestmentType::RealEstate);
        assert!(investment.votes.is_none());
        assert!(investment.profit.is_none());
    }

    #[test]
    fn event_link_points_at_detail_route() {
        let event = Event {
            id: "e1".into(),
            title: "Matures".into(),
            date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
            event_type: EventType::Completion,
            description: None,
            investment: Some(EventInvestment {
                id: "1".into(),
                title: "Luxury Cabernet Collection".into(),
                investment_type: InvestmentType::Wine,
            }),
        };
        assert_eq!(event.link().as_deref(), Some("/investments/wine/1"));
    }
}
