//! Aggregate figures for the overview page.

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::db::models::{Investment, InvestmentStatus, InvestmentType, Investor};

const ENDING_SOON_DAYS: i64 = 30;
const CLOSING_SOON_DAYS: i64 = 7;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioTotals {
    pub total_invested: i64,
    pub total_profit: i64,
    pub roi_percent: f64,
    pub active: usize,
    pub ending_soon: usize,
    pub pending_proposals: usize,
    pub closing_soon: usize,
}

impl PortfolioTotals {
    /// Proposals are not counted as invested money until they pass.
    pub fn new(investments: &[Investment], today: NaiveDate) -> Self {
        let funded = investments
            .iter()
            .filter(|inv| inv.status != InvestmentStatus::Proposed);

        let total_invested: i64 = funded.clone().map(|inv| inv.amount).sum();
        let total_profit: i64 = funded.filter_map(|inv| inv.profit).sum();

        let roi_percent = if total_invested == 0 {
            0.0
        } else {
            (total_profit as f64 / total_invested as f64 * 1000.0).round() / 10.0
        };

        let within = |date: NaiveDate, days: i64| date >= today && date <= today + Duration::days(days);

        let active: Vec<&Investment> = investments
            .iter()
            .filter(|inv| inv.status == InvestmentStatus::Active)
            .collect();
        let proposals: Vec<&Investment> = investments
            .iter()
            .filter(|inv| inv.status == InvestmentStatus::Proposed)
            .collect();

        Self {
            total_invested,
            total_profit,
            roi_percent,
            active: active.len(),
            ending_soon: active
                .iter()
                .filter(|inv| inv.end_date.is_some_and(|end| within(end, ENDING_SOON_DAYS)))
                .count(),
            pending_proposals: proposals.len(),
            closing_soon: proposals
                .iter()
                .filter(|inv| within(inv.start_date, CLOSING_SOON_DAYS))
                .count(),
        }
    }

    pub fn stat_cards(&self) -> Vec<StatCard> {
        vec![
            StatCard {
                title: "Total Investments",
                value: format_usd(self.total_invested),
                description: "Across all investment types".to_string(),
            },
            StatCard {
                title: "Total Profit",
                value: format_usd(self.total_profit),
                description: format!("{:.1}% return on investment", self.roi_percent),
            },
            StatCard {
                title: "Active Investments",
                value: self.active.to_string(),
                description: format!("{} ending in the next {ENDING_SOON_DAYS} days", self.ending_soon),
            },
            StatCard {
                title: "Pending Proposals",
                value: self.pending_proposals.to_string(),
                description: format!(
                    "{} {} ending soon",
                    self.closing_soon,
                    if self.closing_soon == 1 { "proposal" } else { "proposals" }
                ),
            },
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatCard {
    pub title: &'static str,
    pub value: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    #[serde(rename = "type")]
    pub investment_type: InvestmentType,
    pub label: &'static str,
    pub color: &'static str,
    pub value: i64,
    pub share_percent: u32,
}

/// Funded amount per category, in category order, skipping empty ones.
pub fn category_distribution(investments: &[Investment]) -> Vec<CategoryShare> {
    let funded: Vec<&Investment> = investments
        .iter()
        .filter(|inv| inv.status != InvestmentStatus::Proposed)
        .collect();
    let total: i64 = funded.iter().map(|inv| inv.amount).sum();

    InvestmentType::ALL
        .iter()
        .filter_map(|&kind| {
            let value: i64 = funded
                .iter()
                .filter(|inv| inv.investment_type == kind)
                .map(|inv| inv.amount)
                .sum();
            (value > 0).then(|| CategoryShare {
                investment_type: kind,
                label: kind.label(),
                color: kind.color(),
                value,
                share_percent: (value as f64 / total as f64 * 100.0).round() as u32,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestorStats {
    pub total_investors: usize,
    pub new_this_month: usize,
    pub top_contributor: Option<String>,
    pub average_contribution: f64,
}

impl InvestorStats {
    pub fn new(investors: &[Investor], today: NaiveDate) -> Self {
        let total: i64 = investors.iter().map(|i| i.total_contribution).sum();

        Self {
            total_investors: investors.len(),
            new_this_month: investors
                .iter()
                .filter(|i| i.join_date.year() == today.year() && i.join_date.month() == today.month())
                .count(),
            // First of equal contributors wins
            top_contributor: investors
                .iter()
                .rev()
                .max_by_key(|i| i.total_contribution)
                .map(|i| i.name.clone()),
            average_contribution: if investors.is_empty() {
                0.0
            } else {
                total as f64 / investors.len() as f64
            },
        }
    }
}

/// Whole-dollar USD with thousands separators, e.g. `-$8,500`.
pub fn format_usd(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    if value < 0 {
        format!("-${grouped}")
    } else {
        format!("${grouped}")
    }
}
