//! Investor table: search, column sort with click-to-toggle direction, and the
//! summary figures shown under the table.

use std::{cmp::Ordering, str::FromStr};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

use crate::{
    db::models::Investor,
    error::{AppError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvestorField {
    Name,
    Email,
    TotalContribution,
    JoinDate,
    Status,
    LastActivity,
    InvestmentCount,
}

impl FromStr for InvestorField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(InvestorField::Name),
            "email" => Ok(InvestorField::Email),
            "total_contribution" => Ok(InvestorField::TotalContribution),
            "join_date" => Ok(InvestorField::JoinDate),
            "status" => Ok(InvestorField::Status),
            "last_activity" => Ok(InvestorField::LastActivity),
            "investment_count" => Ok(InvestorField::InvestmentCount),
            other => Err(AppError::Validation(format!("Cannot sort investors by '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortState {
    pub field: InvestorField,
    pub direction: SortDirection,
}

impl Default for SortState {
    fn default() -> Self {
        Self {
            field: InvestorField::Name,
            direction: SortDirection::Asc,
        }
    }
}

impl SortState {
    /// Clicking the active column flips direction; any other column becomes
    /// active in ascending order.
    pub fn click(self, field: InvestorField) -> Self {
        if field == self.field {
            Self {
                field,
                direction: self.direction.flipped(),
            }
        } else {
            Self {
                field,
                direction: SortDirection::Asc,
            }
        }
    }

    pub fn compare(&self, a: &Investor, b: &Investor) -> Ordering {
        let ordering = field_value(a, self.field).compare(&field_value(b, self.field));
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

enum FieldValue<'a> {
    Text(&'a str),
    Number(i64),
    Date(NaiveDate),
}

impl FieldValue<'_> {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (FieldValue::Text(a), FieldValue::Text(b)) => locale_compare(a, b),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

fn field_value(investor: &Investor, field: InvestorField) -> FieldValue<'_> {
    match field {
        InvestorField::Name => FieldValue::Text(&investor.name),
        InvestorField::Email => FieldValue::Text(&investor.email),
        InvestorField::TotalContribution => FieldValue::Number(investor.total_contribution),
        InvestorField::JoinDate => FieldValue::Date(investor.join_date),
        InvestorField::Status => FieldValue::Text(investor.status.as_str()),
        InvestorField::LastActivity => FieldValue::Date(investor.last_activity),
        InvestorField::InvestmentCount => FieldValue::Number(investor.investment_count),
    }
}

/// Collator-style ordering in three passes: base letters with accents and
/// case removed, then accents, then case (lowercase first).
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| folded(a).cmp(folded(b)))
        .then_with(|| {
            a.nfd()
                .zip(b.nfd())
                .find(|(x, y)| x != y)
                .map_or(Ordering::Equal, |(x, y)| {
                    match (x.is_lowercase(), y.is_lowercase()) {
                        (true, false) => Ordering::Less,
                        (false, true) => Ordering::Greater,
                        _ => x.cmp(&y),
                    }
                })
        })
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

// Decomposed and lowercased, so an unaccented letter sorts before its
// accented forms.
fn folded(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

pub fn matches_search(investor: &Investor, search: &str) -> bool {
    let needle = search.to_lowercase();
    investor.name.to_lowercase().contains(&needle) || investor.email.to_lowercase().contains(&needle)
}

pub fn search_and_sort<'a>(investors: &'a [Investor], search: &str, sort: SortState) -> Vec<&'a Investor> {
    let mut rows: Vec<&Investor> = investors
        .iter()
        .filter(|investor| matches_search(investor, search))
        .collect();
    rows.sort_by(|a, b| sort.compare(a, b));
    rows
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvestorSummary {
    pub showing: usize,
    pub total: usize,
    pub total_contribution: i64,
    pub average_contribution: f64,
    pub total_investments: i64,
}

impl InvestorSummary {
    /// Totals cover every investor; `showing` counts the rows left after search.
    pub fn new(all: &[Investor], showing: usize) -> Self {
        let total_contribution: i64 = all.iter().map(|i| i.total_contribution).sum();
        let average_contribution = if all.is_empty() {
            0.0
        } else {
            total_contribution as f64 / all.len() as f64
        };

        Self {
            showing,
            total: all.len(),
            total_contribution,
            average_contribution,
            total_investments: all.iter().map(|i| i.investment_count).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::InvestorStatus;

    fn investor(id: &str, name: &str, contribution: i64, count: i64) -> Investor {
        Investor {
            id: id.to_string(),
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            total_contribution: contribution,
            join_date: NaiveDate::from_ymd_opt(2022, 1, 1).unwrap(),
            status: InvestorStatus::Active,
            last_activity: NaiveDate::from_ymd_opt(2023, 6, 1).unwrap(),
            investment_count: count,
            avatar: None,
        }
    }

    fn table() -> Vec<Investor> {
        vec![
            investor("1", "John Smith", 75_000, 5),
            investor("2", "Emily Johnson", 120_000, 8),
            investor("3", "Michael Lee", 50_000, 3),
            investor("4", "sarah Miller", 250_000, 12),
        ]
    }

    fn names(rows: &[&Investor]) -> Vec<String> {
        rows.iter().map(|i| i.name.clone()).collect()
    }

    #[test]
    fn click_toggles_active_column_and_resets_new_one() {
        let state = SortState::default();
        let flipped = state.click(InvestorField::Name);
        assert_eq!(flipped.direction, SortDirection::Desc);

        let contribution = flipped.click(InvestorField::TotalContribution);
        assert_eq!(contribution.field, InvestorField::TotalContribution);
        assert_eq!(contribution.direction, SortDirection::Asc);

        let back = contribution.click(InvestorField::TotalContribution);
        assert_eq!(back.direction, SortDirection::Desc);
    }

    #[test]
    fn names_sort_ignoring_case() {
        let investors = table();
        let rows = search_and_sort(&investors, "", SortState::default());
        assert_eq!(
            names(&rows),
            ["Emily Johnson", "John Smith", "Michael Lee", "sarah Miller"]
        );
    }

    #[test]
    fn numeric_columns_sort_arithmetically() {
        let investors = table();
        let sort = SortState {
            field: InvestorField::TotalContribution,
            direction: SortDirection::Desc,
        };
        let amounts: Vec<i64> = search_and_sort(&investors, "", sort)
            .iter()
            .map(|i| i.total_contribution)
            .collect();
        assert_eq!(amounts, [250_000, 120_000, 75_000, 50_000]);
    }

    #[test]
    fn search_matches_name_or_email() {
        let investors = table();
        let rows = search_and_sort(&investors, "LEE", SortState::default());
        assert_eq!(names(&rows), ["Michael Lee"]);

        let rows = search_and_sort(&investors, "emily.johnson@", SortState::default());
        assert_eq!(names(&rows), ["Emily Johnson"]);
    }

    #[test]
    fn locale_compare_orders_lowercase_first_on_ties() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("Same", "Same"), Ordering::Equal);
    }

    #[test]
    fn accented_names_sort_with_their_base_letter() {
        assert_eq!(locale_compare("Émile", "Fred"), Ordering::Less);
        assert_eq!(locale_compare("Zoe", "Émile"), Ordering::Greater);
        assert_eq!(locale_compare("Emile", "Émile"), Ordering::Less);
        assert_eq!(locale_compare("émile", "Émile"), Ordering::Less);

        let investors = vec![
            investor("1", "Zoe Adams", 10_000, 1),
            investor("2", "Émile Zola", 20_000, 1),
            investor("3", "Fred Olsen", 30_000, 1),
            investor("4", "Ángela Ruiz", 40_000, 1),
        ];
        let rows = search_and_sort(&investors, "", SortState::default());
        assert_eq!(
            names(&rows),
            ["Ángela Ruiz", "Émile Zola", "Fred Olsen", "Zoe Adams"]
        );
    }

    #[test]
    fn summary_totals_whole_table() {
        let investors = table();
        let summary = InvestorSummary::new(&investors, 1);
        assert_eq!(summary.showing, 1);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.total_contribution, 495_000);
        assert_eq!(summary.average_contribution, 123_750.0);
        assert_eq!(summary.total_investments, 28);
    }

    #[test]
    fn summary_of_empty_table_averages_zero() {
        let summary = InvestorSummary::new(&[], 0);
        assert_eq!(summary.average_contribution, 0.0);
    }
}
