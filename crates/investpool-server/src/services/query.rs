//! Investment list query: filter by type, status and title search, then order
//! by a named sort key.
//!
//! The pipeline never mutates its input and is cheap enough to rerun on every
//! request.

use std::{cmp::Ordering, str::FromStr};

use crate::{
    db::models::{Investment, InvestmentStatus, InvestmentType},
    error::{AppError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Newest,
    Oldest,
    Highest,
    Lowest,
    Profit,
    Loss,
    Votes,
}

impl FromStr for SortKey {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "newest" => Ok(SortKey::Newest),
            "oldest" => Ok(SortKey::Oldest),
            "highest" => Ok(SortKey::Highest),
            "lowest" => Ok(SortKey::Lowest),
            "profit" => Ok(SortKey::Profit),
            "loss" => Ok(SortKey::Loss),
            "votes" => Ok(SortKey::Votes),
            other => Err(AppError::Validation(format!("Unknown sort option '{other}'"))),
        }
    }
}

impl SortKey {
    pub fn compare(self, a: &Investment, b: &Investment) -> Ordering {
        match self {
            SortKey::Newest => b.start_date.cmp(&a.start_date),
            SortKey::Oldest => a.start_date.cmp(&b.start_date),
            SortKey::Highest => b.amount.cmp(&a.amount),
            SortKey::Lowest => a.amount.cmp(&b.amount),
            SortKey::Profit => profit_of(b).cmp(&profit_of(a)),
            SortKey::Loss => profit_of(a).cmp(&profit_of(b)),
            SortKey::Votes => votes_of(b).cmp(&votes_of(a)),
        }
    }
}

fn profit_of(investment: &Investment) -> i64 {
    investment.profit.unwrap_or(0)
}

// Records without a tally sort as if nobody had voted.
fn votes_of(investment: &Investment) -> u32 {
    investment.votes.map_or(0, |v| v.total)
}

/// Parses an optional filter value where empty and `"all"` mean no filter.
pub fn parse_filter<T>(value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr<Err = AppError>,
{
    match value.map(str::trim) {
        None | Some("") | Some("all") => Ok(None),
        Some(v) => v.parse().map(Some),
    }
}

#[derive(Debug, Clone, Default)]
pub struct InvestmentQuery {
    pub investment_type: Option<InvestmentType>,
    pub status: Option<InvestmentStatus>,
    pub search: String,
    pub sort: SortKey,
}

impl InvestmentQuery {
    pub fn matches(&self, investment: &Investment) -> bool {
        if self
            .investment_type
            .is_some_and(|kind| investment.investment_type != kind)
        {
            return false;
        }

        if self.status.is_some_and(|status| investment.status != status) {
            return false;
        }

        self.search.is_empty()
            || investment
                .title
                .to_lowercase()
                .contains(&self.search.to_lowercase())
    }

    /// Filters then stable-sorts `source`; ties keep source order.
    pub fn apply<'a>(&self, source: &'a [Investment]) -> Vec<&'a Investment> {
        let mut results: Vec<&Investment> =
            source.iter().filter(|inv| self.matches(inv)).collect();
        results.sort_by(|a, b| self.sort.compare(a, b));
        results
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::db::models::Votes;

    fn investment(id: &str, title: &str, kind: InvestmentType, amount: i64) -> Investment {
        Investment {
            id: id.to_string(),
            title: title.to_string(),
            investment_type: kind,
            amount,
            profit: None,
            profit_percentage: None,
            status: InvestmentStatus::Active,
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            end_date: None,
            votes: None,
            image_src: None,
        }
    }

    fn sample() -> Vec<Investment> {
        let mut cabernet = investment("1", "Luxury Cabernet Collection", InvestmentType::Wine, 12_500);
        cabernet.profit = Some(2_300);
        cabernet.start_date = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();

        let mut apartment = investment("2", "Downtown Apartment", InvestmentType::RealEstate, 250_000);
        apartment.profit = Some(12_000);
        apartment.start_date = NaiveDate::from_ymd_opt(2022, 3, 10).unwrap();

        let mut fleet = investment("3", "Premium Electric Vehicle Fleet", InvestmentType::Cars, 180_000);
        fleet.profit = Some(-8_500);
        fleet.start_date = NaiveDate::from_ymd_opt(2023, 1, 20).unwrap();

        let mut startup = investment("4", "Tech Startup Investment", InvestmentType::HighRisk, 50_000);
        startup.status = InvestmentStatus::Proposed;
        startup.start_date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        startup.votes = Some(Votes { total: 15, positive: 9 });

        vec![cabernet, apartment, fleet, startup]
    }

    fn ids(results: &[&Investment]) -> Vec<String> {
        results.iter().map(|inv| inv.id.clone()).collect()
    }

    #[test]
    fn lowest_orders_amounts_ascending() {
        let source = sample();
        let query = InvestmentQuery {
            sort: SortKey::Lowest,
            ..Default::default()
        };

        let amounts: Vec<i64> = query.apply(&source).iter().map(|inv| inv.amount).collect();
        assert_eq!(amounts, [12_500, 50_000, 180_000, 250_000]);
    }

    #[test]
    fn highest_is_non_increasing() {
        let source = sample();
        let query = InvestmentQuery {
            sort: SortKey::Highest,
            ..Default::default()
        };

        let results = query.apply(&source);
        assert!(results.windows(2).all(|w| w[0].amount >= w[1].amount));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let source = sample();
        let query = InvestmentQuery {
            search: "APART".to_string(),
            ..Default::default()
        };

        let results = query.apply(&source);
        assert_eq!(ids(&results), ["2"]);
        for inv in source.iter().filter(|inv| inv.id != "2") {
            assert!(!inv.title.to_lowercase().contains("apart"));
        }
    }

    #[test]
    fn filters_combine_with_and() {
        let source = sample();
        let query = InvestmentQuery {
            investment_type: Some(InvestmentType::HighRisk),
            status: Some(InvestmentStatus::Active),
            ..Default::default()
        };
        assert!(query.apply(&source).is_empty());

        let query = InvestmentQuery {
            investment_type: Some(InvestmentType::HighRisk),
            status: Some(InvestmentStatus::Proposed),
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&source)), ["4"]);
    }

    #[test]
    fn missing_profit_sorts_as_zero() {
        let source = sample();
        let profit = InvestmentQuery {
            sort: SortKey::Profit,
            ..Default::default()
        };
        assert_eq!(ids(&profit.apply(&source)), ["2", "1", "4", "3"]);

        let loss = InvestmentQuery {
            sort: SortKey::Loss,
            ..Default::default()
        };
        assert_eq!(ids(&loss.apply(&source)), ["3", "4", "1", "2"]);
    }

    #[test]
    fn newest_and_oldest_follow_start_date() {
        let source = sample();
        let newest = InvestmentQuery::default();
        assert_eq!(ids(&newest.apply(&source)), ["4", "1", "3", "2"]);

        let oldest = InvestmentQuery {
            sort: SortKey::Oldest,
            ..Default::default()
        };
        assert_eq!(ids(&oldest.apply(&source)), ["2", "3", "1", "4"]);
    }

    #[test]
    fn ties_keep_source_order() {
        let source = vec![
            investment("a", "First", InvestmentType::Wine, 100),
            investment("b", "Second", InvestmentType::Wine, 100),
            investment("c", "Third", InvestmentType::Wine, 100),
        ];
        for sort in [SortKey::Highest, SortKey::Lowest, SortKey::Profit, SortKey::Votes] {
            let query = InvestmentQuery {
                sort,
                ..Default::default()
            };
            assert_eq!(ids(&query.apply(&source)), ["a", "b", "c"]);
        }
    }

    #[test]
    fn votes_sort_puts_untallied_last() {
        let source = sample();
        let query = InvestmentQuery {
            sort: SortKey::Votes,
            ..Default::default()
        };
        assert_eq!(ids(&query.apply(&source))[0], "4");
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let query = InvestmentQuery {
            search: "anything".to_string(),
            sort: SortKey::Loss,
            ..Default::default()
        };
        assert!(query.apply(&[]).is_empty());
    }

    #[test]
    fn source_is_left_untouched() {
        let source = sample();
        let before = ids(&source.iter().collect::<Vec<_>>());
        let _ = InvestmentQuery {
            sort: SortKey::Highest,
            ..Default::default()
        }
        .apply(&source);
        assert_eq!(ids(&source.iter().collect::<Vec<_>>()), before);
    }

    #[test]
    fn parse_filter_treats_all_as_absent() {
        assert_eq!(parse_filter::<InvestmentType>(Some("all")).unwrap(), None);
        assert_eq!(parse_filter::<InvestmentType>(None).unwrap(), None);
        assert_eq!(
            parse_filter::<InvestmentType>(Some("wine")).unwrap(),
            Some(InvestmentType::Wine)
        );
        assert!(parse_filter::<InvestmentType>(Some("yachts")).is_err());
        assert!("sideways".parse::<SortKey>().is_err());
    }
}
