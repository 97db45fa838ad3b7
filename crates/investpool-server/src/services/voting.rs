use chrono::NaiveDate;
use serde::Serialize;

use crate::db::models::Votes;

/// Proposals pass with strictly more than this share of positive votes.
pub const PASS_THRESHOLD: u32 = 50;

/// Length of the voting window, which closes on the proposal's start date.
pub const VOTING_PERIOD_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoteSummary {
    pub positive: u32,
    pub total: u32,
    pub percentage: u32,
    pub passing: bool,
}

impl Votes {
    /// Share of positive votes rounded half-up to a whole percent.
    /// An empty tally reads as 0%.
    pub fn percentage(&self) -> u32 {
        if self.total == 0 {
            return 0;
        }
        let (positive, total) = (u64::from(self.positive), u64::from(self.total));
        ((200 * positive + total) / (2 * total)) as u32
    }

    pub fn is_passing(&self) -> bool {
        self.percentage() > PASS_THRESHOLD
    }

    pub fn summary(&self) -> VoteSummary {
        VoteSummary {
            positive: self.positive,
            total: self.total,
            percentage: self.percentage(),
            passing: self.is_passing(),
        }
    }
}

pub fn remaining_voting_days(start_date: NaiveDate, today: NaiveDate) -> i64 {
    (start_date - today).num_days().clamp(0, VOTING_PERIOD_DAYS)
}
