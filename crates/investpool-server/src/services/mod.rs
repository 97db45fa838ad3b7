pub mod calendar;
pub mod dashboard;
pub mod investors;
pub mod query;
pub mod sessions;
pub mod voting;
