pub mod auth;
pub mod comments;
pub mod dashboard;
pub mod events;
pub mod investments;
pub mod investors;
pub mod proposals;
