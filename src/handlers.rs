pub mod auth;
pub mod org;
pub mod plans;
pub mod reports;
