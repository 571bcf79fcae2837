pub mod auth;
pub mod org;
pub mod plan;
pub mod report;
