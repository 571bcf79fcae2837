pub mod auth;
pub mod notification;
pub mod org_service;
pub mod plan_service;
pub mod report_service;
pub mod scope_service;
pub mod status;
