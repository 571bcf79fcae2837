pub mod user_repo;
pub use user_repo::UserRepository;
pub mod org_repo;
pub use org_repo::OrgRepository;
pub mod plan_repo;
pub use plan_repo::PlanRepository;
pub mod activity_repo;
pub use activity_repo::ActivityRepository;
pub mod report_repo;
pub use report_repo::ReportRepository;
