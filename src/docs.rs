// src/docs.rs

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::get_managed_users,

        // --- Org ---
        handlers::org::create_department,
        handlers::org::create_division,
        handlers::org::create_group,
        handlers::org::assign_position,

        // --- Plans ---
        handlers::plans::create_plan,
        handlers::plans::list_plans,
        handlers::plans::get_plan,
        handlers::plans::update_plan,
        handlers::plans::delete_plan,

        // --- Allocations ---
        handlers::plans::create_allocation,
        handlers::plans::remove_allocation,

        // --- Approval trail ---
        handlers::plans::submit_user_plan,
        handlers::plans::approve_user_plan,
        handlers::plans::reject_user_plan,
        handlers::plans::revoke_user_plan,
        handlers::plans::submit_condition,
        handlers::plans::approve_condition,
        handlers::plans::reject_condition,
        handlers::plans::revoke_condition,

        // --- Reports ---
        handlers::reports::create_report,
        handlers::reports::list_reports,
        handlers::reports::get_report,
        handlers::reports::update_report,
        handlers::reports::delete_report,
    ),
    components(
        schemas(
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::AuthResponse,
            models::org::Role,
            models::org::Department,
            models::org::Division,
            models::org::Group,
            models::org::CreateDepartmentPayload,
            models::org::CreateDivisionPayload,
            models::org::CreateGroupPayload,
            models::org::AssignPositionPayload,
            models::plan::Plan,
            models::plan::PlanCondition,
            models::plan::PlanStatus,
            models::plan::UserPlan,
            models::plan::UserPlanStatus,
            models::plan::UserPlanCondition,
            models::plan::UserPlanConditionStatus,
            models::plan::UserPlanActivity,
            models::plan::UserPlanConditionActivity,
            models::plan::ActivityStatus,
            models::plan::CreatePlanPayload,
            models::plan::UpdatePlanPayload,
            models::plan::PlanConditionInput,
            models::plan::CreateAllocationPayload,
            models::plan::TrailActionPayload,
            models::plan::PlanDetail,
            models::report::Report,
            models::report::CreateReportPayload,
            models::report::ReportTargetPayload,
            models::report::ReportDetail,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registro e login"),
        (name = "users", description = "Usuário autenticado e escopo gerenciado"),
        (name = "org", description = "Unidades organizacionais"),
        (name = "plans", description = "Ciclo de vida de planos"),
        (name = "allocations", description = "Alocação de planos a usuários"),
        (name = "trail", description = "Trilha de aprovação"),
        (name = "reports", description = "Relatórios e visibilidade"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}
