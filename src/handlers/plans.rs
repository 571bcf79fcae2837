// src/handlers/plans.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::ActorContext,
    models::plan::{
        CreateAllocationPayload, CreatePlanPayload, Plan, PlanDetail, TrailActionPayload,
        UpdatePlanPayload, UserPlan, UserPlanActivity, UserPlanConditionActivity,
    },
};

// ---
// Ciclo de vida do plano
// ---

// POST /api/plans
#[utoipa::path(
    post,
    path = "/api/plans",
    request_body = CreatePlanPayload,
    responses(
        (status = 201, description = "Plano criado", body = PlanDetail),
        (status = 404, description = "Criador sem departamento"),
    ),
    security(("bearer_auth" = [])),
    tag = "plans"
)]
pub async fn create_plan(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreatePlanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state.plan_service.create_plan(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/plans
#[utoipa::path(
    get,
    path = "/api/plans",
    responses((status = 200, description = "Planos visíveis ao ator", body = [Plan])),
    security(("bearer_auth" = [])),
    tag = "plans"
)]
pub async fn list_plans(
    State(app_state): State<AppState>,
    actor: ActorContext,
) -> Result<impl IntoResponse, AppError> {
    let plans = app_state.plan_service.list_plans(&actor).await?;
    Ok(Json(plans))
}

// GET /api/plans/{plan_id}
#[utoipa::path(
    get,
    path = "/api/plans/{plan_id}",
    params(("plan_id" = Uuid, Path, description = "Plano")),
    responses(
        (status = 200, description = "Detalhe do plano", body = PlanDetail),
        (status = 404, description = "Plano não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "plans"
)]
pub async fn get_plan(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.plan_service.get_plan(&actor, plan_id).await?;
    Ok(Json(detail))
}

// PUT /api/plans/{plan_id}
#[utoipa::path(
    put,
    path = "/api/plans/{plan_id}",
    request_body = UpdatePlanPayload,
    params(("plan_id" = Uuid, Path, description = "Plano")),
    responses(
        (status = 200, description = "Plano atualizado", body = PlanDetail),
        (status = 403, description = "Plano congelado (já possui alocações)"),
    ),
    security(("bearer_auth" = [])),
    tag = "plans"
)]
pub async fn update_plan(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<UpdatePlanPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state
        .plan_service
        .update_plan(&actor, plan_id, payload)
        .await?;
    Ok(Json(detail))
}

// DELETE /api/plans/{plan_id}
#[utoipa::path(
    delete,
    path = "/api/plans/{plan_id}",
    params(("plan_id" = Uuid, Path, description = "Plano")),
    responses(
        (status = 204, description = "Plano removido"),
        (status = 403, description = "Plano congelado (já possui alocações)"),
    ),
    security(("bearer_auth" = [])),
    tag = "plans"
)]
pub async fn delete_plan(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(plan_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.plan_service.delete_plan(&actor, plan_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Alocações
// ---

// POST /api/plans/{plan_id}/allocations
#[utoipa::path(
    post,
    path = "/api/plans/{plan_id}/allocations",
    request_body = CreateAllocationPayload,
    params(("plan_id" = Uuid, Path, description = "Plano")),
    responses(
        (status = 201, description = "Alocação criada", body = UserPlan),
        (status = 403, description = "Alvo não é Member ou está fora do escopo"),
        (status = 409, description = "Alocação já existe"),
    ),
    security(("bearer_auth" = [])),
    tag = "allocations"
)]
pub async fn create_allocation(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(plan_id): Path<Uuid>,
    Json(payload): Json<CreateAllocationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user_plan = app_state
        .plan_service
        .create_allocation(&actor, plan_id, payload.user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(user_plan)))
}

// DELETE /api/plans/{plan_id}/allocations/{user_id}
#[utoipa::path(
    delete,
    path = "/api/plans/{plan_id}/allocations/{user_id}",
    params(
        ("plan_id" = Uuid, Path, description = "Plano"),
        ("user_id" = Uuid, Path, description = "Usuário alocado"),
    ),
    responses(
        (status = 204, description = "Alocação removida"),
        (status = 409, description = "Condição alterada: há aprovação não revogada"),
    ),
    security(("bearer_auth" = [])),
    tag = "allocations"
)]
pub async fn remove_allocation(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path((plan_id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .plan_service
        .remove_allocation(&actor, plan_id, user_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---
// Trilha de aprovação — alocação inteira
// ---

// POST /api/user-plans/{id}/submit
#[utoipa::path(
    post,
    path = "/api/user-plans/{id}/submit",
    request_body = TrailActionPayload,
    params(("id" = Uuid, Path, description = "Alocação")),
    responses((status = 201, description = "Submissão registrada", body = UserPlanActivity)),
    security(("bearer_auth" = [])),
    tag = "trail"
)]
pub async fn submit_user_plan(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<TrailActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let activity = app_state
        .plan_service
        .submit_user_plan(&actor, id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// POST /api/user-plans/{id}/approve
#[utoipa::path(
    post,
    path = "/api/user-plans/{id}/approve",
    request_body = TrailActionPayload,
    params(("id" = Uuid, Path, description = "Alocação")),
    responses((status = 201, description = "Aprovação registrada", body = UserPlanActivity)),
    security(("bearer_auth" = [])),
    tag = "trail"
)]
pub async fn approve_user_plan(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<TrailActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let activity = app_state
        .plan_service
        .decide_user_plan(&actor, id, true, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// POST /api/user-plans/{id}/reject
#[utoipa::path(
    post,
    path = "/api/user-plans/{id}/reject",
    request_body = TrailActionPayload,
    params(("id" = Uuid, Path, description = "Alocação")),
    responses((status = 201, description = "Rejeição registrada", body = UserPlanActivity)),
    security(("bearer_auth" = [])),
    tag = "trail"
)]
pub async fn reject_user_plan(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<TrailActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let activity = app_state
        .plan_service
        .decide_user_plan(&actor, id, false, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// POST /api/user-plans/{id}/revoke
#[utoipa::path(
    post,
    path = "/api/user-plans/{id}/revoke",
    params(("id" = Uuid, Path, description = "Alocação")),
    responses(
        (status = 201, description = "Decisão revogada", body = UserPlanActivity),
        (status = 404, description = "Nenhuma decisão revogável"),
    ),
    security(("bearer_auth" = [])),
    tag = "trail"
)]
pub async fn revoke_user_plan(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let activity = app_state.plan_service.revoke_user_plan(&actor, id).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// ---
// Trilha de aprovação — por condição
// ---

// POST /api/user-plan-conditions/{id}/submit
#[utoipa::path(
    post,
    path = "/api/user-plan-conditions/{id}/submit",
    request_body = TrailActionPayload,
    params(("id" = Uuid, Path, description = "Condição da alocação")),
    responses((status = 201, description = "Submissão registrada", body = UserPlanConditionActivity)),
    security(("bearer_auth" = [])),
    tag = "trail"
)]
pub async fn submit_condition(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<TrailActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let activity = app_state
        .plan_service
        .submit_condition(&actor, id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// POST /api/user-plan-conditions/{id}/approve
#[utoipa::path(
    post,
    path = "/api/user-plan-conditions/{id}/approve",
    request_body = TrailActionPayload,
    params(("id" = Uuid, Path, description = "Condição da alocação")),
    responses((status = 201, description = "Aprovação registrada", body = UserPlanConditionActivity)),
    security(("bearer_auth" = [])),
    tag = "trail"
)]
pub async fn approve_condition(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<TrailActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let activity = app_state
        .plan_service
        .decide_condition(&actor, id, true, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// POST /api/user-plan-conditions/{id}/reject
#[utoipa::path(
    post,
    path = "/api/user-plan-conditions/{id}/reject",
    request_body = TrailActionPayload,
    params(("id" = Uuid, Path, description = "Condição da alocação")),
    responses((status = 201, description = "Rejeição registrada", body = UserPlanConditionActivity)),
    security(("bearer_auth" = [])),
    tag = "trail"
)]
pub async fn reject_condition(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
    Json(payload): Json<TrailActionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let activity = app_state
        .plan_service
        .decide_condition(&actor, id, false, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(activity)))
}

// POST /api/user-plan-conditions/{id}/revoke
#[utoipa::path(
    post,
    path = "/api/user-plan-conditions/{id}/revoke",
    params(("id" = Uuid, Path, description = "Condição da alocação")),
    responses(
        (status = 201, description = "Decisão revogada", body = UserPlanConditionActivity),
        (status = 404, description = "Nenhuma decisão revogável"),
    ),
    security(("bearer_auth" = [])),
    tag = "trail"
)]
pub async fn revoke_condition(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let activity = app_state.plan_service.revoke_condition(&actor, id).await?;
    Ok((StatusCode::CREATED, Json(activity)))
}
