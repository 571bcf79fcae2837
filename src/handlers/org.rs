// src/handlers/org.rs

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
    models::org::{
        AssignPositionPayload, CreateDepartmentPayload, CreateDivisionPayload, CreateGroupPayload,
        Department, Division, Group,
    },
};

// POST /api/org/departments
#[utoipa::path(
    post,
    path = "/api/org/departments",
    request_body = CreateDepartmentPayload,
    responses((status = 201, description = "Departamento criado", body = Department)),
    security(("bearer_auth" = [])),
    tag = "org"
)]
pub async fn create_department(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreateDepartmentPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let department = app_state.org_service.create_department(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

// POST /api/org/divisions
#[utoipa::path(
    post,
    path = "/api/org/divisions",
    request_body = CreateDivisionPayload,
    responses((status = 201, description = "Divisão criada", body = Division)),
    security(("bearer_auth" = [])),
    tag = "org"
)]
pub async fn create_division(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreateDivisionPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let division = app_state.org_service.create_division(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(division)))
}

// POST /api/org/groups
#[utoipa::path(
    post,
    path = "/api/org/groups",
    request_body = CreateGroupPayload,
    responses((status = 201, description = "Grupo criado", body = Group)),
    security(("bearer_auth" = [])),
    tag = "org"
)]
pub async fn create_group(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreateGroupPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let group = app_state.org_service.create_group(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(group)))
}

// PUT /api/org/users/{user_id}/position
#[utoipa::path(
    put,
    path = "/api/org/users/{user_id}/position",
    request_body = AssignPositionPayload,
    params(("user_id" = Uuid, Path, description = "Usuário alvo")),
    responses((status = 200, description = "Posição atribuída")),
    security(("bearer_auth" = [])),
    tag = "org"
)]
pub async fn assign_position(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(user_id): Path<Uuid>,
    Json(payload): Json<AssignPositionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let user = app_state
        .org_service
        .assign_position(&actor, user_id, payload)
        .await?;
    Ok(Json(user))
}
