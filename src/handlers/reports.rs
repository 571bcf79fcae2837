// src/handlers/reports.rs

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
    models::report::{CreateReportPayload, Report, ReportDetail},
};

// POST /api/reports
#[utoipa::path(
    post,
    path = "/api/reports",
    request_body = CreateReportPayload,
    responses((status = 201, description = "Relatório criado", body = ReportDetail)),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn create_report(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Json(payload): Json<CreateReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state.report_service.create_report(&actor, payload).await?;
    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/reports
#[utoipa::path(
    get,
    path = "/api/reports",
    responses((status = 200, description = "Relatórios visíveis ao ator", body = [Report])),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn list_reports(
    State(app_state): State<AppState>,
    actor: ActorContext,
) -> Result<impl IntoResponse, AppError> {
    let reports = app_state.report_service.list_reports(&actor).await?;
    Ok(Json(reports))
}

// GET /api/reports/{report_id}
#[utoipa::path(
    get,
    path = "/api/reports/{report_id}",
    params(("report_id" = Uuid, Path, description = "Relatório")),
    responses(
        (status = 200, description = "Detalhe do relatório", body = ReportDetail),
        (status = 403, description = "Fora da visibilidade do ator"),
        (status = 404, description = "Relatório não encontrado"),
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn get_report(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(report_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = app_state.report_service.get_report(&actor, report_id).await?;
    Ok(Json(detail))
}

// PUT /api/reports/{report_id}
#[utoipa::path(
    put,
    path = "/api/reports/{report_id}",
    request_body = CreateReportPayload,
    params(("report_id" = Uuid, Path, description = "Relatório")),
    responses(
        (status = 200, description = "Relatório atualizado", body = ReportDetail),
        (status = 403, description = "Sem permissão de edição"),
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn update_report(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(report_id): Path<Uuid>,
    Json(payload): Json<CreateReportPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let detail = app_state
        .report_service
        .update_report(&actor, report_id, payload)
        .await?;
    Ok(Json(detail))
}

// DELETE /api/reports/{report_id}
#[utoipa::path(
    delete,
    path = "/api/reports/{report_id}",
    params(("report_id" = Uuid, Path, description = "Relatório")),
    responses(
        (status = 204, description = "Relatório removido"),
        (status = 403, description = "Sem permissão de edição"),
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn delete_report(
    State(app_state): State<AppState>,
    actor: ActorContext,
    Path(report_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.report_service.delete_report(&actor, report_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
