// src/models/report.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    pub creator_user_id: Uuid,
    #[schema(example = "Relatório semanal — Plataforma")]
    pub title: String,
    pub body: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---
// Snapshot do endereçamento explícito de um recurso, usado pelo portão de
// visibilidade. É um valor puro: o portão não consulta o banco.
// ---
#[derive(Debug, Clone, Default)]
pub struct ResourceTarget {
    pub creator_id: Uuid,
    pub is_public: bool,
    pub user_ids: Vec<Uuid>,
    pub department_ids: Vec<Uuid>,
    pub division_ids: Vec<Uuid>,
    pub group_ids: Vec<Uuid>,
    // Expansão divisão→grupo: grupos aninhados sob as divisões alvo,
    // mesmo quando o grupo em si não foi endereçado.
    pub expanded_group_ids: Vec<Uuid>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportTargetPayload {
    #[serde(default)]
    pub user_ids: Vec<Uuid>,
    #[serde(default)]
    pub department_ids: Vec<Uuid>,
    #[serde(default)]
    pub division_ids: Vec<Uuid>,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateReportPayload {
    #[validate(length(min = 1, message = "O título do relatório é obrigatório."))]
    pub title: String,
    pub body: String,
    #[serde(default)]
    pub is_public: bool,
    #[validate(nested)]
    pub target: ReportTargetPayload,
}

// Resposta completa (relatório + alvos explícitos)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReportDetail {
    #[serde(flatten)]
    pub report: Report,
    pub user_ids: Vec<Uuid>,
    pub department_ids: Vec<Uuid>,
    pub division_ids: Vec<Uuid>,
    pub group_ids: Vec<Uuid>,
}
