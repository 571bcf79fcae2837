// src/models/plan.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Enums de status ---
// Os valores numéricos são os persistidos no banco (SMALLINT).
// Nenhum destes campos é gravável pelo cliente: todos derivam da trilha
// de atividades (ver services::status).

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(rename_all = "camelCase")]
pub enum PlanStatus {
    Completed = 1,
    InProgress = 2,
    NotStarted = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(rename_all = "camelCase")]
pub enum UserPlanStatus {
    Completed = 1,
    InProgress = 2,
    PendingApproval = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(rename_all = "camelCase")]
pub enum UserPlanConditionStatus {
    Completed = 1,
    Incomplete = 2,
    PendingApproval = 3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(rename_all = "camelCase")]
pub enum ActivityStatus {
    Accepted = 1,
    Submitted = 2,
    Rejected = 3,
    Revoked = 4,
}

// --- O plano (template) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    // Âncora organizacional: todo plano pertence a um departamento;
    // divisão e grupo refinam o alvo opcionalmente.
    pub department_id: Uuid,
    pub division_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    #[schema(example = "Onboarding Backend 2026")]
    pub name: String,
    pub overview: Option<String>,
    pub status: PlanStatus,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

// Item de checklist, filho de exatamente um plano.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanCondition {
    pub id: Uuid,
    pub plan_id: Uuid,
    #[schema(example = "Concluir curso interno de segurança")]
    pub name: String,
    pub overview: Option<String>,
    #[schema(example = 480)]
    pub estimated_time_minutes: Option<i32>,
    pub created_at: DateTime<Utc>,
}

// --- A alocação (plano x usuário) ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPlan {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub user_id: Uuid,
    pub status: UserPlanStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPlanCondition {
    pub id: Uuid,
    pub user_plan_id: Uuid,
    pub plan_condition_id: Uuid,
    pub user_id: Uuid,
    pub status: UserPlanConditionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- A trilha de atividades (append-only) ---
// Uma atividade nunca é alterada depois de criada, exceto pelo
// `revoke_flag`/`revoked_at` quando uma revogação posterior a referencia.

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPlanActivity {
    pub id: Uuid,
    pub user_plan_id: Uuid,
    pub actor_user_id: Uuid,
    pub status: ActivityStatus,
    pub comment: Option<String>,
    pub revoke_flag: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    // A revogação referencia a decisão original, em vez de apagá-la.
    pub revokes_activity_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPlanConditionActivity {
    pub id: Uuid,
    pub user_plan_condition_id: Uuid,
    pub user_plan_id: Uuid,
    pub actor_user_id: Uuid,
    pub status: ActivityStatus,
    pub comment: Option<String>,
    // Evidência anexada só existe no nível de condição.
    pub attachment_url: Option<String>,
    pub revoke_flag: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub revokes_activity_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanConditionInput {
    #[validate(length(min = 1, message = "O nome da condição é obrigatório."))]
    pub name: String,
    pub overview: Option<String>,
    pub estimated_time_minutes: Option<i32>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePlanPayload {
    #[validate(length(min = 1, message = "O nome do plano é obrigatório."))]
    pub name: String,
    pub overview: Option<String>,
    pub division_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O plano precisa de pelo menos uma condição."), nested)]
    pub conditions: Vec<PlanConditionInput>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePlanPayload {
    #[validate(length(min = 1, message = "O nome do plano é obrigatório."))]
    pub name: String,
    pub overview: Option<String>,
    #[validate(length(min = 1, message = "O plano precisa de pelo menos uma condição."), nested)]
    pub conditions: Vec<PlanConditionInput>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAllocationPayload {
    pub user_id: Uuid,
}

// Envio de evidência / decisão sobre a trilha
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrailActionPayload {
    pub comment: Option<String>,
    // Somente aceito em submissões no nível de condição.
    pub attachment_url: Option<String>,
}

// Resposta completa (plano + condições)
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlanDetail {
    #[serde(flatten)]
    pub plan: Plan,
    pub conditions: Vec<PlanCondition>,
    pub allocations: Vec<UserPlan>,
}
