// src/models/org.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- Papéis ---
// Enum totalmente ordenado, do mais privilegiado (1) ao menos (5).
// Invariante: um papel só administra papéis ESTRITAMENTE abaixo dele,
// dentro do mesmo tenant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[repr(i16)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    SystemAdmin = 1,
    PowerUser = 2,
    SeniorUser = 3,
    Contributor = 4,
    Member = 5,
}

impl Role {
    // `true` se `self` pode administrar usuários com o papel `other`.
    // Nunca administra o próprio nível nem níveis acima.
    pub fn manages(self, other: Role) -> bool {
        (self as i16) < (other as i16)
    }
}

// --- Unidades organizacionais ---

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: Uuid,
    #[schema(ignore)]
    pub tenant_id: Uuid,
    #[schema(example = "Engenharia")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Division {
    pub id: Uuid,
    pub department_id: Uuid,
    #[schema(example = "Plataforma")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// Um grupo pertence a um departamento e pode, opcionalmente, referenciar
// uma divisão do MESMO departamento (invariante suave, verificada no
// momento da atribuição).
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: Uuid,
    pub department_id: Uuid,
    pub division_id: Option<Uuid>,
    #[schema(example = "Time de Backend")]
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDepartmentPayload {
    #[validate(length(min = 1, message = "O nome do departamento é obrigatório."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateDivisionPayload {
    pub department_id: Uuid,
    #[validate(length(min = 1, message = "O nome da divisão é obrigatório."))]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupPayload {
    pub department_id: Uuid,
    pub division_id: Option<Uuid>,
    #[validate(length(min = 1, message = "O nome do grupo é obrigatório."))]
    pub name: String,
}

// Atribuição de posição organizacional a um usuário
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignPositionPayload {
    pub department_id: Uuid,
    pub division_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
}
