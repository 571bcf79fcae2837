// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::org::Role;

// Representa um usuário vindo do banco de dados
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,

    #[schema(ignore)] // tenant_id vem do token, ocultamos da doc pública
    pub tenant_id: Uuid,

    pub email: String,

    #[serde(skip_serializing)] // IMPORTANTE para segurança
    pub password_hash: String,

    #[schema(example = "Maria Souza")]
    pub display_name: String,

    pub role: Role,

    // Posição organizacional: divisão e grupo são refinamentos opcionais
    // do departamento.
    pub department_id: Option<Uuid>,
    pub division_id: Option<Uuid>,
    pub group_id: Option<Uuid>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    #[serde(skip_serializing)]
    pub deleted_at: Option<DateTime<Utc>>,
}

// ---
// ActorContext: a identidade do ator, passada EXPLICITAMENTE como primeiro
// argumento de toda chamada do núcleo. Nada de estado global de requisição.
// ---
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub user_id: Uuid,
    pub tenant_id: Uuid,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub division_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
}

impl From<&User> for ActorContext {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            tenant_id: user.tenant_id,
            role: user.role,
            department_id: user.department_id,
            division_id: user.division_id,
            group_id: user.group_id,
        }
    }
}

// Dados para registro de um novo usuário
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,

    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,

    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub display_name: String,

    pub tenant_id: Uuid,
    pub role: Role,
    pub department_id: Option<Uuid>,
    pub division_id: Option<Uuid>,
    pub group_id: Option<Uuid>,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time (quando o token expira)
    pub iat: usize, // Issued At (quando o token foi criado)
}
