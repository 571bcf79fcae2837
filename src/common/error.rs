use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro central, com `thiserror` para melhor ergonomia.
// A taxonomia é: NotFound / Forbidden / Conflict / Validação / Interno.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Departamento não encontrado")]
    DepartmentNotFound,

    #[error("Unidade organizacional não encontrada")]
    OrgUnitNotFound,

    #[error("Plano não encontrado")]
    PlanNotFound,

    #[error("Alocação não encontrada")]
    AllocationNotFound,

    #[error("Condição não encontrada")]
    ConditionNotFound,

    #[error("Relatório não encontrado")]
    ReportNotFound,

    #[error("Nenhuma decisão revogável encontrada")]
    NoRevocableDecision,

    // Autorização: falha de escopo, de ordem de papéis ou operação fora do
    // estado permitido do plano.
    #[error("Acesso negado: {0}")]
    Forbidden(String),

    // Remoção de alocação contra histórico aceito e não revogado.
    #[error("Condição alterada")]
    ConditionChanged,

    #[error("Este usuário já possui uma alocação para este plano")]
    AllocationAlreadyExists,

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            AppError::EmailAlreadyExists => {
                (StatusCode::CONFLICT, "Este e-mail já está em uso.".to_string())
            }
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "E-mail ou senha inválidos.".to_string())
            }
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Token de autenticação inválido ou ausente.".to_string(),
            ),

            AppError::UserNotFound => {
                (StatusCode::NOT_FOUND, "Usuário não encontrado.".to_string())
            }
            AppError::DepartmentNotFound => {
                (StatusCode::NOT_FOUND, "Departamento não encontrado.".to_string())
            }
            AppError::OrgUnitNotFound => (
                StatusCode::NOT_FOUND,
                "Unidade organizacional não encontrada.".to_string(),
            ),
            AppError::PlanNotFound => {
                (StatusCode::NOT_FOUND, "Plano não encontrado.".to_string())
            }
            AppError::AllocationNotFound => {
                (StatusCode::NOT_FOUND, "Alocação não encontrada.".to_string())
            }
            AppError::ConditionNotFound => {
                (StatusCode::NOT_FOUND, "Condição não encontrada.".to_string())
            }
            AppError::ReportNotFound => {
                (StatusCode::NOT_FOUND, "Relatório não encontrado.".to_string())
            }
            AppError::NoRevocableDecision => (
                StatusCode::NOT_FOUND,
                "Nenhuma decisão revogável encontrada.".to_string(),
            ),

            AppError::Forbidden(reason) => (StatusCode::FORBIDDEN, reason),

            AppError::ConditionChanged => (
                StatusCode::CONFLICT,
                "A condição foi alterada: existe uma aprovação que não foi revogada.".to_string(),
            ),
            AppError::AllocationAlreadyExists => (
                StatusCode::CONFLICT,
                "Este usuário já possui uma alocação para este plano.".to_string(),
            ),

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` loga a mensagem detalhada no servidor; o cliente recebe
            // apenas um sinal genérico, sem detalhes de armazenamento.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Ocorreu um erro inesperado.".to_string(),
                )
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
