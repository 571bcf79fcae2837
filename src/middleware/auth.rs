// src/middleware/auth.rs

use axum::{
    extract::{FromRequestParts, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{ActorContext, User},
};

// O middleware de autenticação: valida o bearer token, carrega o usuário e
// injeta o ActorContext nos "extensions" da requisição. É daqui que todo
// handler recebe a identidade — nunca de estado ambiente.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let headers = request.headers();
    let auth_header = headers
        .get("Authorization")
        .and_then(|value| value.to_str().ok());

    if let Some(auth_header) = auth_header {
        if let Some(token) = auth_header.strip_prefix("Bearer ") {
            let user = app_state.auth_service.validate_token(token).await?;
            let actor = ActorContext::from(&user);

            request.extensions_mut().insert(user);
            request.extensions_mut().insert(actor);
            return Ok(next.run(request).await);
        }
    }

    Err(AppError::InvalidToken)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<User>()
            .cloned()
            .map(AuthenticatedUser)
            .ok_or(AppError::InvalidToken)
    }
}

// Extrator do contexto do ator (o insumo de todas as chamadas do núcleo)
impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ActorContext>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}
