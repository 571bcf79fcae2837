// src/handlers/auth.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::AuthenticatedUser,
    models::auth::{ActorContext, AuthResponse, LoginUserPayload, RegisterUserPayload, User},
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário registrado", body = AuthResponse),
        (status = 400, description = "Payload inválido"),
        (status = 409, description = "E-mail já em uso"),
    ),
    tag = "auth"
)]
pub async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let token = app_state.auth_service.register_user(payload).await?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Autenticado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas"),
    ),
    tag = "auth"
)]
pub async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginUserPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses((status = 200, description = "Usuário autenticado", body = User)),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_me(user: AuthenticatedUser) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user.0))
}

// GET /api/users/managed — o escopo gerenciado do ator, materializado.
#[utoipa::path(
    get,
    path = "/api/users/managed",
    responses((status = 200, description = "Usuários no escopo do ator", body = [User])),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn get_managed_users(
    State(app_state): State<AppState>,
    actor: ActorContext,
) -> Result<impl IntoResponse, AppError> {
    let users = app_state.scope_service.managed_users(&actor).await?;
    Ok(Json(users))
}
