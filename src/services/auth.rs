// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, RegisterUserPayload, User},
};

// O colaborador de identidade: emite e valida tokens e resolve o usuário
// autenticado. O núcleo confia no contexto resultante sem revalidar papéis.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, pool: PgPool) -> Self {
        Self {
            user_repo,
            jwt_secret,
            pool,
        }
    }

    pub async fn register_user(&self, payload: RegisterUserPayload) -> Result<String, AppError> {
        // Hashing fora do runtime: bcrypt é CPU-bound.
        let password = payload.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || hash(&password, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let mut tx = self.pool.begin().await?;

        let new_user = self
            .user_repo
            .create_user(
                &mut *tx,
                payload.tenant_id,
                &payload.email,
                &password_hash,
                &payload.display_name,
                payload.role,
                payload.department_id,
                payload.division_id,
                payload.group_id,
            )
            .await?;

        tx.commit().await?;

        tracing::info!("👤 Usuário {} registrado.", new_user.id);

        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        self.user_repo
            .find_by_id(token_data.claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(7);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}
