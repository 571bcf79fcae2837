// src/db/user_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::{auth::User, org::Role};

// O repositório de usuários, responsável por todas as interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail (ignora tombstones)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = $1 AND deleted_at IS NULL",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // Busca um usuário pelo seu ID (ignora tombstones)
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // Busca dentro de um tenant específico (para checagens de alocação)
    pub async fn find_in_tenant(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    // Todos os usuários ativos do tenant — a entrada do resolutor de escopo.
    // Recalculado a cada requisição; nunca cacheado.
    pub async fn list_active_in_tenant(&self, tenant_id: Uuid) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE tenant_id = $1 AND deleted_at IS NULL",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    // Cria um novo usuário no banco de dados
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        email: &str,
        password_hash: &str,
        display_name: &str,
        role: Role,
        department_id: Option<Uuid>,
        division_id: Option<Uuid>,
        group_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users
                (tenant_id, email, password_hash, display_name, role,
                 department_id, division_id, group_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(email)
        .bind(password_hash)
        .bind(display_name)
        .bind(role)
        .bind(department_id)
        .bind(division_id)
        .bind(group_id)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Converte erro de violação de chave única em um erro mais amigável
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::EmailAlreadyExists;
                }
            }
            e.into()
        })
    }

    // Atribui a posição organizacional de um usuário
    pub async fn update_position<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        department_id: Uuid,
        division_id: Option<Uuid>,
        group_id: Option<Uuid>,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET department_id = $2, division_id = $3, group_id = $4, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(department_id)
        .bind(division_id)
        .bind(group_id)
        .fetch_optional(executor)
        .await?;

        user.ok_or(AppError::UserNotFound)
    }
}
