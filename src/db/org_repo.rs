// src/db/org_repo.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::org::{Department, Division, Group};

#[derive(Clone)]
pub struct OrgRepository {
    pool: PgPool,
}

impl OrgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create_department(
        &self,
        tenant_id: Uuid,
        name: &str,
    ) -> Result<Department, AppError> {
        let department = sqlx::query_as::<_, Department>(
            "INSERT INTO departments (tenant_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(tenant_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(department)
    }

    pub async fn create_division(
        &self,
        department_id: Uuid,
        name: &str,
    ) -> Result<Division, AppError> {
        let division = sqlx::query_as::<_, Division>(
            "INSERT INTO divisions (department_id, name) VALUES ($1, $2) RETURNING *",
        )
        .bind(department_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(division)
    }

    pub async fn create_group(
        &self,
        department_id: Uuid,
        division_id: Option<Uuid>,
        name: &str,
    ) -> Result<Group, AppError> {
        let group = sqlx::query_as::<_, Group>(
            "INSERT INTO groups (department_id, division_id, name) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(department_id)
        .bind(division_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(group)
    }

    pub async fn find_department(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Department>, AppError> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT * FROM departments WHERE id = $1 AND tenant_id = $2",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }

    pub async fn find_division(&self, id: Uuid) -> Result<Option<Division>, AppError> {
        let division =
            sqlx::query_as::<_, Division>("SELECT * FROM divisions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(division)
    }

    pub async fn find_group(&self, id: Uuid) -> Result<Option<Group>, AppError> {
        let group = sqlx::query_as::<_, Group>("SELECT * FROM groups WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(group)
    }

    // Expansão divisão→grupo usada pelo portão de visibilidade:
    // todos os grupos aninhados sob as divisões dadas.
    pub async fn groups_in_divisions(
        &self,
        division_ids: &[Uuid],
    ) -> Result<Vec<Uuid>, AppError> {
        if division_ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM groups WHERE division_id = ANY($1)",
        )
        .bind(division_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}
