// src/db/report_repo.rs

use sqlx::{Executor, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::common::db_utils::{cascade_delete, RelationTable};
use crate::common::error::AppError;
use crate::models::report::{Report, ReportTargetPayload};

// Tabelas de relação do agregado "report" (endereçamento explícito).
const REPORT_RELATIONS: &[RelationTable] = &[
    RelationTable::new("report_users", "report_id"),
    RelationTable::new("report_departments", "report_id"),
    RelationTable::new("report_divisions", "report_id"),
    RelationTable::new("report_groups", "report_id"),
];

#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn insert_report<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        creator_user_id: Uuid,
        title: &str,
        body: &str,
        is_public: bool,
    ) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(
            r#"
            INSERT INTO reports (tenant_id, creator_user_id, title, body, is_public)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(creator_user_id)
        .bind(title)
        .bind(body)
        .bind(is_public)
        .fetch_one(executor)
        .await?;

        Ok(report)
    }

    pub async fn update_report<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        title: &str,
        body: &str,
        is_public: bool,
    ) -> Result<Report, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let report = sqlx::query_as::<_, Report>(
            r#"
            UPDATE reports SET title = $2, body = $3, is_public = $4, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(title)
        .bind(body)
        .bind(is_public)
        .fetch_optional(executor)
        .await?;

        report.ok_or(AppError::ReportNotFound)
    }

    pub async fn soft_delete_report<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE reports SET deleted_at = now() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn find_report(
        &self,
        id: Uuid,
        tenant_id: Uuid,
    ) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    pub async fn list_reports(&self, tenant_id: Uuid) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE tenant_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    // Reescrita atômica dos alvos explícitos: apaga tudo e regrava dentro
    // da transação do chamador. Nunca fica metade escrito.
    pub async fn rewrite_targets(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        report_id: Uuid,
        target: &ReportTargetPayload,
    ) -> Result<(), AppError> {
        cascade_delete(tx, report_id, REPORT_RELATIONS).await?;

        // Inserção em massa via UNNEST
        if !target.user_ids.is_empty() {
            sqlx::query(
                "INSERT INTO report_users (report_id, user_id) SELECT $1, unnest($2::uuid[])",
            )
            .bind(report_id)
            .bind(&target.user_ids)
            .execute(&mut **tx)
            .await?;
        }

        if !target.department_ids.is_empty() {
            sqlx::query(
                "INSERT INTO report_departments (report_id, department_id) SELECT $1, unnest($2::uuid[])",
            )
            .bind(report_id)
            .bind(&target.department_ids)
            .execute(&mut **tx)
            .await?;
        }

        if !target.division_ids.is_empty() {
            sqlx::query(
                "INSERT INTO report_divisions (report_id, division_id) SELECT $1, unnest($2::uuid[])",
            )
            .bind(report_id)
            .bind(&target.division_ids)
            .execute(&mut **tx)
            .await?;
        }

        if !target.group_ids.is_empty() {
            sqlx::query(
                "INSERT INTO report_groups (report_id, group_id) SELECT $1, unnest($2::uuid[])",
            )
            .bind(report_id)
            .bind(&target.group_ids)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }

    pub async fn load_target_lists(
        &self,
        report_id: Uuid,
    ) -> Result<(Vec<Uuid>, Vec<Uuid>, Vec<Uuid>, Vec<Uuid>), AppError> {
        let user_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM report_users WHERE report_id = $1",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        let department_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT department_id FROM report_departments WHERE report_id = $1",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        let division_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT division_id FROM report_divisions WHERE report_id = $1",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        let group_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT group_id FROM report_groups WHERE report_id = $1",
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok((user_ids, department_ids, division_ids, group_ids))
    }
}
