// src/db/activity_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::plan::{ActivityStatus, UserPlanActivity, UserPlanConditionActivity};

// Trilha de aprovação: linhas append-only. A única mutação permitida é o
// carimbo de revogação (revoke_flag/revoked_at) sobre uma decisão anterior.
#[derive(Clone)]
pub struct ActivityRepository {
    pool: PgPool,
}

impl ActivityRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Nível de alocação (user_plan) ---

    pub async fn insert_user_plan_activity<'e, E>(
        &self,
        executor: E,
        user_plan_id: Uuid,
        actor_user_id: Uuid,
        status: ActivityStatus,
        comment: Option<&str>,
        revokes_activity_id: Option<Uuid>,
    ) -> Result<UserPlanActivity, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activity = sqlx::query_as::<_, UserPlanActivity>(
            r#"
            INSERT INTO user_plan_activities
                (user_plan_id, actor_user_id, status, comment, revokes_activity_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_plan_id)
        .bind(actor_user_id)
        .bind(status)
        .bind(comment)
        .bind(revokes_activity_id)
        .fetch_one(executor)
        .await?;

        Ok(activity)
    }

    // Ordenação canônica: created_at DESC, id DESC (desempate).
    pub async fn list_user_plan_activities(
        &self,
        user_plan_id: Uuid,
    ) -> Result<Vec<UserPlanActivity>, AppError> {
        let activities = sqlx::query_as::<_, UserPlanActivity>(
            r#"
            SELECT * FROM user_plan_activities
            WHERE user_plan_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }

    pub async fn list_user_plan_activities_tx<'e, E>(
        &self,
        executor: E,
        user_plan_id: Uuid,
    ) -> Result<Vec<UserPlanActivity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activities = sqlx::query_as::<_, UserPlanActivity>(
            r#"
            SELECT * FROM user_plan_activities
            WHERE user_plan_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_plan_id)
        .fetch_all(executor)
        .await?;

        Ok(activities)
    }

    pub async fn flag_user_plan_activity_revoked<'e, E>(
        &self,
        executor: E,
        activity_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE user_plan_activities SET revoke_flag = true, revoked_at = now() WHERE id = $1",
        )
        .bind(activity_id)
        .execute(executor)
        .await?;

        Ok(())
    }

    // --- Nível de condição (user_plan_condition) ---

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_condition_activity<'e, E>(
        &self,
        executor: E,
        user_plan_condition_id: Uuid,
        user_plan_id: Uuid,
        actor_user_id: Uuid,
        status: ActivityStatus,
        comment: Option<&str>,
        attachment_url: Option<&str>,
        revokes_activity_id: Option<Uuid>,
    ) -> Result<UserPlanConditionActivity, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activity = sqlx::query_as::<_, UserPlanConditionActivity>(
            r#"
            INSERT INTO user_plan_condition_activities
                (user_plan_condition_id, user_plan_id, actor_user_id, status,
                 comment, attachment_url, revokes_activity_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_plan_condition_id)
        .bind(user_plan_id)
        .bind(actor_user_id)
        .bind(status)
        .bind(comment)
        .bind(attachment_url)
        .bind(revokes_activity_id)
        .fetch_one(executor)
        .await?;

        Ok(activity)
    }

    pub async fn list_condition_activities(
        &self,
        user_plan_condition_id: Uuid,
    ) -> Result<Vec<UserPlanConditionActivity>, AppError> {
        let activities = sqlx::query_as::<_, UserPlanConditionActivity>(
            r#"
            SELECT * FROM user_plan_condition_activities
            WHERE user_plan_condition_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_plan_condition_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }

    pub async fn list_condition_activities_tx<'e, E>(
        &self,
        executor: E,
        user_plan_condition_id: Uuid,
    ) -> Result<Vec<UserPlanConditionActivity>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let activities = sqlx::query_as::<_, UserPlanConditionActivity>(
            r#"
            SELECT * FROM user_plan_condition_activities
            WHERE user_plan_condition_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_plan_condition_id)
        .fetch_all(executor)
        .await?;

        Ok(activities)
    }

    // Todas as atividades de condição de uma alocação, para a checagem de
    // revogabilidade na remoção.
    pub async fn list_condition_activities_for_user_plan(
        &self,
        user_plan_id: Uuid,
    ) -> Result<Vec<UserPlanConditionActivity>, AppError> {
        let activities = sqlx::query_as::<_, UserPlanConditionActivity>(
            r#"
            SELECT * FROM user_plan_condition_activities
            WHERE user_plan_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(user_plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(activities)
    }

    pub async fn flag_condition_activity_revoked<'e, E>(
        &self,
        executor: E,
        activity_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            r#"
            UPDATE user_plan_condition_activities
            SET revoke_flag = true, revoked_at = now()
            WHERE id = $1
            "#,
        )
        .bind(activity_id)
        .execute(executor)
        .await?;

        Ok(())
    }
}
