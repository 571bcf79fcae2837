// src/db/plan_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::common::error::AppError;
use crate::models::plan::{
    Plan, PlanCondition, PlanConditionInput, PlanStatus, UserPlan, UserPlanCondition,
    UserPlanConditionStatus, UserPlanStatus,
};

#[derive(Clone)]
pub struct PlanRepository {
    pool: PgPool,
}

impl PlanRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // --- Planos ---

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_plan<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        department_id: Uuid,
        division_id: Option<Uuid>,
        group_id: Option<Uuid>,
        name: &str,
        overview: Option<&str>,
        created_by: Uuid,
    ) -> Result<Plan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            INSERT INTO plans
                (tenant_id, department_id, division_id, group_id, name, overview,
                 status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(department_id)
        .bind(division_id)
        .bind(group_id)
        .bind(name)
        .bind(overview)
        .bind(PlanStatus::NotStarted)
        .bind(created_by)
        .fetch_one(executor)
        .await?;

        Ok(plan)
    }

    pub async fn find_plan(&self, id: Uuid, tenant_id: Uuid) -> Result<Option<Plan>, AppError> {
        let plan = sqlx::query_as::<_, Plan>(
            "SELECT * FROM plans WHERE id = $1 AND tenant_id = $2 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(tenant_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(plan)
    }

    pub async fn list_plans(&self, tenant_id: Uuid) -> Result<Vec<Plan>, AppError> {
        let plans = sqlx::query_as::<_, Plan>(
            "SELECT * FROM plans WHERE tenant_id = $1 AND deleted_at IS NULL ORDER BY created_at DESC",
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(plans)
    }

    pub async fn update_plan<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        name: &str,
        overview: Option<&str>,
    ) -> Result<Plan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let plan = sqlx::query_as::<_, Plan>(
            r#"
            UPDATE plans SET name = $2, overview = $3, updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(overview)
        .fetch_optional(executor)
        .await?;

        plan.ok_or(AppError::PlanNotFound)
    }

    // Tombstone: o plano nunca é removido fisicamente.
    pub async fn soft_delete_plan<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE plans SET deleted_at = now() WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;

        Ok(())
    }

    pub async fn update_plan_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: PlanStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE plans SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;

        Ok(())
    }

    // --- Condições do plano ---

    pub async fn insert_condition<'e, E>(
        &self,
        executor: E,
        plan_id: Uuid,
        input: &PlanConditionInput,
    ) -> Result<PlanCondition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let condition = sqlx::query_as::<_, PlanCondition>(
            r#"
            INSERT INTO plan_conditions (plan_id, name, overview, estimated_time_minutes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(plan_id)
        .bind(&input.name)
        .bind(input.overview.as_deref())
        .bind(input.estimated_time_minutes)
        .fetch_one(executor)
        .await?;

        Ok(condition)
    }

    pub async fn list_conditions(&self, plan_id: Uuid) -> Result<Vec<PlanCondition>, AppError> {
        let conditions = sqlx::query_as::<_, PlanCondition>(
            "SELECT * FROM plan_conditions WHERE plan_id = $1 ORDER BY created_at",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(conditions)
    }

    // --- Alocações (user_plans) ---

    pub async fn insert_user_plan<'e, E>(
        &self,
        executor: E,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> Result<UserPlan, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, UserPlan>(
            r#"
            INSERT INTO user_plans (plan_id, user_id, status)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(plan_id)
        .bind(user_id)
        .bind(UserPlanStatus::InProgress)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Unicidade de (plan_id, user_id) garantida por índice único.
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return AppError::AllocationAlreadyExists;
                }
            }
            e.into()
        })
    }

    pub async fn find_user_plan(
        &self,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<UserPlan>, AppError> {
        let user_plan = sqlx::query_as::<_, UserPlan>(
            "SELECT * FROM user_plans WHERE plan_id = $1 AND user_id = $2",
        )
        .bind(plan_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_plan)
    }

    pub async fn find_user_plan_by_id(&self, id: Uuid) -> Result<Option<UserPlan>, AppError> {
        let user_plan = sqlx::query_as::<_, UserPlan>("SELECT * FROM user_plans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user_plan)
    }

    pub async fn list_user_plans(&self, plan_id: Uuid) -> Result<Vec<UserPlan>, AppError> {
        let user_plans = sqlx::query_as::<_, UserPlan>(
            "SELECT * FROM user_plans WHERE plan_id = $1 ORDER BY created_at",
        )
        .bind(plan_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(user_plans)
    }

    pub async fn list_user_plans_for_user(&self, user_id: Uuid) -> Result<Vec<UserPlan>, AppError> {
        let user_plans = sqlx::query_as::<_, UserPlan>(
            "SELECT * FROM user_plans WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(user_plans)
    }

    // Variante dentro de transação, usada pelo recálculo de status.
    pub async fn list_user_plans_tx<'e, E>(
        &self,
        executor: E,
        plan_id: Uuid,
    ) -> Result<Vec<UserPlan>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user_plans = sqlx::query_as::<_, UserPlan>(
            "SELECT * FROM user_plans WHERE plan_id = $1 ORDER BY created_at",
        )
        .bind(plan_id)
        .fetch_all(executor)
        .await?;

        Ok(user_plans)
    }

    pub async fn update_user_plan_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: UserPlanStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE user_plans SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;

        Ok(())
    }

    // --- Acompanhamento por condição (user_plan_conditions) ---

    pub async fn insert_user_plan_condition<'e, E>(
        &self,
        executor: E,
        user_plan_id: Uuid,
        plan_condition_id: Uuid,
        user_id: Uuid,
    ) -> Result<UserPlanCondition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let condition = sqlx::query_as::<_, UserPlanCondition>(
            r#"
            INSERT INTO user_plan_conditions (user_plan_id, plan_condition_id, user_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(user_plan_id)
        .bind(plan_condition_id)
        .bind(user_id)
        .bind(UserPlanConditionStatus::Incomplete)
        .fetch_one(executor)
        .await?;

        Ok(condition)
    }

    pub async fn find_user_plan_condition(
        &self,
        id: Uuid,
    ) -> Result<Option<UserPlanCondition>, AppError> {
        let condition = sqlx::query_as::<_, UserPlanCondition>(
            "SELECT * FROM user_plan_conditions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(condition)
    }

    pub async fn list_user_plan_conditions_tx<'e, E>(
        &self,
        executor: E,
        user_plan_id: Uuid,
    ) -> Result<Vec<UserPlanCondition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let conditions = sqlx::query_as::<_, UserPlanCondition>(
            "SELECT * FROM user_plan_conditions WHERE user_plan_id = $1 ORDER BY created_at",
        )
        .bind(user_plan_id)
        .fetch_all(executor)
        .await?;

        Ok(conditions)
    }

    pub async fn update_user_plan_condition_status<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        status: UserPlanConditionStatus,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query(
            "UPDATE user_plan_conditions SET status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(status)
        .execute(executor)
        .await?;

        Ok(())
    }
}
