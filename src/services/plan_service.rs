// src/services/plan_service.rs

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::{
    common::db_utils::{cascade_delete, RelationTable},
    common::error::AppError,
    db::{ActivityRepository, PlanRepository, UserRepository},
    models::auth::ActorContext,
    models::org::Role,
    models::plan::{
        ActivityStatus, CreatePlanPayload, Plan, PlanDetail, PlanStatus, TrailActionPayload,
        UpdatePlanPayload, UserPlan, UserPlanActivity, UserPlanCondition,
        UserPlanConditionActivity,
    },
    services::notification::NotificationService,
    services::scope_service::ScopeService,
    services::status::{self, TrailEntry},
};

// Tabelas de relação do agregado "user_plan", na ordem da cascata
// (filhas primeiro, raiz por último).
const USER_PLAN_RELATIONS: &[RelationTable] = &[
    RelationTable::new("user_plan_condition_activities", "user_plan_id"),
    RelationTable::new("user_plan_activities", "user_plan_id"),
    RelationTable::new("user_plan_conditions", "user_plan_id"),
    RelationTable::new("user_plans", "id"),
];

// ---
// Validações puras do fluxo (testáveis sem banco)
// ---

// Edição/remoção estrutural só é permitida enquanto o plano não saiu de
// NotStarted: qualquer histórico de alocação congela o template.
fn ensure_plan_editable(status: PlanStatus) -> Result<(), AppError> {
    if status == PlanStatus::NotStarted {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "O plano já possui alocações e não pode mais ser alterado.".into(),
        ))
    }
}

// Regras de alocação: plano concluído rejeita primeiro; depois, somente
// usuários Member recebem trabalho por condição.
fn ensure_allocatable(plan_status: PlanStatus, target_role: Role) -> Result<(), AppError> {
    if plan_status == PlanStatus::Completed {
        return Err(AppError::Forbidden(
            "O plano já foi concluído e não aceita novas alocações.".into(),
        ));
    }
    if target_role != Role::Member {
        return Err(AppError::Forbidden(
            "Apenas usuários com papel Member podem receber alocações.".into(),
        ));
    }
    Ok(())
}

// Transições legais da trilha, derivadas da atividade efetiva mais recente:
// submeter exige que nada esteja pendente nem aceito (trilha vazia ou
// rejeição); aprovar/rejeitar exigem uma submissão pendente. Revogações
// têm sua própria checagem (decisão não revogada existente).
fn ensure_trail_transition(
    entries: &[TrailEntry],
    action: ActivityStatus,
) -> Result<(), AppError> {
    let latest = status::latest_effective(entries).map(|e| e.status);

    let legal = match action {
        ActivityStatus::Submitted => {
            matches!(latest, None | Some(ActivityStatus::Rejected))
        }
        ActivityStatus::Accepted | ActivityStatus::Rejected => {
            latest == Some(ActivityStatus::Submitted)
        }
        ActivityStatus::Revoked => true,
    };

    if legal {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "A ação não é válida para o estado atual da trilha.".into(),
        ))
    }
}

// Uma alocação só é removível enquanto nenhuma condição tem uma aprovação
// aceita e não revogada.
fn ensure_revocable(activities: &[UserPlanConditionActivity]) -> Result<(), AppError> {
    let has_irrevocable = activities
        .iter()
        .any(|a| a.status == ActivityStatus::Accepted && !a.revoke_flag);

    if has_irrevocable {
        Err(AppError::ConditionChanged)
    } else {
        Ok(())
    }
}

#[derive(Clone)]
pub struct PlanService {
    plan_repo: PlanRepository,
    activity_repo: ActivityRepository,
    user_repo: UserRepository,
    scope_service: ScopeService,
    notification_service: NotificationService,
    pool: PgPool,
}

impl PlanService {
    pub fn new(
        plan_repo: PlanRepository,
        activity_repo: ActivityRepository,
        user_repo: UserRepository,
        scope_service: ScopeService,
        notification_service: NotificationService,
        pool: PgPool,
    ) -> Self {
        Self {
            plan_repo,
            activity_repo,
            user_repo,
            scope_service,
            notification_service,
            pool,
        }
    }

    // ---
    // Autorização (sempre resolvida ANTES de abrir transação)
    // ---

    // O ator precisa administrar `user_id` (escopo gerenciado).
    async fn require_in_scope(&self, actor: &ActorContext, user_id: Uuid) -> Result<(), AppError> {
        let scope = self.scope_service.managed_scope(actor).await?;
        if scope.contains(&user_id) {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "O usuário alvo está fora do seu escopo gerenciado.".into(),
            ))
        }
    }

    // Decisões (aprovar/rejeitar/revogar) exigem escopo sobre o dono E que
    // o decisor não seja o próprio dono.
    async fn require_decider(&self, actor: &ActorContext, owner_id: Uuid) -> Result<(), AppError> {
        if actor.user_id == owner_id {
            return Err(AppError::Forbidden(
                "O próprio usuário não pode decidir sobre sua submissão.".into(),
            ));
        }
        self.require_in_scope(actor, owner_id).await
    }

    // O ator pode ver/administrar o plano: é o criador, administra o
    // criador, ou possui uma alocação dele.
    async fn can_access_plan(&self, actor: &ActorContext, plan: &Plan) -> Result<bool, AppError> {
        if plan.created_by == actor.user_id {
            return Ok(true);
        }
        let scope = self.scope_service.managed_scope(actor).await?;
        if scope.contains(&plan.created_by) {
            return Ok(true);
        }
        let own = self.plan_repo.find_user_plan(plan.id, actor.user_id).await?;
        Ok(own.is_some())
    }

    async fn require_plan(&self, actor: &ActorContext, plan_id: Uuid) -> Result<Plan, AppError> {
        self.plan_repo
            .find_plan(plan_id, actor.tenant_id)
            .await?
            .ok_or(AppError::PlanNotFound)
    }

    // ---
    // Ciclo de vida do plano
    // ---

    pub async fn create_plan(
        &self,
        actor: &ActorContext,
        payload: CreatePlanPayload,
    ) -> Result<PlanDetail, AppError> {
        // Todo plano é ancorado a uma unidade organizacional: criador sem
        // departamento é rejeitado.
        let department_id = actor.department_id.ok_or(AppError::DepartmentNotFound)?;

        let mut tx = self.pool.begin().await?;

        let plan = self
            .plan_repo
            .insert_plan(
                &mut *tx,
                actor.tenant_id,
                department_id,
                payload.division_id,
                payload.group_id,
                &payload.name,
                payload.overview.as_deref(),
                actor.user_id,
            )
            .await?;

        let mut conditions = Vec::with_capacity(payload.conditions.len());
        for input in &payload.conditions {
            conditions.push(self.plan_repo.insert_condition(&mut *tx, plan.id, input).await?);
        }

        tx.commit().await?;

        self.notification_service.notify("plan.created", &[plan.created_by]);

        Ok(PlanDetail {
            plan,
            conditions,
            allocations: Vec::new(),
        })
    }

    pub async fn get_plan(&self, actor: &ActorContext, plan_id: Uuid) -> Result<PlanDetail, AppError> {
        let plan = self.require_plan(actor, plan_id).await?;

        if !self.can_access_plan(actor, &plan).await? {
            return Err(AppError::Forbidden(
                "Você não tem acesso a este plano.".into(),
            ));
        }

        let conditions = self.plan_repo.list_conditions(plan.id).await?;
        let allocations = self.plan_repo.list_user_plans(plan.id).await?;

        Ok(PlanDetail {
            plan,
            conditions,
            allocations,
        })
    }

    pub async fn list_plans(&self, actor: &ActorContext) -> Result<Vec<Plan>, AppError> {
        let scope = self.scope_service.managed_scope(actor).await?;
        let own_allocations = self.plan_repo.list_user_plans_for_user(actor.user_id).await?;
        let allocated_plan_ids: Vec<Uuid> =
            own_allocations.iter().map(|up| up.plan_id).collect();

        let plans = self.plan_repo.list_plans(actor.tenant_id).await?;
        Ok(plans
            .into_iter()
            .filter(|p| scope.contains(&p.created_by) || allocated_plan_ids.contains(&p.id))
            .collect())
    }

    pub async fn update_plan(
        &self,
        actor: &ActorContext,
        plan_id: Uuid,
        payload: UpdatePlanPayload,
    ) -> Result<PlanDetail, AppError> {
        let plan = self.require_plan(actor, plan_id).await?;

        if plan.created_by != actor.user_id {
            self.require_in_scope(actor, plan.created_by).await?;
        }
        ensure_plan_editable(plan.status)?;

        let mut tx = self.pool.begin().await?;

        let plan = self
            .plan_repo
            .update_plan(&mut *tx, plan.id, &payload.name, payload.overview.as_deref())
            .await?;

        // Reescreve as condições por inteiro (o plano ainda não tem alocações).
        cascade_delete(
            &mut tx,
            plan.id,
            &[RelationTable::new("plan_conditions", "plan_id")],
        )
        .await?;

        let mut conditions = Vec::with_capacity(payload.conditions.len());
        for input in &payload.conditions {
            conditions.push(self.plan_repo.insert_condition(&mut *tx, plan.id, input).await?);
        }

        tx.commit().await?;

        Ok(PlanDetail {
            plan,
            conditions,
            allocations: Vec::new(),
        })
    }

    pub async fn delete_plan(&self, actor: &ActorContext, plan_id: Uuid) -> Result<(), AppError> {
        let plan = self.require_plan(actor, plan_id).await?;

        if plan.created_by != actor.user_id {
            self.require_in_scope(actor, plan.created_by).await?;
        }
        ensure_plan_editable(plan.status)?;

        let mut tx = self.pool.begin().await?;

        cascade_delete(
            &mut tx,
            plan.id,
            &[RelationTable::new("plan_conditions", "plan_id")],
        )
        .await?;
        self.plan_repo.soft_delete_plan(&mut *tx, plan.id).await?;

        tx.commit().await?;
        Ok(())
    }

    // ---
    // Alocação (plano x usuário Member)
    // ---

    pub async fn create_allocation(
        &self,
        actor: &ActorContext,
        plan_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<UserPlan, AppError> {
        let plan = self.require_plan(actor, plan_id).await?;

        let target = self
            .user_repo
            .find_in_tenant(target_user_id, actor.tenant_id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        ensure_allocatable(plan.status, target.role)?;
        self.require_in_scope(actor, target.id).await?;

        if self.plan_repo.find_user_plan(plan.id, target.id).await?.is_some() {
            return Err(AppError::AllocationAlreadyExists);
        }

        let conditions = self.plan_repo.list_conditions(plan.id).await?;

        // Tudo ou nada: alocação + trilha por condição + status do plano.
        let mut tx = self.pool.begin().await?;

        let user_plan = self
            .plan_repo
            .insert_user_plan(&mut *tx, plan.id, target.id)
            .await?;

        for condition in &conditions {
            self.plan_repo
                .insert_user_plan_condition(&mut *tx, user_plan.id, condition.id, target.id)
                .await?;
        }

        let user_plans = self.plan_repo.list_user_plans_tx(&mut *tx, plan.id).await?;
        let statuses: Vec<_> = user_plans.iter().map(|up| up.status).collect();
        self.plan_repo
            .update_plan_status(&mut *tx, plan.id, status::derive_plan(&statuses))
            .await?;

        tx.commit().await?;

        self.notification_service.notify("plan.allocated", &[target.id]);

        Ok(user_plan)
    }

    pub async fn remove_allocation(
        &self,
        actor: &ActorContext,
        plan_id: Uuid,
        target_user_id: Uuid,
    ) -> Result<(), AppError> {
        let plan = self.require_plan(actor, plan_id).await?;

        let user_plan = self
            .plan_repo
            .find_user_plan(plan.id, target_user_id)
            .await?
            .ok_or(AppError::AllocationNotFound)?;

        self.require_in_scope(actor, user_plan.user_id).await?;

        // Histórico aceito e não revogado bloqueia a remoção: nunca
        // cascateamos deletes por cima de decisões aceitas.
        let activities = self
            .activity_repo
            .list_condition_activities_for_user_plan(user_plan.id)
            .await?;
        ensure_revocable(&activities)?;

        let mut tx = self.pool.begin().await?;

        cascade_delete(&mut tx, user_plan.id, USER_PLAN_RELATIONS).await?;

        let user_plans = self.plan_repo.list_user_plans_tx(&mut *tx, plan.id).await?;
        let statuses: Vec<_> = user_plans.iter().map(|up| up.status).collect();
        self.plan_repo
            .update_plan_status(&mut *tx, plan.id, status::derive_plan(&statuses))
            .await?;

        tx.commit().await?;
        Ok(())
    }

    // ---
    // Trilha de aprovação — nível de condição
    // ---

    async fn require_condition(&self, id: Uuid) -> Result<UserPlanCondition, AppError> {
        self.plan_repo
            .find_user_plan_condition(id)
            .await?
            .ok_or(AppError::ConditionNotFound)
    }

    pub async fn submit_condition(
        &self,
        actor: &ActorContext,
        condition_id: Uuid,
        payload: TrailActionPayload,
    ) -> Result<UserPlanConditionActivity, AppError> {
        let condition = self.require_condition(condition_id).await?;

        // Só o Member alocado envia evidência da própria condição.
        if condition.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "Somente o usuário alocado pode submeter esta condição.".into(),
            ));
        }

        let activities = self.activity_repo.list_condition_activities(condition.id).await?;
        let entries: Vec<TrailEntry> = activities.iter().map(TrailEntry::from).collect();
        ensure_trail_transition(&entries, ActivityStatus::Submitted)?;

        let mut tx = self.pool.begin().await?;

        let activity = self
            .activity_repo
            .insert_condition_activity(
                &mut *tx,
                condition.id,
                condition.user_plan_id,
                actor.user_id,
                ActivityStatus::Submitted,
                payload.comment.as_deref(),
                payload.attachment_url.as_deref(),
                None,
            )
            .await?;

        self.recompute_user_plan(&mut tx, condition.user_plan_id).await?;
        tx.commit().await?;

        self.notification_service
            .notify("user_plan_condition.submitted", &[condition.user_id]);

        Ok(activity)
    }

    pub async fn decide_condition(
        &self,
        actor: &ActorContext,
        condition_id: Uuid,
        approve: bool,
        payload: TrailActionPayload,
    ) -> Result<UserPlanConditionActivity, AppError> {
        let condition = self.require_condition(condition_id).await?;
        self.require_decider(actor, condition.user_id).await?;

        let decision = if approve {
            ActivityStatus::Accepted
        } else {
            ActivityStatus::Rejected
        };

        // Decidir exige uma submissão pendente: nada de aprovar uma condição
        // que nunca foi submetida.
        let activities = self.activity_repo.list_condition_activities(condition.id).await?;
        let entries: Vec<TrailEntry> = activities.iter().map(TrailEntry::from).collect();
        ensure_trail_transition(&entries, decision)?;

        let mut tx = self.pool.begin().await?;

        let activity = self
            .activity_repo
            .insert_condition_activity(
                &mut *tx,
                condition.id,
                condition.user_plan_id,
                actor.user_id,
                decision,
                payload.comment.as_deref(),
                None,
                None,
            )
            .await?;

        self.recompute_user_plan(&mut tx, condition.user_plan_id).await?;
        tx.commit().await?;

        let event = if approve {
            "user_plan_condition.accepted"
        } else {
            "user_plan_condition.rejected"
        };
        self.notification_service.notify(event, &[condition.user_id]);

        Ok(activity)
    }

    pub async fn revoke_condition(
        &self,
        actor: &ActorContext,
        condition_id: Uuid,
    ) -> Result<UserPlanConditionActivity, AppError> {
        let condition = self.require_condition(condition_id).await?;
        self.require_decider(actor, condition.user_id).await?;

        // A decisão mais recente ainda não revogada (Accepted ou Rejected).
        let activities = self.activity_repo.list_condition_activities(condition.id).await?;
        let target = activities
            .iter()
            .find(|a| {
                matches!(a.status, ActivityStatus::Accepted | ActivityStatus::Rejected)
                    && !a.revoke_flag
            })
            .ok_or(AppError::NoRevocableDecision)?;

        let mut tx = self.pool.begin().await?;

        self.activity_repo
            .flag_condition_activity_revoked(&mut *tx, target.id)
            .await?;

        let activity = self
            .activity_repo
            .insert_condition_activity(
                &mut *tx,
                condition.id,
                condition.user_plan_id,
                actor.user_id,
                ActivityStatus::Revoked,
                None,
                None,
                Some(target.id),
            )
            .await?;

        self.recompute_user_plan(&mut tx, condition.user_plan_id).await?;
        tx.commit().await?;

        self.notification_service
            .notify("user_plan_condition.revoked", &[condition.user_id]);

        Ok(activity)
    }

    // ---
    // Trilha de aprovação — nível de alocação (isomórfica à de condição;
    // o status derivado continua vindo das condições)
    // ---

    async fn require_user_plan(&self, id: Uuid) -> Result<UserPlan, AppError> {
        self.plan_repo
            .find_user_plan_by_id(id)
            .await?
            .ok_or(AppError::AllocationNotFound)
    }

    pub async fn submit_user_plan(
        &self,
        actor: &ActorContext,
        user_plan_id: Uuid,
        payload: TrailActionPayload,
    ) -> Result<UserPlanActivity, AppError> {
        let user_plan = self.require_user_plan(user_plan_id).await?;

        if user_plan.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "Somente o usuário alocado pode submeter este plano.".into(),
            ));
        }

        let activities = self.activity_repo.list_user_plan_activities(user_plan.id).await?;
        let entries: Vec<TrailEntry> = activities.iter().map(TrailEntry::from).collect();
        ensure_trail_transition(&entries, ActivityStatus::Submitted)?;

        let mut tx = self.pool.begin().await?;

        let activity = self
            .activity_repo
            .insert_user_plan_activity(
                &mut *tx,
                user_plan.id,
                actor.user_id,
                ActivityStatus::Submitted,
                payload.comment.as_deref(),
                None,
            )
            .await?;

        self.recompute_user_plan(&mut tx, user_plan.id).await?;
        tx.commit().await?;

        self.notification_service
            .notify("user_plan.submitted", &[user_plan.user_id]);

        Ok(activity)
    }

    pub async fn decide_user_plan(
        &self,
        actor: &ActorContext,
        user_plan_id: Uuid,
        approve: bool,
        payload: TrailActionPayload,
    ) -> Result<UserPlanActivity, AppError> {
        let user_plan = self.require_user_plan(user_plan_id).await?;
        self.require_decider(actor, user_plan.user_id).await?;

        let decision = if approve {
            ActivityStatus::Accepted
        } else {
            ActivityStatus::Rejected
        };

        let activities = self.activity_repo.list_user_plan_activities(user_plan.id).await?;
        let entries: Vec<TrailEntry> = activities.iter().map(TrailEntry::from).collect();
        ensure_trail_transition(&entries, decision)?;

        let mut tx = self.pool.begin().await?;

        let activity = self
            .activity_repo
            .insert_user_plan_activity(
                &mut *tx,
                user_plan.id,
                actor.user_id,
                decision,
                payload.comment.as_deref(),
                None,
            )
            .await?;

        self.recompute_user_plan(&mut tx, user_plan.id).await?;
        tx.commit().await?;

        let event = if approve {
            "user_plan.accepted"
        } else {
            "user_plan.rejected"
        };
        self.notification_service.notify(event, &[user_plan.user_id]);

        Ok(activity)
    }

    pub async fn revoke_user_plan(
        &self,
        actor: &ActorContext,
        user_plan_id: Uuid,
    ) -> Result<UserPlanActivity, AppError> {
        let user_plan = self.require_user_plan(user_plan_id).await?;
        self.require_decider(actor, user_plan.user_id).await?;

        let mut tx = self.pool.begin().await?;

        let activities = self
            .activity_repo
            .list_user_plan_activities_tx(&mut *tx, user_plan.id)
            .await?;
        let target = activities
            .iter()
            .find(|a| {
                matches!(a.status, ActivityStatus::Accepted | ActivityStatus::Rejected)
                    && !a.revoke_flag
            })
            .ok_or(AppError::NoRevocableDecision)?;

        self.activity_repo
            .flag_user_plan_activity_revoked(&mut *tx, target.id)
            .await?;

        let activity = self
            .activity_repo
            .insert_user_plan_activity(
                &mut *tx,
                user_plan.id,
                actor.user_id,
                ActivityStatus::Revoked,
                None,
                Some(target.id),
            )
            .await?;

        self.recompute_user_plan(&mut tx, user_plan.id).await?;
        tx.commit().await?;

        self.notification_service
            .notify("user_plan.revoked", &[user_plan.user_id]);

        Ok(activity)
    }

    // ---
    // Recálculo de status derivado: condições -> alocação -> plano,
    // sempre dentro da transação da mutação que o disparou.
    // ---
    async fn recompute_user_plan(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_plan_id: Uuid,
    ) -> Result<(), AppError> {
        let conditions = self
            .plan_repo
            .list_user_plan_conditions_tx(&mut **tx, user_plan_id)
            .await?;

        let mut derivations = Vec::with_capacity(conditions.len());
        for condition in &conditions {
            let activities = self
                .activity_repo
                .list_condition_activities_tx(&mut **tx, condition.id)
                .await?;
            let entries: Vec<TrailEntry> = activities.iter().map(TrailEntry::from).collect();

            let derivation = status::derive_condition(&entries);
            if derivation.status != condition.status {
                self.plan_repo
                    .update_user_plan_condition_status(&mut **tx, condition.id, derivation.status)
                    .await?;
            }
            derivations.push(derivation);
        }

        let user_plan = self
            .plan_repo
            .find_user_plan_by_id(user_plan_id)
            .await?
            .ok_or(AppError::AllocationNotFound)?;

        let new_status = status::derive_user_plan(&derivations);
        if new_status != user_plan.status {
            self.plan_repo
                .update_user_plan_status(&mut **tx, user_plan.id, new_status)
                .await?;
        }

        // O plano enxerga o status recém-gravado da alocação.
        let user_plans = self
            .plan_repo
            .list_user_plans_tx(&mut **tx, user_plan.plan_id)
            .await?;
        let statuses: Vec<_> = user_plans
            .iter()
            .map(|up| if up.id == user_plan.id { new_status } else { up.status })
            .collect();
        self.plan_repo
            .update_plan_status(&mut **tx, user_plan.plan_id, status::derive_plan(&statuses))
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn entry(status: ActivityStatus, offset_secs: i64) -> TrailEntry {
        TrailEntry {
            id: Uuid::new_v4(),
            status,
            revoke_flag: false,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    fn condition_activity(
        status: ActivityStatus,
        revoke_flag: bool,
    ) -> UserPlanConditionActivity {
        UserPlanConditionActivity {
            id: Uuid::new_v4(),
            user_plan_condition_id: Uuid::new_v4(),
            user_plan_id: Uuid::new_v4(),
            actor_user_id: Uuid::new_v4(),
            status,
            comment: None,
            attachment_url: None,
            revoke_flag,
            revoked_at: revoke_flag.then(Utc::now),
            revokes_activity_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn plan_frozen_outside_not_started() {
        assert!(ensure_plan_editable(PlanStatus::NotStarted).is_ok());
        assert!(matches!(
            ensure_plan_editable(PlanStatus::InProgress),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_plan_editable(PlanStatus::Completed),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn completed_plan_rejects_allocation_before_role_check() {
        // Mesmo com alvo Member, plano concluído falha primeiro.
        assert!(matches!(
            ensure_allocatable(PlanStatus::Completed, Role::Member),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn only_members_receive_allocations() {
        for role in [
            Role::SystemAdmin,
            Role::PowerUser,
            Role::SeniorUser,
            Role::Contributor,
        ] {
            assert!(
                matches!(
                    ensure_allocatable(PlanStatus::NotStarted, role),
                    Err(AppError::Forbidden(_))
                ),
                "papel {:?} não deveria receber alocação",
                role
            );
        }
        assert!(ensure_allocatable(PlanStatus::NotStarted, Role::Member).is_ok());
        assert!(ensure_allocatable(PlanStatus::InProgress, Role::Member).is_ok());
    }

    #[test]
    fn accepted_history_blocks_removal_until_revoked() {
        // Aceita e não revogada => Conflict.
        let accepted = condition_activity(ActivityStatus::Accepted, false);
        assert!(matches!(
            ensure_revocable(&[accepted.clone()]),
            Err(AppError::ConditionChanged)
        ));

        // Depois de revogada, a mesma remoção passa.
        let mut revoked = accepted;
        revoked.revoke_flag = true;
        revoked.revoked_at = Some(Utc::now());
        let marker = condition_activity(ActivityStatus::Revoked, false);
        assert!(ensure_revocable(&[revoked, marker]).is_ok());
    }

    #[test]
    fn decision_requires_pending_submission() {
        // Aprovar uma condição nunca submetida pularia PendingApproval.
        assert!(matches!(
            ensure_trail_transition(&[], ActivityStatus::Accepted),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            ensure_trail_transition(&[], ActivityStatus::Rejected),
            Err(AppError::Forbidden(_))
        ));

        // Com submissão pendente, ambas as decisões são legais.
        let pending = vec![entry(ActivityStatus::Submitted, 0)];
        assert!(ensure_trail_transition(&pending, ActivityStatus::Accepted).is_ok());
        assert!(ensure_trail_transition(&pending, ActivityStatus::Rejected).is_ok());

        // Decidir duas vezes também é ilegal.
        let decided = vec![
            entry(ActivityStatus::Submitted, 0),
            entry(ActivityStatus::Accepted, 10),
        ];
        assert!(matches!(
            ensure_trail_transition(&decided, ActivityStatus::Rejected),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn resubmission_requires_rejection_or_empty_trail() {
        assert!(ensure_trail_transition(&[], ActivityStatus::Submitted).is_ok());

        // Submeter por cima de uma aceitação não revogada reabriria uma
        // condição concluída.
        let accepted = vec![
            entry(ActivityStatus::Submitted, 0),
            entry(ActivityStatus::Accepted, 10),
        ];
        assert!(matches!(
            ensure_trail_transition(&accepted, ActivityStatus::Submitted),
            Err(AppError::Forbidden(_))
        ));

        // Submissão duplicada enquanto pendente também não.
        let pending = vec![entry(ActivityStatus::Submitted, 0)];
        assert!(matches!(
            ensure_trail_transition(&pending, ActivityStatus::Submitted),
            Err(AppError::Forbidden(_))
        ));

        // Depois de uma rejeição, o reenvio é o caminho esperado.
        let rejected = vec![
            entry(ActivityStatus::Submitted, 0),
            entry(ActivityStatus::Rejected, 10),
        ];
        assert!(ensure_trail_transition(&rejected, ActivityStatus::Submitted).is_ok());
    }

    #[test]
    fn revocation_reopens_the_decision() {
        // Aceitação revogada volta a contar como submissão pendente, então
        // uma nova decisão é legal e um reenvio não.
        let mut accepted = entry(ActivityStatus::Accepted, 10);
        accepted.revoke_flag = true;
        let trail = vec![
            entry(ActivityStatus::Submitted, 0),
            accepted,
            entry(ActivityStatus::Revoked, 20),
        ];

        assert!(ensure_trail_transition(&trail, ActivityStatus::Accepted).is_ok());
        assert!(matches!(
            ensure_trail_transition(&trail, ActivityStatus::Submitted),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn submissions_and_rejections_do_not_block_removal() {
        let trail = vec![
            condition_activity(ActivityStatus::Submitted, false),
            condition_activity(ActivityStatus::Rejected, false),
        ];
        assert!(ensure_revocable(&trail).is_ok());
    }
}
