// src/services/report_service.rs

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrgRepository, ReportRepository},
    models::auth::ActorContext,
    models::org::Role,
    models::report::{CreateReportPayload, Report, ReportDetail, ResourceTarget},
    services::notification::NotificationService,
    services::scope_service::ScopeService,
};

// ---
// O portão de visibilidade: predicados puros sobre
// (ator, escopo gerenciado, snapshot de endereçamento do recurso).
// Nenhuma mutação, nenhuma consulta — o serviço monta o snapshot.
// ---

// Leitura (a regra mais permissiva). Visível se QUALQUER uma valer:
//   1. recurso público;
//   2. ator é SystemAdmin;
//   3. criador dentro do escopo do ator;
//   4. algum destinatário explícito dentro do escopo;
//   5. interseção da posição do ator com os alvos de dept/divisão/grupo;
//   6. expansão divisão→grupo: o grupo do ator está aninhado sob uma
//      divisão alvo, mesmo sem ter sido endereçado diretamente.
pub fn can_view(actor: &ActorContext, scope: &HashSet<Uuid>, target: &ResourceTarget) -> bool {
    if target.is_public {
        return true;
    }
    if actor.role == Role::SystemAdmin {
        return true;
    }
    if scope.contains(&target.creator_id) {
        return true;
    }
    if target.user_ids.iter().any(|u| scope.contains(u)) {
        return true;
    }
    if org_intersects(actor, target) {
        return true;
    }
    if let Some(group_id) = actor.group_id {
        if target.expanded_group_ids.contains(&group_id) {
            return true;
        }
    }
    false
}

// Escrita (subconjunto estrito da leitura): sem a regra de destinatário e
// sem a expansão divisão→grupo. Member só edita o que criou.
pub fn can_edit(actor: &ActorContext, scope: &HashSet<Uuid>, target: &ResourceTarget) -> bool {
    if actor.role == Role::Member {
        return target.creator_id == actor.user_id;
    }

    target.is_public
        || actor.role == Role::SystemAdmin
        || scope.contains(&target.creator_id)
        || org_intersects(actor, target)
}

fn org_intersects(actor: &ActorContext, target: &ResourceTarget) -> bool {
    let dept = actor
        .department_id
        .is_some_and(|d| target.department_ids.contains(&d));
    let division = actor
        .division_id
        .is_some_and(|d| target.division_ids.contains(&d));
    let group = actor.group_id.is_some_and(|g| target.group_ids.contains(&g));

    dept || division || group
}

#[derive(Clone)]
pub struct ReportService {
    report_repo: ReportRepository,
    org_repo: OrgRepository,
    scope_service: ScopeService,
    notification_service: NotificationService,
    pool: PgPool,
}

impl ReportService {
    pub fn new(
        report_repo: ReportRepository,
        org_repo: OrgRepository,
        scope_service: ScopeService,
        notification_service: NotificationService,
        pool: PgPool,
    ) -> Self {
        Self {
            report_repo,
            org_repo,
            scope_service,
            notification_service,
            pool,
        }
    }

    // Monta o snapshot de endereçamento de um relatório, incluindo a
    // expansão divisão→grupo.
    async fn target_snapshot(&self, report: &Report) -> Result<ResourceTarget, AppError> {
        let (user_ids, department_ids, division_ids, group_ids) =
            self.report_repo.load_target_lists(report.id).await?;

        let expanded_group_ids = self.org_repo.groups_in_divisions(&division_ids).await?;

        Ok(ResourceTarget {
            creator_id: report.creator_user_id,
            is_public: report.is_public,
            user_ids,
            department_ids,
            division_ids,
            group_ids,
            expanded_group_ids,
        })
    }

    pub async fn create_report(
        &self,
        actor: &ActorContext,
        payload: CreateReportPayload,
    ) -> Result<ReportDetail, AppError> {
        let mut tx = self.pool.begin().await?;

        let report = self
            .report_repo
            .insert_report(
                &mut *tx,
                actor.tenant_id,
                actor.user_id,
                &payload.title,
                &payload.body,
                payload.is_public,
            )
            .await?;

        self.report_repo
            .rewrite_targets(&mut tx, report.id, &payload.target)
            .await?;

        tx.commit().await?;

        self.notification_service
            .notify("report.created", &payload.target.user_ids);

        Ok(ReportDetail {
            report,
            user_ids: payload.target.user_ids,
            department_ids: payload.target.department_ids,
            division_ids: payload.target.division_ids,
            group_ids: payload.target.group_ids,
        })
    }

    pub async fn get_report(
        &self,
        actor: &ActorContext,
        report_id: Uuid,
    ) -> Result<ReportDetail, AppError> {
        let report = self
            .report_repo
            .find_report(report_id, actor.tenant_id)
            .await?
            .ok_or(AppError::ReportNotFound)?;

        let target = self.target_snapshot(&report).await?;
        let scope = self.scope_service.managed_scope(actor).await?;

        if !can_view(actor, &scope, &target) {
            return Err(AppError::Forbidden(
                "Você não tem acesso a este relatório.".into(),
            ));
        }

        Ok(ReportDetail {
            report,
            user_ids: target.user_ids,
            department_ids: target.department_ids,
            division_ids: target.division_ids,
            group_ids: target.group_ids,
        })
    }

    pub async fn list_reports(&self, actor: &ActorContext) -> Result<Vec<Report>, AppError> {
        let scope = self.scope_service.managed_scope(actor).await?;
        let reports = self.report_repo.list_reports(actor.tenant_id).await?;

        let mut visible = Vec::new();
        for report in reports {
            let target = self.target_snapshot(&report).await?;
            if can_view(actor, &scope, &target) {
                visible.push(report);
            }
        }

        Ok(visible)
    }

    pub async fn update_report(
        &self,
        actor: &ActorContext,
        report_id: Uuid,
        payload: CreateReportPayload,
    ) -> Result<ReportDetail, AppError> {
        let report = self
            .report_repo
            .find_report(report_id, actor.tenant_id)
            .await?
            .ok_or(AppError::ReportNotFound)?;

        let target = self.target_snapshot(&report).await?;
        let scope = self.scope_service.managed_scope(actor).await?;

        if !can_edit(actor, &scope, &target) {
            return Err(AppError::Forbidden(
                "Você não tem permissão para editar este relatório.".into(),
            ));
        }

        let mut tx = self.pool.begin().await?;

        let report = self
            .report_repo
            .update_report(
                &mut *tx,
                report.id,
                &payload.title,
                &payload.body,
                payload.is_public,
            )
            .await?;

        self.report_repo
            .rewrite_targets(&mut tx, report.id, &payload.target)
            .await?;

        tx.commit().await?;

        Ok(ReportDetail {
            report,
            user_ids: payload.target.user_ids,
            department_ids: payload.target.department_ids,
            division_ids: payload.target.division_ids,
            group_ids: payload.target.group_ids,
        })
    }

    pub async fn delete_report(
        &self,
        actor: &ActorContext,
        report_id: Uuid,
    ) -> Result<(), AppError> {
        let report = self
            .report_repo
            .find_report(report_id, actor.tenant_id)
            .await?
            .ok_or(AppError::ReportNotFound)?;

        let target = self.target_snapshot(&report).await?;
        let scope = self.scope_service.managed_scope(actor).await?;

        if !can_edit(actor, &scope, &target) {
            return Err(AppError::Forbidden(
                "Você não tem permissão para excluir este relatório.".into(),
            ));
        }

        self.report_repo.soft_delete_report(&self.pool, report.id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actor(role: Role, dept: Option<Uuid>, div: Option<Uuid>, group: Option<Uuid>) -> ActorContext {
        ActorContext {
            user_id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            role,
            department_id: dept,
            division_id: div,
            group_id: group,
        }
    }

    fn self_scope(actor: &ActorContext) -> HashSet<Uuid> {
        HashSet::from([actor.user_id])
    }

    #[test]
    fn public_resource_is_visible_to_anyone() {
        let viewer = actor(Role::Member, None, None, None);
        let target = ResourceTarget {
            creator_id: Uuid::new_v4(),
            is_public: true,
            ..Default::default()
        };
        assert!(can_view(&viewer, &self_scope(&viewer), &target));
    }

    #[test]
    fn system_admin_sees_everything() {
        let admin = actor(Role::SystemAdmin, None, None, None);
        let target = ResourceTarget {
            creator_id: Uuid::new_v4(),
            ..Default::default()
        };
        assert!(can_view(&admin, &self_scope(&admin), &target));
        assert!(can_edit(&admin, &self_scope(&admin), &target));
    }

    #[test]
    fn department_target_grants_view_not_edit_to_member() {
        // Relatório privado endereçado ao departamento D1, criado em D2:
        // um Member de D1 vê, mas não edita.
        let d1 = Uuid::new_v4();
        let viewer = actor(Role::Member, Some(d1), None, None);
        let target = ResourceTarget {
            creator_id: Uuid::new_v4(),
            is_public: false,
            department_ids: vec![d1],
            ..Default::default()
        };

        let scope = self_scope(&viewer);
        assert!(can_view(&viewer, &scope, &target));
        assert!(!can_edit(&viewer, &scope, &target));
    }

    #[test]
    fn recipient_in_scope_grants_view_only() {
        let manager = actor(Role::PowerUser, Some(Uuid::new_v4()), None, None);
        let managed_user = Uuid::new_v4();
        let mut scope = self_scope(&manager);
        scope.insert(managed_user);

        let target = ResourceTarget {
            creator_id: Uuid::new_v4(),
            user_ids: vec![managed_user],
            ..Default::default()
        };

        assert!(can_view(&manager, &scope, &target));
        // Ser destinatário (regra 4) não basta para editar.
        assert!(!can_edit(&manager, &scope, &target));
    }

    #[test]
    fn division_expansion_widens_view_only() {
        let group = Uuid::new_v4();
        let viewer = actor(Role::Member, Some(Uuid::new_v4()), None, Some(group));
        let target = ResourceTarget {
            creator_id: Uuid::new_v4(),
            division_ids: vec![Uuid::new_v4()],
            expanded_group_ids: vec![group],
            ..Default::default()
        };

        let scope = self_scope(&viewer);
        assert!(can_view(&viewer, &scope, &target));
        assert!(!can_edit(&viewer, &scope, &target));
    }

    #[test]
    fn member_edits_only_own_resources() {
        let member = actor(Role::Member, Some(Uuid::new_v4()), None, None);

        let own = ResourceTarget {
            creator_id: member.user_id,
            ..Default::default()
        };
        let foreign = ResourceTarget {
            creator_id: Uuid::new_v4(),
            is_public: true,
            ..Default::default()
        };

        let scope = self_scope(&member);
        assert!(can_edit(&member, &scope, &own));
        assert!(!can_edit(&member, &scope, &foreign));
    }

    #[test]
    fn edit_implies_view() {
        // Monotonicidade: qualquer combinação em que can_edit vale,
        // can_view também vale.
        let dept = Uuid::new_v4();
        let div = Uuid::new_v4();
        let group = Uuid::new_v4();
        let creator = Uuid::new_v4();

        let actors = [
            actor(Role::SystemAdmin, None, None, None),
            actor(Role::PowerUser, Some(dept), None, None),
            actor(Role::SeniorUser, Some(dept), Some(div), None),
            actor(Role::Contributor, Some(dept), Some(div), Some(group)),
            actor(Role::Member, Some(dept), Some(div), Some(group)),
        ];

        let targets = [
            ResourceTarget { creator_id: creator, is_public: true, ..Default::default() },
            ResourceTarget { creator_id: creator, department_ids: vec![dept], ..Default::default() },
            ResourceTarget { creator_id: creator, division_ids: vec![div], ..Default::default() },
            ResourceTarget { creator_id: creator, group_ids: vec![group], ..Default::default() },
            ResourceTarget { creator_id: creator, user_ids: vec![creator], ..Default::default() },
            ResourceTarget { creator_id: creator, expanded_group_ids: vec![group], ..Default::default() },
        ];

        for a in &actors {
            for with_creator_in_scope in [false, true] {
                let mut scope = self_scope(a);
                if with_creator_in_scope {
                    scope.insert(creator);
                }
                for t in &targets {
                    if can_edit(a, &scope, t) {
                        assert!(can_view(a, &scope, t), "can_edit sem can_view: {:?}", a.role);
                    }
                }
            }
        }
    }
}
