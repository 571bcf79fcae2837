// src/services/status.rs

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::plan::{
    ActivityStatus, PlanStatus, UserPlanActivity, UserPlanConditionActivity,
    UserPlanConditionStatus, UserPlanStatus,
};

// ---
// O agregador de status: funções puras que derivam o status de
// UserPlanCondition / UserPlan / Plan a partir da trilha de atividades.
// Recalculado (e persistido na mesma transação) a cada mutação da trilha;
// nunca gravado diretamente pelo cliente.
// ---

// Visão mínima de uma atividade, suficiente para a derivação.
#[derive(Debug, Clone)]
pub struct TrailEntry {
    pub id: Uuid,
    pub status: ActivityStatus,
    pub revoke_flag: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&UserPlanConditionActivity> for TrailEntry {
    fn from(a: &UserPlanConditionActivity) -> Self {
        Self {
            id: a.id,
            status: a.status,
            revoke_flag: a.revoke_flag,
            created_at: a.created_at,
        }
    }
}

impl From<&UserPlanActivity> for TrailEntry {
    fn from(a: &UserPlanActivity) -> Self {
        Self {
            id: a.id,
            status: a.status,
            revoke_flag: a.revoke_flag,
            created_at: a.created_at,
        }
    }
}

// Derivação de uma condição: além do status, o agregador de alocação
// precisa saber se ela está parada em uma rejeição não reenviada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionDerivation {
    pub status: UserPlanConditionStatus,
    pub rejection_pending: bool,
}

// A atividade "mais recente" para fins de status: marcadores Revoked e
// atividades já revogadas são invisíveis — o status volta ao que era antes
// da decisão desfeita. Desempate canônico: created_at DESC, id DESC.
pub fn latest_effective(entries: &[TrailEntry]) -> Option<&TrailEntry> {
    entries
        .iter()
        .filter(|e| e.status != ActivityStatus::Revoked && !e.revoke_flag)
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        })
}

pub fn derive_condition(entries: &[TrailEntry]) -> ConditionDerivation {
    match latest_effective(entries).map(|e| e.status) {
        Some(ActivityStatus::Accepted) => ConditionDerivation {
            status: UserPlanConditionStatus::Completed,
            rejection_pending: false,
        },
        Some(ActivityStatus::Submitted) => ConditionDerivation {
            status: UserPlanConditionStatus::PendingApproval,
            rejection_pending: false,
        },
        Some(ActivityStatus::Rejected) => ConditionDerivation {
            status: UserPlanConditionStatus::Incomplete,
            rejection_pending: true,
        },
        // Sem atividade efetiva => nada foi enviado ainda.
        _ => ConditionDerivation {
            status: UserPlanConditionStatus::Incomplete,
            rejection_pending: false,
        },
    }
}

pub fn derive_user_plan(conditions: &[ConditionDerivation]) -> UserPlanStatus {
    if !conditions.is_empty()
        && conditions
            .iter()
            .all(|c| c.status == UserPlanConditionStatus::Completed)
    {
        return UserPlanStatus::Completed;
    }

    let any_pending = conditions
        .iter()
        .any(|c| c.status == UserPlanConditionStatus::PendingApproval);
    let any_rejection = conditions.iter().any(|c| c.rejection_pending);

    if any_pending && !any_rejection {
        UserPlanStatus::PendingApproval
    } else {
        UserPlanStatus::InProgress
    }
}

pub fn derive_plan(user_plans: &[UserPlanStatus]) -> PlanStatus {
    if user_plans.is_empty() {
        return PlanStatus::NotStarted;
    }

    if user_plans.iter().all(|s| *s == UserPlanStatus::Completed) {
        PlanStatus::Completed
    } else {
        PlanStatus::InProgress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn entry(status: ActivityStatus, offset_secs: i64) -> TrailEntry {
        TrailEntry {
            id: Uuid::new_v4(),
            status,
            revoke_flag: false,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[test]
    fn empty_trail_is_incomplete() {
        let d = derive_condition(&[]);
        assert_eq!(d.status, UserPlanConditionStatus::Incomplete);
        assert!(!d.rejection_pending);
    }

    #[test]
    fn submitted_becomes_pending_approval() {
        let trail = vec![entry(ActivityStatus::Submitted, 0)];
        assert_eq!(
            derive_condition(&trail).status,
            UserPlanConditionStatus::PendingApproval
        );
    }

    #[test]
    fn accepted_becomes_completed() {
        let trail = vec![
            entry(ActivityStatus::Submitted, 0),
            entry(ActivityStatus::Accepted, 10),
        ];
        assert_eq!(
            derive_condition(&trail).status,
            UserPlanConditionStatus::Completed
        );
    }

    #[test]
    fn rejected_falls_back_to_incomplete() {
        let trail = vec![
            entry(ActivityStatus::Submitted, 0),
            entry(ActivityStatus::Rejected, 10),
        ];
        let d = derive_condition(&trail);
        assert_eq!(d.status, UserPlanConditionStatus::Incomplete);
        assert!(d.rejection_pending);
    }

    #[test]
    fn resubmission_clears_rejection() {
        let trail = vec![
            entry(ActivityStatus::Submitted, 0),
            entry(ActivityStatus::Rejected, 10),
            entry(ActivityStatus::Submitted, 20),
        ];
        let d = derive_condition(&trail);
        assert_eq!(d.status, UserPlanConditionStatus::PendingApproval);
        assert!(!d.rejection_pending);
    }

    #[test]
    fn revoke_restores_pre_decision_status() {
        // Aprovar e depois revogar devolve o status anterior à aprovação.
        let submitted = entry(ActivityStatus::Submitted, 0);
        let mut accepted = entry(ActivityStatus::Accepted, 10);

        let before = derive_condition(&[submitted.clone()]).status;

        accepted.revoke_flag = true;
        let trail = vec![
            submitted,
            accepted,
            entry(ActivityStatus::Revoked, 20),
        ];
        assert_eq!(derive_condition(&trail).status, before);
        assert_eq!(
            derive_condition(&trail).status,
            UserPlanConditionStatus::PendingApproval
        );
    }

    #[test]
    fn same_instant_ties_break_by_id() {
        let at = Utc::now();
        let mut a = entry(ActivityStatus::Submitted, 0);
        let mut b = entry(ActivityStatus::Accepted, 0);
        a.created_at = at;
        b.created_at = at;

        // O maior id vence quando o instante empata.
        let (first, second) = if a.id < b.id { (a, b) } else { (b, a) };
        let trail = vec![first, second.clone()];
        assert_eq!(latest_effective(&trail).unwrap().id, second.id);
    }

    #[test]
    fn user_plan_completed_only_when_all_conditions_complete() {
        let done = ConditionDerivation {
            status: UserPlanConditionStatus::Completed,
            rejection_pending: false,
        };
        let open = ConditionDerivation {
            status: UserPlanConditionStatus::Incomplete,
            rejection_pending: false,
        };

        assert_eq!(derive_user_plan(&[done, done]), UserPlanStatus::Completed);
        assert_eq!(derive_user_plan(&[done, open]), UserPlanStatus::InProgress);
    }

    #[test]
    fn user_plan_pending_blocked_by_unresubmitted_rejection() {
        let pending = ConditionDerivation {
            status: UserPlanConditionStatus::PendingApproval,
            rejection_pending: false,
        };
        let rejected = ConditionDerivation {
            status: UserPlanConditionStatus::Incomplete,
            rejection_pending: true,
        };

        assert_eq!(derive_user_plan(&[pending]), UserPlanStatus::PendingApproval);
        assert_eq!(
            derive_user_plan(&[pending, rejected]),
            UserPlanStatus::InProgress
        );
    }

    #[test]
    fn plan_status_over_allocations() {
        assert_eq!(derive_plan(&[]), PlanStatus::NotStarted);
        assert_eq!(
            derive_plan(&[UserPlanStatus::Completed, UserPlanStatus::Completed]),
            PlanStatus::Completed
        );
        assert_eq!(
            derive_plan(&[UserPlanStatus::Completed, UserPlanStatus::InProgress]),
            PlanStatus::InProgress
        );
    }
}
