// src/services/scope_service.rs

use std::collections::HashSet;

use uuid::Uuid;

use crate::common::error::AppError;
use crate::db::UserRepository;
use crate::models::{auth::ActorContext, auth::User, org::Role};

// ---
// O resolutor de escopo: calcula, para um ator, o conjunto de usuários que
// ele pode ver/administrar. Função pura sobre o snapshot de usuários do
// tenant; o serviço abaixo só busca o snapshot e delega.
//
// Regras, indexadas por papel (sem vazamento entre departamentos):
//   SystemAdmin -> todo o tenant
//   PowerUser   -> papéis abaixo, no mesmo departamento
//   SeniorUser  -> Contributor/Member, mesmo departamento E divisão
//   Contributor -> Member, mesmo departamento E divisão E grupo
//   Member      -> apenas ele mesmo
//
// Fail-closed: tenant nulo ou ator não resolvível => conjunto vazio.
// ---
pub fn managed_scope(actor: &ActorContext, tenant_users: &[User]) -> HashSet<Uuid> {
    if actor.tenant_id.is_nil() {
        return HashSet::new();
    }

    // O próprio registro do ator precisa existir no snapshot (e não estar
    // apagado); caso contrário, nada é visível.
    let resolved = tenant_users
        .iter()
        .any(|u| u.id == actor.user_id && u.deleted_at.is_none());
    if !resolved {
        return HashSet::new();
    }

    let mut scope = HashSet::new();
    scope.insert(actor.user_id);

    for user in tenant_users {
        if user.id == actor.user_id || user.deleted_at.is_some() {
            continue;
        }

        let managed = match actor.role {
            Role::SystemAdmin => true,

            Role::PowerUser => {
                actor.role.manages(user.role)
                    && actor.department_id.is_some()
                    && user.department_id == actor.department_id
            }

            Role::SeniorUser => {
                matches!(user.role, Role::Contributor | Role::Member)
                    && actor.department_id.is_some()
                    && user.department_id == actor.department_id
                    && actor.division_id.is_some()
                    && user.division_id == actor.division_id
            }

            Role::Contributor => {
                user.role == Role::Member
                    && actor.department_id.is_some()
                    && user.department_id == actor.department_id
                    && actor.division_id.is_some()
                    && user.division_id == actor.division_id
                    && actor.group_id.is_some()
                    && user.group_id == actor.group_id
            }

            Role::Member => false,
        };

        if managed {
            scope.insert(user.id);
        }
    }

    scope
}

#[derive(Clone)]
pub struct ScopeService {
    user_repo: UserRepository,
}

impl ScopeService {
    pub fn new(user_repo: UserRepository) -> Self {
        Self { user_repo }
    }

    // Recalculado a cada chamada: a posição organizacional pode mudar entre
    // requisições, então nada de memoização.
    pub async fn managed_scope(&self, actor: &ActorContext) -> Result<HashSet<Uuid>, AppError> {
        if actor.tenant_id.is_nil() {
            return Ok(HashSet::new());
        }

        let users = self.user_repo.list_active_in_tenant(actor.tenant_id).await?;
        Ok(managed_scope(actor, &users))
    }

    // Lista materializada (para o endpoint /users/managed).
    pub async fn managed_users(&self, actor: &ActorContext) -> Result<Vec<User>, AppError> {
        let users = self.user_repo.list_active_in_tenant(actor.tenant_id).await?;
        let scope = managed_scope(actor, &users);

        Ok(users.into_iter().filter(|u| scope.contains(&u.id)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(
        tenant: Uuid,
        role: Role,
        dept: Option<Uuid>,
        div: Option<Uuid>,
        group: Option<Uuid>,
    ) -> User {
        User {
            id: Uuid::new_v4(),
            tenant_id: tenant,
            email: format!("{}@example.com", Uuid::new_v4()),
            password_hash: "hash".into(),
            display_name: "Usuário".into(),
            role,
            department_id: dept,
            division_id: div,
            group_id: group,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            deleted_at: None,
        }
    }

    fn actor_of(u: &User) -> ActorContext {
        ActorContext::from(u)
    }

    #[test]
    fn system_admin_sees_whole_tenant() {
        let tenant = Uuid::new_v4();
        let admin = user(tenant, Role::SystemAdmin, None, None, None);
        let mut users = vec![admin.clone()];
        for _ in 0..4 {
            users.push(user(tenant, Role::Member, Some(Uuid::new_v4()), None, None));
        }

        let scope = managed_scope(&actor_of(&admin), &users);
        assert_eq!(scope.len(), 5);
        for u in &users {
            assert!(scope.contains(&u.id));
        }
    }

    #[test]
    fn power_user_is_confined_to_department() {
        let tenant = Uuid::new_v4();
        let d1 = Uuid::new_v4();
        let d2 = Uuid::new_v4();

        let power = user(tenant, Role::PowerUser, Some(d1), None, None);
        let senior = user(tenant, Role::SeniorUser, Some(d1), None, None);
        let contributor = user(tenant, Role::Contributor, Some(d1), None, None);
        let member_d1 = user(tenant, Role::Member, Some(d1), None, None);
        let member_d2 = user(tenant, Role::Member, Some(d2), None, None);

        let users = vec![
            power.clone(),
            senior.clone(),
            contributor.clone(),
            member_d1.clone(),
            member_d2.clone(),
        ];

        let scope = managed_scope(&actor_of(&power), &users);
        assert!(scope.contains(&power.id));
        assert!(scope.contains(&senior.id));
        assert!(scope.contains(&contributor.id));
        assert!(scope.contains(&member_d1.id));
        assert!(!scope.contains(&member_d2.id));
    }

    #[test]
    fn power_user_never_manages_peers_or_admins() {
        let tenant = Uuid::new_v4();
        let d1 = Uuid::new_v4();

        let power = user(tenant, Role::PowerUser, Some(d1), None, None);
        let other_power = user(tenant, Role::PowerUser, Some(d1), None, None);
        let admin = user(tenant, Role::SystemAdmin, Some(d1), None, None);

        let users = vec![power.clone(), other_power.clone(), admin.clone()];
        let scope = managed_scope(&actor_of(&power), &users);

        assert!(!scope.contains(&other_power.id));
        assert!(!scope.contains(&admin.id));
    }

    #[test]
    fn senior_user_requires_same_division() {
        let tenant = Uuid::new_v4();
        let dept = Uuid::new_v4();
        let div_a = Uuid::new_v4();
        let div_b = Uuid::new_v4();

        let senior = user(tenant, Role::SeniorUser, Some(dept), Some(div_a), None);
        let member_same = user(tenant, Role::Member, Some(dept), Some(div_a), None);
        let member_other = user(tenant, Role::Member, Some(dept), Some(div_b), None);

        let users = vec![senior.clone(), member_same.clone(), member_other.clone()];
        let scope = managed_scope(&actor_of(&senior), &users);

        assert!(scope.contains(&member_same.id));
        assert!(!scope.contains(&member_other.id));
    }

    #[test]
    fn contributor_scope_is_contained_in_own_group() {
        let tenant = Uuid::new_v4();
        let dept = Uuid::new_v4();
        let div = Uuid::new_v4();
        let group = Uuid::new_v4();

        let contributor = user(tenant, Role::Contributor, Some(dept), Some(div), Some(group));
        let member_in = user(tenant, Role::Member, Some(dept), Some(div), Some(group));
        let member_out = user(tenant, Role::Member, Some(dept), Some(div), Some(Uuid::new_v4()));
        let contributor_in = user(tenant, Role::Contributor, Some(dept), Some(div), Some(group));

        let users = vec![
            contributor.clone(),
            member_in.clone(),
            member_out.clone(),
            contributor_in.clone(),
        ];
        let scope = managed_scope(&actor_of(&contributor), &users);

        assert!(scope.contains(&member_in.id));
        assert!(!scope.contains(&member_out.id));
        // Pares (mesmo papel) nunca entram, mesmo no mesmo grupo.
        assert!(!scope.contains(&contributor_in.id));
    }

    #[test]
    fn member_sees_only_self() {
        let tenant = Uuid::new_v4();
        let dept = Uuid::new_v4();
        let member = user(tenant, Role::Member, Some(dept), None, None);
        let other = user(tenant, Role::Member, Some(dept), None, None);

        let users = vec![member.clone(), other.clone()];
        let scope = managed_scope(&actor_of(&member), &users);

        assert_eq!(scope.len(), 1);
        assert!(scope.contains(&member.id));
    }

    #[test]
    fn scope_always_contains_actor_id() {
        let tenant = Uuid::new_v4();
        for role in [
            Role::SystemAdmin,
            Role::PowerUser,
            Role::SeniorUser,
            Role::Contributor,
            Role::Member,
        ] {
            let actor = user(tenant, role, Some(Uuid::new_v4()), None, None);
            let scope = managed_scope(&actor_of(&actor), &[actor.clone()]);
            assert!(scope.contains(&actor.id), "papel {:?} perdeu o próprio id", role);
        }
    }

    #[test]
    fn role_order_invariant_holds() {
        // Nenhum escopo contém usuário com papel igual ou superior ao do
        // ator, exceto o próprio ator.
        let tenant = Uuid::new_v4();
        let dept = Uuid::new_v4();
        let div = Uuid::new_v4();
        let group = Uuid::new_v4();

        let roles = [
            Role::SystemAdmin,
            Role::PowerUser,
            Role::SeniorUser,
            Role::Contributor,
            Role::Member,
        ];

        let mut users = Vec::new();
        for role in roles {
            users.push(user(tenant, role, Some(dept), Some(div), Some(group)));
        }

        for actor_user in &users {
            if actor_user.role == Role::SystemAdmin {
                continue; // administra o tenant inteiro por definição
            }
            let scope = managed_scope(&actor_of(actor_user), &users);
            for u in &users {
                if u.id == actor_user.id {
                    continue;
                }
                if scope.contains(&u.id) {
                    assert!(
                        actor_user.role.manages(u.role),
                        "{:?} não deveria administrar {:?}",
                        actor_user.role,
                        u.role
                    );
                }
            }
        }
    }

    #[test]
    fn nil_tenant_fails_closed() {
        let dept = Uuid::new_v4();
        let mut admin = user(Uuid::new_v4(), Role::SystemAdmin, Some(dept), None, None);
        admin.tenant_id = Uuid::nil();

        let actor = actor_of(&admin);
        assert!(managed_scope(&actor, &[admin]).is_empty());
    }

    #[test]
    fn unresolved_actor_fails_closed() {
        let tenant = Uuid::new_v4();
        let ghost = user(tenant, Role::SystemAdmin, None, None, None);
        let someone = user(tenant, Role::Member, None, None, None);

        // O registro do ator não está no snapshot.
        let scope = managed_scope(&actor_of(&ghost), &[someone]);
        assert!(scope.is_empty());
    }

    #[test]
    fn deleted_users_are_excluded() {
        let tenant = Uuid::new_v4();
        let admin = user(tenant, Role::SystemAdmin, None, None, None);
        let mut deleted = user(tenant, Role::Member, None, None, None);
        deleted.deleted_at = Some(Utc::now());

        let scope = managed_scope(&actor_of(&admin), &[admin.clone(), deleted.clone()]);
        assert!(!scope.contains(&deleted.id));
    }
}
