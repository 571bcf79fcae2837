// src/services/org_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{OrgRepository, UserRepository},
    models::auth::{ActorContext, User},
    models::org::{
        AssignPositionPayload, CreateDepartmentPayload, CreateDivisionPayload,
        CreateGroupPayload, Department, Division, Group, Role,
    },
    services::scope_service::ScopeService,
};

// Consistência da posição organizacional, verificada no momento da
// atribuição (invariante suave: não há garantia de chave estrangeira
// cobrindo todos os caminhos).
fn ensure_consistent_position(
    department_id: Uuid,
    division: Option<&Division>,
    group: Option<&Group>,
) -> Result<(), AppError> {
    if let Some(division) = division {
        if division.department_id != department_id {
            return Err(AppError::Forbidden(
                "A divisão não pertence ao departamento informado.".into(),
            ));
        }
    }

    if let Some(group) = group {
        if group.department_id != department_id {
            return Err(AppError::Forbidden(
                "O grupo não pertence ao departamento informado.".into(),
            ));
        }
        // Grupo ancorado em divisão: a divisão do usuário precisa bater.
        if let Some(group_division) = group.division_id {
            if division.map(|d| d.id) != Some(group_division) {
                return Err(AppError::Forbidden(
                    "O grupo pertence a outra divisão.".into(),
                ));
            }
        }
    }

    Ok(())
}

#[derive(Clone)]
pub struct OrgService {
    org_repo: OrgRepository,
    user_repo: UserRepository,
    scope_service: ScopeService,
    pool: PgPool,
}

impl OrgService {
    pub fn new(
        org_repo: OrgRepository,
        user_repo: UserRepository,
        scope_service: ScopeService,
        pool: PgPool,
    ) -> Self {
        Self {
            org_repo,
            user_repo,
            scope_service,
            pool,
        }
    }

    fn require_admin(&self, actor: &ActorContext) -> Result<(), AppError> {
        if actor.role == Role::SystemAdmin {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Apenas administradores podem gerenciar unidades organizacionais.".into(),
            ))
        }
    }

    pub async fn create_department(
        &self,
        actor: &ActorContext,
        payload: CreateDepartmentPayload,
    ) -> Result<Department, AppError> {
        self.require_admin(actor)?;
        self.org_repo.create_department(actor.tenant_id, &payload.name).await
    }

    pub async fn create_division(
        &self,
        actor: &ActorContext,
        payload: CreateDivisionPayload,
    ) -> Result<Division, AppError> {
        self.require_admin(actor)?;

        self.org_repo
            .find_department(payload.department_id, actor.tenant_id)
            .await?
            .ok_or(AppError::DepartmentNotFound)?;

        self.org_repo.create_division(payload.department_id, &payload.name).await
    }

    pub async fn create_group(
        &self,
        actor: &ActorContext,
        payload: CreateGroupPayload,
    ) -> Result<Group, AppError> {
        self.require_admin(actor)?;

        self.org_repo
            .find_department(payload.department_id, actor.tenant_id)
            .await?
            .ok_or(AppError::DepartmentNotFound)?;

        // Se o grupo referencia uma divisão, ela precisa ser do mesmo
        // departamento.
        if let Some(division_id) = payload.division_id {
            let division = self
                .org_repo
                .find_division(division_id)
                .await?
                .ok_or(AppError::OrgUnitNotFound)?;
            if division.department_id != payload.department_id {
                return Err(AppError::Forbidden(
                    "A divisão não pertence ao departamento informado.".into(),
                ));
            }
        }

        self.org_repo
            .create_group(payload.department_id, payload.division_id, &payload.name)
            .await
    }

    // Atribui a posição organizacional de um usuário dentro do escopo do
    // ator, validando a consistência departamento/divisão/grupo.
    pub async fn assign_position(
        &self,
        actor: &ActorContext,
        user_id: Uuid,
        payload: AssignPositionPayload,
    ) -> Result<User, AppError> {
        let scope = self.scope_service.managed_scope(actor).await?;
        if !scope.contains(&user_id) {
            return Err(AppError::Forbidden(
                "O usuário alvo está fora do seu escopo gerenciado.".into(),
            ));
        }

        self.org_repo
            .find_department(payload.department_id, actor.tenant_id)
            .await?
            .ok_or(AppError::DepartmentNotFound)?;

        let division = match payload.division_id {
            Some(id) => Some(
                self.org_repo
                    .find_division(id)
                    .await?
                    .ok_or(AppError::OrgUnitNotFound)?,
            ),
            None => None,
        };

        let group = match payload.group_id {
            Some(id) => Some(
                self.org_repo
                    .find_group(id)
                    .await?
                    .ok_or(AppError::OrgUnitNotFound)?,
            ),
            None => None,
        };

        ensure_consistent_position(payload.department_id, division.as_ref(), group.as_ref())?;

        // Escrita simples de uma linha: não precisa de transação.
        self.user_repo
            .update_position(
                &self.pool,
                user_id,
                payload.department_id,
                payload.division_id,
                payload.group_id,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn division(department_id: Uuid) -> Division {
        Division {
            id: Uuid::new_v4(),
            department_id,
            name: "Divisão".into(),
            created_at: Utc::now(),
        }
    }

    fn group(department_id: Uuid, division_id: Option<Uuid>) -> Group {
        Group {
            id: Uuid::new_v4(),
            department_id,
            division_id,
            name: "Grupo".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn consistent_position_passes() {
        let dept = Uuid::new_v4();
        let div = division(dept);
        let grp = group(dept, Some(div.id));
        assert!(ensure_consistent_position(dept, Some(&div), Some(&grp)).is_ok());
    }

    #[test]
    fn division_of_other_department_is_rejected() {
        let dept = Uuid::new_v4();
        let foreign = division(Uuid::new_v4());
        assert!(matches!(
            ensure_consistent_position(dept, Some(&foreign), None),
            Err(AppError::Forbidden(_))
        ));
    }

    #[test]
    fn group_of_other_division_is_rejected() {
        let dept = Uuid::new_v4();
        let div = division(dept);
        let grp = group(dept, Some(Uuid::new_v4()));
        assert!(matches!(
            ensure_consistent_position(dept, Some(&div), Some(&grp)),
            Err(AppError::Forbidden(_))
        ));
    }
}
