// src/config.rs

use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{env, time::Duration};

use crate::{
    db::{ActivityRepository, OrgRepository, PlanRepository, ReportRepository, UserRepository},
    services::{
        auth::AuthService, notification::NotificationService, org_service::OrgService,
        plan_service::PlanService, report_service::ReportService, scope_service::ScopeService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub auth_service: AuthService,
    pub scope_service: ScopeService,
    pub org_service: OrgService,
    pub plan_service: PlanService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let org_repo = OrgRepository::new(db_pool.clone());
        let plan_repo = PlanRepository::new(db_pool.clone());
        let activity_repo = ActivityRepository::new(db_pool.clone());
        let report_repo = ReportRepository::new(db_pool.clone());

        let notification_service = NotificationService::new();
        let auth_service = AuthService::new(user_repo.clone(), jwt_secret, db_pool.clone());
        let scope_service = ScopeService::new(user_repo.clone());
        let org_service = OrgService::new(
            org_repo.clone(),
            user_repo.clone(),
            scope_service.clone(),
            db_pool.clone(),
        );
        let plan_service = PlanService::new(
            plan_repo,
            activity_repo,
            user_repo,
            scope_service.clone(),
            notification_service.clone(),
            db_pool.clone(),
        );
        let report_service = ReportService::new(
            report_repo,
            org_repo,
            scope_service.clone(),
            notification_service,
            db_pool.clone(),
        );

        Ok(Self {
            db_pool,
            auth_service,
            scope_service,
            org_service,
            plan_service,
            report_service,
        })
    }
}
