//src/main.rs

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route("/managed", get(handlers::auth::get_managed_users));

    // Unidades organizacionais e posição
    let org_routes = Router::new()
        .route("/departments", post(handlers::org::create_department))
        .route("/divisions", post(handlers::org::create_division))
        .route("/groups", post(handlers::org::create_group))
        .route("/users/{user_id}/position", put(handlers::org::assign_position));

    // Planos, alocações e trilha de aprovação
    let plan_routes = Router::new()
        .route(
            "/",
            post(handlers::plans::create_plan).get(handlers::plans::list_plans),
        )
        .route(
            "/{plan_id}",
            get(handlers::plans::get_plan)
                .put(handlers::plans::update_plan)
                .delete(handlers::plans::delete_plan),
        )
        .route(
            "/{plan_id}/allocations",
            post(handlers::plans::create_allocation),
        )
        .route(
            "/{plan_id}/allocations/{user_id}",
            axum::routing::delete(handlers::plans::remove_allocation),
        );

    let user_plan_routes = Router::new()
        .route("/{id}/submit", post(handlers::plans::submit_user_plan))
        .route("/{id}/approve", post(handlers::plans::approve_user_plan))
        .route("/{id}/reject", post(handlers::plans::reject_user_plan))
        .route("/{id}/revoke", post(handlers::plans::revoke_user_plan));

    let condition_routes = Router::new()
        .route("/{id}/submit", post(handlers::plans::submit_condition))
        .route("/{id}/approve", post(handlers::plans::approve_condition))
        .route("/{id}/reject", post(handlers::plans::reject_condition))
        .route("/{id}/revoke", post(handlers::plans::revoke_condition));

    // Relatórios (atrás do portão de visibilidade)
    let report_routes = Router::new()
        .route(
            "/",
            post(handlers::reports::create_report).get(handlers::reports::list_reports),
        )
        .route(
            "/{report_id}",
            get(handlers::reports::get_report)
                .put(handlers::reports::update_report)
                .delete(handlers::reports::delete_report),
        );

    // Tudo que não é auth passa pelo guard, que injeta o ActorContext.
    let protected = Router::new()
        .nest("/api/users", user_routes)
        .nest("/api/org", org_routes)
        .nest("/api/plans", plan_routes)
        .nest("/api/user-plans", user_plan_routes)
        .nest("/api/user-plan-conditions", condition_routes)
        .nest("/api/reports", report_routes)
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
