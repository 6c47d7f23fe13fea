use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use sqlx::sqlite::SqlitePoolOptions;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

mod auth;
mod chat_api;
mod error;
mod manager;
mod project_api;
mod task_api;
mod user_api;
mod workspace_api;

use manager::token_manager::TokenManager;

secrets_validator::check_env!();

pub struct AppState {
    pub pool: sqlx::SqlitePool,
    pub tokens: TokenManager,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "teamspace=debug,tower_http=info".into()),
        )
        .init();

    let pool = SqlitePoolOptions::new()
        .connect(&dotenvy::var("DATABASE_URL")?)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let tokens = TokenManager::new(&dotenvy::var("JWT_SECRET")?);
    let state = Arc::new(AppState { pool, tokens });

    let app = Router::new()
        .nest("/users", user_api::router(state.clone()))
        .nest("/workspaces", workspace_api::router(state.clone()))
        .nest("/projects", project_api::router(state.clone()))
        .nest("/tasks", task_api::router(state.clone()))
        .nest("/chat", chat_api::router(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let port: u16 = dotenvy::var("PORT")
        .unwrap_or_else(|_| "5000".to_owned())
        .parse()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {addr}");

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
