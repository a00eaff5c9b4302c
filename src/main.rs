use std::sync::Arc;

use tower_sessions_sqlx_store::PostgresStore;

mod api;
mod app;
mod auth;
mod buyer;
mod config;
mod dates;
mod error;
mod market;
mod notify;
mod produce;
mod state;
mod store;
#[cfg(test)]
mod test_support;

use crate::{
    config::AppConfig,
    notify::LogNotifier,
    state::AppState,
    store::postgres::{self, PgStore},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "marketmatch=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    let db = postgres::connect(&config.database_url).await?;

    sqlx::migrate!("./migrations").run(&db).await?;

    let sessions = PostgresStore::new(db.clone());
    sessions.migrate().await?;

    let state = AppState::from_parts(
        config.clone(),
        Arc::new(PgStore::new(db)),
        Arc::new(LogNotifier::new(config.sms_from_number.clone())),
    );

    app::serve(app::build_app(state, sessions), &config).await
}
