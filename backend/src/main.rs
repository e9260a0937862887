// src/main.rs

use std::sync::Arc;
use std::time::Duration;

use exam_platform::config::Config;
use exam_platform::repository::{MemoryExamRepository, PgExamRepository, SharedRepository};
use exam_platform::routes;
use exam_platform::state::AppState;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Loads .env (if present) before reading the environment
    let config = Config::from_env();

    let file_appender = tracing_appender::rolling::daily(&config.log_dir, "exam-platform.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let env_filter = EnvFilter::new(&config.rust_log);
    let stdout_layer = fmt::layer().with_writer(std::io::stdout).with_target(false);
    let file_layer = fmt::layer().with_writer(non_blocking).with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(file_layer)
        .init();

    let repo = build_repository(&config).await;

    let state = AppState {
        repo,
        config: config.clone(),
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind {}: {}", config.bind_addr, e));
    tracing::info!("Listening on {}", config.bind_addr);

    axum::serve(listener, app).await.unwrap();
}

/// PostgreSQL when `DATABASE_URL` is set, the in-memory store otherwise.
async fn build_repository(config: &Config) -> SharedRepository {
    let Some(database_url) = &config.database_url else {
        tracing::warn!("DATABASE_URL not set, results are kept in memory only");
        return Arc::new(MemoryExamRepository::new());
    };

    // Initialize Database Pool with Retry
    let mut retry_count = 0;
    let pool = loop {
        match PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
        {
            Ok(pool) => break pool,
            Err(e) => {
                retry_count += 1;
                if retry_count > 5 {
                    panic!("Failed to connect to database after 5 retries: {}", e);
                }
                tracing::warn!("Database not ready, retrying in 2s... (Attempt {})", retry_count);
                tokio::time::sleep(Duration::from_secs(2)).await;
            }
        }
    };
    tracing::info!("Database connected...");

    let repo = PgExamRepository::new(pool);
    tracing::info!("Running migrations...");
    repo.migrate()
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations applied successfully.");

    Arc::new(repo)
}
