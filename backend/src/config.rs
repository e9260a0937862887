// src/config.rs

use std::env;
use dotenvy::dotenv;

/// Pass mark applied when an exam declares none (percent).
pub const DEFAULT_PASSING_SCORE: f64 = 50.0;

/// Unit-less pass marks above this value were authored as absolute marks.
pub const LEGACY_MARKS_CUTOFF: f64 = 50.0;

/// How many results the per-exam leaderboard shows.
pub const LEADERBOARD_SIZE: usize = 5;

#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL URL. Without it the service keeps everything in memory.
    pub database_url: Option<String>,
    pub jwt_secret: String,
    pub rust_log: String,
    pub bind_addr: String,
    pub log_dir: String,
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let jwt_secret = env::var("JWT_SECRET")
            .expect("JWT_SECRET must be set");

        let rust_log = env::var("RUST_LOG")
            .unwrap_or_else(|_| "info".to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        let log_dir = env::var("LOG_DIR")
            .unwrap_or_else(|_| "logs".to_string());

        Self {
            database_url,
            jwt_secret,
            rust_log,
            bind_addr,
            log_dir,
        }
    }
}
