// src/config.rs

use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use dotenvy::dotenv;
use thiserror::Error;

/// Number of questions drawn for exam-mode assignments.
pub const EXAM_QUESTION_COUNT: u32 = 20;

/// Focus-lost events that force-terminate a session.
pub const DEFAULT_INTEGRITY_THRESHOLD: u32 = 3;

pub const DEFAULT_TIME_LIMIT_MINUTES: u32 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

/// Engine defaults applied when a start request leaves a setting out.
#[derive(Debug, Clone)]
pub struct QuizSettings {
    pub default_time_limit_minutes: u32,
    pub exam_question_cap: u32,
    pub integrity_threshold: u32,
    /// Blocked gestures only terminate a session when this is set.
    pub gesture_threshold: Option<u32>,
    pub tick_interval: Duration,
    pub session_retention: Duration,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            default_time_limit_minutes: DEFAULT_TIME_LIMIT_MINUTES,
            exam_question_cap: EXAM_QUESTION_COUNT,
            integrity_threshold: DEFAULT_INTEGRITY_THRESHOLD,
            gesture_threshold: None,
            tick_interval: Duration::from_secs(1),
            session_retention: Duration::from_secs(3600),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub rust_log: String,
    pub log_dir: String,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<String>,
    pub quiz: QuizSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        let bind_addr = parsed("BIND_ADDR")?.unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:3000,http://127.0.0.1:3000".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let defaults = QuizSettings::default();
        let quiz = QuizSettings {
            default_time_limit_minutes: positive("QUIZ_TIME_LIMIT_MINUTES")?
                .unwrap_or(defaults.default_time_limit_minutes),
            exam_question_cap: positive("QUIZ_EXAM_QUESTION_CAP")?.unwrap_or(defaults.exam_question_cap),
            integrity_threshold: positive("QUIZ_INTEGRITY_THRESHOLD")?
                .unwrap_or(defaults.integrity_threshold),
            gesture_threshold: positive("QUIZ_GESTURE_THRESHOLD")?,
            tick_interval: parsed::<u64>("QUIZ_TICK_INTERVAL_MS")?
                .map(Duration::from_millis)
                .unwrap_or(defaults.tick_interval),
            session_retention: parsed::<u64>("QUIZ_SESSION_RETENTION_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.session_retention),
        };

        Ok(Self {
            database_url,
            jwt_secret,
            rust_log,
            log_dir,
            bind_addr,
            cors_origins,
            quiz,
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name).map_err(|_| ConfigError::Missing(name))
}

fn parsed<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(None),
    }
}

fn positive(name: &'static str) -> Result<Option<u32>, ConfigError> {
    match parsed::<u32>(name)? {
        Some(0) => Err(ConfigError::Invalid {
            name,
            value: "0".to_string(),
        }),
        other => Ok(other),
    }
}
