// src/config.rs

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use dotenvy::dotenv;
use thiserror::Error;

use crate::models::progress::ProgressStatus;

/// Percentage a quiz attempt must reach to count as passed.
pub const PASSING_SCORE_PERCENTAGE: u8 = 60;

/// Countdown budget granted per loaded question.
pub const SECONDS_PER_QUESTION: u32 = 60;

/// How long a notice stays visible before it is dismissed.
pub const NOTICE_TTL_SECS: u64 = 3;

/// How long an untouched quiz session is kept before it is dropped.
pub const SESSION_IDLE_SECS: u64 = 30 * 60;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Tunables of the quiz session controller.
#[derive(Debug, Clone)]
pub struct QuizSettings {
    pub pass_threshold: u8,
    pub seconds_per_question: u32,
    /// Status recorded for an attempt that did not pass.
    pub failed_status: ProgressStatus,
    pub notice_ttl_secs: u64,
    pub session_idle_secs: u64,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            pass_threshold: PASSING_SCORE_PERCENTAGE,
            seconds_per_question: SECONDS_PER_QUESTION,
            failed_status: ProgressStatus::InProgress,
            notice_ttl_secs: NOTICE_TTL_SECS,
            session_idle_secs: SESSION_IDLE_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub rust_log: String,
    pub bind_addr: SocketAddr,
    pub quiz: QuizSettings,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv().ok();

        let database_url = required("DATABASE_URL")?;
        let jwt_secret = required("JWT_SECRET")?;

        let jwt_expiration = parsed("JWT_EXPIRATION", 86_400)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let bind_addr = parsed("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3000)))?;

        let defaults = QuizSettings::default();
        let pass_threshold = parsed("QUIZ_PASS_THRESHOLD", defaults.pass_threshold)?;
        if pass_threshold > 100 {
            return Err(ConfigError::Invalid {
                key: "QUIZ_PASS_THRESHOLD",
                value: pass_threshold.to_string(),
            });
        }

        let quiz = QuizSettings {
            pass_threshold,
            seconds_per_question: parsed("QUIZ_SECONDS_PER_QUESTION", defaults.seconds_per_question)?,
            failed_status: parsed("QUIZ_FAILED_STATUS", defaults.failed_status)?,
            notice_ttl_secs: parsed("QUIZ_NOTICE_TTL_SECS", defaults.notice_ttl_secs)?,
            session_idle_secs: parsed("QUIZ_SESSION_IDLE_SECS", defaults.session_idle_secs)?,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            rust_log,
            bind_addr,
            quiz,
        })
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { key, value }),
        Err(_) => Ok(default),
    }
}
