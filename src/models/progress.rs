// src/models/progress.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Completion status of a lesson for one user.
/// Stored verbatim in `lesson_progress.status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum ProgressStatus {
    #[default]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Completed")]
    Completed,
}

impl ProgressStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "Not Started",
            ProgressStatus::InProgress => "In Progress",
            ProgressStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStatus(pub String);

impl fmt::Display for UnknownStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown progress status '{}'", self.0)
    }
}

impl std::error::Error for UnknownStatus {}

impl FromStr for ProgressStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Not Started" => Ok(ProgressStatus::NotStarted),
            "In Progress" => Ok(ProgressStatus::InProgress),
            "Completed" => Ok(ProgressStatus::Completed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A prior progress record as read before a quiz session starts.
///
/// A non-null `best_score` means the quiz was already submitted once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PriorProgress {
    pub best_score: Option<i32>,
    pub status: Option<ProgressStatus>,
}

impl PriorProgress {
    pub fn has_submitted(&self) -> bool {
        self.best_score.is_some()
    }
}

/// Upsert request for `lesson_progress`, keyed by `(user_id, lesson_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProgressUpsert {
    pub user_id: i64,
    pub lesson_id: i64,
    pub status: ProgressStatus,
    pub best_score: i32,
}

/// Raw row of the `lesson_progress` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProgressRow {
    pub lesson_id: i64,
    pub status: String,
    pub best_score: Option<i32>,
}

impl ProgressRow {
    /// Unrecognized statuses are treated as not started.
    pub fn status(&self) -> ProgressStatus {
        self.status.parse().unwrap_or_default()
    }
}
