// src/quiz/score.rs

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    config::QuizSettings,
    models::{progress::ProgressStatus, question::Question},
};

/// Outcome of grading one quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct Score {
    pub correct: usize,
    pub total: usize,
    /// `round(100 * correct / total)`, half up.
    pub percentage: u32,
    pub passed: bool,
}

impl Score {
    pub fn message(&self) -> String {
        if self.passed {
            format!("Passed with {}%", self.percentage)
        } else {
            format!("Failed with {}%", self.percentage)
        }
    }
}

/// Pass threshold and the status recorded for each outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub pass_threshold: u8,
    pub failed_status: ProgressStatus,
}

impl ScoringPolicy {
    pub fn status_for(&self, score: &Score) -> ProgressStatus {
        if score.passed {
            ProgressStatus::Completed
        } else {
            self.failed_status
        }
    }
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        ScoringPolicy::from(&QuizSettings::default())
    }
}

impl From<&QuizSettings> for ScoringPolicy {
    fn from(settings: &QuizSettings) -> Self {
        Self {
            pass_threshold: settings.pass_threshold,
            failed_status: settings.failed_status,
        }
    }
}

/// Rounds `numerator / denominator` to the nearest integer, halves going up.
/// Returns 0 for an empty denominator.
pub fn round_ratio(numerator: u64, denominator: u64) -> u32 {
    if denominator == 0 {
        return 0;
    }
    let rounded = (2 * numerator + denominator) / (2 * denominator);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Compares each selection against the question's correct option.
/// Unanswered questions count as wrong.
pub fn grade(questions: &[Question], answers: &BTreeMap<i64, usize>, policy: &ScoringPolicy) -> Score {
    let correct = questions
        .iter()
        .filter(|q| answers.get(&q.id) == Some(&q.correct_option))
        .count();
    let total = questions.len();
    let percentage = round_ratio(100 * correct as u64, total as u64);

    Score {
        correct,
        total,
        percentage,
        passed: percentage >= u32::from(policy.pass_threshold),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questions(n: usize) -> Vec<Question> {
        (0..n)
            .map(|i| Question {
                id: i as i64 + 1,
                prompt: format!("Question {}", i + 1),
                options: vec!["A".into(), "B".into(), "C".into()],
                correct_option: 0,
            })
            .collect()
    }

    fn answers(picks: &[usize]) -> BTreeMap<i64, usize> {
        picks
            .iter()
            .enumerate()
            .map(|(i, pick)| (i as i64 + 1, *pick))
            .collect()
    }

    #[test]
    fn three_of_five_is_a_pass() {
        let score = grade(&questions(5), &answers(&[0, 0, 0, 1, 2]), &ScoringPolicy::default());
        assert_eq!(score.correct, 3);
        assert_eq!(score.percentage, 60);
        assert!(score.passed);
    }

    #[test]
    fn two_of_five_is_a_fail() {
        let score = grade(&questions(5), &answers(&[0, 0, 1, 1, 2]), &ScoringPolicy::default());
        assert_eq!(score.percentage, 40);
        assert!(!score.passed);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(round_ratio(200, 3), 67);
        assert_eq!(round_ratio(100, 3), 33);
        assert_eq!(round_ratio(100, 8), 13);
        assert_eq!(round_ratio(5, 0), 0);
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        let score = grade(&questions(4), &answers(&[0]), &ScoringPolicy::default());
        assert_eq!(score.correct, 1);
        assert_eq!(score.total, 4);
        assert_eq!(score.percentage, 25);
    }

    #[test]
    fn failed_status_follows_policy() {
        let fail = grade(&questions(2), &answers(&[1, 1]), &ScoringPolicy::default());
        assert_eq!(ScoringPolicy::default().status_for(&fail), ProgressStatus::InProgress);

        let strict = ScoringPolicy {
            pass_threshold: 60,
            failed_status: ProgressStatus::Completed,
        };
        assert_eq!(strict.status_for(&fail), ProgressStatus::Completed);
        assert_eq!(fail.message(), "Failed with 0%");
    }
}
