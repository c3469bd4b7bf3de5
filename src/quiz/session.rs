// src/quiz/session.rs

//! State machine for a single quiz attempt.
//!
//! `NotStarted -> InProgress -> Submitting -> Submitted`. A quiz whose prior
//! progress already carries a best score is locked from construction on and
//! never reaches `InProgress`.

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    config::QuizSettings,
    models::{progress::PriorProgress, progress::ProgressStatus, question::Question},
    quiz::score::{self, Score, ScoringPolicy},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    NotStarted,
    InProgress,
    Submitting,
    Submitted,
}

/// A refused transition. The session is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Quiz already submitted.")]
    AlreadySubmitted,
    #[error("Quiz already started.")]
    AlreadyStarted,
    #[error("Start the quiz first.")]
    NotStarted,
    #[error("Please answer all questions.")]
    Incomplete { answered: usize, total: usize },
    #[error("Question {0} is not part of this quiz.")]
    UnknownQuestion(i64),
    #[error("Option {option} does not exist for question {question_id}.")]
    UnknownOption { question_id: i64, option: usize },
    #[error("Submission already in progress.")]
    SubmissionPending,
}

/// What a completed submission asks to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub score: Score,
    pub status: ProgressStatus,
}

#[derive(Debug)]
pub struct QuizSession {
    questions: Vec<Question>,
    answers: BTreeMap<i64, usize>,
    phase: Phase,
    remaining: Option<u32>,
    has_submitted: bool,
    score: Option<Score>,
    seconds_per_question: u32,
    policy: ScoringPolicy,
}

impl QuizSession {
    /// Returns `None` for an empty question set: there is nothing to attempt.
    pub fn new(questions: Vec<Question>, prior: &PriorProgress, settings: &QuizSettings) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }

        Some(Self {
            questions,
            answers: BTreeMap::new(),
            phase: Phase::NotStarted,
            remaining: None,
            has_submitted: prior.has_submitted(),
            score: None,
            seconds_per_question: settings.seconds_per_question,
            policy: ScoringPolicy::from(settings),
        })
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn answers(&self) -> &BTreeMap<i64, usize> {
        &self.answers
    }

    pub fn remaining_seconds(&self) -> Option<u32> {
        self.remaining
    }

    pub fn score(&self) -> Option<Score> {
        self.score
    }

    /// Locked sessions accept no further attempt.
    pub fn is_locked(&self) -> bool {
        self.has_submitted
    }

    /// Answers are revealed once the quiz has been submitted, now or before.
    pub fn show_answers(&self) -> bool {
        self.has_submitted
    }

    /// The countdown ran out while the attempt is still open.
    pub fn is_expired(&self) -> bool {
        self.phase == Phase::InProgress && self.remaining == Some(0)
    }

    pub fn time_budget(&self) -> u32 {
        let count = u32::try_from(self.questions.len()).unwrap_or(u32::MAX);
        count.saturating_mul(self.seconds_per_question)
    }

    /// Opens the attempt and returns the countdown length in seconds.
    pub fn start(&mut self) -> Result<u32, SessionError> {
        if self.has_submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        match self.phase {
            Phase::NotStarted => {
                let budget = self.time_budget();
                self.answers.clear();
                self.remaining = Some(budget);
                self.phase = Phase::InProgress;
                Ok(budget)
            }
            Phase::InProgress => Err(SessionError::AlreadyStarted),
            Phase::Submitting => Err(SessionError::SubmissionPending),
            Phase::Submitted => Err(SessionError::AlreadySubmitted),
        }
    }

    /// Records (or overwrites) the selection for one question.
    pub fn select(&mut self, question_id: i64, option: usize) -> Result<(), SessionError> {
        self.ensure_in_progress()?;

        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or(SessionError::UnknownQuestion(question_id))?;

        if option >= question.options.len() {
            return Err(SessionError::UnknownOption { question_id, option });
        }

        self.answers.insert(question_id, option);
        Ok(())
    }

    /// Advances the countdown by one second.
    /// Returns whether the countdown should keep ticking.
    pub fn tick(&mut self) -> bool {
        if self.phase != Phase::InProgress {
            return false;
        }
        match self.remaining {
            Some(left) if left > 1 => {
                self.remaining = Some(left - 1);
                true
            }
            Some(_) => {
                self.remaining = Some(0);
                false
            }
            None => false,
        }
    }

    /// Grades the attempt and moves to `Submitting`.
    /// Every loaded question must have a selection.
    pub fn begin_submit(&mut self) -> Result<Score, SessionError> {
        self.ensure_in_progress()?;

        let answered = self
            .questions
            .iter()
            .filter(|q| self.answers.contains_key(&q.id))
            .count();
        let total = self.questions.len();
        if answered != total {
            return Err(SessionError::Incomplete { answered, total });
        }

        let score = score::grade(&self.questions, &self.answers, &self.policy);
        self.phase = Phase::Submitting;
        self.remaining = None;
        self.score = Some(score);
        Ok(score)
    }

    /// Locks the session after a successful `begin_submit`.
    pub fn finish_submit(&mut self) -> Result<Submission, SessionError> {
        match (self.phase, self.score) {
            (Phase::Submitting, Some(score)) => {
                self.phase = Phase::Submitted;
                self.has_submitted = true;
                Ok(Submission {
                    score,
                    status: self.policy.status_for(&score),
                })
            }
            (Phase::Submitted, _) => Err(SessionError::AlreadySubmitted),
            _ => Err(SessionError::NotStarted),
        }
    }

    pub fn submit(&mut self) -> Result<Submission, SessionError> {
        self.begin_submit()?;
        self.finish_submit()
    }

    fn ensure_in_progress(&self) -> Result<(), SessionError> {
        match self.phase {
            Phase::InProgress => Ok(()),
            Phase::Submitting => Err(SessionError::SubmissionPending),
            Phase::Submitted => Err(SessionError::AlreadySubmitted),
            Phase::NotStarted if self.has_submitted => Err(SessionError::AlreadySubmitted),
            Phase::NotStarted => Err(SessionError::NotStarted),
        }
    }
}

/// Formats a countdown as `m:ss`.
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: i64, correct_option: usize) -> Question {
        Question {
            id,
            prompt: format!("Question {}", id),
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_option,
        }
    }

    fn fresh(n: i64) -> QuizSession {
        let questions = (1..=n).map(|id| question(id, 0)).collect();
        QuizSession::new(questions, &PriorProgress::default(), &QuizSettings::default())
            .expect("non-empty quiz")
    }

    #[test]
    fn empty_question_set_has_no_session() {
        assert!(QuizSession::new(vec![], &PriorProgress::default(), &QuizSettings::default()).is_none());
    }

    #[test]
    fn countdown_starts_at_sixty_seconds_per_question() {
        for n in 1..=7 {
            let mut session = fresh(n);
            assert_eq!(session.start(), Ok(n as u32 * 60));
            assert_eq!(session.remaining_seconds(), Some(n as u32 * 60));
            assert_eq!(session.phase(), Phase::InProgress);
        }
    }

    #[test]
    fn prior_best_score_locks_the_session() {
        let prior = PriorProgress {
            best_score: Some(75),
            status: Some(ProgressStatus::Completed),
        };
        let mut session =
            QuizSession::new(vec![question(1, 0)], &prior, &QuizSettings::default()).unwrap();

        assert!(session.is_locked());
        assert!(session.show_answers());
        assert_eq!(session.start(), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.start(), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.phase(), Phase::NotStarted);
        assert_eq!(session.select(1, 0), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.submit(), Err(SessionError::AlreadySubmitted));
    }

    #[test]
    fn selecting_before_start_is_refused() {
        let mut session = fresh(2);
        assert_eq!(session.select(1, 0), Err(SessionError::NotStarted));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn reselecting_overwrites_previous_choice() {
        let mut session = fresh(2);
        session.start().unwrap();
        session.select(1, 2).unwrap();
        session.select(1, 3).unwrap();

        assert_eq!(session.answers().len(), 1);
        assert_eq!(session.answers().get(&1), Some(&3));
    }

    #[test]
    fn unknown_question_or_option_is_refused() {
        let mut session = fresh(2);
        session.start().unwrap();

        assert_eq!(session.select(99, 0), Err(SessionError::UnknownQuestion(99)));
        assert_eq!(
            session.select(1, 4),
            Err(SessionError::UnknownOption { question_id: 1, option: 4 })
        );
        assert!(session.answers().is_empty());
    }

    #[test]
    fn incomplete_submission_keeps_the_attempt_open() {
        let mut session = fresh(3);
        session.start().unwrap();
        session.select(1, 0).unwrap();
        session.select(2, 0).unwrap();

        let err = session.submit().unwrap_err();
        assert_eq!(err, SessionError::Incomplete { answered: 2, total: 3 });
        assert_eq!(err.to_string(), "Please answer all questions.");
        assert_eq!(session.phase(), Phase::InProgress);
        assert!(session.score().is_none());
    }

    #[test]
    fn complete_submission_happens_once() {
        let mut session = fresh(2);
        session.start().unwrap();
        session.select(1, 0).unwrap();
        session.select(2, 0).unwrap();

        let submission = session.submit().unwrap();
        assert_eq!(submission.score.percentage, 100);
        assert_eq!(submission.status, ProgressStatus::Completed);
        assert_eq!(session.phase(), Phase::Submitted);
        assert_eq!(session.remaining_seconds(), None);

        assert_eq!(session.submit(), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.start(), Err(SessionError::AlreadySubmitted));
        assert_eq!(session.score(), Some(submission.score));
    }

    #[test]
    fn submitting_phase_rejects_reentry() {
        let mut session = fresh(1);
        session.start().unwrap();
        session.select(1, 0).unwrap();

        session.begin_submit().unwrap();
        assert_eq!(session.phase(), Phase::Submitting);
        assert_eq!(session.begin_submit(), Err(SessionError::SubmissionPending));
        assert_eq!(session.select(1, 1), Err(SessionError::SubmissionPending));

        session.finish_submit().unwrap();
        assert_eq!(session.finish_submit(), Err(SessionError::AlreadySubmitted));
    }

    #[test]
    fn countdown_clamps_at_zero_without_submitting() {
        let mut session = fresh(1);
        session.start().unwrap();

        let mut ticks = 0;
        while session.tick() {
            ticks += 1;
        }
        assert_eq!(ticks, 59);
        assert_eq!(session.remaining_seconds(), Some(0));
        assert!(session.is_expired());

        assert!(!session.tick());
        assert_eq!(session.remaining_seconds(), Some(0));
        assert_eq!(session.phase(), Phase::InProgress);

        // Answering after expiry is still accepted.
        session.select(1, 0).unwrap();
        assert!(session.submit().is_ok());
    }

    #[test]
    fn four_questions_three_right_is_completed() {
        let questions = vec![question(1, 0), question(2, 1), question(3, 2), question(4, 3)];
        let mut session =
            QuizSession::new(questions, &PriorProgress::default(), &QuizSettings::default()).unwrap();
        session.start().unwrap();
        session.select(1, 0).unwrap();
        session.select(2, 1).unwrap();
        session.select(3, 0).unwrap();
        session.select(4, 3).unwrap();

        let submission = session.submit().unwrap();
        assert_eq!(submission.score.correct, 3);
        assert_eq!(submission.score.percentage, 75);
        assert_eq!(submission.status, ProgressStatus::Completed);
        assert!(submission.score.message().contains("75%"));
    }

    #[test]
    fn two_wrong_answers_stay_in_progress() {
        let questions = vec![question(1, 0), question(2, 0)];
        let mut session =
            QuizSession::new(questions, &PriorProgress::default(), &QuizSettings::default()).unwrap();
        session.start().unwrap();
        session.select(1, 1).unwrap();
        session.select(2, 2).unwrap();

        let submission = session.submit().unwrap();
        assert_eq!(submission.score.percentage, 0);
        assert_eq!(submission.status, ProgressStatus::InProgress);
        assert!(session.is_locked());
        assert_eq!(submission.score.message(), "Failed with 0%");
    }

    #[test]
    fn clock_is_minutes_and_padded_seconds() {
        assert_eq!(format_clock(240), "4:00");
        assert_eq!(format_clock(65), "1:05");
        assert_eq!(format_clock(9), "0:09");
    }
}
