// src/stats.rs

//! Derived progress figures for the catalog and the dashboard.

use std::collections::HashSet;

use crate::{
    models::{
        course::{Course, CourseSummary, LessonScore},
        dashboard::DashboardStats,
        progress::ProgressStatus,
    },
    quiz::score::round_ratio,
};

fn non_negative(score: i32) -> u64 {
    u64::try_from(score).unwrap_or(0)
}

/// Summarizes a course for the catalog.
///
/// `progress` holds the caller's rows for lessons of this course. Missing
/// best scores count as 0 in the average.
pub fn course_summary(
    course: Course,
    is_enrolled: bool,
    lesson_count: usize,
    progress: &[LessonScore],
) -> CourseSummary {
    let completed_lessons = progress
        .iter()
        .filter(|p| p.status == ProgressStatus::Completed)
        .count();
    let score_sum: u64 = progress
        .iter()
        .map(|p| p.best_score.map(non_negative).unwrap_or(0))
        .sum();

    CourseSummary {
        course,
        is_enrolled,
        lesson_count,
        completed_lessons,
        average_score: round_ratio(score_sum, progress.len() as u64),
        progress_percent: round_ratio(100 * completed_lessons as u64, lesson_count as u64),
    }
}

/// Dashboard figures restricted to lessons of enrolled courses.
/// Only recorded best scores enter the average.
pub fn dashboard_stats(
    enrolled_courses: usize,
    enrolled_lessons: &HashSet<i64>,
    progress: &[LessonScore],
) -> DashboardStats {
    let relevant: Vec<&LessonScore> = progress
        .iter()
        .filter(|p| enrolled_lessons.contains(&p.lesson_id))
        .collect();

    let completed_lessons = relevant
        .iter()
        .filter(|p| p.status == ProgressStatus::Completed)
        .count();
    let scores: Vec<u64> = relevant
        .iter()
        .filter_map(|p| p.best_score.map(non_negative))
        .collect();

    DashboardStats {
        enrolled_courses,
        completed_lessons,
        completion_rate: round_ratio(100 * completed_lessons as u64, enrolled_lessons.len() as u64),
        average_score: round_ratio(scores.iter().sum(), scores.len() as u64),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(lesson_id: i64, status: ProgressStatus, best_score: Option<i32>) -> LessonScore {
        LessonScore { lesson_id, status, best_score }
    }

    fn course() -> Course {
        Course {
            id: 1,
            title: "Rust".into(),
            description: "Ownership".into(),
            created_at: None,
        }
    }

    #[test]
    fn course_summary_counts_missing_scores_as_zero() {
        let progress = [
            row(1, ProgressStatus::Completed, Some(90)),
            row(2, ProgressStatus::InProgress, Some(45)),
            row(3, ProgressStatus::NotStarted, None),
        ];
        let summary = course_summary(course(), true, 4, &progress);

        assert_eq!(summary.completed_lessons, 1);
        assert_eq!(summary.average_score, 45);
        assert_eq!(summary.progress_percent, 25);
    }

    #[test]
    fn course_without_lessons_or_progress_is_all_zero() {
        let summary = course_summary(course(), false, 0, &[]);
        assert_eq!(summary.average_score, 0);
        assert_eq!(summary.progress_percent, 0);
    }

    #[test]
    fn dashboard_ignores_lessons_outside_enrolled_courses() {
        let enrolled: HashSet<i64> = [1, 2, 3].into_iter().collect();
        let progress = [
            row(1, ProgressStatus::Completed, Some(80)),
            row(2, ProgressStatus::InProgress, Some(55)),
            row(3, ProgressStatus::NotStarted, None),
            row(9, ProgressStatus::Completed, Some(10)),
        ];
        let stats = dashboard_stats(1, &enrolled, &progress);

        assert_eq!(stats.enrolled_courses, 1);
        assert_eq!(stats.completed_lessons, 1);
        assert_eq!(stats.completion_rate, 33);
        assert_eq!(stats.average_score, 68);
    }

    #[test]
    fn empty_dashboard_is_zeroed() {
        assert_eq!(dashboard_stats(0, &HashSet::new(), &[]), DashboardStats::default());
    }
}
