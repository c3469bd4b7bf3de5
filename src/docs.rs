// src/docs.rs

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    handlers::{auth, catalog, dashboard, quiz, system},
    models::{
        course::{Course, CourseDetail, CourseSummary},
        dashboard::{DashboardChange, DashboardResponse, DashboardStats},
        enrollment::Enrollment,
        lesson::{Lesson, LessonDetail, LessonStatusItem},
        progress::{PriorProgress, ProgressStatus},
        question::PublicQuestion,
        user::{CreateUserRequest, LoginRequest, TokenResponse, User},
    },
    quiz::{
        Persistence, Phase, QuizOpen, SessionView,
        notice::{Notice, NoticeKind},
        score::Score,
    },
};

#[derive(OpenApi)]
#[openapi(
    paths(
        system::health_check,
        auth::register,
        auth::login,
        catalog::list_courses,
        catalog::get_course,
        catalog::enroll,
        catalog::get_lesson,
        quiz::open_quiz,
        quiz::get_quiz,
        quiz::start_quiz,
        quiz::select_answer,
        quiz::submit_quiz,
        quiz::retry_save,
        quiz::discard_quiz,
        dashboard::get_dashboard,
        dashboard::wait_for_changes,
    ),
    components(schemas(
        User, CreateUserRequest, LoginRequest, TokenResponse,
        Course, CourseSummary, CourseDetail, Enrollment,
        Lesson, LessonDetail, LessonStatusItem, PublicQuestion,
        PriorProgress, ProgressStatus,
        QuizOpen, SessionView, Phase, Persistence, Score, Notice, NoticeKind,
        quiz::SelectAnswerRequest,
        DashboardStats, DashboardResponse, DashboardChange,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "System", description = "Liveness"),
        (name = "Auth", description = "Registration and login"),
        (name = "Catalog", description = "Courses, lessons and enrollment"),
        (name = "Quiz", description = "Timed quiz sessions"),
        (name = "Dashboard", description = "Learning statistics")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}
