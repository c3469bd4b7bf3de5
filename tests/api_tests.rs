// tests/api_tests.rs

//! End-to-end tests against a real PostgreSQL.
//! Run with `DATABASE_URL` set and `cargo test -- --ignored`.

use lms::{
    config::{Config, QuizSettings},
    routes,
    state::AppState,
};
use sqlx::{PgPool, postgres::PgPoolOptions};

struct TestApp {
    address: String,
    pool: PgPool,
    client: reqwest::Client,
}

/// Spawns the app on a random port.
async fn spawn_app() -> TestApp {
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing.");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    let config = Config {
        database_url,
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600,
        rust_log: "error".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        quiz: QuizSettings::default(),
    };

    let app = routes::create_router(AppState::new(pool.clone(), config));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestApp {
        address: format!("http://127.0.0.1:{}", port),
        pool,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Registers a fresh user and returns its bearer token.
    async fn login_new_user(&self) -> String {
        let username = format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8]);
        let credentials = serde_json::json!({ "username": username, "password": "password123" });

        let register = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&credentials)
            .send()
            .await
            .expect("Register failed");
        assert_eq!(register.status().as_u16(), 201);

        let login: serde_json::Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&credentials)
            .send()
            .await
            .expect("Login failed")
            .json()
            .await
            .expect("Failed to parse login json");

        login["token"].as_str().expect("Token not found").to_string()
    }

    /// Seeds a course with one lesson holding the given `(correct_answer)` questions.
    async fn seed_lesson(&self, correct_answers: &[i32]) -> (i64, i64) {
        let (course_id,): (i64,) =
            sqlx::query_as("INSERT INTO courses (title, description) VALUES ($1, $2) RETURNING id")
                .bind("Rust Basics")
                .bind("Ownership and borrowing")
                .fetch_one(&self.pool)
                .await
                .unwrap();
        let (lesson_id,): (i64,) = sqlx::query_as(
            "INSERT INTO lessons (course_id, title, content, order_index) VALUES ($1, $2, $3, 1) RETURNING id",
        )
        .bind(course_id)
        .bind("Moves")
        .bind("Values move by default.")
        .fetch_one(&self.pool)
        .await
        .unwrap();

        if !correct_answers.is_empty() {
            let (quiz_id,): (i64,) =
                sqlx::query_as("INSERT INTO quizzes (lesson_id) VALUES ($1) RETURNING id")
                    .bind(lesson_id)
                    .fetch_one(&self.pool)
                    .await
                    .unwrap();
            for (i, correct) in correct_answers.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO quiz_questions (quiz_id, question_text, options, correct_answer, order_index)
                    VALUES ($1, $2, $3, $4, $5)
                    "#,
                )
                .bind(quiz_id)
                .bind(format!("Question {}", i + 1))
                .bind(serde_json::json!(["A", "B", "C", "D"]))
                .bind(*correct)
                .bind(i as i32)
                .execute(&self.pool)
                .await
                .unwrap();
            }
        }

        (course_id, lesson_id)
    }
}

#[tokio::test]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn health_check_works() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn register_fails_validation() {
    let app = spawn_app().await;

    let response = app
        .client
        .post(app.url("/api/auth/register"))
        .json(&serde_json::json!({ "username": "yo", "password": "password123" }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn protected_routes_require_token() {
    let app = spawn_app().await;

    let response = app.client.get(app.url("/api/courses")).send().await.unwrap();
    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn enrollment_is_idempotent() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    let (course_id, _) = app.seed_lesson(&[0]).await;

    let first = app
        .client
        .post(app.url(&format!("/api/courses/{}/enroll", course_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = app
        .client
        .post(app.url(&format!("/api/courses/{}/enroll", course_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 200);

    let missing = app
        .client
        .post(app.url("/api/courses/999999999/enroll"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status().as_u16(), 404);
}

#[tokio::test]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn quiz_flow_updates_progress_and_dashboard() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    let (course_id, lesson_id) = app.seed_lesson(&[0, 1, 2, 3]).await;

    app.client
        .post(app.url(&format!("/api/courses/{}/enroll", course_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let lesson: serde_json::Value = app
        .client
        .get(app.url(&format!("/api/lessons/{}", lesson_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let question_ids: Vec<i64> = lesson["questions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_i64().unwrap())
        .collect();
    assert_eq!(question_ids.len(), 4);
    assert!(lesson["questions"][0].get("correct_option").is_none());

    let quiz_url = app.url(&format!("/api/lessons/{}/quiz", lesson_id));
    let opened: serde_json::Value = app
        .client
        .post(&quiz_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(opened["available"], true);
    assert_eq!(opened["session"]["phase"], "NOT_STARTED");

    let started: serde_json::Value = app
        .client
        .post(format!("{}/start", quiz_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(started["remaining_seconds"], 240);

    // Third answer is wrong.
    for (id, option) in question_ids.iter().zip([0, 1, 0, 3]) {
        let response = app
            .client
            .put(format!("{}/answers", quiz_url))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "question_id": id, "option_index": option }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    let submitted: serde_json::Value = app
        .client
        .post(format!("{}/submit", quiz_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(submitted["phase"], "SUBMITTED");
    assert_eq!(submitted["score"]["percentage"], 75);
    assert_eq!(submitted["persistence"], "confirmed");

    let dashboard: serde_json::Value = app
        .client
        .get(app.url("/api/dashboard"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(dashboard["stats"]["enrolled_courses"], 1);
    assert_eq!(dashboard["stats"]["completed_lessons"], 1);
    assert_eq!(dashboard["stats"]["completion_rate"], 100);
    assert_eq!(dashboard["stats"]["average_score"], 75);

    let course: serde_json::Value = app
        .client
        .get(app.url(&format!("/api/courses/{}", course_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(course["lessons"][0]["status"], "Completed");

    // Discard and reopen: the stored best score locks the quiz.
    let discarded = app.client.delete(&quiz_url).bearer_auth(&token).send().await.unwrap();
    assert_eq!(discarded.status().as_u16(), 204);

    let reopened: serde_json::Value = app
        .client
        .post(&quiz_url)
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reopened["session"]["locked"], true);

    let refused: serde_json::Value = app
        .client
        .post(format!("{}/start", quiz_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(refused["phase"], "NOT_STARTED");
    assert_eq!(refused["notice"]["text"], "Quiz already submitted.");
}

#[tokio::test]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn lesson_without_quiz_reports_empty_state() {
    let app = spawn_app().await;
    let token = app.login_new_user().await;
    let (_, lesson_id) = app.seed_lesson(&[]).await;

    let opened: serde_json::Value = app
        .client
        .post(app.url(&format!("/api/lessons/{}/quiz", lesson_id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(opened["available"], false);
    assert_eq!(opened["message"], "No quiz available for this lesson.");
}

#[tokio::test]
#[ignore = "needs a PostgreSQL DATABASE_URL"]
async fn questions_must_mark_an_existing_option_correct() {
    let app = spawn_app().await;
    let (_, lesson_id) = app.seed_lesson(&[0]).await;
    let (quiz_id,): (i64,) = sqlx::query_as("SELECT id FROM quizzes WHERE lesson_id = $1")
        .bind(lesson_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();

    let insert = |options: serde_json::Value, correct: i32| {
        sqlx::query(
            "INSERT INTO quiz_questions (quiz_id, question_text, options, correct_answer) VALUES ($1, 'Bad', $2, $3)",
        )
        .bind(quiz_id)
        .bind(options)
        .bind(correct)
        .execute(&app.pool)
    };

    assert!(insert(serde_json::json!(["A", "B"]), 2).await.is_err());
    assert!(insert(serde_json::json!([]), 0).await.is_err());
    assert!(insert(serde_json::json!(["A", "B"]), 1).await.is_ok());
}
