// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, catalog, dashboard, quiz, system},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, catalog, quiz, dashboard).
/// * Protects everything but auth and system routes with the JWT middleware.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        HeaderValue::from_static("http://localhost:3000"),
        HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let course_routes = Router::new()
        .route("/", get(catalog::list_courses))
        .route("/{id}", get(catalog::get_course))
        .route("/{id}/enroll", post(catalog::enroll));

    let lesson_routes = Router::new()
        .route("/{id}", get(catalog::get_lesson))
        .route(
            "/{id}/quiz",
            post(quiz::open_quiz)
                .get(quiz::get_quiz)
                .delete(quiz::discard_quiz),
        )
        .route("/{id}/quiz/start", post(quiz::start_quiz))
        .route("/{id}/quiz/answers", put(quiz::select_answer))
        .route("/{id}/quiz/submit", post(quiz::submit_quiz))
        .route("/{id}/quiz/retry-save", post(quiz::retry_save));

    let dashboard_routes = Router::new()
        .route("/", get(dashboard::get_dashboard))
        .route("/changes", get(dashboard::wait_for_changes));

    let protected = Router::new()
        .nest("/api/courses", course_routes)
        .nest("/api/lessons", lesson_routes)
        .nest("/api/dashboard", dashboard_routes)
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(system::health_check))
        .route("/api-docs/openapi.json", get(system::openapi_json))
        .nest("/api/auth", auth_routes)
        .merge(protected)
        // Global Middleware (applied from top to bottom)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
