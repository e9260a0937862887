// src/routes.rs

use axum::{
    Json, Router,
    http::Method,
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{analytics, exam, results, student},
    state::AppState,
    utils::jwt::{auth_middleware, faculty_middleware},
};

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Assembles the main application router.
///
/// * Exam reads, exam taking, results and student analytics need a valid token.
/// * Exam authoring and exam analytics additionally need a faculty role.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin([
            "http://localhost:3000".parse().expect("valid origin"),
            "http://127.0.0.1:3000".parse().expect("valid origin"),
        ])
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let exam_routes = Router::new()
        .route("/", get(exam::list_exams))
        .route("/{id}", get(exam::get_exam))
        .route("/{id}/questions", get(exam::get_exam_questions))
        // Faculty-only authoring routes
        .merge(
            Router::new()
                .route("/", post(exam::create_exam))
                .route("/{id}", axum::routing::put(exam::update_exam).delete(exam::delete_exam))
                .route("/{id}/publish", post(exam::publish_exam))
                .layer(middleware::from_fn(faculty_middleware)),
        );

    let student_routes = Router::new()
        .route("/exams/{id}/start", post(student::start_exam))
        .route("/exams/{id}/submit", post(student::submit_exam))
        .route("/exams/{id}/result", get(student::get_my_result));

    let result_routes = Router::new()
        .route("/", get(results::list_results))
        .route("/{id}", get(results::get_result));

    let analytics_routes = Router::new()
        .route("/student", get(analytics::student_analytics))
        .merge(
            Router::new()
                .route("/exams/{id}", get(analytics::exam_analytics))
                .layer(middleware::from_fn(faculty_middleware)),
        );

    let protected = Router::new()
        .nest("/exams", exam_routes)
        .nest("/student", student_routes)
        .nest("/results", result_routes)
        .nest("/analytics", analytics_routes)
        // Auth runs before every nested route, including the faculty check
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/api/health", get(health))
        .nest("/api", protected)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
