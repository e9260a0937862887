// src/handlers/student.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    error::AppError,
    grading::grade_exam,
    handlers::exam::visible_exam,
    models::{
        exam::{ExamStatus, PublicExam},
        submission::{NewExamResult, ResultFilter, ResultView, SubmitExamRequest},
    },
    repository::SharedRepository,
    utils::jwt::Claims,
};

/// Opens an attempt and hands out the exam without answer keys.
///
/// Starting twice keeps the first start time.
pub async fn start_exam(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = visible_exam(&repo, &claims, id).await?;
    if exam.status != ExamStatus::Published {
        return Err(AppError::Conflict("Exam has not been published".to_string()));
    }

    let attempt = repo.start_attempt(exam.id, &claims.sub).await?;
    tracing::info!(exam_id = exam.id, student = %claims.sub, "Exam started");

    Ok(Json(serde_json::json!({
        "attempt": attempt,
        "exam": PublicExam::from(&exam),
    })))
}

/// Grades a submission and stores the result.
///
/// * Grades against the exam as currently stored.
/// * Time spent is measured from the attempt start, if there is one.
/// * Every call stores a new result.
pub async fn submit_exam(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let exam = visible_exam(&repo, &claims, id).await?;
    if exam.status != ExamStatus::Published {
        return Err(AppError::Conflict("Exam has not been published".to_string()));
    }

    let submitted_at = Utc::now();
    let time_spent_seconds = repo
        .get_attempt(exam.id, &claims.sub)
        .await?
        .map(|a| (submitted_at - a.started_at).num_seconds().max(0))
        .unwrap_or(0);

    let grade = grade_exam(&exam, &req.responses);

    tracing::info!(
        exam_id = exam.id,
        student = %claims.sub,
        score = grade.score,
        total = grade.total_marks,
        passed = grade.passed,
        "Exam graded"
    );

    let result = repo
        .save_result(NewExamResult {
            exam_id: exam.id,
            exam_title: exam.title.clone(),
            student_id: claims.sub.clone(),
            student_name: claims.name.clone(),
            grade,
            time_spent_seconds,
            submitted_at,
        })
        .await?;

    Ok(Json(ResultView::from(result)))
}

/// The caller's most recent result for an exam.
pub async fn get_my_result(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let filter = ResultFilter {
        exam_id: Some(id),
        student_id: Some(claims.sub.clone()),
    };

    let latest = repo
        .list_results(&filter)
        .await?
        .into_iter()
        .next()
        .ok_or(AppError::NotFound("No result for this exam".to_string()))?;

    Ok(Json(ResultView::from(latest)))
}
