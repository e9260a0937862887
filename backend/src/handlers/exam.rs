// src/handlers/exam.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        exam::{CreateExamRequest, Exam, ExamStatus, NewExam, PublicExam, UpdateExamRequest},
        question::{PublicQuestion, Question},
    },
    repository::SharedRepository,
    utils::{
        html::{clean_html, clean_opt},
        jwt::Claims,
    },
};

#[derive(Debug, Deserialize)]
pub struct ExamListQuery {
    pub status: Option<ExamStatus>,
}

/// Fetches an exam the caller is allowed to see.
///
/// Drafts are invisible to students and reported as missing.
pub(crate) async fn visible_exam(
    repo: &SharedRepository,
    claims: &Claims,
    id: i64,
) -> Result<Exam, AppError> {
    repo.get_exam(id)
        .await?
        .filter(|exam| claims.is_staff() || exam.status == ExamStatus::Published)
        .ok_or(AppError::NotFound("Exam not found".to_string()))
}

/// Cleans author-supplied rich text. Options and keys are left alone so
/// text-based answer keys still match their option.
fn sanitize_questions(questions: Vec<Question>) -> Vec<Question> {
    questions
        .into_iter()
        .map(|q| Question {
            text: clean_html(&q.text),
            explanation: clean_opt(q.explanation.as_deref()),
            ..q
        })
        .collect()
}

/// Lists exams.
///
/// Students only ever see published exams; faculty may filter by status.
pub async fn list_exams(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<ExamListQuery>,
) -> Result<Response, AppError> {
    if claims.is_staff() {
        let exams = repo.list_exams(query.status).await?;
        return Ok(Json(exams).into_response());
    }

    let exams: Vec<PublicExam> = repo
        .list_exams(Some(ExamStatus::Published))
        .await?
        .iter()
        .map(PublicExam::from)
        .collect();
    Ok(Json(exams).into_response())
}

/// Returns one exam. Faculty get the full definition, students the public view.
pub async fn get_exam(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<Response, AppError> {
    let exam = visible_exam(&repo, &claims, id).await?;
    if claims.is_staff() {
        Ok(Json(exam).into_response())
    } else {
        Ok(Json(PublicExam::from(&exam)).into_response())
    }
}

/// Returns the exam's questions without answer keys.
pub async fn get_exam_questions(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = visible_exam(&repo, &claims, id).await?;
    let questions: Vec<PublicQuestion> = exam.questions.iter().map(PublicQuestion::from).collect();
    Ok(Json(questions))
}

/// Creates a draft exam.
/// Faculty only.
pub async fn create_exam(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let exam = repo
        .create_exam(NewExam {
            title: clean_html(&payload.title),
            description: clean_opt(payload.description.as_deref()),
            duration: payload.duration,
            total_marks: payload.total_marks,
            passing_score: payload.passing_score,
            passing_score_unit: payload.passing_score_unit,
            questions: sanitize_questions(payload.questions),
            created_by: claims.sub.clone(),
        })
        .await?;

    tracing::info!(exam_id = exam.id, author = %claims.sub, "Exam created");
    Ok((StatusCode::CREATED, Json(exam)))
}

/// Updates an exam's metadata or questions.
/// Faculty only.
pub async fn update_exam(
    State(repo): State<SharedRepository>,
    Path(id): Path<i64>,
    Json(mut payload): Json<UpdateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    payload.title = payload.title.as_deref().map(clean_html);
    payload.description = clean_opt(payload.description.as_deref());
    payload.questions = payload.questions.map(sanitize_questions);

    let exam = repo
        .update_exam(id, payload)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    Ok(Json(exam))
}

/// Deletes an exam. Stored results are kept.
/// Faculty only.
pub async fn delete_exam(
    State(repo): State<SharedRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !repo.delete_exam(id).await? {
        return Err(AppError::NotFound("Exam not found".to_string()));
    }
    tracing::info!(exam_id = id, "Exam deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Makes an exam available to students.
/// Faculty only.
pub async fn publish_exam(
    State(repo): State<SharedRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = repo
        .publish_exam(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    if exam.questions.is_empty() {
        tracing::warn!(exam_id = id, "Published an exam with no questions");
    }
    Ok(Json(exam))
}
