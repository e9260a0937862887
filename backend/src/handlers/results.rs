// src/handlers/results.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::submission::{ResultFilter, ResultView},
    repository::SharedRepository,
    utils::jwt::Claims,
};

/// Lists stored results, newest first.
///
/// Students are always restricted to their own results.
pub async fn list_results(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Query(mut filter): Query<ResultFilter>,
) -> Result<impl IntoResponse, AppError> {
    if !claims.is_staff() {
        filter.student_id = Some(claims.sub.clone());
    }

    let results: Vec<ResultView> = repo
        .list_results(&filter)
        .await?
        .into_iter()
        .map(ResultView::from)
        .collect();

    Ok(Json(results))
}

/// Returns one result to its owner or to faculty.
pub async fn get_result(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let result = repo
        .get_result(id)
        .await?
        .ok_or(AppError::NotFound("Result not found".to_string()))?;

    if !claims.is_staff() && result.student_id != claims.sub {
        return Err(AppError::Forbidden("Not your result".to_string()));
    }

    Ok(Json(ResultView::from(result)))
}
