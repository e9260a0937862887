// src/handlers/analytics.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::LEADERBOARD_SIZE,
    error::AppError,
    grading::{
        PerformanceBreakdown,
        stats::{ExamStatistics, StudentSummary},
    },
    models::submission::{ExamResult, ResultFilter},
    repository::SharedRepository,
    utils::jwt::Claims,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub student_id: String,
    pub student_name: Option<String>,
    pub score: u32,
    pub percentage: u32,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamAnalytics {
    pub exam_id: i64,
    pub title: String,
    pub statistics: ExamStatistics,
    pub leaderboard: Vec<LeaderboardEntry>,
    /// Chapter and difficulty performance over all submissions.
    pub analysis: PerformanceBreakdown,
}

/// Best results first; earlier submissions win ties.
fn leaderboard(results: &[ExamResult]) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<&ExamResult> = results.iter().collect();
    ranked.sort_by(|a, b| {
        b.grade
            .percentage
            .cmp(&a.grade.percentage)
            .then(a.submitted_at.cmp(&b.submitted_at))
    });
    ranked
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .map(|r| LeaderboardEntry {
            student_id: r.student_id.clone(),
            student_name: r.student_name.clone(),
            score: r.grade.score,
            percentage: r.grade.percentage,
            submitted_at: r.submitted_at,
        })
        .collect()
}

/// Aggregate statistics and top results for one exam.
/// Faculty only.
pub async fn exam_analytics(
    State(repo): State<SharedRepository>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let exam = repo
        .get_exam(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let filter = ResultFilter {
        exam_id: Some(id),
        student_id: None,
    };
    let results = repo.list_results(&filter).await?;

    Ok(Json(ExamAnalytics {
        exam_id: exam.id,
        title: exam.title,
        statistics: ExamStatistics::from_results(&results),
        leaderboard: leaderboard(&results),
        analysis: PerformanceBreakdown::from_outcomes(
            results.iter().flat_map(|r| &r.grade.question_outcomes),
        ),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuery {
    pub student_id: Option<String>,
}

/// Summary of one student's results.
///
/// Students get their own summary; faculty may ask for anyone's.
pub async fn student_analytics(
    State(repo): State<SharedRepository>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<StudentQuery>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = match query.student_id {
        Some(id) if claims.is_staff() => id,
        Some(id) if id != claims.sub => {
            return Err(AppError::Forbidden("Not your analytics".to_string()));
        }
        _ => claims.sub.clone(),
    };

    let filter = ResultFilter {
        exam_id: None,
        student_id: Some(student_id.clone()),
    };
    let results = repo.list_results(&filter).await?;

    Ok(Json(StudentSummary::from_results(&student_id, &results)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::GradeResult;
    use chrono::Duration;

    fn result(student: &str, percentage: u32, minutes_ago: i64) -> ExamResult {
        ExamResult {
            id: 0,
            exam_id: 1,
            exam_title: "E".into(),
            student_id: student.into(),
            student_name: None,
            grade: GradeResult {
                score: percentage / 10,
                total_marks: 10,
                percentage,
                correct_answers: 0,
                incorrect_answers: 0,
                unanswered: 0,
                total_questions: 0,
                passed: percentage >= 50,
                passing_score_used: 50.0,
                question_outcomes: Vec::new(),
            },
            time_spent_seconds: 0,
            submitted_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[test]
    fn leaderboard_ranks_by_percentage_then_time() {
        let results = vec![
            result("late", 90, 1),
            result("low", 10, 5),
            result("early", 90, 10),
            result("mid", 60, 3),
            result("a", 20, 3),
            result("b", 30, 3),
        ];
        let board = leaderboard(&results);
        let order: Vec<&str> = board.iter().map(|e| e.student_id.as_str()).collect();
        assert_eq!(order, ["early", "late", "mid", "b", "a"]);
    }
}
