// src/models/submission.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::grading::{GradeResult, PerformanceBreakdown, QuestionOutcome};
use crate::models::question::AnswerValue;

/// A student's answer to one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(default)]
    pub answer: Option<AnswerValue>,
    #[serde(default)]
    pub answered: bool,
}

impl Response {
    pub fn answered(answer: impl Into<AnswerValue>) -> Self {
        Response {
            answer: Some(answer.into()),
            answered: true,
        }
    }
}

/// Responses keyed by question id.
pub type ResponseMap = HashMap<String, Response>;

/// DTO for submitting an exam attempt.
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    #[serde(default)]
    pub responses: ResponseMap,
}

/// Records when a student opened an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ExamAttempt {
    pub exam_id: i64,
    pub student_id: String,
    pub started_at: DateTime<Utc>,
}

/// A graded submission as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamResult {
    pub id: i64,
    pub exam_id: i64,
    pub exam_title: String,
    pub student_id: String,
    pub student_name: Option<String>,
    #[serde(flatten)]
    pub grade: GradeResult,
    pub time_spent_seconds: i64,
    pub submitted_at: DateTime<Utc>,
}

impl ExamResult {
    /// "12m 5s" style rendering of the time spent.
    pub fn time_taken(&self) -> String {
        let secs = self.time_spent_seconds.max(0);
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// A graded submission before it has been assigned an id.
#[derive(Debug, Clone)]
pub struct NewExamResult {
    pub exam_id: i64,
    pub exam_title: String,
    pub student_id: String,
    pub student_name: Option<String>,
    pub grade: GradeResult,
    pub time_spent_seconds: i64,
    pub submitted_at: DateTime<Utc>,
}

impl NewExamResult {
    pub fn into_result(self, id: i64) -> ExamResult {
        ExamResult {
            id,
            exam_id: self.exam_id,
            exam_title: self.exam_title,
            student_id: self.student_id,
            student_name: self.student_name,
            grade: self.grade,
            time_spent_seconds: self.time_spent_seconds,
            submitted_at: self.submitted_at,
        }
    }
}

/// Query filter for listing results.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultFilter {
    pub exam_id: Option<i64>,
    pub student_id: Option<String>,
}

impl ResultFilter {
    pub fn matches(&self, result: &ExamResult) -> bool {
        self.exam_id.is_none_or(|id| id == result.exam_id)
            && self
                .student_id
                .as_deref()
                .is_none_or(|id| id == result.student_id)
    }
}

/// Row shape of `exam_results`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ExamResultRow {
    pub id: i64,
    pub exam_id: i64,
    pub exam_title: String,
    pub student_id: String,
    pub student_name: Option<String>,
    pub score: i64,
    pub total_marks: i64,
    pub percentage: i64,
    pub correct_answers: i64,
    pub incorrect_answers: i64,
    pub unanswered: i64,
    pub total_questions: i64,
    pub passed: bool,
    pub passing_score_used: f64,
    pub question_outcomes: sqlx::types::Json<Vec<QuestionOutcome>>,
    pub time_spent_seconds: i64,
    pub submitted_at: DateTime<Utc>,
}

impl From<ExamResultRow> for ExamResult {
    fn from(row: ExamResultRow) -> Self {
        let count = |v: i64| u32::try_from(v).unwrap_or(0);
        ExamResult {
            id: row.id,
            exam_id: row.exam_id,
            exam_title: row.exam_title,
            student_id: row.student_id,
            student_name: row.student_name,
            grade: GradeResult {
                score: count(row.score),
                total_marks: count(row.total_marks),
                percentage: count(row.percentage),
                correct_answers: count(row.correct_answers),
                incorrect_answers: count(row.incorrect_answers),
                unanswered: count(row.unanswered),
                total_questions: count(row.total_questions),
                passed: row.passed,
                passing_score_used: row.passing_score_used,
                question_outcomes: row.question_outcomes.0,
            },
            time_spent_seconds: row.time_spent_seconds,
            submitted_at: row.submitted_at,
        }
    }
}

/// A stored result as returned to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    #[serde(flatten)]
    pub result: ExamResult,
    /// "Passed" or "Failed".
    pub status: &'static str,
    pub time_taken: String,
    pub analysis: PerformanceBreakdown,
}

impl From<ExamResult> for ResultView {
    fn from(result: ExamResult) -> Self {
        ResultView {
            status: if result.grade.passed { "Passed" } else { "Failed" },
            time_taken: result.time_taken(),
            analysis: PerformanceBreakdown::from_outcomes(&result.grade.question_outcomes),
            result,
        }
    }
}
