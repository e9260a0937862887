// src/repository/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};

use super::ExamRepository;
use crate::{
    error::AppError,
    grading::QuestionOutcome,
    models::{
        exam::{Exam, ExamStatus, NewExam, PassingScoreUnit, UpdateExamRequest},
        question::Question,
        submission::{ExamAttempt, ExamResult, ExamResultRow, NewExamResult, ResultFilter},
    },
};

const EXAM_COLUMNS: &str = "id, title, description, duration, total_marks, passing_score, \
     passing_score_unit, status, questions, created_by, created_at";

const RESULT_COLUMNS: &str = "id, exam_id, exam_title, student_id, student_name, score, \
     total_marks, percentage, correct_answers, incorrect_answers, unanswered, total_questions, \
     passed, passing_score_used, question_outcomes, time_spent_seconds, submitted_at";

/// Row shape of `exams`.
#[derive(sqlx::FromRow)]
struct ExamRow {
    id: i64,
    title: String,
    description: Option<String>,
    duration: i32,
    total_marks: Option<i32>,
    passing_score: Option<f64>,
    passing_score_unit: Option<String>,
    status: String,
    questions: Json<Vec<Question>>,
    created_by: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ExamRow> for Exam {
    type Error = AppError;

    fn try_from(row: ExamRow) -> Result<Self, Self::Error> {
        let status: ExamStatus = row.status.parse().map_err(AppError::InternalServerError)?;
        let passing_score_unit = row
            .passing_score_unit
            .map(|unit| unit.parse::<PassingScoreUnit>())
            .transpose()
            .map_err(AppError::InternalServerError)?;

        Ok(Exam {
            id: row.id,
            title: row.title,
            description: row.description,
            duration: u32::try_from(row.duration).unwrap_or(0),
            total_marks: row.total_marks.and_then(|m| u32::try_from(m).ok()),
            passing_score: row.passing_score,
            passing_score_unit,
            status,
            questions: row.questions.0,
            created_by: row.created_by,
            created_at: Some(row.created_at),
        })
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

/// PostgreSQL-backed store.
#[derive(Clone)]
pub struct PgExamRepository {
    pool: PgPool,
}

impl PgExamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn write_exam(&self, exam: &Exam) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE exams SET
                title = $2,
                description = $3,
                duration = $4,
                total_marks = $5,
                passing_score = $6,
                passing_score_unit = $7,
                status = $8,
                questions = $9
            WHERE id = $1
            "#,
        )
        .bind(exam.id)
        .bind(&exam.title)
        .bind(&exam.description)
        .bind(to_i32(exam.duration))
        .bind(exam.total_marks.map(to_i32))
        .bind(exam.passing_score)
        .bind(exam.passing_score_unit.map(|u| u.as_str()))
        .bind(exam.status.as_str())
        .bind(Json(&exam.questions))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to update exam {}: {:?}", exam.id, e);
            AppError::InternalServerError(e.to_string())
        })?;
        Ok(())
    }
}

#[async_trait]
impl ExamRepository for PgExamRepository {
    async fn list_exams(&self, status: Option<ExamStatus>) -> Result<Vec<Exam>, AppError> {
        let rows: Vec<ExamRow> = sqlx::query_as(&format!(
            "SELECT {EXAM_COLUMNS} FROM exams WHERE ($1::TEXT IS NULL OR status = $1) ORDER BY id"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list exams: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        rows.into_iter().map(Exam::try_from).collect()
    }

    async fn get_exam(&self, id: i64) -> Result<Option<Exam>, AppError> {
        let row: Option<ExamRow> =
            sqlx::query_as(&format!("SELECT {EXAM_COLUMNS} FROM exams WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        row.map(Exam::try_from).transpose()
    }

    async fn create_exam(&self, exam: NewExam) -> Result<Exam, AppError> {
        let row: ExamRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO exams
                (title, description, duration, total_marks, passing_score,
                 passing_score_unit, status, questions, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, 'draft', $7, $8)
            RETURNING {EXAM_COLUMNS}
            "#
        ))
        .bind(&exam.title)
        .bind(&exam.description)
        .bind(to_i32(exam.duration))
        .bind(exam.total_marks.map(to_i32))
        .bind(exam.passing_score)
        .bind(exam.passing_score_unit.map(|u| u.as_str()))
        .bind(Json(&exam.questions))
        .bind(&exam.created_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create exam: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Exam::try_from(row)
    }

    async fn update_exam(&self, id: i64, patch: UpdateExamRequest) -> Result<Option<Exam>, AppError> {
        let Some(mut exam) = self.get_exam(id).await? else {
            return Ok(None);
        };
        exam.apply_update(patch);
        self.write_exam(&exam).await?;
        Ok(Some(exam))
    }

    async fn delete_exam(&self, id: i64) -> Result<bool, AppError> {
        let deleted = sqlx::query("DELETE FROM exams WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn publish_exam(&self, id: i64) -> Result<Option<Exam>, AppError> {
        let row: Option<ExamRow> = sqlx::query_as(&format!(
            "UPDATE exams SET status = 'published' WHERE id = $1 RETURNING {EXAM_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Exam::try_from).transpose()
    }

    async fn start_attempt(&self, exam_id: i64, student_id: &str) -> Result<ExamAttempt, AppError> {
        sqlx::query(
            r#"
            INSERT INTO exam_attempts (exam_id, student_id)
            VALUES ($1, $2)
            ON CONFLICT (exam_id, student_id) DO NOTHING
            "#,
        )
        .bind(exam_id)
        .bind(student_id)
        .execute(&self.pool)
        .await?;

        self.get_attempt(exam_id, student_id)
            .await?
            .ok_or_else(|| AppError::InternalServerError("attempt vanished after insert".to_string()))
    }

    async fn get_attempt(&self, exam_id: i64, student_id: &str) -> Result<Option<ExamAttempt>, AppError> {
        let attempt = sqlx::query_as::<_, ExamAttempt>(
            "SELECT exam_id, student_id, started_at FROM exam_attempts WHERE exam_id = $1 AND student_id = $2",
        )
        .bind(exam_id)
        .bind(student_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(attempt)
    }

    async fn save_result(&self, result: NewExamResult) -> Result<ExamResult, AppError> {
        let grade = &result.grade;
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO exam_results
                (exam_id, exam_title, student_id, student_name, score, total_marks, percentage,
                 correct_answers, incorrect_answers, unanswered, total_questions, passed,
                 passing_score_used, question_outcomes, time_spent_seconds, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            RETURNING id
            "#,
        )
        .bind(result.exam_id)
        .bind(&result.exam_title)
        .bind(&result.student_id)
        .bind(&result.student_name)
        .bind(i64::from(grade.score))
        .bind(i64::from(grade.total_marks))
        .bind(i64::from(grade.percentage))
        .bind(i64::from(grade.correct_answers))
        .bind(i64::from(grade.incorrect_answers))
        .bind(i64::from(grade.unanswered))
        .bind(i64::from(grade.total_questions))
        .bind(grade.passed)
        .bind(grade.passing_score_used)
        .bind(Json::<&Vec<QuestionOutcome>>(&grade.question_outcomes))
        .bind(result.time_spent_seconds)
        .bind(result.submitted_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save exam result: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(result.into_result(id))
    }

    async fn list_results(&self, filter: &ResultFilter) -> Result<Vec<ExamResult>, AppError> {
        let rows: Vec<ExamResultRow> = sqlx::query_as(&format!(
            r#"
            SELECT {RESULT_COLUMNS} FROM exam_results
            WHERE ($1::BIGINT IS NULL OR exam_id = $1)
              AND ($2::TEXT IS NULL OR student_id = $2)
            ORDER BY id DESC
            "#
        ))
        .bind(filter.exam_id)
        .bind(filter.student_id.as_deref())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to list exam results: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(rows.into_iter().map(ExamResult::from).collect())
    }

    async fn get_result(&self, id: i64) -> Result<Option<ExamResult>, AppError> {
        let row: Option<ExamResultRow> =
            sqlx::query_as(&format!("SELECT {RESULT_COLUMNS} FROM exam_results WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(ExamResult::from))
    }
}
