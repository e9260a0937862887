// src/repository/mod.rs

//! Persistence for exams, attempts and results.
//!
//! Handlers only see [`ExamRepository`]; `main` picks the PostgreSQL store
//! when a database is configured and the in-memory store otherwise.

mod memory;
mod postgres;

pub use memory::MemoryExamRepository;
pub use postgres::PgExamRepository;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        exam::{Exam, ExamStatus, NewExam, UpdateExamRequest},
        submission::{ExamAttempt, ExamResult, NewExamResult, ResultFilter},
    },
};

#[async_trait]
pub trait ExamRepository: Send + Sync {
    /// Exams in id order, optionally restricted to one status.
    async fn list_exams(&self, status: Option<ExamStatus>) -> Result<Vec<Exam>, AppError>;

    async fn get_exam(&self, id: i64) -> Result<Option<Exam>, AppError>;

    async fn create_exam(&self, exam: NewExam) -> Result<Exam, AppError>;

    /// Applies the present fields of `patch`. `None` if the exam does not exist.
    async fn update_exam(&self, id: i64, patch: UpdateExamRequest) -> Result<Option<Exam>, AppError>;

    /// `false` if there was nothing to delete.
    async fn delete_exam(&self, id: i64) -> Result<bool, AppError>;

    async fn publish_exam(&self, id: i64) -> Result<Option<Exam>, AppError>;

    /// Opens an attempt, or returns the one already open.
    async fn start_attempt(&self, exam_id: i64, student_id: &str) -> Result<ExamAttempt, AppError>;

    async fn get_attempt(&self, exam_id: i64, student_id: &str) -> Result<Option<ExamAttempt>, AppError>;

    /// Stores one graded submission.
    async fn save_result(&self, result: NewExamResult) -> Result<ExamResult, AppError>;

    /// Matching results, newest first.
    async fn list_results(&self, filter: &ResultFilter) -> Result<Vec<ExamResult>, AppError>;

    async fn get_result(&self, id: i64) -> Result<Option<ExamResult>, AppError>;
}

/// Repository handle shared across handlers.
pub type SharedRepository = std::sync::Arc<dyn ExamRepository>;
