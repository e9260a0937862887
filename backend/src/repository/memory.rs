// src/repository/memory.rs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::ExamRepository;
use crate::{
    error::AppError,
    models::{
        exam::{Exam, ExamStatus, NewExam, UpdateExamRequest},
        submission::{ExamAttempt, ExamResult, NewExamResult, ResultFilter},
    },
};

#[derive(Default)]
struct Store {
    exams: BTreeMap<i64, Exam>,
    attempts: HashMap<(i64, String), ExamAttempt>,
    results: BTreeMap<i64, ExamResult>,
    last_exam_id: i64,
    last_result_id: i64,
}

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct MemoryExamRepository {
    store: RwLock<Store>,
}

impl MemoryExamRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ExamRepository for MemoryExamRepository {
    async fn list_exams(&self, status: Option<ExamStatus>) -> Result<Vec<Exam>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .exams
            .values()
            .filter(|e| status.is_none_or(|s| s == e.status))
            .cloned()
            .collect())
    }

    async fn get_exam(&self, id: i64) -> Result<Option<Exam>, AppError> {
        Ok(self.store.read().await.exams.get(&id).cloned())
    }

    async fn create_exam(&self, exam: NewExam) -> Result<Exam, AppError> {
        let mut store = self.store.write().await;
        store.last_exam_id += 1;
        let exam = Exam {
            id: store.last_exam_id,
            title: exam.title,
            description: exam.description,
            duration: exam.duration,
            total_marks: exam.total_marks,
            passing_score: exam.passing_score,
            passing_score_unit: exam.passing_score_unit,
            status: ExamStatus::Draft,
            questions: exam.questions,
            created_by: Some(exam.created_by),
            created_at: Some(Utc::now()),
        };
        store.exams.insert(exam.id, exam.clone());
        Ok(exam)
    }

    async fn update_exam(&self, id: i64, patch: UpdateExamRequest) -> Result<Option<Exam>, AppError> {
        let mut store = self.store.write().await;
        Ok(store.exams.get_mut(&id).map(|exam| {
            exam.apply_update(patch);
            exam.clone()
        }))
    }

    async fn delete_exam(&self, id: i64) -> Result<bool, AppError> {
        let mut store = self.store.write().await;
        store.attempts.retain(|(exam_id, _), _| *exam_id != id);
        Ok(store.exams.remove(&id).is_some())
    }

    async fn publish_exam(&self, id: i64) -> Result<Option<Exam>, AppError> {
        let mut store = self.store.write().await;
        Ok(store.exams.get_mut(&id).map(|exam| {
            exam.status = ExamStatus::Published;
            exam.clone()
        }))
    }

    async fn start_attempt(&self, exam_id: i64, student_id: &str) -> Result<ExamAttempt, AppError> {
        let mut store = self.store.write().await;
        let attempt = store
            .attempts
            .entry((exam_id, student_id.to_string()))
            .or_insert_with(|| ExamAttempt {
                exam_id,
                student_id: student_id.to_string(),
                started_at: Utc::now(),
            });
        Ok(attempt.clone())
    }

    async fn get_attempt(&self, exam_id: i64, student_id: &str) -> Result<Option<ExamAttempt>, AppError> {
        let store = self.store.read().await;
        Ok(store.attempts.get(&(exam_id, student_id.to_string())).cloned())
    }

    async fn save_result(&self, result: NewExamResult) -> Result<ExamResult, AppError> {
        let mut store = self.store.write().await;
        store.last_result_id += 1;
        let result = result.into_result(store.last_result_id);
        store.results.insert(result.id, result.clone());
        Ok(result)
    }

    async fn list_results(&self, filter: &ResultFilter) -> Result<Vec<ExamResult>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .results
            .values()
            .rev()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn get_result(&self, id: i64) -> Result<Option<ExamResult>, AppError> {
        Ok(self.store.read().await.results.get(&id).cloned())
    }
}
