// src/models/exam.rs

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::question::{PublicQuestion, Question};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExamStatus {
    Draft,
    Published,
}

impl ExamStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ExamStatus::Draft => "draft",
            ExamStatus::Published => "published",
        }
    }
}

impl fmt::Display for ExamStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExamStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ExamStatus::Draft),
            "published" => Ok(ExamStatus::Published),
            other => Err(format!("unknown exam status '{}'", other)),
        }
    }
}

/// How `passing_score` is to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PassingScoreUnit {
    Percentage,
    Marks,
}

impl PassingScoreUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            PassingScoreUnit::Percentage => "percentage",
            PassingScoreUnit::Marks => "marks",
        }
    }
}

impl FromStr for PassingScoreUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(PassingScoreUnit::Percentage),
            "marks" => Ok(PassingScoreUnit::Marks),
            other => Err(format!("unknown passing score unit '{}'", other)),
        }
    }
}

/// An exam definition: metadata plus its ordered questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exam {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Minutes.
    #[serde(default)]
    pub duration: u32,
    /// Declared total. Grading recomputes the total from the questions.
    #[serde(default)]
    pub total_marks: Option<u32>,
    #[serde(default)]
    pub passing_score: Option<f64>,
    #[serde(default)]
    pub passing_score_unit: Option<PassingScoreUnit>,
    #[serde(default = "default_status")]
    pub status: ExamStatus,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

fn default_status() -> ExamStatus {
    ExamStatus::Draft
}

impl Exam {
    /// Overwrites every field present in `patch`.
    pub fn apply_update(&mut self, patch: UpdateExamRequest) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
        if let Some(total_marks) = patch.total_marks {
            self.total_marks = Some(total_marks);
        }
        if let Some(passing_score) = patch.passing_score {
            self.passing_score = Some(passing_score);
        }
        if let Some(unit) = patch.passing_score_unit {
            self.passing_score_unit = Some(unit);
        }
        if let Some(questions) = patch.questions {
            self.questions = questions;
        }
    }
}

/// Exam as shown to students: correct answers stripped.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicExam {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub duration: u32,
    pub total_marks: u32,
    pub passing_score: Option<f64>,
    pub passing_score_unit: Option<PassingScoreUnit>,
    pub status: ExamStatus,
    pub question_count: usize,
    pub questions: Vec<PublicQuestion>,
}

impl From<&Exam> for PublicExam {
    fn from(exam: &Exam) -> Self {
        PublicExam {
            id: exam.id,
            title: exam.title.clone(),
            description: exam.description.clone(),
            duration: exam.duration,
            total_marks: exam
                .questions
                .iter()
                .map(Question::marks)
                .fold(0u32, u32::saturating_add),
            passing_score: exam.passing_score,
            passing_score_unit: exam.passing_score_unit,
            status: exam.status,
            question_count: exam.questions.len(),
            questions: exam.questions.iter().map(PublicQuestion::from).collect(),
        }
    }
}

/// DTO for creating an exam.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExamRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be between 1 and 100 characters."))]
    pub title: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 1440))]
    pub duration: u32,
    pub total_marks: Option<u32>,
    #[validate(range(min = 0.0))]
    pub passing_score: Option<f64>,
    pub passing_score_unit: Option<PassingScoreUnit>,
    #[validate(custom(function = validate_questions))]
    pub questions: Vec<Question>,
}

/// DTO for updating an exam. Fields are optional.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExamRequest {
    #[validate(length(min = 1, max = 100))]
    pub title: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(min = 1, max = 1440))]
    pub duration: Option<u32>,
    pub total_marks: Option<u32>,
    #[validate(range(min = 0.0))]
    pub passing_score: Option<f64>,
    pub passing_score_unit: Option<PassingScoreUnit>,
    #[validate(custom(function = validate_questions))]
    pub questions: Option<Vec<Question>>,
}

/// Fully prepared exam ready to be stored.
#[derive(Debug, Clone)]
pub struct NewExam {
    pub title: String,
    pub description: Option<String>,
    pub duration: u32,
    pub total_marks: Option<u32>,
    pub passing_score: Option<f64>,
    pub passing_score_unit: Option<PassingScoreUnit>,
    pub questions: Vec<Question>,
    pub created_by: String,
}

const QUESTION_TEXT_MAX_LENGTH: usize = 1000;
const OPTION_TEXT_MAX_LENGTH: usize = 200;
const QUESTION_MARKS_MAX: u32 = 1000;

fn validate_questions(questions: &[Question]) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for q in questions {
        if q.id.trim().is_empty() {
            return Err(ValidationError::new("question_id_empty"));
        }
        if !seen.insert(q.id.as_str()) {
            return Err(ValidationError::new("question_id_duplicate"));
        }
        if q.text.chars().count() > QUESTION_TEXT_MAX_LENGTH {
            return Err(ValidationError::new("question_text_too_long"));
        }
        if q.marks() > QUESTION_MARKS_MAX {
            return Err(ValidationError::new("question_marks_out_of_range"));
        }
        if q.question_type.has_options() {
            let Some(options) = q.options() else {
                return Err(ValidationError::new("options_cannot_be_empty"));
            };
            if options
                .iter()
                .any(|o| o.text().chars().count() > OPTION_TEXT_MAX_LENGTH)
            {
                return Err(ValidationError::new("option_too_long"));
            }
        }
        if q.correct_answer.is_none() {
            return Err(ValidationError::new("correct_answer_missing"));
        }
    }
    Ok(())
}
