// src/models/question.rs

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Question kinds understood by the grader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    #[serde(alias = "multiple_choice", alias = "multiple-choice")]
    Mcq,
    #[serde(alias = "true-false")]
    TrueFalse,
    #[serde(alias = "short-answer")]
    ShortAnswer,
    Essay,
}

impl QuestionType {
    /// Choice questions must carry options.
    pub fn has_options(self) -> bool {
        matches!(self, QuestionType::Mcq | QuestionType::TrueFalse)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

/// A scalar answer as it appears in authored keys and submitted responses.
///
/// Authoring tools and clients mix representations: an option may be
/// referenced by index (`1` or `"1"`), by id, or by its display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl AnswerValue {
    /// Numeric reading of the value: numbers as-is, strings when they
    /// parse as a number after trimming. Booleans and blank strings are
    /// not numeric.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AnswerValue::Number(n) => n.as_f64(),
            AnswerValue::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
                }
            }
            AnswerValue::Bool(_) => None,
        }
    }
}

/// Renders the value the way it would be compared as a raw string.
/// Whole numbers render without a fractional part.
impl fmt::Display for AnswerValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnswerValue::Bool(b) => write!(f, "{}", b),
            AnswerValue::Number(n) => match n.as_f64() {
                Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => write!(f, "{}", v as i64),
                _ => write!(f, "{}", n),
            },
            AnswerValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        AnswerValue::Text(value.to_string())
    }
}

impl From<u64> for AnswerValue {
    fn from(value: u64) -> Self {
        AnswerValue::Number(value.into())
    }
}

/// One choice of a multiple-choice or true/false question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionOption {
    Text(String),
    Choice { id: AnswerValue, text: String },
}

impl QuestionOption {
    pub fn text(&self) -> &str {
        match self {
            QuestionOption::Text(text) => text,
            QuestionOption::Choice { text, .. } => text,
        }
    }

    pub fn id(&self) -> Option<String> {
        match self {
            QuestionOption::Text(_) => None,
            QuestionOption::Choice { id, .. } => Some(id.to_string()),
        }
    }
}

/// A gradable question as authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    #[serde(deserialize_with = "id_from_string_or_number")]
    pub id: String,

    #[serde(rename = "type")]
    pub question_type: QuestionType,

    #[serde(default)]
    pub text: String,

    /// Weight toward the total. Absent marks count as 1.
    #[serde(default)]
    pub marks: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,

    #[serde(default)]
    pub correct_answer: Option<AnswerValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

impl Question {
    pub fn marks(&self) -> u32 {
        self.marks.unwrap_or(1)
    }

    /// Options, if the question carries a non-empty list of them.
    pub fn options(&self) -> Option<&[QuestionOption]> {
        self.options.as_deref().filter(|opts| !opts.is_empty())
    }
}

/// Question as shown to a student taking the exam (no key, no explanation).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuestion {
    pub id: String,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub text: String,
    pub marks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<QuestionOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

impl From<&Question> for PublicQuestion {
    fn from(q: &Question) -> Self {
        PublicQuestion {
            id: q.id.clone(),
            question_type: q.question_type,
            text: q.text.clone(),
            marks: q.marks(),
            options: q.options.clone(),
            chapter: q.chapter.clone(),
            difficulty: q.difficulty,
        }
    }
}

/// Question ids arrive as strings or numbers; both are kept as strings.
pub(crate) fn id_from_string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match AnswerValue::deserialize(deserializer)? {
        AnswerValue::Bool(_) => Err(serde::de::Error::custom(
            "question id must be a string or a number",
        )),
        other => Ok(other.to_string()),
    }
}
