// src/grading/answer_key.rs

use crate::models::{
    exam::Exam,
    question::{Difficulty, QuestionOption, Question},
};

/// Canonical form of a question's correct answer.
///
/// Resolved once per exam so grading never has to guess whether the
/// authored key was an index, an option id or an option's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerKey {
    /// The key points at a concrete option. `raw` is the key as authored
    /// (an index, an option id or the option text).
    Choice {
        index: usize,
        text: String,
        raw: String,
    },
    /// Free-text key, or a choice key that matched no option.
    Literal(String),
}

impl AnswerKey {
    /// Resolves the authored `correct_answer` of `question`.
    ///
    /// With options: a numeric key (number or numeric string) is an index,
    /// anything else is matched against each option's id or text. Keys that
    /// resolve to nothing fall back to their raw text.
    pub fn resolve(question: &Question) -> Self {
        let Some(correct) = question.correct_answer.as_ref() else {
            return AnswerKey::Literal(String::new());
        };
        let raw = correct.to_string();

        let Some(options) = question.options() else {
            return AnswerKey::Literal(raw);
        };

        let index = match correct.as_number() {
            Some(n) => index_of(n).filter(|&i| i < options.len()),
            None => options
                .iter()
                .position(|opt| opt.id().as_deref() == Some(raw.as_str()) || opt.text() == raw),
        };

        match index {
            Some(i) => choice(i, &options[i], raw),
            None => AnswerKey::Literal(raw),
        }
    }
}

fn index_of(n: f64) -> Option<usize> {
    (n >= 0.0 && n.fract() == 0.0).then_some(n as usize)
}

fn choice(index: usize, option: &QuestionOption, raw: String) -> AnswerKey {
    AnswerKey::Choice {
        index,
        text: option.text().to_string(),
        raw,
    }
}

/// Trims and case-folds an answer for comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// One gradable line of an answer sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetEntry {
    pub question_id: String,
    pub marks: u32,
    pub key: AnswerKey,
    pub chapter: Option<String>,
    pub difficulty: Option<Difficulty>,
}

/// An exam's questions with every answer key resolved, in exam order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AnswerSheet {
    entries: Vec<SheetEntry>,
}

impl AnswerSheet {
    pub fn from_exam(exam: &Exam) -> Self {
        AnswerSheet::from_questions(&exam.questions)
    }

    pub fn from_questions(questions: &[Question]) -> Self {
        let entries = questions
            .iter()
            .map(|q| SheetEntry {
                question_id: q.id.clone(),
                marks: q.marks(),
                key: AnswerKey::resolve(q),
                chapter: q.chapter.clone(),
                difficulty: q.difficulty,
            })
            .collect();
        AnswerSheet { entries }
    }

    pub fn entries(&self) -> &[SheetEntry] {
        &self.entries
    }

    /// Sum of all question marks, saturating at `u32::MAX`.
    pub fn total_marks(&self) -> u32 {
        self.entries
            .iter()
            .fold(0u32, |total, e| total.saturating_add(e.marks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn question(value: serde_json::Value) -> Question {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn numeric_key_resolves_to_option() {
        let q = question(json!({
            "id": "q", "type": "mcq", "options": ["A", "B", "C"], "correctAnswer": 1
        }));
        assert_eq!(
            AnswerKey::resolve(&q),
            AnswerKey::Choice { index: 1, text: "B".into(), raw: "1".into() }
        );

        let q = question(json!({
            "id": "q", "type": "mcq", "options": ["A", "B", "C"], "correctAnswer": " 2 "
        }));
        assert_eq!(
            AnswerKey::resolve(&q),
            AnswerKey::Choice { index: 2, text: "C".into(), raw: " 2 ".into() }
        );
    }

    #[test]
    fn id_and_text_keys_resolve_to_option() {
        let q = question(json!({
            "id": "q",
            "type": "mcq",
            "options": [{"id": "a", "text": "Alpha"}, {"id": "b", "text": "Beta"}],
            "correctAnswer": "b"
        }));
        assert_eq!(
            AnswerKey::resolve(&q),
            AnswerKey::Choice { index: 1, text: "Beta".into(), raw: "b".into() }
        );

        let q = question(json!({
            "id": "q",
            "type": "mcq",
            "options": [{"id": "a", "text": "Alpha"}, {"id": "b", "text": "Beta"}],
            "correctAnswer": "Alpha"
        }));
        assert_eq!(
            AnswerKey::resolve(&q),
            AnswerKey::Choice { index: 0, text: "Alpha".into(), raw: "Alpha".into() }
        );
    }

    #[test]
    fn unresolvable_keys_degrade_to_literal() {
        let q = question(json!({
            "id": "q", "type": "mcq", "options": ["A", "B"], "correctAnswer": "Z"
        }));
        assert_eq!(AnswerKey::resolve(&q), AnswerKey::Literal("Z".into()));

        let q = question(json!({
            "id": "q", "type": "mcq", "options": ["A", "B"], "correctAnswer": 9
        }));
        assert_eq!(AnswerKey::resolve(&q), AnswerKey::Literal("9".into()));

        let q = question(json!({"id": "q", "type": "mcq", "options": ["A"]}));
        assert_eq!(AnswerKey::resolve(&q), AnswerKey::Literal(String::new()));
    }

    #[test]
    fn sheet_keeps_exam_order_and_sums_marks() {
        let questions = vec![
            question(json!({"id": "b", "type": "essay", "marks": 3, "correctAnswer": "x"})),
            question(json!({"id": "a", "type": "short_answer", "correctAnswer": "y"})),
        ];
        let sheet = AnswerSheet::from_questions(&questions);
        let ids: Vec<&str> = sheet.entries().iter().map(|e| e.question_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert_eq!(sheet.total_marks(), 4);
    }

    #[test]
    fn total_marks_saturate_instead_of_overflowing() {
        let questions = vec![
            question(json!({"id": "a", "type": "essay", "marks": 4_000_000_000u32, "correctAnswer": "x"})),
            question(json!({"id": "b", "type": "essay", "marks": 4_000_000_000u32, "correctAnswer": "y"})),
        ];
        assert_eq!(AnswerSheet::from_questions(&questions).total_marks(), u32::MAX);
    }
}
