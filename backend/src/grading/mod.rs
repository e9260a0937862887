// src/grading/mod.rs

//! Exam grading.
//!
//! Grading is a pure function of an exam definition and a response map.
//! Answer keys are resolved into an [`AnswerSheet`] first, then every
//! question is classified as correct, incorrect or unanswered.

pub mod answer_key;
pub mod breakdown;
pub mod stats;
pub mod strategy;
pub mod threshold;

use serde::{Deserialize, Serialize};

pub use answer_key::{AnswerKey, AnswerSheet, normalize};
pub use breakdown::{PerformanceBreakdown, TopicPerformance};
pub use strategy::{ExactMatch, GradingStrategy};
pub use threshold::{PassingScore, percentage_of};

use crate::models::{
    exam::Exam,
    question::{AnswerValue, Difficulty, Question},
    submission::ResponseMap,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Correct,
    Incorrect,
    Unanswered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: String,
    pub status: OutcomeStatus,
    pub marks_awarded: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chapter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
}

/// Outcome of grading one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub score: u32,
    pub total_marks: u32,
    pub percentage: u32,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub unanswered: u32,
    pub total_questions: u32,
    pub passed: bool,
    /// Resolved pass mark, as a percentage.
    pub passing_score_used: f64,
    pub question_outcomes: Vec<QuestionOutcome>,
}

/// Grades attempts using a [`GradingStrategy`].
#[derive(Debug, Clone, Default)]
pub struct Grader<S = ExactMatch> {
    strategy: S,
}

impl Grader<ExactMatch> {
    pub fn new() -> Self {
        Grader { strategy: ExactMatch }
    }
}

impl<S: GradingStrategy> Grader<S> {
    pub fn with_strategy(strategy: S) -> Self {
        Grader { strategy }
    }

    pub fn grade(&self, exam: &Exam, responses: &ResponseMap) -> GradeResult {
        let sheet = AnswerSheet::from_exam(exam);
        self.grade_sheet(&sheet, PassingScore::from_exam(exam), responses)
    }

    /// Grades against an already resolved sheet.
    pub fn grade_sheet(
        &self,
        sheet: &AnswerSheet,
        passing: PassingScore,
        responses: &ResponseMap,
    ) -> GradeResult {
        let mut score: u32 = 0;
        let mut correct_answers = 0;
        let mut incorrect_answers = 0;
        let mut unanswered = 0;
        let mut question_outcomes = Vec::with_capacity(sheet.entries().len());

        for entry in sheet.entries() {
            let response = responses
                .get(&entry.question_id)
                .filter(|r| r.answered);

            let status = match response {
                None => {
                    unanswered += 1;
                    OutcomeStatus::Unanswered
                }
                Some(r) if self.strategy.is_correct(&entry.key, r.answer.as_ref()) => {
                    correct_answers += 1;
                    score = score.saturating_add(entry.marks);
                    OutcomeStatus::Correct
                }
                Some(_) => {
                    incorrect_answers += 1;
                    OutcomeStatus::Incorrect
                }
            };

            tracing::trace!(question_id = %entry.question_id, ?status, "graded question");

            question_outcomes.push(QuestionOutcome {
                question_id: entry.question_id.clone(),
                status,
                marks_awarded: if status == OutcomeStatus::Correct { entry.marks } else { 0 },
                chapter: entry.chapter.clone(),
                difficulty: entry.difficulty,
            });
        }

        let total_marks = sheet.total_marks();
        let percentage = percentage_of(score, total_marks);
        let passing_score_used = passing.resolve(total_marks);

        GradeResult {
            score,
            total_marks,
            percentage,
            correct_answers,
            incorrect_answers,
            unanswered,
            total_questions: sheet.entries().len() as u32,
            passed: f64::from(percentage) >= passing_score_used,
            passing_score_used,
            question_outcomes,
        }
    }
}

/// Grades `responses` against `exam` with exact matching.
pub fn grade_exam(exam: &Exam, responses: &ResponseMap) -> GradeResult {
    Grader::new().grade(exam, responses)
}

/// Whether `answer` is a correct response to `question` under exact matching.
pub fn is_answer_correct(question: &Question, answer: Option<&AnswerValue>) -> bool {
    ExactMatch.is_correct(&AnswerKey::resolve(question), answer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::submission::Response;
    use serde_json::json;

    fn exam(value: serde_json::Value) -> Exam {
        serde_json::from_value(value).unwrap()
    }

    fn responses(pairs: &[(&str, &str)]) -> ResponseMap {
        pairs
            .iter()
            .map(|(id, ans)| (id.to_string(), Response::answered(*ans)))
            .collect()
    }

    fn two_question_exam() -> Exam {
        exam(json!({
            "title": "Basics",
            "passingScore": 40,
            "questions": [
                {"id": "q1", "type": "mcq", "marks": 1, "options": ["3", "4", "5"], "correctAnswer": "4"},
                {"id": "q2", "type": "short_answer", "marks": 1, "correctAnswer": "Paris"}
            ]
        }))
    }

    fn five_by_six(passing: f64) -> Exam {
        let questions: Vec<_> = (1..=5)
            .map(|i| json!({"id": format!("q{i}"), "type": "short_answer", "marks": 6, "correctAnswer": "yes"}))
            .collect();
        exam(json!({"title": "Marks", "passingScore": passing, "questions": questions}))
    }

    #[test]
    fn test_all_correct() {
        let result = grade_exam(&two_question_exam(), &responses(&[("q1", "4"), ("q2", "Paris")]));

        assert_eq!(result.score, 2);
        assert_eq!(result.total_marks, 2);
        assert_eq!(result.percentage, 100);
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.incorrect_answers, 0);
        assert_eq!(result.unanswered, 0);
        assert!(result.passed);
        assert_eq!(result.passing_score_used, 40.0);
    }

    #[test]
    fn test_mixed() {
        let result = grade_exam(&two_question_exam(), &responses(&[("q1", "4"), ("q2", "London")]));

        assert_eq!(result.score, 1);
        assert_eq!(result.percentage, 50);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.incorrect_answers, 1);
        assert!(result.passed);
    }

    #[test]
    fn test_absolute_marks_threshold() {
        let exam = five_by_six(15.0);

        let two = grade_exam(&exam, &responses(&[("q1", "yes"), ("q2", "yes"), ("q3", "no")]));
        assert_eq!(two.score, 12);
        assert_eq!(two.total_marks, 30);
        assert_eq!(two.percentage, 40);
        assert_eq!(two.passing_score_used, 50.0);
        assert!(!two.passed);

        let three = grade_exam(&exam, &responses(&[("q1", "yes"), ("q2", "yes"), ("q3", "yes")]));
        assert_eq!(three.score, 18);
        assert_eq!(three.percentage, 60);
        assert!(three.passed);
    }

    #[test]
    fn test_explicit_marks_unit() {
        // 15 marks out of 30, declared as marks.
        let mut exam = five_by_six(15.0);
        exam.passing_score_unit = Some(crate::models::exam::PassingScoreUnit::Marks);
        let result = grade_exam(&exam, &responses(&[("q1", "yes"), ("q2", "yes")]));
        assert_eq!(result.passing_score_used, 50.0);
        assert!(!result.passed);

        // 60 read as a percentage even though it is above the legacy cutoff.
        let mut exam = five_by_six(60.0);
        exam.passing_score_unit = Some(crate::models::exam::PassingScoreUnit::Percentage);
        let result = grade_exam(&exam, &responses(&[("q1", "yes"), ("q2", "yes"), ("q3", "yes")]));
        assert_eq!(result.passing_score_used, 60.0);
        assert!(result.passed);
    }

    #[test]
    fn test_index_and_text_are_equivalent() {
        let exam = exam(json!({
            "questions": [
                {"id": "q", "type": "mcq", "options": ["A", "B", "C"], "correctAnswer": 1}
            ]
        }));

        for answer in ["B", "1", " b "] {
            let result = grade_exam(&exam, &responses(&[("q", answer)]));
            assert_eq!(result.correct_answers, 1, "answer {answer:?}");
        }

        let mut numeric = ResponseMap::new();
        numeric.insert("q".into(), Response::answered(1u64));
        assert_eq!(grade_exam(&exam, &numeric).correct_answers, 1);

        let wrong = grade_exam(&exam, &responses(&[("q", "C")]));
        assert_eq!(wrong.incorrect_answers, 1);
    }

    #[test]
    fn test_numeric_option_ids_do_not_collide_with_indexes() {
        let exam = exam(json!({
            "questions": [{
                "id": "q",
                "type": "mcq",
                "options": [{"id": 1, "text": "A"}, {"id": 2, "text": "B"}, {"id": 3, "text": "C"}],
                "correctAnswer": "B"
            }]
        }));

        // Option A has id 1, which is also the index of B.
        let mut picked_a = ResponseMap::new();
        picked_a.insert("q".into(), Response::answered(1u64));
        let result = grade_exam(&exam, &picked_a);
        assert_eq!(result.correct_answers, 0);
        assert_eq!(result.score, 0);

        assert_eq!(grade_exam(&exam, &responses(&[("q", "b")])).correct_answers, 1);
    }

    #[test]
    fn test_text_key_rejects_bare_index() {
        let exam = exam(json!({
            "questions": [
                {"id": "q", "type": "mcq", "options": ["London", "Paris"], "correctAnswer": "Paris"}
            ]
        }));
        assert_eq!(grade_exam(&exam, &responses(&[("q", "1")])).correct_answers, 0);
        assert_eq!(grade_exam(&exam, &responses(&[("q", "paris")])).correct_answers, 1);
    }

    #[test]
    fn test_huge_marks_saturate() {
        let exam = exam(json!({
            "questions": [
                {"id": "a", "type": "short_answer", "marks": 4_000_000_000u32, "correctAnswer": "x"},
                {"id": "b", "type": "short_answer", "marks": 4_000_000_000u32, "correctAnswer": "y"}
            ]
        }));
        let result = grade_exam(&exam, &responses(&[("a", "x"), ("b", "y")]));
        assert_eq!(result.total_marks, u32::MAX);
        assert_eq!(result.score, u32::MAX);
        assert!(result.score <= result.total_marks);
        assert_eq!(result.percentage, 100);
    }

    #[test]
    fn test_outcomes_carry_question_metadata() {
        let exam = exam(json!({
            "questions": [
                {"id": "a", "type": "short_answer", "chapter": "Motion", "difficulty": "hard", "correctAnswer": "x"},
                {"id": "b", "type": "short_answer", "correctAnswer": "y"}
            ]
        }));
        let result = grade_exam(&exam, &responses(&[("a", "x")]));
        assert_eq!(result.question_outcomes[0].chapter.as_deref(), Some("Motion"));
        assert_eq!(result.question_outcomes[0].difficulty, Some(Difficulty::Hard));
        assert_eq!(result.question_outcomes[1].chapter, None);

        let breakdown = PerformanceBreakdown::from_outcomes(&result.question_outcomes);
        assert_eq!(breakdown.chapter_performance.len(), 1);
        assert_eq!(breakdown.strengths[0].name, "Motion");
    }

    #[test]
    fn test_unanswered() {
        let mut map = responses(&[("q1", "4")]);
        map.insert(
            "q2".into(),
            Response {
                answer: Some("Paris".into()),
                answered: false,
            },
        );

        let result = grade_exam(&two_question_exam(), &map);
        assert_eq!(result.correct_answers, 1);
        assert_eq!(result.unanswered, 1);
        assert_eq!(result.incorrect_answers, 0);
        assert_eq!(result.score, 1);
        assert_eq!(result.question_outcomes[1].status, OutcomeStatus::Unanswered);
        assert_eq!(result.question_outcomes[1].marks_awarded, 0);

        let empty = grade_exam(&two_question_exam(), &ResponseMap::new());
        assert_eq!(empty.unanswered, 2);
        assert_eq!(empty.score, 0);
    }

    #[test]
    fn test_zero_question_exam() {
        let result = grade_exam(&exam(json!({"questions": []})), &ResponseMap::new());
        assert_eq!(result.total_marks, 0);
        assert_eq!(result.percentage, 0);
        assert!(!result.passed);
        assert_eq!(result.total_questions, 0);
    }

    #[test]
    fn test_zero_marks_with_zero_threshold_passes() {
        let exam = exam(json!({
            "passingScore": 0,
            "questions": [{"id": "q", "type": "essay", "marks": 0, "correctAnswer": "x"}]
        }));
        let result = grade_exam(&exam, &responses(&[("q", "x")]));
        assert_eq!(result.total_marks, 0);
        assert_eq!(result.percentage, 0);
        assert!(result.passed);
    }

    #[test]
    fn test_declared_total_is_ignored() {
        let mut exam = two_question_exam();
        exam.total_marks = Some(100);
        let result = grade_exam(&exam, &responses(&[("q1", "4")]));
        assert_eq!(result.total_marks, 2);
        assert_eq!(result.percentage, 50);
    }

    #[test]
    fn test_missing_marks_count_as_one() {
        let exam = exam(json!({
            "questions": [
                {"id": "a", "type": "short_answer", "correctAnswer": "x"},
                {"id": "b", "type": "short_answer", "marks": 3, "correctAnswer": "y"}
            ]
        }));
        let result = grade_exam(&exam, &responses(&[("a", "x")]));
        assert_eq!(result.total_marks, 4);
        assert_eq!(result.score, 1);
        assert_eq!(result.percentage, 25);
    }

    #[test]
    fn test_malformed_key_does_not_abort_grading() {
        let exam = exam(json!({
            "questions": [
                {"id": "a", "type": "mcq", "options": ["A", "B"], "correctAnswer": "Z"},
                {"id": "b", "type": "mcq", "options": ["A", "B"]},
                {"id": "c", "type": "short_answer", "correctAnswer": "ok"}
            ]
        }));
        let result = grade_exam(&exam, &responses(&[("a", "z"), ("b", "A"), ("c", "OK")]));
        assert_eq!(result.correct_answers, 2);
        assert_eq!(result.incorrect_answers, 1);
    }

    #[test]
    fn test_invariants_and_idempotence() {
        let exam = exam(json!({
            "passingScore": 70,
            "questions": [
                {"id": "1", "type": "mcq", "marks": 2, "options": [{"id": "x", "text": "X"}, {"id": "y", "text": "Y"}], "correctAnswer": "y"},
                {"id": "2", "type": "true_false", "marks": 1, "options": ["True", "False"], "correctAnswer": 0},
                {"id": "3", "type": "short_answer", "marks": 4, "correctAnswer": "Newton"},
                {"id": "4", "type": "essay", "marks": 5, "correctAnswer": "free text"}
            ]
        }));
        let map = responses(&[("1", "y"), ("2", "false"), ("3", " newton")]);

        let first = grade_exam(&exam, &map);
        let second = grade_exam(&exam, &map);
        assert_eq!(first, second);

        assert_eq!(
            first.correct_answers + first.incorrect_answers + first.unanswered,
            first.total_questions
        );
        assert_eq!(first.total_questions, 4);
        assert!(first.score <= first.total_marks);
        assert_eq!(first.score, 6);
        assert_eq!(first.total_marks, 12);
        assert_eq!(first.percentage, 50);
        // 70 > 50, so read as marks: round(100 * 70 / 12) = 583.
        assert_eq!(first.passing_score_used, 583.0);
        assert!(!first.passed);
    }

    #[test]
    fn test_is_answer_correct_free_function() {
        let q: Question = serde_json::from_value(json!({
            "id": "q", "type": "true_false", "options": ["True", "False"], "correctAnswer": "False"
        }))
        .unwrap();
        assert!(is_answer_correct(&q, Some(&"false".into())));
        assert!(!is_answer_correct(&q, Some(&"1".into())));
        assert!(!is_answer_correct(&q, Some(&"True".into())));
        assert!(!is_answer_correct(&q, None));
    }

    struct AlwaysWrong;

    impl GradingStrategy for AlwaysWrong {
        fn is_correct(&self, _key: &AnswerKey, _answer: Option<&AnswerValue>) -> bool {
            false
        }
    }

    #[test]
    fn test_custom_strategy() {
        let grader = Grader::with_strategy(AlwaysWrong);
        let result = grader.grade(&two_question_exam(), &responses(&[("q1", "4"), ("q2", "Paris")]));
        assert_eq!(result.score, 0);
        assert_eq!(result.incorrect_answers, 2);
    }
}
