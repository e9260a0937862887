// src/grading/strategy.rs

use crate::grading::answer_key::{AnswerKey, normalize};
use crate::models::question::AnswerValue;

/// Decides whether a submitted answer satisfies a resolved key.
pub trait GradingStrategy: Send + Sync {
    fn is_correct(&self, key: &AnswerKey, answer: Option<&AnswerValue>) -> bool;
}

/// Exact comparison after trimming and case-folding.
///
/// A choice key also accepts the answer when its raw form equals the key
/// as authored, so a key written as index `1` accepts `"1"` and `1`, and a
/// key written as option id `"b"` accepts `"b"`. Nothing else about the
/// option (its position, its other identifiers) is accepted.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatch;

impl GradingStrategy for ExactMatch {
    fn is_correct(&self, key: &AnswerKey, answer: Option<&AnswerValue>) -> bool {
        let raw = answer.map(ToString::to_string).unwrap_or_default();
        let given = normalize(&raw);

        match key {
            AnswerKey::Literal(text) => given == normalize(text),
            AnswerKey::Choice { text, raw: authored, .. } => {
                given == normalize(text) || raw == *authored
            }
        }
    }
}
