// src/grading/breakdown.rs

//! Per-chapter and per-difficulty performance, derived from graded
//! question outcomes.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::grading::{OutcomeStatus, QuestionOutcome, percentage_of};
use crate::models::question::Difficulty;

/// Topics at or above this percentage are listed as strengths.
pub const STRENGTH_THRESHOLD: u32 = 70;

/// Topics below this percentage are listed as weaknesses.
pub const WEAKNESS_THRESHOLD: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicPerformance {
    pub name: String,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
    pub total: u32,
    pub percentage: u32,
}

impl TopicPerformance {
    fn new(name: impl Into<String>) -> Self {
        TopicPerformance {
            name: name.into(),
            ..TopicPerformance::default()
        }
    }

    fn add(&mut self, status: OutcomeStatus) {
        self.total += 1;
        match status {
            OutcomeStatus::Correct => self.correct += 1,
            OutcomeStatus::Incorrect => self.incorrect += 1,
            OutcomeStatus::Unanswered => self.unanswered += 1,
        }
        self.percentage = percentage_of(self.correct, self.total);
    }
}

/// Performance grouped by chapter and by difficulty.
///
/// Questions without a chapter (or difficulty) are left out of that
/// grouping. Chapters are ordered by name, difficulties easy to hard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceBreakdown {
    pub chapter_performance: Vec<TopicPerformance>,
    pub difficulty_performance: Vec<TopicPerformance>,
    pub strengths: Vec<TopicPerformance>,
    pub weaknesses: Vec<TopicPerformance>,
}

impl PerformanceBreakdown {
    pub fn from_outcomes<'a>(outcomes: impl IntoIterator<Item = &'a QuestionOutcome>) -> Self {
        let mut chapters: BTreeMap<&str, TopicPerformance> = BTreeMap::new();
        let mut difficulties: BTreeMap<Difficulty, TopicPerformance> = BTreeMap::new();

        for outcome in outcomes {
            if let Some(chapter) = outcome.chapter.as_deref() {
                chapters
                    .entry(chapter)
                    .or_insert_with(|| TopicPerformance::new(chapter))
                    .add(outcome.status);
            }
            if let Some(difficulty) = outcome.difficulty {
                difficulties
                    .entry(difficulty)
                    .or_insert_with(|| TopicPerformance::new(difficulty.as_str()))
                    .add(outcome.status);
            }
        }

        let chapter_performance: Vec<TopicPerformance> = chapters.into_values().collect();
        let strengths = chapter_performance
            .iter()
            .filter(|c| c.percentage >= STRENGTH_THRESHOLD)
            .cloned()
            .collect();
        let weaknesses = chapter_performance
            .iter()
            .filter(|c| c.percentage < WEAKNESS_THRESHOLD)
            .cloned()
            .collect();

        PerformanceBreakdown {
            chapter_performance,
            difficulty_performance: difficulties.into_values().collect(),
            strengths,
            weaknesses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(chapter: Option<&str>, difficulty: Option<Difficulty>, status: OutcomeStatus) -> QuestionOutcome {
        QuestionOutcome {
            question_id: "q".into(),
            status,
            marks_awarded: 0,
            chapter: chapter.map(String::from),
            difficulty,
        }
    }

    #[test]
    fn groups_by_chapter_and_difficulty() {
        use OutcomeStatus::*;
        let outcomes = vec![
            outcome(Some("Motion"), Some(Difficulty::Hard), Correct),
            outcome(Some("Motion"), Some(Difficulty::Easy), Correct),
            outcome(Some("Motion"), Some(Difficulty::Easy), Incorrect),
            outcome(Some("Algebra"), Some(Difficulty::Easy), Unanswered),
            outcome(Some("Algebra"), None, Incorrect),
            outcome(None, Some(Difficulty::Hard), Correct),
        ];
        let breakdown = PerformanceBreakdown::from_outcomes(&outcomes);

        let chapters: Vec<(&str, u32, u32)> = breakdown
            .chapter_performance
            .iter()
            .map(|c| (c.name.as_str(), c.correct, c.total))
            .collect();
        assert_eq!(chapters, [("Algebra", 0, 2), ("Motion", 2, 3)]);
        assert_eq!(breakdown.chapter_performance[0].unanswered, 1);
        assert_eq!(breakdown.chapter_performance[1].percentage, 67);

        let difficulties: Vec<(&str, u32, u32)> = breakdown
            .difficulty_performance
            .iter()
            .map(|d| (d.name.as_str(), d.correct, d.total))
            .collect();
        assert_eq!(difficulties, [("easy", 1, 3), ("hard", 2, 2)]);

        // 67% is neither a strength nor a weakness.
        assert!(breakdown.strengths.is_empty());
        assert_eq!(breakdown.weaknesses.len(), 1);
        assert_eq!(breakdown.weaknesses[0].name, "Algebra");
    }

    #[test]
    fn strength_threshold_is_inclusive() {
        let mut outcomes = vec![outcome(Some("Optics"), None, OutcomeStatus::Incorrect)];
        outcomes.extend((0..9).map(|_| outcome(Some("Optics"), None, OutcomeStatus::Correct)));
        outcomes.extend((0..7).map(|_| outcome(Some("Waves"), None, OutcomeStatus::Correct)));
        outcomes.extend((0..3).map(|_| outcome(Some("Waves"), None, OutcomeStatus::Incorrect)));

        let breakdown = PerformanceBreakdown::from_outcomes(&outcomes);
        let names: Vec<&str> = breakdown.strengths.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Optics", "Waves"]);
    }

    #[test]
    fn untagged_outcomes_give_an_empty_breakdown() {
        let outcomes = vec![outcome(None, None, OutcomeStatus::Correct)];
        assert_eq!(
            PerformanceBreakdown::from_outcomes(&outcomes),
            PerformanceBreakdown::default()
        );
    }
}
