// src/grading/stats.rs

use serde::Serialize;

use crate::grading::{PerformanceBreakdown, percentage_of};
use crate::models::submission::ExamResult;

/// Performance bands used on dashboards and reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceBand {
    Excellent,
    Good,
    Average,
    Poor,
}

impl PerformanceBand {
    pub fn for_percentage(percentage: u32) -> Self {
        match percentage {
            80.. => PerformanceBand::Excellent,
            60..=79 => PerformanceBand::Good,
            40..=59 => PerformanceBand::Average,
            _ => PerformanceBand::Poor,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BandCounts {
    pub excellent: u32,
    pub good: u32,
    pub average: u32,
    pub poor: u32,
}

impl BandCounts {
    fn add(&mut self, band: PerformanceBand) {
        match band {
            PerformanceBand::Excellent => self.excellent += 1,
            PerformanceBand::Good => self.good += 1,
            PerformanceBand::Average => self.average += 1,
            PerformanceBand::Poor => self.poor += 1,
        }
    }
}

/// Aggregate over all stored results of one exam.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamStatistics {
    pub attempts: u32,
    pub passed: u32,
    pub failed: u32,
    pub pass_rate: u32,
    pub average_percentage: u32,
    pub average_score: f64,
    pub highest_percentage: u32,
    pub lowest_percentage: u32,
    pub bands: BandCounts,
}

impl ExamStatistics {
    pub fn from_results(results: &[ExamResult]) -> Self {
        if results.is_empty() {
            return ExamStatistics::default();
        }

        let attempts = results.len() as u32;
        let passed = results.iter().filter(|r| r.grade.passed).count() as u32;
        let percentage_sum: u32 = results.iter().map(|r| r.grade.percentage).sum();
        let score_sum: u64 = results.iter().map(|r| u64::from(r.grade.score)).sum();

        let mut bands = BandCounts::default();
        for r in results {
            bands.add(PerformanceBand::for_percentage(r.grade.percentage));
        }

        ExamStatistics {
            attempts,
            passed,
            failed: attempts - passed,
            pass_rate: percentage_of(passed, attempts),
            average_percentage: percentage_sum_avg(percentage_sum, attempts),
            average_score: score_sum as f64 / f64::from(attempts),
            highest_percentage: results.iter().map(|r| r.grade.percentage).max().unwrap_or(0),
            lowest_percentage: results.iter().map(|r| r.grade.percentage).min().unwrap_or(0),
            bands,
        }
    }
}

/// One student's record across exams.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummary {
    pub student_id: String,
    pub exams_taken: u32,
    pub passed: u32,
    pub average_percentage: u32,
    pub best_percentage: u32,
    pub band: Option<PerformanceBand>,
    /// Chapter and difficulty performance over every graded question.
    pub analysis: PerformanceBreakdown,
}

impl StudentSummary {
    pub fn from_results(student_id: &str, results: &[ExamResult]) -> Self {
        let mine: Vec<&ExamResult> = results.iter().filter(|r| r.student_id == student_id).collect();
        let exams_taken = mine.len() as u32;
        if exams_taken == 0 {
            return StudentSummary {
                student_id: student_id.to_string(),
                ..StudentSummary::default()
            };
        }

        let percentage_sum: u32 = mine.iter().map(|r| r.grade.percentage).sum();
        let average_percentage = percentage_sum_avg(percentage_sum, exams_taken);

        StudentSummary {
            student_id: student_id.to_string(),
            exams_taken,
            passed: mine.iter().filter(|r| r.grade.passed).count() as u32,
            average_percentage,
            best_percentage: mine.iter().map(|r| r.grade.percentage).max().unwrap_or(0),
            band: Some(PerformanceBand::for_percentage(average_percentage)),
            analysis: PerformanceBreakdown::from_outcomes(
                mine.iter().flat_map(|r| &r.grade.question_outcomes),
            ),
        }
    }
}

/// Rounded mean of `count` percentages summing to `sum`.
fn percentage_sum_avg(sum: u32, count: u32) -> u32 {
    if count == 0 {
        return 0;
    }
    ((u64::from(sum) * 2 + u64::from(count)) / (u64::from(count) * 2)) as u32
}
