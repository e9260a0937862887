// src/grading/threshold.rs

use crate::config::{DEFAULT_PASSING_SCORE, LEGACY_MARKS_CUTOFF};
use crate::models::exam::{Exam, PassingScoreUnit};

/// Pass mark of an exam with its unit made explicit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PassingScore {
    Percentage(f64),
    Marks(f64),
}

impl PassingScore {
    /// Reads the exam's pass mark.
    ///
    /// Records without a unit predate the explicit field: values above
    /// the legacy cutoff were authored as marks, the rest as percentages.
    pub fn from_exam(exam: &Exam) -> Self {
        PassingScore::new(exam.passing_score, exam.passing_score_unit)
    }

    pub fn new(value: Option<f64>, unit: Option<PassingScoreUnit>) -> Self {
        let value = value.unwrap_or(DEFAULT_PASSING_SCORE);
        match unit {
            Some(PassingScoreUnit::Percentage) => PassingScore::Percentage(value),
            Some(PassingScoreUnit::Marks) => PassingScore::Marks(value),
            None if value > LEGACY_MARKS_CUTOFF => PassingScore::Marks(value),
            None => PassingScore::Percentage(value),
        }
    }

    /// Threshold as a percentage of `total_marks`.
    ///
    /// A marks threshold on an exam worth nothing falls back to the
    /// default percentage.
    pub fn resolve(self, total_marks: u32) -> f64 {
        match self {
            PassingScore::Percentage(p) => p,
            PassingScore::Marks(_) if total_marks == 0 => DEFAULT_PASSING_SCORE,
            PassingScore::Marks(m) => (100.0 * m / f64::from(total_marks)).round(),
        }
    }
}

/// `round(100 * part / whole)` with halves rounded up; 0 when `whole` is 0.
pub fn percentage_of(part: u32, whole: u32) -> u32 {
    if whole == 0 {
        return 0;
    }
    let (part, whole) = (u64::from(part), u64::from(whole));
    ((200 * part + whole) / (2 * whole)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_values_split_on_cutoff() {
        assert_eq!(PassingScore::new(Some(40.0), None), PassingScore::Percentage(40.0));
        assert_eq!(PassingScore::new(Some(50.0), None), PassingScore::Percentage(50.0));
        assert_eq!(PassingScore::new(Some(60.0), None), PassingScore::Marks(60.0));
        assert_eq!(PassingScore::new(None, None), PassingScore::Percentage(50.0));
    }

    #[test]
    fn explicit_unit_wins_over_magnitude() {
        let p = PassingScore::new(Some(60.0), Some(PassingScoreUnit::Percentage));
        assert_eq!(p.resolve(50), 60.0);

        let m = PassingScore::new(Some(15.0), Some(PassingScoreUnit::Marks));
        assert_eq!(m.resolve(30), 50.0);
    }

    #[test]
    fn marks_threshold_on_empty_exam_uses_default() {
        assert_eq!(PassingScore::Marks(80.0).resolve(0), 50.0);
    }

    #[test]
    fn percentage_rounds_half_up() {
        assert_eq!(percentage_of(1, 2), 50);
        assert_eq!(percentage_of(1, 3), 33);
        assert_eq!(percentage_of(2, 3), 67);
        assert_eq!(percentage_of(1, 8), 13);
        assert_eq!(percentage_of(12, 30), 40);
        assert_eq!(percentage_of(0, 0), 0);
    }
}
