//! Optimization progress classification over the recall trend

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of the per-round mean recall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    /// No round has completed yet
    NotStarted,
    Improving,
    Stagnating,
    Unstable,
}

impl ProgressStatus {
    pub fn message(&self) -> &'static str {
        match self {
            ProgressStatus::NotStarted => "optimization has not started",
            ProgressStatus::Improving => "recall is still improving",
            ProgressStatus::Stagnating => "recall has levelled off",
            ProgressStatus::Unstable => "recall is unstable, strategy may need adjusting",
        }
    }
}

impl fmt::Display for ProgressStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProgressStatus::NotStarted => "not_started",
            ProgressStatus::Improving => "improving",
            ProgressStatus::Stagnating => "stagnating",
            ProgressStatus::Unstable => "unstable",
        };
        f.write_str(name)
    }
}

/// Classify a trend of per-round mean recall values
///
/// Improving when the last point beats the one before it; otherwise
/// stagnating when there are at least three points and both of the last two
/// deltas are smaller than `epsilon` in magnitude; otherwise unstable.
pub fn classify(trend: &[f64], epsilon: f64) -> ProgressStatus {
    let n = trend.len();
    if n == 0 {
        return ProgressStatus::NotStarted;
    }

    if n >= 2 && trend[n - 1] > trend[n - 2] {
        return ProgressStatus::Improving;
    }

    let flat = |i: usize| (trend[i] - trend[i - 1]).abs() < epsilon;
    if n >= 3 && flat(n - 1) && flat(n - 2) {
        return ProgressStatus::Stagnating;
    }

    ProgressStatus::Unstable
}

/// Snapshot of progress derived from the full history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub status: ProgressStatus,
    pub message: String,
    /// 1-based round with the highest mean recall; 0 if no round beat 0.0
    pub best_round: u32,
    pub best_recall: f64,
    pub recall_trend: Vec<f64>,
}

impl ProgressReport {
    pub fn from_trend(trend: Vec<f64>, epsilon: f64) -> Self {
        let status = classify(&trend, epsilon);

        let mut best_round = 0;
        let mut best_recall = 0.0;
        for (i, recall) in trend.iter().enumerate() {
            if *recall > best_recall {
                best_recall = *recall;
                best_round = i as u32 + 1;
            }
        }

        Self {
            status,
            message: status.message().to_string(),
            best_round,
            best_recall,
            recall_trend: trend,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 0.01;

    #[test]
    fn test_flat_trend_is_stagnating() {
        assert_eq!(classify(&[0.5, 0.5, 0.5], EPS), ProgressStatus::Stagnating);
        assert_eq!(classify(&[0.1, 0.5, 0.505, 0.5], EPS), ProgressStatus::Stagnating);
    }

    #[test]
    fn test_rising_trend_is_improving() {
        assert_eq!(classify(&[0.3, 0.5], EPS), ProgressStatus::Improving);
        // Any strict rise counts, even inside the flat band
        assert_eq!(classify(&[0.5, 0.5, 0.505], EPS), ProgressStatus::Improving);
    }

    #[test]
    fn test_falling_trend_is_unstable() {
        assert_eq!(classify(&[0.9, 0.2], EPS), ProgressStatus::Unstable);
        assert_eq!(classify(&[0.5, 0.5], EPS), ProgressStatus::Unstable);
        assert_eq!(classify(&[0.4], EPS), ProgressStatus::Unstable);
    }

    #[test]
    fn test_only_last_two_deltas_matter() {
        assert_eq!(classify(&[0.9, 0.5, 0.5], EPS), ProgressStatus::Unstable);
        assert_eq!(classify(&[0.9, 0.3, 0.3, 0.3], EPS), ProgressStatus::Stagnating);
    }

    #[test]
    fn test_empty_trend_not_started() {
        let report = ProgressReport::from_trend(vec![], EPS);
        assert_eq!(report.status, ProgressStatus::NotStarted);
        assert_eq!(report.best_round, 0);
        assert_eq!(report.best_recall, 0.0);
    }

    #[test]
    fn test_report_picks_first_best_round() {
        let report = ProgressReport::from_trend(vec![0.2, 0.6, 0.6, 0.4], EPS);
        assert_eq!(report.best_round, 2);
        assert_eq!(report.best_recall, 0.6);
        assert_eq!(report.status, ProgressStatus::Unstable);
    }
}
