//! Set-overlap scoring between predicted and ground-truth labels

use serde::{Deserialize, Serialize};
use shared::{DifferenceReport, LabelSet};

/// Jaccard overlap of two label lists, with the sets that produced it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlapResult {
    pub score: f64,
    pub overlap: LabelSet,
    pub missed: LabelSet,
    pub extra: LabelSet,
}

/// Jaccard overlap after normalization; 0.0 if either side normalizes to empty
pub fn overlap<P, T>(predicted: &[P], truth: &[T]) -> OverlapResult
where
    P: AsRef<str>,
    T: AsRef<str>,
{
    let predicted = LabelSet::from_labels(predicted);
    let truth = LabelSet::from_labels(truth);

    if predicted.is_empty() || truth.is_empty() {
        return OverlapResult {
            score: 0.0,
            overlap: LabelSet::new(),
            missed: truth,
            extra: predicted,
        };
    }

    let shared = predicted.intersection(&truth);
    let union = predicted.union(&truth);

    OverlapResult {
        score: shared.len() as f64 / union.len() as f64,
        missed: truth.difference(&predicted),
        extra: predicted.difference(&truth),
        overlap: shared,
    }
}

/// Missed / wrong / correct sets with recall and precision
pub fn differences<P, T>(predicted: &[P], truth: &[T]) -> DifferenceReport
where
    P: AsRef<str>,
    T: AsRef<str>,
{
    let predicted = LabelSet::from_labels(predicted);
    let truth = LabelSet::from_labels(truth);
    let correct = predicted.intersection(&truth);

    let ratio = |n: usize, d: usize| if d == 0 { 0.0 } else { n as f64 / d as f64 };

    DifferenceReport {
        missed: truth.difference(&predicted),
        wrong: predicted.difference(&truth),
        recall: ratio(correct.len(), truth.len()),
        precision: ratio(correct.len(), predicted.len()),
        correct,
    }
}

/// Arithmetic mean, 0.0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EMPTY: [&str; 0] = [];

    #[test]
    fn test_identical_sets_score_one() {
        let result = overlap(&["肺炎", "Anemia"], &["anemia.", " 肺炎"]);
        assert_eq!(result.score, 1.0);
        assert!(result.missed.is_empty());
        assert!(result.extra.is_empty());
    }

    #[test]
    fn test_overlap_is_symmetric_and_bounded() {
        let cases: [(&[&str], &[&str]); 4] = [
            (&["a", "b"], &["b", "c"]),
            (&["a"], &["a", "b", "c"]),
            (&["x", "y", "z"], &["z"]),
            (&["a", "b"], &["c", "d"]),
        ];
        for (left, right) in cases {
            let forward = overlap(left, right).score;
            let backward = overlap(right, left).score;
            assert_eq!(forward, backward);
            assert!((0.0..=1.0).contains(&forward));
        }
    }

    #[test]
    fn test_overlap_total_over_edge_inputs() {
        let inputs: [&[&str]; 7] = [
            &[],
            &["a"],
            &["a", "a", "A."],
            &["。", " ，", ""],
            &["a", "b", "c"],
            &["肺炎", "Anemia"],
            &["b", "肺炎；"],
        ];
        for left in inputs {
            for right in inputs {
                let forward = overlap(left, right);
                let backward = overlap(right, left);
                assert_eq!(forward.score, backward.score, "{left:?} vs {right:?}");
                assert!((0.0..=1.0).contains(&forward.score));
                assert_eq!(forward.missed, backward.extra);
            }
        }

        // Duplicates collapse, punctuation-only labels vanish
        assert_eq!(overlap(&["a", "a", "A."], &["a"]).score, 1.0);
        assert_eq!(overlap(&["。", " ，"], &["。"]).score, 0.0);
        assert!((overlap(&["b", "肺炎；"], &["肺炎", "Anemia"]).score - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_partial_overlap() {
        let result = overlap(&["a", "b"], &["b", "c"]);
        assert!((result.score - 1.0 / 3.0).abs() < 1e-12);
        assert_eq!(result.overlap.to_vec(), vec!["b"]);
        assert_eq!(result.missed.to_vec(), vec!["c"]);
        assert_eq!(result.extra.to_vec(), vec!["a"]);
    }

    #[test]
    fn test_empty_or_disjoint_scores_zero() {
        assert_eq!(overlap(&EMPTY, &["a"]).score, 0.0);
        assert_eq!(overlap(&["a"], &EMPTY).score, 0.0);
        assert_eq!(overlap(&EMPTY, &EMPTY).score, 0.0);
        assert_eq!(overlap(&["a"], &["b"]).score, 0.0);
        // Labels that normalize to nothing count as empty
        assert_eq!(overlap(&[" 。"], &["a"]).score, 0.0);
    }

    #[test]
    fn test_empty_prediction_reports_all_truth_missed() {
        let result = overlap(&EMPTY, &["a", "b"]);
        assert_eq!(result.missed.len(), 2);
    }

    #[test]
    fn test_differences_recall_and_precision() {
        let report = differences(&["胃炎", "高血压"], &["胃炎", "贫血", "脂肪肝"]);
        assert_eq!(report.correct.to_vec(), vec!["胃炎"]);
        assert_eq!(report.missed.len(), 2);
        assert_eq!(report.wrong.to_vec(), vec!["高血压"]);
        assert!((report.recall - 1.0 / 3.0).abs() < 1e-12);
        assert!((report.precision - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_perfect_iff_equal_sets() {
        let equal = differences(&["A", "b"], &["a", "B."]);
        assert_eq!((equal.recall, equal.precision), (1.0, 1.0));

        let subset = differences(&["a"], &["a", "b"]);
        assert_eq!(subset.precision, 1.0);
        assert!(subset.recall < 1.0);

        let superset = differences(&["a", "b"], &["a"]);
        assert_eq!(superset.recall, 1.0);
        assert!(superset.precision < 1.0);
    }

    #[test]
    fn test_empty_denominators_are_zero() {
        let report = differences(&EMPTY, &EMPTY);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.precision, 0.0);

        let report = differences(&["a"], &EMPTY);
        assert_eq!(report.recall, 0.0);
        assert_eq!(report.precision, 0.0);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[0.5, 1.0]) - 0.75).abs() < 1e-12);
    }
}
