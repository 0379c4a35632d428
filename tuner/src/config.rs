//! Tuning loop configuration

use std::path::PathBuf;

use crate::error::{TunerError, TunerResult};

#[derive(Debug, Clone, PartialEq)]
pub struct TunerConfig {
    /// Hard cap on the number of rounds
    pub max_rounds: u32,
    /// Cases evaluated per round before any stagnation extension
    pub base_sample_size: usize,
    /// Consecutive non-improving rounds that end the run
    pub stagnation_limit: u32,
    /// Recall delta below which two rounds count as flat
    pub stagnation_epsilon: f64,
    /// Cases evaluated concurrently within a round
    pub concurrency: usize,
    /// Predictor calls per case while the parsed label list stays empty
    pub prediction_attempts: u32,
    /// Best prompt snapshots, final prompt and report
    pub results_dir: PathBuf,
    /// Per-round result bundles
    pub logs_dir: PathBuf,
}

impl Default for TunerConfig {
    fn default() -> Self {
        Self {
            max_rounds: 10,
            base_sample_size: 3,
            stagnation_limit: 5,
            stagnation_epsilon: 0.01,
            concurrency: 4,
            prediction_attempts: 3,
            results_dir: PathBuf::from("results"),
            logs_dir: PathBuf::from("logs"),
        }
    }
}

impl TunerConfig {
    pub fn validate(&self) -> TunerResult<()> {
        let positive = [
            ("max_rounds", self.max_rounds as usize),
            ("base_sample_size", self.base_sample_size),
            ("stagnation_limit", self.stagnation_limit as usize),
            ("concurrency", self.concurrency),
            ("prediction_attempts", self.prediction_attempts as usize),
        ];
        if let Some((field, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(TunerError::fatal(format!("{field} must be at least 1")));
        }
        if !(self.stagnation_epsilon.is_finite() && self.stagnation_epsilon > 0.0) {
            return Err(TunerError::fatal("stagnation_epsilon must be a positive number"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = TunerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_rounds, 10);
        assert_eq!(config.base_sample_size, 3);
        assert_eq!(config.stagnation_limit, 5);
    }

    #[test]
    fn test_zero_limits_rejected() {
        let config = TunerConfig {
            concurrency: 0,
            ..TunerConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("concurrency"));

        let config = TunerConfig {
            stagnation_epsilon: 0.0,
            ..TunerConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
