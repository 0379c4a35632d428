//! Test helpers and builder patterns for tuner tests
//!
//! The builder wires mocks with permissive defaults for the collaborators a
//! test does not care about.

use std::path::PathBuf;

use oracles::{MockCaseAnalyzer, MockPredictor, MockPromptGenerator};
use tuner::traits::{MockArtifactStore, MockRunReporter};
use tuner::{PromptTuner, TunerConfig};

pub type TestTuner = PromptTuner<MockPredictor, MockPromptGenerator, MockCaseAnalyzer, MockArtifactStore, MockRunReporter>;

/// Builder pattern for creating test tuners with sensible defaults
pub struct TunerBuilder {
    predictor: MockPredictor,
    generator: MockPromptGenerator,
    analyzer: MockCaseAnalyzer,
    artifacts: MockArtifactStore,
    reporter: MockRunReporter,
    config: TunerConfig,
}

impl TunerBuilder {
    pub fn new() -> Self {
        let mut analyzer = MockCaseAnalyzer::new();
        analyzer
            .expect_analyze()
            .returning(|request| Ok(format!("漏诊 {}", request.report.missed)));

        Self {
            predictor: MockPredictor::new(),
            generator: MockPromptGenerator::new(),
            analyzer,
            artifacts: TestHelpers::accepting_artifacts(),
            reporter: TestHelpers::quiet_reporter(),
            config: TestHelpers::test_config(),
        }
    }

    pub fn with_predictor<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockPredictor),
    {
        setup(&mut self.predictor);
        self
    }

    pub fn with_generator<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockPromptGenerator),
    {
        setup(&mut self.generator);
        self
    }

    /// Replace the default analyzer
    pub fn with_analyzer<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockCaseAnalyzer),
    {
        let mut analyzer = MockCaseAnalyzer::new();
        setup(&mut analyzer);
        self.analyzer = analyzer;
        self
    }

    /// Replace the default artifact store
    pub fn with_artifacts<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockArtifactStore),
    {
        let mut artifacts = MockArtifactStore::new();
        setup(&mut artifacts);
        self.artifacts = artifacts;
        self
    }

    pub fn with_config<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut TunerConfig),
    {
        setup(&mut self.config);
        self
    }

    pub fn build(self) -> TestTuner {
        PromptTuner::new(
            self.predictor,
            self.generator,
            self.analyzer,
            self.artifacts,
            self.reporter,
            self.config,
        )
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    pub fn test_config() -> TunerConfig {
        TunerConfig {
            concurrency: 2,
            results_dir: PathBuf::from("unused-results"),
            logs_dir: PathBuf::from("unused-logs"),
            ..TunerConfig::default()
        }
    }

    /// Artifact store that accepts every write
    pub fn accepting_artifacts() -> MockArtifactStore {
        let mut artifacts = MockArtifactStore::new();
        artifacts
            .expect_save_best_prompt_snapshot()
            .returning(|round, _| Ok(PathBuf::from(format!("best_prompt_{round}.txt"))));
        artifacts
            .expect_save_round_results()
            .returning(|record, _| Ok(PathBuf::from(format!("iteration_{}_results.json", record.index))));
        artifacts
            .expect_save_final_prompt()
            .returning(|_| Ok(PathBuf::from("best_prompt.txt")));
        artifacts
            .expect_save_report()
            .returning(|_| Ok(PathBuf::from("optimization_report.json")));
        artifacts
    }

    /// Reporter that accepts every event
    pub fn quiet_reporter() -> MockRunReporter {
        let mut reporter = MockRunReporter::new();
        reporter.expect_run_started().return_const(());
        reporter.expect_round_started().return_const(());
        reporter.expect_candidate_rejected().return_const(());
        reporter.expect_prompt_selected().return_const(());
        reporter.expect_case_scored().return_const(());
        reporter.expect_case_skipped().return_const(());
        reporter.expect_prediction_failed().return_const(());
        reporter.expect_analysis_failed().return_const(());
        reporter.expect_round_completed().return_const(());
        reporter.expect_improvement().return_const(());
        reporter.expect_sampling_adjusted().return_const(());
        reporter.expect_artifact_failed().return_const(());
        reporter.expect_terminated().return_const(());
        reporter
    }
}
