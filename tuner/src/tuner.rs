//! Prompt tuning control loop
//!
//! Each round asks the optimizer for a candidate, validates it against the
//! run's template skeleton, evaluates the resulting prompt on a prefix of the
//! case set and decides whether to keep it and whether to stop.

use chrono::Utc;
use futures_util::stream::{self, StreamExt};

use oracles::{CaseAnalyzer, PromptGenerator, Predictor};
use shared::{
    logging, AnalysisRequest, CandidateStatus, Case, CaseId, CaseResult, GenerationRequest, IterationRecord,
    LabelSet, RoundSummary,
};

use crate::config::TunerConfig;
use crate::core::parser::extract_labels;
use crate::core::scoring::{differences, mean, overlap};
use crate::core::{LoopPhase, OptimizationState, PromptTemplate, TerminationCause};
use crate::error::{TunerError, TunerResult};
use crate::traits::{ArtifactStore, RunReporter};
use crate::types::{OptimizationReport, TuningOutcome};

/// Stored in place of the analyzer's explanation when it cannot be obtained
pub const ANALYSIS_UNAVAILABLE: &str = "analysis unavailable";

enum CaseOutcome {
    Scored(CaseResult),
    Skipped(CaseId),
}

struct RoundEvaluation {
    results: Vec<CaseResult>,
    skipped: Vec<CaseId>,
}

/// Greedy prompt tuner with injected oracles and collaborators
pub struct PromptTuner<P, G, A, S, R>
where
    P: Predictor,
    G: PromptGenerator,
    A: CaseAnalyzer,
    S: ArtifactStore,
    R: RunReporter,
{
    predictor: P,
    generator: G,
    analyzer: A,
    artifacts: S,
    reporter: R,
    config: TunerConfig,
}

impl<P, G, A, S, R> PromptTuner<P, G, A, S, R>
where
    P: Predictor,
    G: PromptGenerator,
    A: CaseAnalyzer,
    S: ArtifactStore,
    R: RunReporter,
{
    pub fn new(predictor: P, generator: G, analyzer: A, artifacts: S, reporter: R, config: TunerConfig) -> Self {
        Self {
            predictor,
            generator,
            analyzer,
            artifacts,
            reporter,
            config,
        }
    }

    pub fn config(&self) -> &TunerConfig {
        &self.config
    }

    /// Run rounds until a termination condition holds
    ///
    /// Only initialization problems are returned as errors; every failure
    /// inside a round falls back and is reported.
    pub async fn run(&self, initial_prompt: &str, cases: &[Case]) -> TunerResult<TuningOutcome> {
        self.config.validate()?;
        let skeleton = PromptTemplate::parse(initial_prompt)
            .map_err(|e| TunerError::fatal(format!("initial template is invalid: {e}")))?;
        if cases.is_empty() {
            return Err(TunerError::fatal("no valid cases to evaluate"));
        }

        let max_rounds = self.config.max_rounds;
        let mut state = OptimizationState::new(skeleton.render(), cases.len(), self.config.base_sample_size);
        self.reporter.run_started(cases.len(), max_rounds);

        let cause = loop {
            let round = state.begin_round();
            self.reporter
                .round_started(round, max_rounds, state.best_score(), state.sample_size());

            let prompt_before = state.best_prompt().to_string();
            let (prompt, candidate) = self.generate_candidate(&skeleton, &state, round).await;
            if !candidate.is_accepted() {
                self.reporter.candidate_rejected(round, &candidate);
            }
            self.reporter.prompt_selected(round, &prompt_before, &prompt);

            state.enter(LoopPhase::Evaluating);
            let sample = &cases[..state.sample_size()];
            let evaluation = self.evaluate(round, &prompt, sample).await;

            state.enter(LoopPhase::Deciding);
            let record = build_record(round, prompt_before, prompt, candidate, sample.len(), evaluation);
            let previous_best = state.best_score();
            let improved = state.record_round(record);

            if improved {
                self.reporter.improvement(round, previous_best, state.best_score());
                let saved = self.artifacts.save_best_prompt_snapshot(round, state.best_prompt()).await;
                self.report_artifact("best prompt snapshot", saved);
            }

            let progress = state.history().progress(self.config.stagnation_epsilon);
            if let Some(latest) = state.history().latest() {
                let saved = self.artifacts.save_round_results(latest, state.best_score()).await;
                self.report_artifact("round results", saved);
                self.reporter.round_completed(latest, &progress);
            }

            let sample_before = state.sample_size();
            state.adapt_sampling(progress.status);
            if state.sample_size() != sample_before {
                self.reporter
                    .sampling_adjusted(state.sample_size(), state.stagnating_streak());
            }

            if let Some(cause) = state.termination(&self.config) {
                break cause;
            }
        };

        state.enter(LoopPhase::Terminated);
        Ok(self.finish(state, cause).await)
    }

    async fn generate_candidate(
        &self,
        skeleton: &PromptTemplate,
        state: &OptimizationState,
        round: u32,
    ) -> (String, CandidateStatus) {
        let current = state.best_prompt().to_string();
        let request = GenerationRequest {
            current_prompt: current.clone(),
            round,
            feedback: if round > 1 { state.history().feedback_bundle() } else { None },
        };

        match self.generator.generate(&request).await {
            Ok(text) => match PromptTemplate::parse(&text) {
                Ok(candidate) => (skeleton.splice(&candidate).render(), CandidateStatus::Accepted),
                Err(violation) => (
                    current,
                    CandidateStatus::Rejected {
                        reason: violation.to_string(),
                    },
                ),
            },
            Err(e) => (
                current,
                CandidateStatus::GenerationFailed {
                    reason: TunerError::from(e).to_string(),
                },
            ),
        }
    }

    /// Evaluate `sample` concurrently; results keep case order
    async fn evaluate(&self, round: u32, prompt: &str, sample: &[Case]) -> RoundEvaluation {
        let outcomes: Vec<CaseOutcome> = stream::iter(sample)
            .map(move |case| self.evaluate_case(round, prompt, case))
            .buffered(self.config.concurrency)
            .collect()
            .await;

        let mut evaluation = RoundEvaluation {
            results: Vec::with_capacity(outcomes.len()),
            skipped: Vec::new(),
        };
        for outcome in outcomes {
            match outcome {
                CaseOutcome::Scored(result) => evaluation.results.push(result),
                CaseOutcome::Skipped(id) => evaluation.skipped.push(id),
            }
        }
        evaluation
    }

    async fn evaluate_case(&self, round: u32, prompt: &str, case: &Case) -> CaseOutcome {
        if case.input.is_null() {
            let violation = TunerError::integrity(&case.id, "input payload is missing");
            self.reporter.case_skipped(round, &case.id, &violation.to_string());
            return CaseOutcome::Skipped(case.id.clone());
        }

        let predicted = self.predict_labels(round, prompt, case).await;
        let scored = overlap(&predicted, &case.ground_truth);
        let report = differences(&predicted, &case.ground_truth);

        let request = AnalysisRequest {
            input: case.input.clone(),
            predicted: predicted.clone(),
            truth: case.ground_truth.clone(),
            report: report.clone(),
        };
        let analysis = match self.analyzer.analyze(&request).await {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                let error = TunerError::MalformedResponse {
                    reason: "analyzer returned empty text".to_string(),
                };
                self.reporter.analysis_failed(round, &case.id, &error);
                ANALYSIS_UNAVAILABLE.to_string()
            }
            Err(e) => {
                self.reporter.analysis_failed(round, &case.id, &TunerError::from(e));
                ANALYSIS_UNAVAILABLE.to_string()
            }
        };

        let result = CaseResult {
            case_id: case.id.clone(),
            predicted,
            truth: case.ground_truth.clone(),
            report,
            overlap_score: scored.score,
            analysis,
        };
        self.reporter.case_scored(round, &result);
        CaseOutcome::Scored(result)
    }

    /// Ask the predictor until it yields labels; empty on exhaustion or service failure
    async fn predict_labels(&self, round: u32, prompt: &str, case: &Case) -> Vec<String> {
        for attempt in 1..=self.config.prediction_attempts {
            let response = match self.predictor.predict(prompt, &case.input).await {
                Ok(response) => response,
                Err(e) => {
                    // Transport retries are already spent
                    self.reporter
                        .prediction_failed(round, &case.id, attempt, &TunerError::from(e));
                    return Vec::new();
                }
            };

            let error = match extract_labels(&response) {
                Ok(labels) if !labels.is_empty() => return labels,
                Ok(_) => TunerError::MalformedResponse {
                    reason: "predictor returned no diseases".to_string(),
                },
                Err(failure) => TunerError::MalformedResponse {
                    reason: failure.to_string(),
                },
            };
            self.reporter.prediction_failed(round, &case.id, attempt, &error);
        }
        Vec::new()
    }

    fn report_artifact<T>(&self, artifact: &str, saved: TunerResult<T>) {
        if let Err(e) = saved {
            self.reporter.artifact_failed(artifact, &e);
        }
    }

    async fn finish(&self, state: OptimizationState, cause: TerminationCause) -> TuningOutcome {
        let progress = state.history().progress(self.config.stagnation_epsilon);
        let report = OptimizationReport {
            total_rounds: state.round(),
            best_score: state.best_score(),
            best_round: state.best_round(),
            termination_cause: cause,
            progress: progress.clone(),
            timestamp: logging::file_timestamp(),
        };

        let saved = self.artifacts.save_final_prompt(state.best_prompt()).await;
        self.report_artifact("final prompt", saved);
        let saved = self.artifacts.save_report(&report).await;
        self.report_artifact("optimization report", saved);

        self.reporter.terminated(cause, state.round(), state.best_score());

        TuningOutcome {
            best_prompt: state.best_prompt().to_string(),
            best_score: state.best_score(),
            best_round: state.best_round(),
            termination_cause: cause,
            progress,
            phase: state.phase(),
            history: state.into_history(),
        }
    }
}

fn build_record(
    round: u32,
    prompt_before: String,
    prompt_after: String,
    candidate: CandidateStatus,
    total_cases: usize,
    evaluation: RoundEvaluation,
) -> IterationRecord {
    let scores: Vec<f64> = evaluation.results.iter().map(|r| r.overlap_score).collect();

    let mut common_missed = LabelSet::new();
    let mut common_wrong = LabelSet::new();
    for result in &evaluation.results {
        common_missed.extend_from(&result.report.missed);
        common_wrong.extend_from(&result.report.wrong);
    }

    IterationRecord {
        index: round,
        prompt_before,
        prompt_after,
        candidate,
        aggregate_overlap_score: mean(&scores),
        summary: RoundSummary {
            total_cases,
            common_missed,
            common_wrong,
        },
        per_case: evaluation.results,
        skipped_cases: evaluation.skipped,
        completed_at: Utc::now(),
    }
}
