//! Prompt tuner library for diagnosis-list generation
//!
//! This library runs a greedy hill-climb over the rules section of a
//! sectioned prompt. Every round an optimizer service proposes a candidate,
//! a predictor service is run over a sample of cases, and the results are
//! scored against ground truth to decide whether the candidate is kept.

pub mod config;
pub mod core;
pub mod error;
pub mod services;
pub mod traits;
pub mod tuner;
pub mod types;

// Re-export commonly used types
pub use config::TunerConfig;
pub use core::{LoopPhase, OptimizationState, ProgressReport, ProgressStatus, PromptTemplate, TerminationCause, DEFAULT_TEMPLATE};
pub use error::{TunerError, TunerResult};
pub use traits::{ArtifactStore, RunReporter};
pub use tuner::{PromptTuner, ANALYSIS_UNAVAILABLE};
pub use types::{OptimizationReport, TuningOutcome};
