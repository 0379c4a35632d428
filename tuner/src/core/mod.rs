//! Core tuning logic: scoring, parsing, templates and loop state

pub mod history;
pub mod parser;
pub mod progress;
pub mod scoring;
pub mod state;
pub mod template;

pub use history::History;
pub use parser::{extract_labels, parse_labels, ParseFailure};
pub use progress::{classify, ProgressReport, ProgressStatus};
pub use scoring::{differences, overlap, OverlapResult};
pub use state::{LoopPhase, OptimizationState, TerminationCause};
pub use template::{PromptTemplate, DEFAULT_TEMPLATE};
