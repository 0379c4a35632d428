//! Shared types for the diagnosis prompt tuner
//!
//! Contains the data model exchanged between the tuning loop and the
//! text-generation oracles, the label normalizer, and logging setup.

pub mod errors;
pub mod labels;
pub mod logging;
pub mod sections;
pub mod types;

pub use errors::*;
pub use labels::{normalize, LabelSet};
pub use sections::SectionKind;
pub use types::*;
