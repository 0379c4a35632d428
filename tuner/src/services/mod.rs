//! Tuner service implementations

pub mod artifacts;
pub mod case_store;
pub mod reporter;

#[cfg(test)]
pub mod tests;

pub use artifacts::*;
pub use case_store::*;
pub use reporter::*;
