//! Oracle service implementations

pub mod analyzer;
pub mod chat_client;
pub mod predictor;
pub mod prompt_generator;

#[cfg(test)]
pub mod tests;

pub use analyzer::*;
pub use chat_client::*;
pub use predictor::*;
pub use prompt_generator::*;
