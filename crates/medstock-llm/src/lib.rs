//! LLM-backed substitute suggestions for medications.
//!
//! This crate asks an OpenAI-compatible chat completion service for
//! alternative medication names and turns the free-text reply into an
//! ordered candidate list. Transient service failures can be absorbed with a
//! configured fallback list; those results are tagged
//! [`SuggestionSource::Fallback`] so callers never confuse them with a real
//! reply.

pub mod config;
pub mod prompts;
pub mod suggester;
pub mod suggestion;
pub mod transport;

pub use config::*;
pub use prompts::*;
pub use suggester::*;
pub use suggestion::*;
pub use transport::*;
