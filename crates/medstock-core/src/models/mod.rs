//! Domain models for the medstock system.

mod medication;
mod outcome;

pub use medication::*;
pub use outcome::*;
