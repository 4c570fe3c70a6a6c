//! Core data types shared across contexts.

mod counters;
mod extraction;
mod page;
mod settings;

pub use counters::*;
pub use extraction::*;
pub use page::*;
pub use settings::*;

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
