//! Cross-backend agreement checks and timing.
mod harness;

pub use harness::*;
