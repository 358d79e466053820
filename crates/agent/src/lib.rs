//! The Rivet conversation engine.
//!
//! An [`Agent`] owns one session's transcript, the bound provider, the tool
//! set, and the append-only transcript logger, and drives the
//! converse → act → feed-results-back loop one turn at a time.

pub mod engine;
pub mod transcript;

pub use engine::Agent;
pub use transcript::{TranscriptLogger, TranscriptRecord};
