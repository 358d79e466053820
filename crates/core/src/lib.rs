//! # Rivet Core
//!
//! Domain types, traits, and error definitions for the Rivet coding agent.
//! This crate has **zero framework dependencies** — it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The provider and tool subsystems are defined as traits here.
//! Implementations live in their respective crates. This enables:
//! - Swapping implementations via configuration
//! - Easy testing with mock/stub implementations
//! - Clean dependency graph (all crates depend inward on core)

pub mod error;
pub mod message;
pub mod provider;
pub mod tag;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, ProviderError, Result};
pub use message::{Message, Role, SessionId, Transcript};
pub use provider::{Provider, ProviderRequest, StreamChunk};
pub use tag::{TagMatch, TagScanner};
pub use tool::{Fragment, Tool, TurnResult};
