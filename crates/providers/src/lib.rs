//! LLM provider adapters.
//!
//! Two wire shapes are supported:
//! - OpenAI-style chat completions (`/chat/completions`, Bearer auth,
//!   system messages inline)
//! - Anthropic Messages API (`/v1/messages`, `x-api-key` auth, system
//!   prompt as a top-level field)
//!
//! Model selection uses a single `provider/model-name` string, e.g.
//! `anthropic/claude-sonnet-4-20250514` or `openai/gpt-4o`. The prefix
//! picks the adapter; the remainder goes to the API verbatim.

pub mod anthropic;
pub mod openai;

use std::sync::Arc;

use rivet_core::{Error, Provider, Result};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

/// A parsed `provider/model-name` selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub provider: ProviderKind,
    /// The bare model name, sent to the API as-is.
    pub model: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
        }
    }
}

impl ModelSpec {
    /// Parse a `provider/model-name` string. The provider prefix is matched
    /// case-insensitively; the model name is preserved verbatim (it may
    /// itself contain slashes).
    pub fn parse(s: &str) -> Result<Self> {
        let (prefix, model) = s.split_once('/').ok_or_else(|| {
            Error::config(format!(
                "Invalid model format: '{s}'. Expected 'provider/model-name'"
            ))
        })?;

        if model.is_empty() {
            return Err(Error::config(format!(
                "Invalid model format: '{s}'. Model name is empty"
            )));
        }

        let provider = match prefix.to_ascii_lowercase().as_str() {
            "openai" => ProviderKind::OpenAi,
            "anthropic" => ProviderKind::Anthropic,
            other => {
                return Err(Error::config(format!(
                    "Unknown provider: '{other}'. Supported: openai, anthropic"
                )))
            }
        };

        Ok(Self {
            provider,
            model: model.to_string(),
        })
    }
}

/// Parse a model selector and bind the matching provider adapter, reading
/// the API key from the environment (`OPENAI_API_KEY` / `ANTHROPIC_API_KEY`).
///
/// Returns the bound provider and the bare model name to send on requests.
pub fn bind(model: &str) -> Result<(Arc<dyn Provider>, String)> {
    let spec = ModelSpec::parse(model)?;

    let provider: Arc<dyn Provider> = match spec.provider {
        ProviderKind::OpenAi => {
            let key = require_env("OPENAI_API_KEY")?;
            Arc::new(OpenAiProvider::new(key))
        }
        ProviderKind::Anthropic => {
            let key = require_env("ANTHROPIC_API_KEY")?;
            Arc::new(AnthropicProvider::new(key))
        }
    };

    Ok((provider, spec.model))
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| Error::config(format!("Missing required environment variable: {name}")))
}
