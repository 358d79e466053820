//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world: read and
//! edit files, list directories, fetch URLs, run shell commands. Unlike
//! structured function-calling protocols, a Rivet tool consumes the *whole*
//! raw text of an assistant turn and scans it for its own tag.

use async_trait::async_trait;

/// The detail+summary pair produced by one tool for one turn.
///
/// `detail` is the block fed back to the model; `summary` is the one-line
/// digest shown to the operator. A tool that matched several tags in the
/// same turn aggregates all of them into a single fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub detail: String,
    pub summary: String,
}

/// The concatenation of all fragments produced in one turn.
///
/// Detail blocks are joined by a blank line, summaries by a newline, in
/// tool registration order — not in the textual order of the tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnResult {
    pub detail: String,
    pub summary: String,
}

impl TurnResult {
    /// Join fragments in the order given. Returns `None` for an empty set.
    pub fn join(fragments: Vec<Fragment>) -> Option<Self> {
        if fragments.is_empty() {
            return None;
        }
        let detail = fragments
            .iter()
            .map(|f| f.detail.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        let summary = fragments
            .iter()
            .map(|f| f.summary.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Some(Self { detail, summary })
    }
}

/// The core Tool trait.
///
/// `process` scans the full turn text for this tool's tag and executes every
/// match. Zero matches → `None`. A failure on one match (missing file, bad
/// range, non-zero exit) becomes an error entry in the fragment; it never
/// aborts the remaining matches and never escapes the tool boundary.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tag name this tool answers to (e.g., "ReadFile").
    fn name(&self) -> &str;

    /// Usage documentation rendered into the system prompt's tool block.
    fn docs(&self) -> &str;

    /// Scan `turn_text` and execute all matches of this tool's tag.
    async fn process(&self, turn_text: &str) -> Option<Fragment>;
}
