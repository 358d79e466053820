//! Tag-driven tool implementations.
//!
//! Five tools cover the agent's capabilities: ReadFile, ListDir, EditFile,
//! FetchUrl, RunCommand. Each scans the full text of an assistant turn for
//! its own tag and executes every occurrence. The `ToolSet` runs them all
//! in a fixed registration order and concatenates the results.

pub mod edit_file;
pub mod fetch_url;
pub mod list_dir;
pub mod read_file;
pub mod run_command;

use std::path::PathBuf;

use rivet_core::{Tool, TurnResult};

pub use edit_file::EditFileTool;
pub use fetch_url::FetchUrlTool;
pub use list_dir::ListDirTool;
pub use read_file::ReadFileTool;
pub use run_command::RunCommandTool;

/// The registered tools of one agent, in dispatch order.
pub struct ToolSet {
    tools: Vec<Box<dyn Tool>>,
}

impl ToolSet {
    /// The standard five-tool set, dispatched in this order: ReadFile,
    /// ListDir, EditFile, FetchUrl, RunCommand. All filesystem paths and
    /// commands resolve against `base_dir`.
    pub fn standard(base_dir: PathBuf) -> Self {
        Self {
            tools: vec![
                Box::new(ReadFileTool::new(base_dir.clone())),
                Box::new(ListDirTool::new(base_dir.clone())),
                Box::new(EditFileTool::new(base_dir.clone())),
                Box::new(FetchUrlTool::new()),
                Box::new(RunCommandTool::new(base_dir)),
            ],
        }
    }

    /// A custom tool set, dispatched in the order given.
    pub fn from_tools(tools: Vec<Box<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Run every tool over the same turn text and concatenate the non-empty
    /// fragments in registration order — not in the textual order the tags
    /// appear. `None` means no tool recognized anything.
    pub async fn dispatch(&self, turn_text: &str) -> Option<TurnResult> {
        let mut fragments = Vec::new();
        for tool in &self.tools {
            if let Some(fragment) = tool.process(turn_text).await {
                fragments.push(fragment);
            }
        }
        TurnResult::join(fragments)
    }

    /// Concatenated usage documentation for the system prompt, in
    /// registration order.
    pub fn docs(&self) -> String {
        self.tools
            .iter()
            .map(|t| t.docs())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Resolve a tag-supplied path against the tool's base directory. An
/// absolute attribute wins outright; traversal components are honored
/// as-is.
pub(crate) fn resolve(base_dir: &std::path::Path, path: &str) -> PathBuf {
    base_dir.join(path)
}
