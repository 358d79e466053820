//! ListDir tool — list directory entries, sorted, directories marked.

use std::path::PathBuf;

use async_trait::async_trait;
use rivet_core::tool::{Fragment, Tool};
use rivet_core::{TagMatch, TagScanner};
use tracing::debug;

const DOCS: &str = r#"<ListDir path="some/dir" /> — list the entries of a directory, sorted by name, with directories suffixed by `/`. Omitting `path` lists the current directory."#;

pub struct ListDirTool {
    base_dir: PathBuf,
    scanner: TagScanner,
}

impl ListDirTool {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            scanner: TagScanner::new("ListDir"),
        }
    }

    async fn list_one(&self, m: &TagMatch) -> (String, String) {
        let path = m.attr("path").unwrap_or(".");
        let resolved = crate::resolve(&self.base_dir, path);
        debug!(path = %resolved.display(), "ListDir");

        if !resolved.exists() {
            return (
                format!("=== Directory: {path}/ ===\n(Directory not found)"),
                format!("❌ {path}/ (Directory not found)"),
            );
        }
        if !resolved.is_dir() {
            return (
                format!("=== Directory: {path}/ ===\n(Path is not a directory)"),
                format!("❌ {path}/ (Path is not a directory)"),
            );
        }

        let mut entries = Vec::new();
        match tokio::fs::read_dir(&resolved).await {
            Ok(mut rd) => {
                while let Ok(Some(entry)) = rd.next_entry().await {
                    let name = entry.file_name().to_string_lossy().to_string();
                    let is_dir = entry
                        .file_type()
                        .await
                        .map(|t| t.is_dir())
                        .unwrap_or(false);
                    entries.push(if is_dir { format!("{name}/") } else { name });
                }
            }
            Err(e) => {
                return (
                    format!("=== Directory: {path}/ ===\n(Failed to list: {e})"),
                    format!("❌ {path}/ (Failed to list)"),
                );
            }
        }
        entries.sort();

        let count = entries.len();
        let listing = if entries.is_empty() {
            "(empty)".to_string()
        } else {
            entries.join("\n")
        };

        (
            format!("=== Directory: {path}/ ===\n{listing}"),
            format!("📁 LISTED {path}/ ({count} items)"),
        )
    }
}

#[async_trait]
impl Tool for ListDirTool {
    fn name(&self) -> &str {
        "ListDir"
    }

    fn docs(&self) -> &str {
        DOCS
    }

    async fn process(&self, turn_text: &str) -> Option<Fragment> {
        let matches: Vec<TagMatch> = self.scanner.scan(turn_text).collect();
        if matches.is_empty() {
            return None;
        }

        let mut details = Vec::new();
        let mut summaries = Vec::new();
        for m in &matches {
            let (detail, summary) = self.list_one(m).await;
            details.push(detail);
            summaries.push(summary);
        }

        Some(Fragment {
            detail: details.join("\n\n"),
            summary: summaries.join("\n"),
        })
    }
}
