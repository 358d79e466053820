//! ReadFile tool — read file contents, optionally a 1-based line range.

use std::path::PathBuf;

use async_trait::async_trait;
use rivet_core::tool::{Fragment, Tool};
use rivet_core::{TagMatch, TagScanner};
use tracing::debug;

const DOCS: &str = r#"<ReadFile file="path/to/file" /> — read a whole file.
<ReadFile file="path/to/file" start="10" end="25" /> — read lines 10-25 (1-based, inclusive).
The `path` attribute is accepted as an alias for `file`. Omitting `end` reads to the end of the file."#;

pub struct ReadFileTool {
    base_dir: PathBuf,
    scanner: TagScanner,
}

impl ReadFileTool {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            scanner: TagScanner::new("ReadFile"),
        }
    }

    async fn read_one(&self, m: &TagMatch) -> (String, String) {
        let Some(path) = m.attr_any(&["file", "path"]) else {
            return (
                "(Missing 'file' attribute)".into(),
                "❌ ReadFile (missing 'file' attribute)".into(),
            );
        };

        let resolved = crate::resolve(&self.base_dir, path);
        debug!(path = %resolved.display(), "ReadFile");

        if resolved.is_dir() {
            return (
                format!("=== File: {path} ===\n(Path is a directory)"),
                format!("❌ {path} (Path is a directory)"),
            );
        }

        let content = match tokio::fs::read_to_string(&resolved).await {
            Ok(c) => c,
            Err(_) => {
                return (
                    format!("=== File: {path} ===\n(File not found)"),
                    format!("❌ {path} (File not found)"),
                );
            }
        };

        let start = m.attr("start").and_then(|s| s.parse::<usize>().ok());
        let end = m.attr("end").and_then(|s| s.parse::<usize>().ok());

        if start.is_none() && end.is_none() {
            return (
                format!("=== File: {path} ===\n{content}"),
                format!("📄 READ {path}"),
            );
        }

        // Sliced read: a missing start means line 1, a missing end means
        // EOF, and an end beyond EOF is clamped to it.
        let lines: Vec<&str> = content.lines().collect();
        let s = start.unwrap_or(1);
        if s < 1 || s > lines.len() {
            return (
                format!("=== File: {path} ===\n(Invalid range: start {s} is outside the file)"),
                format!("❌ {path} (invalid range)"),
            );
        }
        let e = end.unwrap_or(lines.len()).min(lines.len());
        if e < s {
            return (
                format!("=== File: {path} ===\n(Invalid range: end {e} before start {s})"),
                format!("❌ {path} (invalid range)"),
            );
        }
        let slice = lines[s - 1..e].join("\n");
        (
            format!("=== File: {path} (lines {s}-{e}) ===\n{slice}"),
            format!("📄 READ {path}"),
        )
    }
}

#[async_trait]
impl Tool for ReadFileTool {
    fn name(&self) -> &str {
        "ReadFile"
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
            let (detail, summary) = self.read_one(m).await;
            details.push(detail);
            summaries.push(summary);
        }

        Some(Fragment {
            detail: details.join("\n\n"),
            summary: summaries.join("\n"),
        })
    }
}
