//! EditFile tool — blind overwrite of a 1-based inclusive line span.
//!
//! The replacement comes from the tag body. Two normalizations apply before
//! splicing: a single leading newline on the body (an artifact of writing
//! the opening tag on its own line) is stripped, and the replacement gets a
//! trailing newline appended if it lacks one. A file that did not end in a
//! newline keeps that property. Any validation failure leaves the file
//! untouched.

use std::path::PathBuf;

use async_trait::async_trait;
use rivet_core::tool::{Fragment, Tool};
use rivet_core::{TagMatch, TagScanner};
use tracing::debug;

const DOCS: &str = r#"<EditFile file="path/to/file" start="3" end="5">
replacement text
</EditFile> — replace lines 3-5 (1-based, inclusive) with the tag body. The span is overwritten blindly; read the file first to know what you are replacing. The `path` attribute is accepted as an alias for `file`."#;

pub struct EditFileTool {
    base_dir: PathBuf,
    scanner: TagScanner,
}

impl EditFileTool {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            scanner: TagScanner::new("EditFile"),
        }
    }

    async fn edit_one(&self, m: &TagMatch) -> (String, String) {
        let Some(path) = m.attr_any(&["file", "path"]) else {
            return (
                "(Missing 'file' attribute)".into(),
                "❌ EditFile (missing 'file' attribute)".into(),
            );
        };

        let fail = |reason: &str| {
            (
                format!("=== Edit: {path} ===\n({reason})"),
                format!("❌ {path} ({reason})"),
            )
        };

        let (Some(start), Some(end)) = (
            m.attr("start").and_then(|s| s.parse::<usize>().ok()),
            m.attr("end").and_then(|s| s.parse::<usize>().ok()),
        ) else {
            return fail("Missing or invalid 'start'/'end' attributes");
        };

        let Some(body) = m.body.as_deref() else {
            return fail("Missing replacement body");
        };

        if start < 1 {
            return fail("Invalid range: start must be at least 1");
        }
        if end < start {
            return fail(&format!("Invalid range: end {end} before start {start}"));
        }

        let resolved = crate::resolve(&self.base_dir, path);
        debug!(path = %resolved.display(), start, end, "EditFile");

        let content = match tokio::fs::read_to_string(&resolved).await {
            Ok(c) => c,
            Err(_) => return fail("File not found"),
        };

        let had_trailing_newline = content.ends_with('\n');
        let mut lines: Vec<String> = content.lines().map(String::from).collect();
        if end > lines.len() {
            return fail(&format!(
                "Invalid range: end {end} beyond end of file ({} lines)",
                lines.len()
            ));
        }

        // Normalize the replacement: drop the leading newline artifact; the
        // trailing newline is implied by line-based splicing (an empty body
        // deletes the span outright).
        let stripped = body.strip_prefix('\n').unwrap_or(body);
        let replacement_lines: Vec<String> = if stripped.is_empty() {
            Vec::new()
        } else {
            stripped.lines().map(String::from).collect()
        };

        lines.splice(start - 1..end, replacement_lines);

        let mut new_content = lines.join("\n");
        if had_trailing_newline {
            new_content.push('\n');
        }

        if let Err(e) = tokio::fs::write(&resolved, &new_content).await {
            return fail(&format!("Failed to write: {e}"));
        }

        (
            format!("=== Edit: {path} ===\nReplaced lines {start}-{end}"),
            format!("✏️ EDITED {path} (lines {start}-{end})"),
        )
    }
}

#[async_trait]
impl Tool for EditFileTool {
    fn name(&self) -> &str {
        "EditFile"
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
            let (detail, summary) = self.edit_one(m).await;
            details.push(detail);
            summaries.push(summary);
        }

        Some(Fragment {
            detail: details.join("\n\n"),
            summary: summaries.join("\n"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(content: &str) -> (tempfile::TempDir, EditFileTool, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("target.txt");
        std::fs::write(&path, content).unwrap();
        let tool = EditFileTool::new(dir.path().to_path_buf());
        (dir, tool, path)
    }

    #[tokio::test]
    async fn replace_middle_span() {
        let (_dir, tool, path) = fixture("one\ntwo\nthree\nfour\n");
        let frag = tool
            .process("<EditFile file=\"target.txt\" start=\"2\" end=\"3\">\nTWO\nTHREE\n</EditFile>")
            .await
            .unwrap();
        assert_eq!(frag.summary, "✏️ EDITED target.txt (lines 2-3)");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "one\nTWO\nTHREE\nfour\n");
    }

    #[tokio::test]
    async fn outside_span_bytes_untouched() {
        let (_dir, tool, path) = fixture("keep1\nreplace\nkeep2\n");
        tool.process("<EditFile file=\"target.txt\" start=\"2\" end=\"2\">\nnew\n</EditFile>")
            .await
            .unwrap();
        let after = std::fs::read_to_string(path).unwrap();
        assert!(after.starts_with("keep1\n"));
        assert!(after.ends_with("keep2\n"));
    }

    #[tokio::test]
    async fn shrinking_and_growing_the_span() {
        let (_dir, tool, path) = fixture("a\nb\nc\n");
        // Replace one line with three
        tool.process("<EditFile file=\"target.txt\" start=\"2\" end=\"2\">\nx\ny\nz\n</EditFile>")
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nx\ny\nz\nc\n");
        // Replace three lines with one
        tool.process("<EditFile file=\"target.txt\" start=\"2\" end=\"4\">\nB\n</EditFile>")
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "a\nB\nc\n");
    }

    #[tokio::test]
    async fn missing_trailing_newline_preserved() {
        let (_dir, tool, path) = fixture("one\ntwo");
        tool.process("<EditFile file=\"target.txt\" start=\"1\" end=\"1\">\nONE\n</EditFile>")
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "ONE\ntwo");
    }

    #[tokio::test]
    async fn body_without_trailing_newline_is_normalized() {
        let (_dir, tool, path) = fixture("a\nb\n");
        tool.process("<EditFile file=\"target.txt\" start=\"1\" end=\"1\">A</EditFile>")
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "A\nb\n");
    }

    #[tokio::test]
    async fn invalid_bounds_mutate_nothing() {
        let original = "a\nb\nc\n";
        let (_dir, tool, path) = fixture(original);

        for tag in [
            "<EditFile file=\"target.txt\" start=\"0\" end=\"1\">\nx\n</EditFile>",
            "<EditFile file=\"target.txt\" start=\"3\" end=\"2\">\nx\n</EditFile>",
            "<EditFile file=\"target.txt\" start=\"1\" end=\"99\">\nx\n</EditFile>",
            "<EditFile file=\"target.txt\" start=\"one\" end=\"2\">\nx\n</EditFile>",
        ] {
            let frag = tool.process(tag).await.unwrap();
            assert!(frag.summary.starts_with("❌"), "expected failure for {tag}");
            assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
        }
    }

    #[tokio::test]
    async fn missing_file_is_error_entry() {
        let dir = tempfile::tempdir().unwrap();
        let tool = EditFileTool::new(dir.path().to_path_buf());
        let frag = tool
            .process("<EditFile file=\"ghost.txt\" start=\"1\" end=\"1\">\nx\n</EditFile>")
            .await
            .unwrap();
        assert!(frag.detail.contains("(File not found)"));
    }

    #[tokio::test]
    async fn self_closing_tag_lacks_body() {
        let (_dir, tool, path) = fixture("a\n");
        let frag = tool
            .process("<EditFile file=\"target.txt\" start=\"1\" end=\"1\" />")
            .await
            .unwrap();
        assert!(frag.detail.contains("Missing replacement body"));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a\n");
    }

    #[tokio::test]
    async fn empty_body_deletes_the_span() {
        let (_dir, tool, path) = fixture("a\nb\nc\n");
        tool.process("<EditFile file=\"target.txt\" start=\"2\" end=\"2\">\n</EditFile>")
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a\nc\n");
    }
}
