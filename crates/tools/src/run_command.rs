//! RunCommand tool — execute shell commands with a bounded timeout.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use rivet_core::tool::{Fragment, Tool};
use rivet_core::{TagMatch, TagScanner};
use tokio::process::Command;
use tracing::{debug, warn};

const DOCS: &str = r#"<RunCommand command="cargo test" /> — run a shell command in the working directory and return its output. Commands are killed after 60 seconds. The `cmd` attribute is accepted as an alias for `command`."#;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

pub struct RunCommandTool {
    base_dir: PathBuf,
    scanner: TagScanner,
    timeout: Duration,
}

impl RunCommandTool {
    pub fn new(base_dir: PathBuf) -> Self {
        Self {
            base_dir,
            scanner: TagScanner::new("RunCommand"),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Override the kill timeout. Test hook.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run_one(&self, m: &TagMatch) -> (String, String) {
        let Some(cmd) = m.attr_any(&["command", "cmd"]) else {
            return (
                "(Missing 'command' attribute)".into(),
                "❌ RunCommand (missing 'command' attribute)".into(),
            );
        };

        debug!(command = %cmd, "RunCommand");

        let mut command = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", cmd]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", cmd]);
            c
        };
        command.current_dir(&self.base_dir).kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, command.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return (
                    format!("=== Command: {cmd} ===\n(Failed to run: {e})"),
                    format!("⚡ RUN `{cmd}` [✗]"),
                );
            }
            Err(_) => {
                warn!(command = %cmd, "Command timed out");
                return (
                    format!(
                        "=== Command: {cmd} ===\n(command timed out after {}s)",
                        self.timeout.as_secs()
                    ),
                    format!("⚡ RUN `{cmd}` [✗]"),
                );
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let exit_code = output.status.code().unwrap_or(-1);

        let mut text = stdout.trim_end().to_string();
        if !stderr.trim().is_empty() {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str("[stderr]\n");
            text.push_str(stderr.trim_end());
        }
        if exit_code != 0 {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&format!("[exit code: {exit_code}]"));
        }
        if text.is_empty() {
            text = "(no output)".into();
        }

        let flag = if output.status.success() { "✓" } else { "✗" };
        (
            format!("=== Command: {cmd} ===\n{text}"),
            format!("⚡ RUN `{cmd}` [{flag}]"),
        )
    }
}

#[async_trait]
impl Tool for RunCommandTool {
    fn name(&self) -> &str {
        "RunCommand"
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
            let (detail, summary) = self.run_one(m).await;
            details.push(detail);
            summaries.push(summary);
        }

        Some(Fragment {
            detail: details.join("\n\n"),
            summary: summaries.join("\n"),
        })
    }
}
