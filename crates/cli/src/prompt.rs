//! System prompt template loading and rendering.
//!
//! A `PROMPT.md` in the working directory overrides the embedded default.
//! Three placeholders are substituted: `{{ current_path }}`, `{{ os }}`,
//! and `{{ tools }}` (the concatenated tool usage docs).

use std::path::Path;

const DEFAULT_PROMPT: &str = include_str!("prompt.md");

/// Load the prompt template and render it for this process.
pub fn system_prompt(tools_docs: &str) -> String {
    let template = load_template(Path::new("PROMPT.md"));
    let current_path = std::env::current_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| ".".into());
    render(&template, &current_path, std::env::consts::OS, tools_docs)
}

fn load_template(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_else(|_| DEFAULT_PROMPT.to_string())
}

fn render(template: &str, current_path: &str, os: &str, tools_docs: &str) -> String {
    template
        .replace("{{ current_path }}", current_path)
        .replace("{{ os }}", os)
        .replace("{{ tools }}", tools_docs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_all_placeholders() {
        let rendered = render(
            "at {{ current_path }} on {{ os }}:\n{{ tools }}",
            "/work",
            "linux",
            "TOOL DOCS",
        );
        assert_eq!(rendered, "at /work on linux:\nTOOL DOCS");
    }

    #[test]
    fn default_template_has_all_placeholders() {
        assert!(DEFAULT_PROMPT.contains("{{ current_path }}"));
        assert!(DEFAULT_PROMPT.contains("{{ os }}"));
        assert!(DEFAULT_PROMPT.contains("{{ tools }}"));
    }

    #[test]
    fn file_template_wins_over_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("PROMPT.md");
        std::fs::write(&path, "custom {{ os }}").unwrap();
        assert_eq!(load_template(&path), "custom {{ os }}");
        assert_eq!(load_template(&dir.path().join("missing.md")), DEFAULT_PROMPT);
    }

    #[test]
    fn template_without_placeholders_is_unchanged() {
        assert_eq!(render("plain", "/", "linux", "t"), "plain");
    }
}
