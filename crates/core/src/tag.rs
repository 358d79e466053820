//! Best-effort tag scanning over free-form model output.
//!
//! The tool-call protocol embeds pseudo-markup commands in the assistant's
//! prose, e.g. `<ReadFile file="src/main.rs" />` or
//! `<EditFile file="a.txt" start="3" end="5">new text</EditFile>`.
//!
//! This is deliberately *not* a markup parser. Matching is permissive:
//! tag names are case-insensitive, tags may appear anywhere in surrounding
//! prose, sibling tags of different kinds may interleave, and malformed
//! tags (unterminated, missing closing bracket) simply produce no match.
//! Attribute values are taken literally up to the next double quote — no
//! escaping or nested quotes. Tightening any of this would break prompts
//! written against the looser behavior.

use std::collections::HashMap;

use regex::Regex;

/// One occurrence of a tag in a scanned text. Ephemeral: constructed per
/// scan, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMatch {
    /// `key="value"` attribute pairs from the opening tag.
    pub attrs: HashMap<String, String>,

    /// Inner text for paired tags; `None` for self-closing tags.
    pub body: Option<String>,
}

impl TagMatch {
    /// Look up an attribute value.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }

    /// First present attribute out of several aliases (e.g. `file`/`path`).
    pub fn attr_any(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|k| self.attr(k))
    }
}

/// A compiled scanner for one tag name. Build once, scan many times.
#[derive(Debug)]
pub struct TagScanner {
    tag: Regex,
    attr: Regex,
}

impl TagScanner {
    /// Compile a scanner recognizing both `<Name .../>` and
    /// `<Name ...>body</Name>` for the given tag name, case-insensitively.
    pub fn new(name: &str) -> Self {
        let escaped = regex::escape(name);
        let pattern = format!(r"(?is)<{escaped}\b([^>]*?)(?:/>|>(.*?)</{escaped}>)");
        Self {
            // Patterns are built from escaped static tag names; they always compile.
            tag: Regex::new(&pattern).expect("invalid tag pattern"),
            attr: Regex::new(r#"(\w+)="([^"]*)""#).expect("invalid attr pattern"),
        }
    }

    /// Lazily yield all matches of this tag in `text`, in order of appearance.
    pub fn scan<'a>(&'a self, text: &'a str) -> impl Iterator<Item = TagMatch> + 'a {
        self.tag.captures_iter(text).map(move |caps| {
            let attrs_str = caps.get(1).map(|m| m.as_str()).unwrap_or("");
            let attrs = self
                .attr
                .captures_iter(attrs_str)
                .map(|a| (a[1].to_string(), a[2].to_string()))
                .collect();
            TagMatch {
                attrs,
                body: caps.get(2).map(|m| m.as_str().to_string()),
            }
        })
    }
}
