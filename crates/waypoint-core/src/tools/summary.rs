//! Outline summaries of large files.
//!
//! Instead of returning a huge file whole, `workspace_readFile` returns the
//! declarations found in it plus its first and last lines, so the caller can
//! ask for the range it actually needs.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Matches lines that open a declaration in the common languages.
static DECLARATION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:pub(?:\([^)]*\))?\s+)?(?:(?:async|unsafe|abstract|public|private|protected)\s+)*(?:(?:fn|struct|enum|trait|impl|mod|type|class|interface|def|function|func|typedef|namespace)\b|const\s+\w+\s*=\s*(?:async\s*)?\()",
    )
    .ok()
});

/// When a file is summarized and how much the summary carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryLimits {
    /// Files with more lines than this are summarized
    pub max_lines: usize,
    /// Files larger than this many bytes are summarized
    pub max_bytes: usize,
    pub head_lines: usize,
    pub tail_lines: usize,
    pub max_declarations: usize,
}

impl Default for SummaryLimits {
    fn default() -> Self {
        Self {
            max_lines: 500,
            max_bytes: 100_000,
            head_lines: 50,
            tail_lines: 20,
            max_declarations: 80,
        }
    }
}

/// One declaration line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Declaration {
    /// 1-based line number
    pub line: usize,
    pub text: String,
}

/// Outline of a large file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub declarations: Vec<Declaration>,
    pub head: String,
    pub tail: String,
}

impl SummaryLimits {
    pub fn needs_summary(&self, content: &str) -> bool {
        content.len() > self.max_bytes || content.lines().count() > self.max_lines
    }

    pub fn summarize(&self, content: &str) -> FileSummary {
        let lines: Vec<&str> = content.lines().collect();
        let declarations = match DECLARATION.as_ref() {
            Some(re) => lines
                .iter()
                .enumerate()
                .filter(|(_, line)| re.is_match(line))
                .take(self.max_declarations)
                .map(|(i, line)| Declaration {
                    line: i + 1,
                    text: line.trim_end().to_string(),
                })
                .collect(),
            None => Vec::new(),
        };
        let head_end = self.head_lines.min(lines.len());
        let tail_start = lines.len().saturating_sub(self.tail_lines).max(head_end);

        FileSummary {
            declarations,
            head: lines[..head_end].join("\n"),
            tail: lines[tail_start..].join("\n"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rust_file(functions: usize) -> String {
        let mut out = String::from("use std::fmt;\n\n");
        for i in 0..functions {
            out.push_str(&format!("pub fn item_{i}() -> u32 {{\n    {i}\n}}\n"));
        }
        out
    }

    #[test]
    fn test_threshold_by_lines_and_bytes() {
        let limits = SummaryLimits::default();
        assert!(!limits.needs_summary(&"x\n".repeat(500)));
        assert!(limits.needs_summary(&"x\n".repeat(501)));
        assert!(limits.needs_summary(&"x".repeat(100_001)));
    }

    #[test]
    fn test_summary_has_head_tail_and_declarations() {
        let content = rust_file(150);
        let summary = SummaryLimits::default().summarize(&content);

        assert_eq!(summary.head.lines().count(), 50);
        assert_eq!(summary.tail.lines().count(), 20);
        assert!(summary.head.starts_with("use std::fmt;"));
        assert_eq!(summary.declarations.len(), 80);
        assert_eq!(summary.declarations[0].line, 3);
        assert_eq!(summary.declarations[0].text, "pub fn item_0() -> u32 {");
    }

    #[test]
    fn test_declarations_across_languages() {
        let content = "class Foo:\n    def bar(self):\n        pass\nexport async function go() {}\ninterface X {}\nfunc main() {}\nlet x = 1;\n";
        let summary = SummaryLimits::default().summarize(content);
        let lines: Vec<usize> = summary.declarations.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![1, 2, 4, 5, 6]);
    }

    #[test]
    fn test_short_files_do_not_repeat_lines_in_tail() {
        let summary = SummaryLimits::default().summarize("a\nb\nc");
        assert_eq!(summary.head, "a\nb\nc");
        assert_eq!(summary.tail, "");
    }
}
