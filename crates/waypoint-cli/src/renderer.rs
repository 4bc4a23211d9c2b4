//! Markdown rendering for the terminal.
//!
//! Core `Display` output is markdown. With color enabled it is laid out by
//! termimad, headers keep their hash marks and outcome lines (`✓`, `✗`,
//! `Success:`, `Error:`) are tinted; with `--no-color` it is printed as is.

use anyhow::Result;
use termimad::{crossterm::style::Color, MadSkin};

const BLUE: &str = "34";
const GREEN: &str = "32";
const RED: &str = "31";

pub struct TerminalRenderer {
    rich_enabled: bool,
    skin: MadSkin,
}

impl TerminalRenderer {
    pub fn new(rich_enabled: bool) -> Self {
        let mut skin = MadSkin::default();
        skin.set_headers_fg(Color::Cyan);
        skin.bold.set_fg(Color::Yellow);
        skin.italic.set_fg(Color::DarkGrey);
        skin.inline_code.set_fg(Color::Green);
        skin.code_block.set_bg(Color::AnsiValue(236));
        Self { rich_enabled, skin }
    }

    pub fn render(&self, markdown: &str) -> Result<()> {
        if !self.rich_enabled {
            print!("{markdown}");
            return Ok(());
        }

        // termimad lays out tables and code fences only when it sees the
        // whole block, so plain lines are buffered between tinted ones
        let mut block = String::new();
        for line in markdown.lines() {
            match line_color(line) {
                Some(code) => {
                    self.flush(&mut block);
                    println!("\x1b[{code}m{line}\x1b[0m");
                }
                None => {
                    block.push_str(line);
                    block.push('\n');
                }
            }
        }
        self.flush(&mut block);
        Ok(())
    }

    fn flush(&self, block: &mut String) {
        if !block.is_empty() {
            self.skin.print_text(block);
            block.clear();
        }
    }
}

impl Default for TerminalRenderer {
    fn default() -> Self {
        Self::new(true)
    }
}

/// ANSI color for lines printed outside termimad.
fn line_color(line: &str) -> Option<&'static str> {
    if line.starts_with('#') {
        Some(BLUE)
    } else if line.starts_with('✓') || line.starts_with("Success:") {
        Some(GREEN)
    } else if line.starts_with('✗') || line.starts_with("Error:") {
        Some(RED)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_renderer_prints_as_is() {
        let renderer = TerminalRenderer::new(false);
        assert!(!renderer.rich_enabled);
        assert!(renderer.render("# Plan\n\n| a | b |\n").is_ok());
        assert!(TerminalRenderer::default().rich_enabled);
    }

    #[test]
    fn test_line_colors() {
        assert_eq!(line_color("## Steps"), Some(BLUE));
        assert_eq!(line_color("✓ Succeeded after 1 attempt(s)"), Some(GREEN));
        assert_eq!(line_color("✗ Failed (blocked): no"), Some(RED));
        assert_eq!(line_color("Error: Checkpoint cp-1 not found"), Some(RED));
        assert_eq!(line_color("| tool | read |"), None);
    }

    #[test]
    fn test_flush_clears_block() {
        let renderer = TerminalRenderer::new(true);
        let mut block = "some text\n".to_string();
        renderer.flush(&mut block);
        assert!(block.is_empty());
    }
}
