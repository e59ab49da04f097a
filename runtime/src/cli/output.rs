//! Terminal output: colors, per-query headings, field lines, JSON.

use std::io::IsTerminal;

// ANSI color codes
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Colored string builder.
pub struct Styled {
    use_color: bool,
}

impl Styled {
    /// Color when allowed and stdout is a terminal. `NO_COLOR` always wins.
    pub fn new(allow_color: bool) -> Self {
        Self {
            use_color: allow_color
                && std::env::var_os("NO_COLOR").is_none()
                && std::io::stdout().is_terminal(),
        }
    }

    pub fn plain() -> Self {
        Self { use_color: false }
    }

    fn paint(&self, code: &str, s: &str) -> String {
        if self.use_color {
            format!("{code}{s}{RESET}")
        } else {
            s.to_string()
        }
    }

    pub fn red(&self, s: &str) -> String {
        self.paint(RED, s)
    }

    pub fn cyan(&self, s: &str) -> String {
        self.paint(CYAN, s)
    }

    pub fn bold(&self, s: &str) -> String {
        self.paint(BOLD, s)
    }
}

/// `--- Querying: 數 ---`
pub fn format_heading(s: &Styled, input: &str) -> String {
    s.bold(&format!("--- Querying: {input} ---"))
}

/// `key: value`, with continuation lines of multi-line values indented.
pub fn format_field(s: &Styled, key: &str, value: &str) -> String {
    let value = value.replace('\n', "\n    ");
    format!("{}: {value}", s.cyan(key))
}

/// Error line naming the input that failed.
pub fn format_error(s: &Styled, input: &str, message: &str) -> String {
    s.red(&format!("Error querying {input}: {message}"))
}

/// Print JSON output to stdout.
pub fn print_json(value: &serde_json::Value) {
    if let Ok(s) = serde_json::to_string_pretty(value) {
        println!("{s}");
    }
}
