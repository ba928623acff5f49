//! Logging utilities with colored module prefixes.
//!
//! Provides the `log!` macro for formatted terminal output. Each message
//! carries a `[module]` prefix colored by a stable hash of the module name,
//! so all messages from one pipeline stage share a color.
//!
//! # Example
//!
//! ```ignore
//! log!("scan"; "found {} content files", count);
//! log!("meta"; "extractor {} failed on {}: {}", name, path, err);
//! ```

use colored::{ColoredString, Colorize};
use std::io::{Write, stdout};

/// Color palette for module prefixes.
const PALETTE: &[fn(&str) -> ColoredString] = &[
    |s| s.yellow(),
    |s| s.green(),
    |s| s.cyan(),
    |s| s.magenta(),
    |s| s.blue(),
    |s| s.bright_yellow(),
    |s| s.bright_green(),
    |s| s.bright_cyan(),
];

/// Log a message with a colored module prefix.
///
/// # Usage
/// ```ignore
/// log!("module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Pick a stable color for a module name.
fn colorize_prefix(module: &str) -> ColoredString {
    let hash: usize = module.bytes().map(usize::from).sum();
    PALETTE[hash % PALETTE.len()](module)
}

/// Write a prefixed log line to stdout.
///
/// Multi-line messages are indented under a single prefix.
pub fn log(module: &str, message: &str) {
    let prefix = colorize_prefix(module);
    let mut out = stdout().lock();
    for (i, line) in message.lines().enumerate() {
        if i == 0 {
            writeln!(out, "[{prefix}] {line}").ok();
        } else {
            writeln!(out, "{:width$} {line}", "", width = module.len() + 2).ok();
        }
    }
    out.flush().ok();
}
