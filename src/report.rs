//! Human-facing output for a [`Results`] report.
use colored::Colorize;
use thiserror::Error;

use crate::path::Path;
use crate::results::{Results, ValueResult};

/// One failing pair, usable as a standalone error.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("@path '{path}': {}", .value_result.message())]
pub struct ValueResultError {
    pub path: Path,
    pub value_result: ValueResult,
}

impl Results {
    /// Every failing pair, ordered by path.
    pub fn errors(&self) -> Vec<ValueResultError> {
        self.iter_sorted()
            .filter(|(_, vr)| !vr.is_valid())
            .map(|(path, vr)| ValueResultError { path: path.clone(), value_result: vr.clone() })
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub only_failures: bool,
    pub color: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { only_failures: true, color: true }
    }
}

fn display_path(path: &Path) -> String {
    if path.is_root() { "(root)".to_string() } else { path.to_string() }
}

pub fn render(results: &Results, opts: &RenderOptions) -> String {
    let mut out = String::new();
    let mut total = 0usize;
    let mut failed = 0usize;
    for (path, vr) in results.iter_sorted() {
        total += 1;
        if !vr.is_valid() {
            failed += 1;
        } else if opts.only_failures {
            continue;
        }
        let (mark, path) = match (vr.is_valid(), opts.color) {
            (true, true) => ("✔".green().to_string(), display_path(path).dimmed().to_string()),
            (false, true) => ("✘".red().bold().to_string(), display_path(path).bold().to_string()),
            (true, false) => ("✔".to_string(), display_path(path)),
            (false, false) => ("✘".to_string(), display_path(path)),
        };
        out.push_str(&format!("  {mark} {path}: {}\n", vr.message()));
    }

    let summary = if failed == 0 {
        format!("all {total} checks passed")
    } else {
        format!("{failed} of {total} checks failed")
    };
    match (failed == 0, opts.color) {
        (true, true) => out.push_str(&format!("{}\n", summary.green())),
        (false, true) => out.push_str(&format!("{}\n", summary.red())),
        (_, false) => out.push_str(&format!("{summary}\n")),
    }
    out
}

// ------------------------------- Tests ------------------------------------ //
