//! Terminal rendering of the action report.
//!
//! Entries are written as they arrive so a long run shows progress. Headers
//! are flush left; every other line is indented under its header with a
//! one-character marker:
//!
//! | Marker | Category | Style |
//! |--------|----------|-------|
//! | `=`    | info     | dimmed |
//! | `+`    | change   | green |
//! | `!`    | warning  | yellow |

use std::io::{self, Write};

use colored::Colorize;
use tracing::debug;

use reconciler::{Category, Mode, ReportEntry, Reporter, RunSummary};

/// Writes report entries to a terminal (or any writer) as they are recorded.
pub struct TerminalReporter<W> {
    out: W,
    changes: usize,
}

impl TerminalReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, changes: 0 }
    }

    /// Writes the closing line of a run.
    pub fn finish(&mut self, summary: &RunSummary) {
        let line = match summary.mode {
            Mode::DryRun if self.changes == 0 => "nothing to change".to_owned(),
            Mode::DryRun => format!("{} change(s) planned, nothing applied", self.changes),
            Mode::Apply => format!("{} change(s) applied", self.changes),
        };
        self.write_line(&format!("\n{} (run {})", line.bold(), summary.run_id));
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, line: &str) {
        // A closed stdout must not abort a run halfway through its writes.
        if let Err(e) = writeln!(self.out, "{line}") {
            debug!(error = %e, "report output unavailable");
        }
    }
}

impl<W: Write + Send> Reporter for TerminalReporter<W> {
    fn record(&mut self, entry: ReportEntry) {
        if entry.verb.is_some() {
            self.changes += 1;
        }
        self.write_line(&format_entry(&entry));
    }
}

/// Renders one entry with its marker and colour.
pub fn format_entry(entry: &ReportEntry) -> String {
    let text = entry.to_string();
    match entry.category {
        Category::Header => text.bold().to_string(),
        Category::Info => format!("  {} {}", "=".dimmed(), text.dimmed()),
        Category::Change => format!("  {} {}", "+".green(), text.green()),
        Category::Warning => format!("  {} {}", "!".yellow(), text.yellow()),
    }
}
