//! The ordered action report produced by every reconciler.
//!
//! Dry-run is not a separate simulation: each mutation point makes the same
//! decision in both modes and records it as a [`ReportEntry`]. The only
//! difference is the tense of the entry's [`Verb`], which [`Mode`] selects.
//! Two runs over the same inputs therefore produce entry sequences that are
//! equal once tense is ignored (see [`ReportEntry::same_action`]).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mode and tense
// ---------------------------------------------------------------------------

/// Whether decisions are only reported or also applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Compute and report; issue no writes.
    DryRun,
    /// Issue the write, then report it in the past tense.
    Apply,
}

impl Mode {
    /// Returns `true` for [`Mode::DryRun`].
    pub fn is_dry_run(self) -> bool {
        self == Mode::DryRun
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::DryRun => write!(f, "dry-run"),
            Mode::Apply => write!(f, "apply"),
        }
    }
}

/// An action verb whose tense follows the [`Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    Create,
    Set,
    Update,
    Invite,
}

impl Verb {
    /// Progressive form in dry-run, past form in apply.
    pub fn conjugate(self, mode: Mode) -> &'static str {
        match (self, mode) {
            (Verb::Create, Mode::DryRun) => "creating",
            (Verb::Create, Mode::Apply) => "created",
            (Verb::Set, Mode::DryRun) => "setting",
            (Verb::Set, Mode::Apply) => "set",
            (Verb::Update, Mode::DryRun) => "updating",
            (Verb::Update, Mode::Apply) => "updated",
            (Verb::Invite, Mode::DryRun) => "inviting",
            (Verb::Invite, Mode::Apply) => "invited",
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// Marker a renderer uses to style a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Section header (`Org`, `Members`, a repository name, ...).
    Header,
    /// No-op or current value.
    Info,
    /// A planned or applied change.
    Change,
    /// Creation, or something an operator should look at.
    Warning,
}

/// One line of the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub category: Category,
    /// Verb and the mode it was conjugated for; `None` for plain lines.
    pub verb: Option<(Verb, Mode)>,
    pub subject: String,
}

impl ReportEntry {
    /// A line without a verb.
    pub fn plain(category: Category, subject: impl Into<String>) -> Self {
        Self {
            category,
            verb: None,
            subject: subject.into(),
        }
    }

    /// A line led by `verb` in the tense of `mode`.
    pub fn action(category: Category, verb: Verb, mode: Mode, subject: impl Into<String>) -> Self {
        Self {
            category,
            verb: Some((verb, mode)),
            subject: subject.into(),
        }
    }

    /// Returns `true` if both entries describe the same decision, ignoring
    /// the tense the verb was rendered in.
    pub fn same_action(&self, other: &ReportEntry) -> bool {
        self.category == other.category
            && self.verb.map(|(v, _)| v) == other.verb.map(|(v, _)| v)
            && self.subject == other.subject
    }
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.verb {
            Some((verb, mode)) => write!(f, "{} {}", verb.conjugate(mode), self.subject),
            None => write!(f, "{}", self.subject),
        }
    }
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receives report entries in the order decisions are made.
pub trait Reporter: Send {
    fn record(&mut self, entry: ReportEntry);

    fn header(&mut self, title: &str) {
        self.record(ReportEntry::plain(Category::Header, title));
    }

    fn info(&mut self, subject: String) {
        self.record(ReportEntry::plain(Category::Info, subject));
    }

    fn warn(&mut self, subject: String) {
        self.record(ReportEntry::plain(Category::Warning, subject));
    }

    fn change(&mut self, verb: Verb, mode: Mode, subject: String) {
        self.record(ReportEntry::action(Category::Change, verb, mode, subject));
    }
}

/// In-memory report, kept in decision order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLog {
    entries: Vec<ReportEntry>,
}

impl ActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Rendered lines, without category markers.
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(ToString::to_string).collect()
    }

    /// Number of entries that describe a change or a creation.
    pub fn change_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.verb.is_some())
            .count()
    }

    /// Returns `true` if `other` records the same decisions in the same order.
    pub fn same_actions(&self, other: &ActionLog) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.same_action(b))
    }
}

impl Reporter for ActionLog {
    fn record(&mut self, entry: ReportEntry) {
        self.entries.push(entry);
    }
}
