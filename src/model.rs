//! Record definitions
//!
//! Typed records produced by the extractors. Every record is built once per
//! query and never mutated afterwards.

use chrono::NaiveDate;
use serde::Serialize;

/// Default author when the last-author query fails
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A single commit from the log listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRecord {
    /// Full hexadecimal commit id
    pub id: String,
    /// Author name, may contain spaces
    pub author: String,
    /// Author date as printed by `--date=short` (YYYY-MM-DD)
    pub date: String,
    /// Subject line, preserved verbatim
    pub subject: String,
    #[serde(flatten)]
    pub stats: CommitStats,
}

impl CommitRecord {
    /// Parse the date field, if it is a calendar date
    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").ok()
    }

    pub fn short_id(&self) -> &str {
        &self.id[..self.id.len().min(7)]
    }
}

/// Totals from a `--shortstat` summary line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CommitStats {
    pub files_changed: u32,
    pub insertions: u32,
    pub deletions: u32,
}

/// A local branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchRecord {
    pub name: String,
    /// Abbreviated id of the branch tip
    pub last_commit: Option<String>,
    /// Fully merged into one of the trunk branches
    pub merged: bool,
    pub is_current: bool,
}

/// A tracked file with its history counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub path: String,
    /// Number of commits touching the path
    pub changes: u32,
    pub last_author: String,
}

/// One annotated line of `git blame`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameLine {
    /// 1-based line number in the blamed file
    pub line_number: usize,
    pub commit: String,
    pub author: String,
    /// Subject of the commit, when it could be resolved
    pub subject: Option<String>,
    pub content: String,
}

/// One line of `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    /// Two-letter XY status code
    pub code: String,
    pub path: String,
}

impl StatusEntry {
    pub fn is_untracked(&self) -> bool {
        self.code == "??"
    }

    pub fn is_conflicted(&self) -> bool {
        matches!(
            self.code.as_str(),
            "UU" | "AA" | "DD" | "AU" | "UA" | "DU" | "UD"
        )
    }
}

/// A blob from `git ls-tree -r -l`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TreeEntry {
    pub path: String,
    pub size: u64,
}

/// Records from one extraction pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordBatch<T> {
    pub records: Vec<T>,
    /// Upstream output was cut off or the record ceiling was reached
    pub truncated: bool,
}

impl<T> RecordBatch<T> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            truncated: false,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<T> Default for RecordBatch<T> {
    fn default() -> Self {
        Self::empty()
    }
}
