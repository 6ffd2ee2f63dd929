//! Summary statistics over extracted records

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::GitSettings;
use crate::model::{BranchRecord, CommitRecord};

/// Commit count for one author
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthorCount {
    pub author: String,
    pub commits: u32,
}

/// Per-author commit counts in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuthorActivity {
    pub authors: Vec<AuthorCount>,
}

impl AuthorActivity {
    /// Count commits per author. Authors first seen after `max_authors`
    /// distinct names are not tracked.
    pub fn from_commits(commits: &[CommitRecord], max_authors: usize) -> Self {
        let mut authors: Vec<AuthorCount> = Vec::new();

        for commit in commits {
            if let Some(entry) = authors.iter_mut().find(|a| a.author == commit.author) {
                entry.commits += 1;
            } else if authors.len() < max_authors {
                authors.push(AuthorCount {
                    author: commit.author.clone(),
                    commits: 1,
                });
            }
        }

        Self { authors }
    }

    /// Author with the most commits; ties go to the one seen first
    pub fn most_active(&self) -> Option<&AuthorCount> {
        let mut best: Option<&AuthorCount> = None;
        for entry in &self.authors {
            if best.map_or(true, |b| entry.commits > b.commits) {
                best = Some(entry);
            }
        }
        best
    }

    pub fn count_for(&self, author: &str) -> Option<u32> {
        self.authors
            .iter()
            .find(|a| a.author == author)
            .map(|a| a.commits)
    }
}

/// Repository-wide line totals
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChangeTotals {
    pub insertions: u64,
    pub deletions: u64,
}

impl ChangeTotals {
    pub fn from_commits(commits: &[CommitRecord]) -> Self {
        commits.iter().fold(Self::default(), |acc, c| Self {
            insertions: acc.insertions + u64::from(c.stats.insertions),
            deletions: acc.deletions + u64::from(c.stats.deletions),
        })
    }
}

/// The newest commit in a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestChange {
    pub subject: String,
    pub author: String,
}

/// Commits are ordered newest first
pub fn latest_change(commits: &[CommitRecord]) -> Option<LatestChange> {
    commits.first().map(|c| LatestChange {
        subject: c.subject.clone(),
        author: c.author.clone(),
    })
}

/// Oldest and newest commit dates in a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateSpan {
    pub first: NaiveDate,
    pub last: NaiveDate,
}

impl DateSpan {
    /// Commits whose date does not parse are skipped
    pub fn from_commits(commits: &[CommitRecord]) -> Option<Self> {
        let mut dates = commits.iter().filter_map(CommitRecord::date);
        let first = dates.next()?;
        let (first, last) = dates.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d)));
        Some(Self { first, last })
    }

    pub fn days(&self) -> i64 {
        (self.last - self.first).num_days()
    }
}

/// Disjoint partition of a branch batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BranchSummary {
    /// Merged into a trunk, safe to delete
    pub merged: usize,
    /// Unmerged work on other branches
    pub active: usize,
    /// Trunks and the current branch
    pub excluded: usize,
}

impl BranchSummary {
    pub fn from_branches(branches: &[BranchRecord], settings: &GitSettings) -> Self {
        let mut summary = Self::default();

        for branch in branches {
            if branch.is_current || settings.is_trunk(&branch.name) {
                summary.excluded += 1;
            } else if branch.merged {
                summary.merged += 1;
            } else {
                summary.active += 1;
            }
        }

        summary
    }

    pub fn total(&self) -> usize {
        self.merged + self.active + self.excluded
    }
}

/// Branches that can be deleted safely
pub fn deletable_branches<'a>(
    branches: &'a [BranchRecord],
    settings: &GitSettings,
) -> Vec<&'a BranchRecord> {
    branches
        .iter()
        .filter(|b| b.merged && !b.is_current && !settings.is_trunk(&b.name))
        .collect()
}
