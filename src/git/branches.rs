//! Branch listing extraction

use std::collections::HashSet;

use crate::config::{GitSettings, Limits};
use crate::model::{BranchRecord, RecordBatch};

use super::commits::is_commit_id;
use super::query::GitQuery;

/// Name of the checked out branch, `None` when detached or unavailable
pub fn current_branch(git: &dyn GitQuery) -> Option<String> {
    git.text(&["branch", "--show-current"])
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Load local branches from `git branch -v` and resolve their merge status
/// against the configured trunk branches.
pub fn extract_branches(
    git: &dyn GitQuery,
    settings: &GitSettings,
    limits: &Limits,
    current: Option<&str>,
) -> RecordBatch<BranchRecord> {
    let output = match git.run(&["branch", "-v"]) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("branch listing unavailable: {}", e);
            return RecordBatch::empty();
        }
    };

    let mut batch = RecordBatch::empty();
    batch.truncated = output.truncated;
    let mut seen = HashSet::new();

    for line in output.text.lines() {
        let Some((name, last_commit)) = parse_branch_line(line) else {
            continue;
        };
        if !seen.insert(name.to_string()) {
            tracing::debug!("dropping duplicate branch {}", name);
            continue;
        }
        if batch.records.len() >= limits.max_branches {
            batch.truncated = true;
            break;
        }

        let is_current = current == Some(name);
        let merged = !is_current && is_merged(git, settings, name);

        batch.records.push(BranchRecord {
            name: name.to_string(),
            last_commit: last_commit.map(str::to_string),
            merged,
            is_current,
        });
    }

    batch
}

/// Split a `git branch -v` line into branch name and tip id
///
/// ```text
/// * main        1a2b3c4 Commit subject
///   feature/x   5d6e7f8 Other subject
/// ```
pub fn parse_branch_line(line: &str) -> Option<(&str, Option<&str>)> {
    let rest = line.trim_start_matches([' ', '*', '+']);

    // "(HEAD detached at 1a2b3c4)" is not a branch
    if rest.starts_with('(') {
        return None;
    }

    let mut tokens = rest.split_whitespace();
    let name = tokens.next()?;
    let last_commit = tokens.next().filter(|t| is_commit_id(t));

    Some((name, last_commit))
}

/// Merged into any trunk other than itself. Trunks are never merged.
fn is_merged(git: &dyn GitQuery, settings: &GitSettings, name: &str) -> bool {
    if settings.is_trunk(name) {
        return false;
    }

    settings
        .trunk_branches
        .iter()
        .any(|trunk| git.succeeds(&["merge-base", "--is-ancestor", name, trunk]))
}
