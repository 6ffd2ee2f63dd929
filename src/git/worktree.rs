//! Working tree, stash, tree and ref listings

use crate::model::{StatusEntry, TreeEntry};

use super::query::{count_lines, GitQuery};

/// Entries of `git status --porcelain`
pub fn status_entries(git: &dyn GitQuery) -> Vec<StatusEntry> {
    git.text(&["status", "--porcelain"])
        .map(|text| text.lines().filter_map(parse_status_line).collect())
        .unwrap_or_default()
}

/// `XY path` or `XY old -> new`; renames report the new path
pub fn parse_status_line(line: &str) -> Option<StatusEntry> {
    if line.len() < 4 || !line.is_char_boundary(2) || !line.is_char_boundary(3) {
        return None;
    }

    let code = &line[..2];
    let raw_path = &line[3..];
    let path = match raw_path.find(" -> ") {
        Some(arrow) => &raw_path[arrow + 4..],
        None => raw_path,
    };

    Some(StatusEntry {
        code: code.to_string(),
        path: path.trim_matches('"').to_string(),
    })
}

pub fn stash_count(git: &dyn GitQuery) -> usize {
    git.text(&["stash", "list"])
        .map(|text| count_lines(&text))
        .unwrap_or(0)
}

/// Blobs reachable from HEAD with their sizes
pub fn tree_entries(git: &dyn GitQuery) -> Vec<TreeEntry> {
    git.text(&["ls-tree", "-r", "-l", "HEAD"])
        .map(|text| text.lines().filter_map(parse_tree_line).collect())
        .unwrap_or_default()
}

/// `<mode> <type> <object> <size>\t<path>`; submodules (size `-`) are skipped
pub fn parse_tree_line(line: &str) -> Option<TreeEntry> {
    let (meta, path) = line.split_once('\t')?;
    let size = meta.split_whitespace().nth(3)?.parse().ok()?;

    Some(TreeEntry {
        path: path.to_string(),
        size,
    })
}

/// `(branch, relative age)` for each local branch
pub fn branch_ages(git: &dyn GitQuery, delimiter: char) -> Vec<(String, String)> {
    let format = format!(
        "--format=%(refname:short){}%(committerdate:relative)",
        delimiter
    );

    git.text(&["for-each-ref", &format, "refs/heads/"])
        .map(|text| {
            text.lines()
                .filter_map(|line| {
                    let (name, age) = line.split_once(delimiter)?;
                    let (name, age) = (name.trim(), age.trim());
                    (!name.is_empty() && !age.is_empty())
                        .then(|| (name.to_string(), age.to_string()))
                })
                .collect()
        })
        .unwrap_or_default()
}
