//! Tracked file extraction

use crate::config::Limits;
use crate::model::{FileRecord, RecordBatch, UNKNOWN_AUTHOR};

use super::query::GitQuery;

/// List tracked files and look up how often each one changed and who
/// touched it last. Paths matching `ignore` are skipped before any
/// per-file query runs.
pub fn extract_files(
    git: &dyn GitQuery,
    limits: &Limits,
    ignore: &[glob::Pattern],
) -> RecordBatch<FileRecord> {
    // NUL separated so paths are listed verbatim, without C-style quoting
    let output = match git.run(&["ls-files", "-z"]) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("file listing unavailable: {}", e);
            return RecordBatch::empty();
        }
    };

    let mut batch = RecordBatch::empty();
    batch.truncated = output.truncated;

    for path in output.text.split('\0') {
        if path.is_empty() || ignore.iter().any(|p| p.matches(path)) {
            continue;
        }
        if batch.records.len() >= limits.max_files {
            batch.truncated = true;
            break;
        }

        batch.records.push(FileRecord {
            path: path.to_string(),
            changes: change_count(git, path),
            last_author: last_author(git, path),
        });
    }

    batch
}

/// Number of commits touching `path`, 1 when the count is unavailable
fn change_count(git: &dyn GitQuery, path: &str) -> u32 {
    git.text(&["rev-list", "--count", "HEAD", "--", path])
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(1)
}

fn last_author(git: &dyn GitQuery, path: &str) -> String {
    git.text(&["log", "-1", "--format=%an", "--", path])
        .map(|s| s.trim_end_matches(['\r', '\n']).to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_AUTHOR.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::query::fake::FakeGit;

    #[test]
    fn test_extract_files_with_defaults() {
        let git = FakeGit::new()
            .with("ls-files -z", "src/main.rs\0docs/my notes.md\0")
            .with("rev-list --count HEAD -- src/main.rs", "12")
            .with("log -1 --format=%an -- src/main.rs", "Ann Lee")
            .with("rev-list --count HEAD -- docs/my notes.md", "not a number");

        let batch = extract_files(&git, &Limits::default(), &[]);
        assert_eq!(batch.len(), 2);

        assert_eq!(batch.records[0].changes, 12);
        assert_eq!(batch.records[0].last_author, "Ann Lee");

        // path with a space is passed through as a single argument
        assert_eq!(batch.records[1].path, "docs/my notes.md");
        assert_eq!(batch.records[1].changes, 1);
        assert_eq!(batch.records[1].last_author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_ignored_paths_skip_queries() {
        let git = FakeGit::new().with("ls-files -z", "Cargo.lock\0src/lib.rs\0");
        let ignore = vec![glob::Pattern::new("*.lock").unwrap()];

        let batch = extract_files(&git, &Limits::default(), &ignore);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].path, "src/lib.rs");
        assert_eq!(git.call_count("rev-list --count HEAD -- Cargo.lock"), 0);
    }

    #[test]
    fn test_file_ceiling() {
        let git = FakeGit::new().with("ls-files -z", "a\0b\0c\0");
        let limits = Limits { max_files: 2, ..Limits::default() };
        let batch = extract_files(&git, &limits, &[]);
        assert_eq!(batch.len(), 2);
        assert!(batch.truncated);
    }

    #[test]
    fn test_non_ascii_path_is_queried_verbatim() {
        let git = FakeGit::new()
            .with("ls-files -z", "déjà.txt\0")
            .with("rev-list --count HEAD -- déjà.txt", "4")
            .with("log -1 --format=%an -- déjà.txt", "Zoë");

        let batch = extract_files(&git, &Limits::default(), &[]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].path, "déjà.txt");
        assert_eq!(batch.records[0].changes, 4);
        assert_eq!(batch.records[0].last_author, "Zoë");
    }

    #[test]
    fn test_no_listing() {
        let batch = extract_files(&FakeGit::new(), &Limits::default(), &[]);
        assert!(batch.is_empty());
    }
}
