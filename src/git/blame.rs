//! Blame extraction

use std::collections::HashMap;

use crate::model::{BlameLine, RecordBatch};

use super::query::GitQuery;

/// Annotate the first `max_lines` lines of `path` with author and commit
/// subject.
pub fn extract_blame(git: &dyn GitQuery, path: &str, max_lines: usize) -> RecordBatch<BlameLine> {
    let output = match git.run(&["blame", "--", path]) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("blame unavailable for {}: {}", path, e);
            return RecordBatch::empty();
        }
    };

    let mut batch = RecordBatch::empty();
    let mut subjects: HashMap<String, Option<String>> = HashMap::new();

    for (index, line) in output.text.lines().enumerate() {
        if batch.records.len() >= max_lines {
            batch.truncated = true;
            break;
        }

        let Some((commit, author, content)) = parse_blame_line(line) else {
            tracing::debug!("dropping malformed blame line: {:?}", line);
            continue;
        };

        let subject = subjects
            .entry(commit.to_string())
            .or_insert_with(|| commit_subject(git, commit))
            .clone();

        batch.records.push(BlameLine {
            line_number: index + 1,
            commit: commit.to_string(),
            author: author.to_string(),
            subject,
            content: content.to_string(),
        });
    }

    batch
}

/// Split a default-format blame line
///
/// ```text
/// ^1a2b3c4 (Ann Lee 2024-01-02 10:00:00 +0100 1) fn main() {
/// ```
///
/// The author is the first word inside the parentheses.
pub fn parse_blame_line(line: &str) -> Option<(&str, &str, &str)> {
    let open = line.find('(')?;
    let commit = line[..open].split_whitespace().next()?.trim_start_matches('^');
    if commit.is_empty() {
        return None;
    }

    let inner = &line[open + 1..];
    let author_end = inner.find(' ')?;
    let author = &inner[..author_end];
    if author.is_empty() {
        return None;
    }

    let content = inner
        .find(") ")
        .map(|i| &inner[i + 2..])
        .or_else(|| inner.strip_suffix(')').map(|_| ""))
        .unwrap_or("");

    Some((commit, author, content))
}

fn commit_subject(git: &dyn GitQuery, commit: &str) -> Option<String> {
    git.text(&["show", "-s", "--format=%s", commit])
        .map(|s| s.lines().next().unwrap_or("").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::query::fake::FakeGit;

    #[test]
    fn test_parse_blame_line() {
        let (commit, author, content) =
            parse_blame_line("^1a2b3c4 (Ann Lee 2024-01-02 10:00:00 +0100 1) fn main() {").unwrap();
        assert_eq!(commit, "1a2b3c4");
        assert_eq!(author, "Ann");
        assert_eq!(content, "fn main() {");

        assert!(parse_blame_line("no parens here").is_none());
        assert!(parse_blame_line("1a2b3c4 (Ann").is_none());
    }

    #[test]
    fn test_extract_blame_memoizes_subjects() {
        let blame = "1111111 (Ann 2024-01-01 10:00:00 +0000 1) a\n\
                     1111111 (Ann 2024-01-01 10:00:00 +0000 2) b\n\
                     garbage\n\
                     2222222 (Bob 2024-01-02 10:00:00 +0000 4) d";
        let git = FakeGit::new()
            .with("blame -- src/lib.rs", blame)
            .with("show -s --format=%s 1111111", "first commit");

        let batch = extract_blame(&git, "src/lib.rs", 10);
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.records[0].subject.as_deref(), Some("first commit"));
        assert_eq!(batch.records[2].line_number, 4);
        assert_eq!(batch.records[2].author, "Bob");
        assert_eq!(batch.records[2].subject, None);
        assert_eq!(git.call_count("show -s --format=%s 1111111"), 1);
    }

    #[test]
    fn test_extract_blame_line_cap() {
        let blame = "1111111 (Ann 2024-01-01 10:00:00 +0000 1) a\n\
                     1111111 (Ann 2024-01-01 10:00:00 +0000 2) b";
        let git = FakeGit::new().with("blame -- f", blame);
        let batch = extract_blame(&git, "f", 1);
        assert_eq!(batch.len(), 1);
        assert!(batch.truncated);
    }
}
