//! Commit log extraction

use crate::config::{GitSettings, Limits};
use crate::model::{CommitRecord, CommitStats, RecordBatch};

use super::query::GitQuery;

/// `--format` argument that prints id, author, date and subject separated by `delimiter`
pub fn log_format(delimiter: char) -> String {
    format!("--format=%H{d}%an{d}%ad{d}%s", d = delimiter)
}

/// Load up to `limits.max_commits` commits, newest first, each enriched with
/// its shortstat totals.
pub fn extract_commits(
    git: &dyn GitQuery,
    settings: &GitSettings,
    limits: &Limits,
) -> RecordBatch<CommitRecord> {
    let format = log_format(settings.delimiter);
    let max = limits.max_commits.to_string();

    let output = match git.run(&["log", &format, "--date=short", "-n", &max]) {
        Ok(output) => output,
        Err(e) => {
            tracing::debug!("commit log unavailable: {}", e);
            return RecordBatch::empty();
        }
    };

    let mut batch = parse_commit_log(&output.text, settings.delimiter, limits.max_commits);
    batch.truncated |= output.truncated;

    for commit in &mut batch.records {
        commit.stats = commit_stats(git, &commit.id);
    }

    batch
}

/// Parse a whole log listing without enrichment
pub fn parse_commit_log(text: &str, delimiter: char, max: usize) -> RecordBatch<CommitRecord> {
    let mut batch = RecordBatch::empty();

    for line in text.lines() {
        if batch.records.len() >= max {
            batch.truncated = true;
            break;
        }
        match parse_commit_line(line, delimiter) {
            Some(commit) => batch.records.push(commit),
            None => tracing::debug!("dropping malformed log line: {:?}", line),
        }
    }

    batch
}

/// Split one log line into its four fields. The subject takes the remainder
/// of the line verbatim, delimiters included.
pub fn parse_commit_line(line: &str, delimiter: char) -> Option<CommitRecord> {
    let line = line.trim_end_matches('\r');
    let mut fields = line.splitn(4, delimiter);

    let id = fields.next()?.trim();
    let author = fields.next()?.trim();
    let date = fields.next()?.trim();
    let subject = fields.next()?;

    if !is_commit_id(id) || author.is_empty() || date.is_empty() {
        return None;
    }

    Some(CommitRecord {
        id: id.to_string(),
        author: author.to_string(),
        date: date.to_string(),
        subject: subject.to_string(),
        stats: CommitStats::default(),
    })
}

pub(crate) fn is_commit_id(s: &str) -> bool {
    s.len() >= 7 && s.chars().all(|c| c.is_ascii_hexdigit())
}

/// Shortstat totals for one commit, zero when the query fails
fn commit_stats(git: &dyn GitQuery, id: &str) -> CommitStats {
    match git.text(&["show", "--shortstat", "--format=", id]) {
        Some(text) => parse_shortstat(&text),
        None => CommitStats::default(),
    }
}

/// Parse the summary line of `--shortstat` / `--stat` output:
///
/// ```text
///  3 files changed, 120 insertions(+), 45 deletions(-)
/// ```
///
/// Missing clauses are zero.
pub fn parse_shortstat(text: &str) -> CommitStats {
    text.lines()
        .rev()
        .find(|l| is_summary_line(l))
        .map(parse_summary_line)
        .unwrap_or_default()
}

/// Parse every summary line in a multi-commit listing
pub fn parse_shortstat_lines(text: &str) -> Vec<CommitStats> {
    text.lines()
        .filter(|l| is_summary_line(l))
        .map(parse_summary_line)
        .collect()
}

fn is_summary_line(line: &str) -> bool {
    line.contains("file") && line.contains("changed")
}

fn parse_summary_line(line: &str) -> CommitStats {
    CommitStats {
        files_changed: number_before(line, "file"),
        insertions: number_before(line, "insertion"),
        deletions: number_before(line, "deletion"),
    }
}

/// The integer immediately preceding `keyword`, or 0
fn number_before(line: &str, keyword: &str) -> u32 {
    let Some(pos) = line.find(keyword) else {
        return 0;
    };

    let head = line[..pos].trim_end();
    let start = head
        .rfind(|c: char| !c.is_ascii_digit())
        .map(|i| i + 1)
        .unwrap_or(0);

    head[start..].parse().unwrap_or(0)
}
