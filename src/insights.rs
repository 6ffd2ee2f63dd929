//! Working tree and history heuristics
//!
//! Lighter pipelines built on the same extractors: cleanup hints, conflict
//! guidance, change impact, large files, documentation activity and
//! workflow patterns.

use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::config::GitSettings;
use crate::git::{self, count_lines, GitQuery};
use crate::model::TreeEntry;

const RECENT_IMPACT_COMMITS: usize = 5;
const RECENT_PERFORMANCE_COMMITS: &str = "5";
const LARGEST_FILES: usize = 3;
const DOC_SAMPLE: &str = "10";
const WORKFLOW_DATE_SAMPLE: &str = "100";
const WORKFLOW_STAT_SAMPLE: &str = "20";
const MERGE_SAMPLE: &str = "10";
const MERGE_BASELINE: &str = "20";
const UNCOMMITTED_WARNING: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub modified: usize,
    pub untracked: usize,
    pub stashes: usize,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.modified == 0 && self.untracked == 0
    }
}

pub fn cleanup(git: &dyn GitQuery) -> CleanupReport {
    let entries = git::status_entries(git);
    let untracked = entries.iter().filter(|e| e.is_untracked()).count();

    CleanupReport {
        modified: entries.len() - untracked,
        untracked,
        stashes: git::stash_count(git),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConflictReport {
    pub files: Vec<String>,
}

pub fn conflicts(git: &dyn GitQuery) -> ConflictReport {
    ConflictReport {
        files: git::status_entries(git)
            .into_iter()
            .filter(|e| e.is_conflicted())
            .map(|e| e.path)
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImpactReport {
    pub target: String,
    /// Target names a path in the working tree
    pub is_file: bool,
    pub recent_commits: Vec<String>,
}

pub fn impact(git: &dyn GitQuery, workdir: &Path, target: &str) -> ImpactReport {
    let is_file = workdir.join(target).exists();
    let recent_commits = if is_file {
        git.text(&["log", "--oneline", "--follow", "--", target])
            .map(|text| {
                text.lines()
                    .take(RECENT_IMPACT_COMMITS)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    ImpactReport {
        target: target.to_string(),
        is_file,
        recent_commits,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PerformanceReport {
    pub recent_commits: Vec<String>,
    pub largest_files: Vec<TreeEntry>,
}

pub fn performance(git: &dyn GitQuery) -> PerformanceReport {
    let recent_commits = git
        .text(&["log", "--oneline", "-n", RECENT_PERFORMANCE_COMMITS])
        .map(|text| text.lines().map(str::to_string).collect())
        .unwrap_or_default();

    PerformanceReport {
        recent_commits,
        largest_files: largest(git::tree_entries(git), LARGEST_FILES),
    }
}

fn largest(mut entries: Vec<TreeEntry>, n: usize) -> Vec<TreeEntry> {
    entries.sort_by(|a, b| b.size.cmp(&a.size));
    entries.truncate(n);
    entries
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DocsReport {
    pub readme: Option<String>,
    pub sampled_commits: usize,
    pub doc_commits: usize,
    /// Fewer than a quarter of recent commits touch documentation
    pub lagging: bool,
}

pub fn docs(git: &dyn GitQuery, repo_root: &Path) -> DocsReport {
    let subjects = git
        .text(&["log", "--oneline", "-n", DOC_SAMPLE])
        .unwrap_or_default();

    let sampled_commits = count_lines(&subjects);
    let doc_commits = subjects.lines().filter(|l| is_doc_commit(l)).count();

    DocsReport {
        readme: find_readme(repo_root),
        sampled_commits,
        doc_commits,
        lagging: sampled_commits > 0 && doc_commits < sampled_commits / 4,
    }
}

fn is_doc_commit(line: &str) -> bool {
    line.contains("doc") || line.contains("readme") || line.contains("Documentation")
}

fn find_readme(root: &Path) -> Option<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .filter(|name| name.starts_with("README"))
        .collect();
    names.sort();
    names.into_iter().next()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitSize {
    Small,
    Balanced,
    Large,
}

impl CommitSize {
    pub fn from_average(lines: u32) -> Self {
        if lines > 500 {
            CommitSize::Large
        } else if lines < 10 {
            CommitSize::Small
        } else {
            CommitSize::Balanced
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StaleBranch {
    pub name: String,
    pub age: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowReport {
    pub sampled_commits: usize,
    /// Mean inserted plus deleted lines over recent commits
    pub average_changes: Option<u32>,
    pub commit_size: Option<CommitSize>,
    pub recent_dates: Vec<String>,
    pub stale_branches: Vec<StaleBranch>,
    pub merge_percentage: Option<u32>,
    pub recommendations: Vec<String>,
}

/// Commit cadence, size and branch hygiene; `None` without any history
pub fn workflow(git: &dyn GitQuery, settings: &GitSettings) -> Option<WorkflowReport> {
    let dates = git
        .text(&["log", "--format=%ad", "--date=iso-strict", "-n", WORKFLOW_DATE_SAMPLE])
        .filter(|text| !text.trim().is_empty())?;

    let average_changes = git
        .text(&["log", "--shortstat", "--format=", "-n", WORKFLOW_STAT_SAMPLE])
        .and_then(|text| average_changes(&text));

    Some(WorkflowReport {
        sampled_commits: count_lines(&dates),
        average_changes,
        commit_size: average_changes.map(CommitSize::from_average),
        recent_dates: dates
            .lines()
            .take(3)
            .filter_map(|l| l.split_once('T').map(|(day, _)| day.to_string()))
            .collect(),
        stale_branches: git::branch_ages(git, settings.delimiter)
            .into_iter()
            .filter(|(name, age)| !settings.is_trunk(name) && is_stale(age))
            .map(|(name, age)| StaleBranch { name, age })
            .collect(),
        merge_percentage: merge_percentage(git),
        recommendations: recommendations(git, settings),
    })
}

fn average_changes(shortstat: &str) -> Option<u32> {
    let stats = git::parse_shortstat_lines(shortstat);
    if stats.is_empty() {
        return None;
    }
    let total: u64 = stats
        .iter()
        .map(|s| u64::from(s.insertions) + u64::from(s.deletions))
        .sum();
    u32::try_from(total / stats.len() as u64).ok()
}

/// Relative ages such as "3 weeks ago" or "2 months ago"
fn is_stale(age: &str) -> bool {
    ["week", "month", "year"].iter().any(|unit| age.contains(unit))
}

fn merge_percentage(git: &dyn GitQuery) -> Option<u32> {
    let merges = count_lines(&git.text(&["log", "--oneline", "--merges", "-n", MERGE_SAMPLE])?);
    let total = count_lines(&git.text(&["log", "--oneline", "-n", MERGE_BASELINE])?);
    if total == 0 {
        return None;
    }
    u32::try_from(merges * 100 / total).ok()
}

fn recommendations(git: &dyn GitQuery, settings: &GitSettings) -> Vec<String> {
    let mut tips = Vec::new();

    if let Some(current) = git::current_branch(git).filter(|b| !settings.is_trunk(b)) {
        let age = settings.trunk_branches.iter().find_map(|trunk| {
            let range = format!("{}..HEAD", trunk);
            git.text(&["log", "-1", "--format=%cr", &range])
                .filter(|age| !age.trim().is_empty())
        });
        if let Some(age) = age {
            tips.push(format!(
                "Feature branch '{}' is {} old - consider merging soon",
                current,
                age.trim_end_matches(" ago")
            ));
        }
    }

    let uncommitted = git::status_entries(git)
        .iter()
        .filter(|e| !e.is_untracked())
        .count();
    if uncommitted > UNCOMMITTED_WARNING {
        tips.push(format!(
            "You have {} uncommitted changes - consider smaller, more frequent commits",
            uncommitted
        ));
    }

    let remote = git.text(&["branch", "-r"]).map(|t| count_lines(&t));
    let local = git.text(&["branch"]).map(|t| count_lines(&t));
    if let (Some(remote), Some(local)) = (remote, local) {
        if remote > local * 2 {
            tips.push(format!(
                "Many remote branches ({} remote vs {} local) - consider cleaning up",
                remote, local
            ));
        }
    }

    tips.push("Run 'gitsmart review' before pushing changes".to_string());
    tips.push("Use 'gitsmart suggest' for better commit messages".to_string());
    tips
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::query::fake::FakeGit;

    #[test]
    fn test_cleanup_counts() {
        let git = FakeGit::new()
            .with("status --porcelain", " M a.rs\nA  b.rs\n?? c.txt")
            .with("stash list", "stash@{0}: WIP on main");
        let report = cleanup(&git);
        assert_eq!(report, CleanupReport { modified: 2, untracked: 1, stashes: 1 });
        assert!(!report.is_clean());

        assert!(cleanup(&FakeGit::new()).is_clean());
    }

    #[test]
    fn test_conflicts() {
        let git = FakeGit::new().with("status --porcelain", "UU src/a.rs\n M b.rs\nAA c.rs");
        assert_eq!(conflicts(&git).files, ["src/a.rs", "c.rs"]);
        assert!(conflicts(&FakeGit::new()).files.is_empty());
    }

    #[test]
    fn test_impact_for_file_and_component() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("lib.rs"), "").unwrap();
        let git = FakeGit::new().with(
            "log --oneline --follow -- lib.rs",
            "a1 one\na2 two\na3 three\na4 four\na5 five\na6 six",
        );

        let report = impact(&git, dir.path(), "lib.rs");
        assert!(report.is_file);
        assert_eq!(report.recent_commits.len(), 5);
        assert_eq!(report.recent_commits[0], "a1 one");

        let report = impact(&git, dir.path(), "parser");
        assert!(!report.is_file);
        assert!(report.recent_commits.is_empty());
    }

    #[test]
    fn test_performance_largest_files() {
        let git = FakeGit::new()
            .with("log --oneline -n 5", "a1 one\na2 two")
            .with(
                "ls-tree -r -l HEAD",
                "100644 blob aaaaaaa     10\tsmall.txt\n\
                 100644 blob bbbbbbb   5000\tbig.bin\n\
                 100644 blob ccccccc    300\tmid.rs\n\
                 100644 blob ddddddd   4000\tlarge.png",
            );

        let report = performance(&git);
        assert_eq!(report.recent_commits.len(), 2);
        let paths: Vec<_> = report.largest_files.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["big.bin", "large.png", "mid.rs"]);
    }

    #[test]
    fn test_docs_report() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "# hi").unwrap();
        let git = FakeGit::new().with(
            "log --oneline -n 10",
            "a1 update docs\na2 feat: x\na3 fix: y\na4 chore\na5 feat: z",
        );

        let report = docs(&git, dir.path());
        assert_eq!(report.readme.as_deref(), Some("README.md"));
        assert_eq!(report.sampled_commits, 5);
        assert_eq!(report.doc_commits, 1);
        assert!(!report.lagging);

        let empty = tempfile::tempdir().unwrap();
        let git = FakeGit::new().with(
            "log --oneline -n 10",
            "a1 feat\na2 feat\na3 feat\na4 feat\na5 feat\na6 feat\na7 feat\na8 feat",
        );
        let report = docs(&git, empty.path());
        assert_eq!(report.readme, None);
        assert!(report.lagging);
    }

    #[test]
    fn test_commit_size_thresholds() {
        assert_eq!(CommitSize::from_average(501), CommitSize::Large);
        assert_eq!(CommitSize::from_average(500), CommitSize::Balanced);
        assert_eq!(CommitSize::from_average(10), CommitSize::Balanced);
        assert_eq!(CommitSize::from_average(9), CommitSize::Small);
    }

    #[test]
    fn test_average_changes() {
        let text = " 1 file changed, 10 insertions(+), 2 deletions(-)\n\n 3 files changed, 20 insertions(+)";
        assert_eq!(average_changes(text), Some(16));
        assert_eq!(average_changes(""), None);
    }

    #[test]
    fn test_workflow_report() {
        let settings = GitSettings::default();
        let git = FakeGit::new()
            .with(
                "log --format=%ad --date=iso-strict -n 100",
                "2024-05-03T10:00:00+02:00\n2024-05-02T09:00:00+02:00\n2024-05-01T08:00:00+02:00\n2024-04-30T08:00:00+02:00",
            )
            .with(
                "log --shortstat --format= -n 20",
                " 1 file changed, 600 insertions(+)\n 2 files changed, 700 deletions(-)",
            )
            .with(
                "for-each-ref --format=%(refname:short)|%(committerdate:relative) refs/heads/",
                "main|5 weeks ago\nold-spike|3 weeks ago\nfresh|2 days ago",
            )
            .with("log --oneline --merges -n 10", "m1 Merge a\nm2 Merge b\nm3 Merge c")
            .with("log --oneline -n 20", "a\nb\nc\nd")
            .with("branch --show-current", "feature")
            .with("log -1 --format=%cr main..HEAD", "4 days ago")
            .with("branch -r", "origin/a\norigin/b\norigin/c\norigin/d\norigin/e")
            .with("branch", "* feature\n  main");

        let report = workflow(&git, &settings).unwrap();
        assert_eq!(report.sampled_commits, 4);
        assert_eq!(report.average_changes, Some(650));
        assert_eq!(report.commit_size, Some(CommitSize::Large));
        assert_eq!(report.recent_dates, ["2024-05-03", "2024-05-02", "2024-05-01"]);
        assert_eq!(
            report.stale_branches,
            [StaleBranch { name: "old-spike".to_string(), age: "3 weeks ago".to_string() }]
        );
        assert_eq!(report.merge_percentage, Some(75));
        assert_eq!(
            report.recommendations[0],
            "Feature branch 'feature' is 4 days old - consider merging soon"
        );
        assert!(report.recommendations[1].starts_with("Many remote branches (5 remote vs 2 local)"));
        assert_eq!(report.recommendations.len(), 4);
    }

    #[test]
    fn test_workflow_without_history() {
        let git = FakeGit::new().with("log --format=%ad --date=iso-strict -n 100", "");
        assert!(workflow(&git, &GitSettings::default()).is_none());
    }
}
