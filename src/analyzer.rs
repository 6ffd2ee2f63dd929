//! Analysis pipelines
//!
//! Each pipeline issues its queries sequentially through a [`GitQuery`] and
//! returns a serializable report. Nothing is cached between pipelines.

use anyhow::Result;
use serde::Serialize;
use std::path::Path;

use crate::aggregate::{
    deletable_branches, latest_change, AuthorActivity, AuthorCount, BranchSummary, ChangeTotals,
    DateSpan, LatestChange,
};
use crate::classify::{self, Classification, DiffReview, REVIEW_CHECKS, SECURITY_CHECKS};
use crate::config::Config;
use crate::git::{self, GitQuery};
use crate::insights::{self, CleanupReport};
use crate::model::{BlameLine, FileRecord};
use crate::rank::top_changed;

#[derive(Debug, Clone, Serialize)]
pub struct CommitSummary {
    pub total_commits: usize,
    pub totals: ChangeTotals,
    pub authors: AuthorActivity,
    pub most_active: Option<AuthorCount>,
    pub latest: Option<LatestChange>,
    pub span: Option<DateSpan>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BranchReport {
    pub current: Option<String>,
    pub total: usize,
    pub summary: BranchSummary,
    /// Merged branches that can be deleted
    pub deletable: Vec<String>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HotFilesReport {
    pub tracked_files: usize,
    pub files: Vec<FileRecord>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlameReport {
    pub path: String,
    pub lines: Vec<BlameLine>,
    pub truncated: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuggestReport {
    pub classification: Classification,
    pub messages: Vec<String>,
}

/// Everything the default command prints
#[derive(Debug, Clone, Serialize)]
pub struct FullAnalysis {
    pub commits: CommitSummary,
    pub branches: BranchReport,
    pub hot_files: HotFilesReport,
    pub cleanup: CleanupReport,
}

pub struct Analyzer<'a> {
    git: &'a dyn GitQuery,
    config: &'a Config,
    /// Directory queries run in; user supplied paths resolve against it
    workdir: &'a Path,
    repo_root: &'a Path,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        git: &'a dyn GitQuery,
        config: &'a Config,
        workdir: &'a Path,
        repo_root: &'a Path,
    ) -> Self {
        Self {
            git,
            config,
            workdir,
            repo_root,
        }
    }

    pub fn analysis(&self) -> FullAnalysis {
        FullAnalysis {
            commits: self.commit_summary(),
            branches: self.branches(),
            hot_files: self.hot_files(),
            cleanup: self.cleanup(),
        }
    }

    pub fn commit_summary(&self) -> CommitSummary {
        let batch = git::extract_commits(self.git, &self.config.git, &self.config.limits);
        let authors = AuthorActivity::from_commits(&batch.records, self.config.limits.max_authors);
        tracing::info!(
            "loaded {} commits from {} authors",
            batch.len(),
            authors.authors.len()
        );

        CommitSummary {
            total_commits: batch.len(),
            totals: ChangeTotals::from_commits(&batch.records),
            most_active: authors.most_active().cloned(),
            latest: latest_change(&batch.records),
            span: DateSpan::from_commits(&batch.records),
            authors,
            truncated: batch.truncated,
        }
    }

    pub fn branches(&self) -> BranchReport {
        let current = git::current_branch(self.git);
        let batch = git::extract_branches(
            self.git,
            &self.config.git,
            &self.config.limits,
            current.as_deref(),
        );
        tracing::info!("loaded {} branches", batch.len());

        BranchReport {
            total: batch.len(),
            summary: BranchSummary::from_branches(&batch.records, &self.config.git),
            deletable: deletable_branches(&batch.records, &self.config.git)
                .into_iter()
                .map(|b| b.name.clone())
                .collect(),
            current,
            truncated: batch.truncated,
        }
    }

    pub fn hot_files(&self) -> HotFilesReport {
        let ignore = self.config.ignore_patterns();
        let batch = git::extract_files(self.git, &self.config.limits, &ignore);
        tracing::info!("loaded {} tracked files", batch.len());

        HotFilesReport {
            tracked_files: batch.len(),
            files: top_changed(&batch.records, self.config.limits.hot_files)
                .into_iter()
                .cloned()
                .collect(),
            truncated: batch.truncated,
        }
    }

    pub fn blame(&self, path: &str) -> Result<BlameReport> {
        if !self.workdir.join(path).is_file() {
            anyhow::bail!("File not found or not readable: {}", path);
        }

        let batch = git::extract_blame(self.git, path, self.config.limits.blame_lines);

        Ok(BlameReport {
            path: path.to_string(),
            lines: batch.records,
            truncated: batch.truncated,
        })
    }

    pub fn cleanup(&self) -> CleanupReport {
        insights::cleanup(self.git)
    }

    /// Classify the staged diff and propose commit messages
    pub fn suggest(&self) -> SuggestReport {
        let diff = self
            .git
            .text(&["diff", "--staged"])
            .unwrap_or_default();

        let classification = classify::classify(&diff);
        let messages = match &classification {
            Classification::Classified(result) => classify::commit_messages(&diff, result),
            Classification::Empty => Vec::new(),
        };

        SuggestReport {
            classification,
            messages,
        }
    }

    /// Review checklist for the last commit, `None` when there is no diff
    pub fn review(&self) -> Option<DiffReview> {
        classify::review_diff(&self.last_commit_diff(), REVIEW_CHECKS)
    }

    pub fn security(&self) -> Option<DiffReview> {
        classify::review_diff(&self.last_commit_diff(), SECURITY_CHECKS)
    }

    fn last_commit_diff(&self) -> String {
        self.git.text(&["diff", "HEAD~1"]).unwrap_or_default()
    }

    pub fn impact(&self, target: &str) -> Result<insights::ImpactReport> {
        if target.trim().is_empty() {
            anyhow::bail!("Please specify a file or component to analyze");
        }
        Ok(insights::impact(self.git, self.workdir, target))
    }

    pub fn conflicts(&self) -> insights::ConflictReport {
        insights::conflicts(self.git)
    }

    pub fn performance(&self) -> insights::PerformanceReport {
        insights::performance(self.git)
    }

    pub fn docs(&self) -> insights::DocsReport {
        insights::docs(self.git, self.repo_root)
    }

    pub fn workflow(&self) -> Option<insights::WorkflowReport> {
        insights::workflow(self.git, &self.config.git)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ChangeType, ConcernFlag};
    use crate::git::query::fake::FakeGit;
    use std::fs;

    const ID_A: &str = "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
    const ID_B: &str = "bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
    const ID_C: &str = "cccccccccccccccccccccccccccccccccccccccc";

    fn analyzer<'a>(git: &'a FakeGit, config: &'a Config, dir: &'a Path) -> Analyzer<'a> {
        Analyzer::new(git, config, dir, dir)
    }

    #[test]
    fn test_commit_summary() {
        let log = format!(
            "{}|Ann Lee|2024-01-03|third\n{}|Bob|2024-01-02|second\n{}|Ann Lee|2024-01-01|first",
            ID_A, ID_B, ID_C
        );
        let git = FakeGit::new()
            .with("log --format=%H|%an|%ad|%s --date=short -n 1000", &log)
            .with(
                &format!("show --shortstat --format= {}", ID_A),
                " 1 file changed, 4 insertions(+), 1 deletion(-)",
            )
            .with(
                &format!("show --shortstat --format= {}", ID_B),
                " 2 files changed, 6 insertions(+)",
            );
        let config = Config::default();

        let summary = analyzer(&git, &config, Path::new(".")).commit_summary();
        assert_eq!(summary.total_commits, 3);
        assert_eq!(summary.totals, ChangeTotals { insertions: 10, deletions: 1 });
        let top = summary.most_active.unwrap();
        assert_eq!(top.author, "Ann Lee");
        assert_eq!(top.commits, 2);
        assert_eq!(summary.latest.unwrap().subject, "third");
        assert_eq!(summary.span.unwrap().days(), 2);
    }

    #[test]
    fn test_commit_summary_without_history() {
        let git = FakeGit::new();
        let config = Config::default();
        let summary = analyzer(&git, &config, Path::new(".")).commit_summary();
        assert_eq!(summary.total_commits, 0);
        assert!(summary.most_active.is_none());
        assert!(summary.latest.is_none());
    }

    #[test]
    fn test_branch_report() {
        let git = FakeGit::new()
            .with("branch --show-current", "feature-z")
            .with(
                "branch -v",
                "  feature-x 1111111 x\n  feature-y 2222222 y\n* feature-z 3333333 z\n  main 4444444 m\n  master 5555555 m",
            )
            .with("merge-base --is-ancestor feature-x master", "");
        let config = Config::default();

        let report = analyzer(&git, &config, Path::new(".")).branches();
        assert_eq!(report.current.as_deref(), Some("feature-z"));
        assert_eq!(report.total, 5);
        assert_eq!(report.summary.merged, 1);
        assert_eq!(report.summary.active, 1);
        assert_eq!(report.summary.excluded, 3);
        assert_eq!(report.deletable, ["feature-x"]);
    }

    #[test]
    fn test_hot_files_ranked_and_filtered() {
        let git = FakeGit::new()
            .with("ls-files -z", "a.rs\0Cargo.lock\0b.rs\0c.rs\0")
            .with("rev-list --count HEAD -- a.rs", "3")
            .with("rev-list --count HEAD -- b.rs", "9")
            .with("rev-list --count HEAD -- c.rs", "3");
        let mut config = Config::default();
        config.hotfiles.ignore = vec!["*.lock".to_string()];
        config.limits.hot_files = 2;

        let report = analyzer(&git, &config, Path::new(".")).hot_files();
        assert_eq!(report.tracked_files, 3);
        let paths: Vec<_> = report.files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, ["b.rs", "a.rs"]);
    }

    #[test]
    fn test_blame_requires_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.c"), "int main;\n").unwrap();
        let git = FakeGit::new()
            .with("blame -- main.c", "1111111 (Ann 2024-01-01 10:00:00 +0000 1) int main;")
            .with("show -s --format=%s 1111111", "init");
        let config = Config::default();
        let analyzer = analyzer(&git, &config, dir.path());

        let report = analyzer.blame("main.c").unwrap();
        assert_eq!(report.lines.len(), 1);
        assert_eq!(report.lines[0].subject.as_deref(), Some("init"));

        assert!(analyzer.blame("missing.c").is_err());
    }

    #[test]
    fn test_suggest() {
        let diff = "diff --git a/a.py b/a.py\n--- /dev/null\n+++ b/a.py\n+def handler(event):";
        let git = FakeGit::new().with("diff --staged", diff);
        let config = Config::default();

        let report = analyzer(&git, &config, Path::new(".")).suggest();
        match report.classification {
            Classification::Classified(ref result) => {
                assert_eq!(result.change_type, ChangeType::FeatureAdd)
            }
            Classification::Empty => panic!("expected a classification"),
        }
        assert_eq!(report.messages[0], "feat: handler implementation");
    }

    #[test]
    fn test_suggest_without_staged_changes() {
        let git = FakeGit::new().with("diff --staged", "");
        let config = Config::default();
        let report = analyzer(&git, &config, Path::new(".")).suggest();
        assert_eq!(report.classification, Classification::Empty);
        assert!(report.messages.is_empty());
    }

    #[test]
    fn test_review_and_security() {
        let diff = "diff --git a/x.c b/x.c\n+// TODO free this\n+char *p = malloc(8);";
        let git = FakeGit::new().with("diff HEAD~1", diff);
        let config = Config::default();
        let analyzer = analyzer(&git, &config, Path::new("."));

        let review = analyzer.review().unwrap();
        assert_eq!(review.files_changed, 1);
        assert_eq!(review.concerns[0].flag, ConcernFlag::HasTodo);

        let audit = analyzer.security().unwrap();
        assert!(audit
            .concerns
            .iter()
            .any(|c| c.flag == ConcernFlag::HasUnfreedAllocation));

        let empty = FakeGit::new();
        assert!(Analyzer::new(&empty, &config, Path::new("."), Path::new("."))
            .review()
            .is_none());
    }

    #[test]
    fn test_impact_rejects_empty_target() {
        let git = FakeGit::new();
        let config = Config::default();
        assert!(analyzer(&git, &config, Path::new(".")).impact("  ").is_err());
    }
}
