//! GitSmart - Git repository analysis
//!
//! Reports on a repository by running the git binary and parsing its output:
//! - Commit, branch, file and blame extraction into typed records
//! - Author activity, change totals and branch merge status
//! - Hot file ranking
//! - Keyword classification of diffs for commit suggestions, review and
//!   security checklists

pub mod aggregate;
pub mod analyzer;
pub mod classify;
pub mod config;
pub mod git;
pub mod insights;
pub mod model;
pub mod rank;
pub mod report;

pub use analyzer::Analyzer;
pub use classify::{classify, ChangeType, Classification, ClassificationResult, ConcernFlag};
pub use config::Config;
pub use git::{GitCli, GitQuery, QueryError};
pub use model::{BranchRecord, CommitRecord, CommitStats, FileRecord, RecordBatch};
