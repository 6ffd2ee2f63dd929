//! Git operations module
//!
//! Provides:
//! - Query execution against the git binary
//! - Commit, branch, file and blame extraction
//! - Working tree and ref listings

pub mod blame;
pub mod branches;
pub mod commits;
pub mod files;
pub mod query;
pub mod worktree;

pub use blame::extract_blame;
pub use branches::{current_branch, extract_branches};
pub use commits::{extract_commits, parse_shortstat, parse_shortstat_lines};
pub use files::extract_files;
pub use query::{count_lines, GitCli, GitQuery, QueryError, QueryOutput};
pub use worktree::{branch_ages, stash_count, status_entries, tree_entries};
