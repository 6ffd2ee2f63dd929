//! Query executor
//!
//! Runs the git binary and captures its stdout. Arguments are passed as an
//! argv vector, never through a shell, so paths with spaces need no quoting.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QueryError {
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("git {args} exited with {status}: {stderr}")]
    Failed {
        args: String,
        status: i32,
        stderr: String,
    },
}

/// Captured stdout of one query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOutput {
    /// Stdout with one trailing line terminator removed
    pub text: String,
    /// Output exceeded the capture ceiling and was cut
    pub truncated: bool,
}

impl QueryOutput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            truncated: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The only way the core talks to version control
pub trait GitQuery {
    /// Run a query and capture its output
    fn run(&self, args: &[&str]) -> Result<QueryOutput, QueryError>;

    /// Existence-style check: did the query exit successfully
    fn succeeds(&self, args: &[&str]) -> bool {
        self.run(args).is_ok()
    }

    /// Output text, or `None` when the query failed
    fn text(&self, args: &[&str]) -> Option<String> {
        match self.run(args) {
            Ok(output) => Some(output.text),
            Err(e) => {
                tracing::debug!("query failed: {}", e);
                None
            }
        }
    }
}

/// Executes queries with the git command line client
pub struct GitCli {
    program: String,
    workdir: PathBuf,
    max_output_bytes: usize,
}

impl GitCli {
    pub fn new(program: &str, workdir: &Path, max_output_bytes: usize) -> Self {
        Self {
            program: program.to_string(),
            workdir: workdir.to_path_buf(),
            max_output_bytes,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }
}

impl GitQuery for GitCli {
    fn run(&self, args: &[&str]) -> Result<QueryOutput, QueryError> {
        tracing::trace!("{} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| QueryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(QueryError::Failed {
                args: args.join(" "),
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let captured = capture(&stdout, self.max_output_bytes);
        if captured.truncated {
            tracing::warn!(
                "output of `{} {}` exceeded {} bytes and was truncated",
                self.program,
                args.join(" "),
                self.max_output_bytes
            );
        }

        Ok(captured)
    }
}

/// Apply the capture ceiling and strip one trailing line terminator.
/// A cut keeps only complete records, ending at a newline or a NUL (`-z`
/// listings); the partial last record is dropped.
fn capture(stdout: &str, max_bytes: usize) -> QueryOutput {
    let (mut text, truncated) = if stdout.len() > max_bytes {
        let mut end = max_bytes;
        while !stdout.is_char_boundary(end) {
            end -= 1;
        }
        let cut = &stdout[..end];
        let complete = cut.rfind(['\n', '\0']).map_or("", |i| &cut[..=i]);
        (complete, true)
    } else {
        (stdout, false)
    };

    if let Some(stripped) = text.strip_suffix('\n') {
        text = stripped.strip_suffix('\r').unwrap_or(stripped);
    }

    QueryOutput {
        text: text.to_string(),
        truncated,
    }
}

/// Count non-empty lines, the in-process equivalent of `| wc -l`
pub fn count_lines(text: &str) -> usize {
    text.lines().filter(|l| !l.trim().is_empty()).count()
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// Scripted executor keyed by the space-joined argument list
    #[derive(Default)]
    pub struct FakeGit {
        responses: HashMap<String, Option<QueryOutput>>,
        pub calls: RefCell<Vec<String>>,
    }

    impl FakeGit {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(mut self, args: &str, text: &str) -> Self {
            self.responses
                .insert(args.to_string(), Some(QueryOutput::new(text)));
            self
        }

        pub fn truncated(mut self, args: &str, text: &str) -> Self {
            self.responses.insert(
                args.to_string(),
                Some(QueryOutput {
                    text: text.to_string(),
                    truncated: true,
                }),
            );
            self
        }

        pub fn failing(mut self, args: &str) -> Self {
            self.responses.insert(args.to_string(), None);
            self
        }

        pub fn call_count(&self, prefix: &str) -> usize {
            self.calls
                .borrow()
                .iter()
                .filter(|c| c.starts_with(prefix))
                .count()
        }
    }

    impl GitQuery for FakeGit {
        fn run(&self, args: &[&str]) -> Result<QueryOutput, QueryError> {
            let key = args.join(" ");
            self.calls.borrow_mut().push(key.clone());
            match self.responses.get(&key) {
                Some(Some(output)) => Ok(output.clone()),
                _ => Err(QueryError::Failed {
                    args: key,
                    status: 128,
                    stderr: "unscripted".to_string(),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capture_strips_single_terminator() {
        assert_eq!(capture("abc\n", 100).text, "abc");
        assert_eq!(capture("abc\r\n", 100).text, "abc");
        assert_eq!(capture("abc\n\n", 100).text, "abc\n");
        assert_eq!(capture("", 100).text, "");
    }

    #[test]
    fn test_capture_truncates_on_char_boundary() {
        // cut lands inside 'é', then falls back to the last full line
        let out = capture("ab\nhéllo\n", 5);
        assert!(out.truncated);
        assert_eq!(out.text, "ab");

        let out = capture("héllo", 2);
        assert!(out.truncated);
        assert_eq!(out.text, "");

        let out = capture("hello", 5);
        assert!(!out.truncated);
        assert_eq!(out.text, "hello");
    }

    #[test]
    fn test_capture_keeps_only_complete_lines() {
        let out = capture("path/one.rs\npath/two.rs\n", 15);
        assert!(out.truncated);
        assert_eq!(out.text, "path/one.rs");

        // cut exactly at a line end keeps that line
        let out = capture("path/one.rs\npath/two.rs\n", 12);
        assert!(out.truncated);
        assert_eq!(out.text, "path/one.rs");

        let out = capture("a.rs\0b.rs\0", 7);
        assert!(out.truncated);
        assert_eq!(out.text, "a.rs\0");
    }

    #[test]
    fn test_count_lines() {
        assert_eq!(count_lines("a\nb\n\nc"), 3);
        assert_eq!(count_lines(""), 0);
    }

    #[test]
    fn test_fake_git_defaults() {
        let git = fake::FakeGit::new().with("status", "ok").failing("log");
        assert_eq!(git.text(&["status"]), Some("ok".to_string()));
        assert!(git.succeeds(&["status"]));
        assert!(!git.succeeds(&["log"]));
        assert!(!git.succeeds(&["unknown"]));
        assert_eq!(git.call_count("status"), 2);
    }
}
