//! Diff classification
//!
//! Keyword heuristics over raw diff text. Every rule is a plain substring
//! test, case-sensitive, over the whole diff. Rules live in ordered tables:
//! for the change type the first match wins, while concern checks are all
//! evaluated independently.

use std::collections::BTreeSet;

use serde::Serialize;

/// Kind of change a diff most likely represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChangeType {
    FeatureAdd,
    Fix,
    Refactor,
    Test,
    Docs,
    Chore,
}

impl ChangeType {
    pub fn label(&self) -> &'static str {
        match self {
            ChangeType::FeatureAdd => "feature-add",
            ChangeType::Fix => "fix",
            ChangeType::Refactor => "refactor",
            ChangeType::Test => "test",
            ChangeType::Docs => "docs",
            ChangeType::Chore => "chore",
        }
    }

    /// Conventional commit type
    pub fn prefix(&self) -> &'static str {
        match self {
            ChangeType::FeatureAdd => "feat",
            other => other.label(),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ChangeType::FeatureAdd => "add new feature",
            ChangeType::Fix => "resolve issue",
            ChangeType::Refactor => "improve code structure",
            ChangeType::Test => "add or update tests",
            ChangeType::Docs => "update documentation",
            ChangeType::Chore => "maintenance tasks",
        }
    }
}

struct TypeRule {
    change_type: ChangeType,
    matches: fn(&str) -> bool,
}

/// Evaluated top to bottom; `Chore` is the fallback
const TYPE_RULES: &[TypeRule] = &[
    TypeRule {
        change_type: ChangeType::FeatureAdd,
        matches: |d| d.contains("--- /dev/null") && d.contains("+++ b/"),
    },
    TypeRule {
        change_type: ChangeType::Fix,
        matches: |d| contains_any(d, &["fix", "bug", "error"]),
    },
    TypeRule {
        change_type: ChangeType::Refactor,
        matches: |d| contains_any(d, &["refactor", "cleanup", "optimize"]),
    },
    TypeRule {
        change_type: ChangeType::Test,
        matches: |d| d.contains("test"),
    },
    TypeRule {
        change_type: ChangeType::Docs,
        matches: |d| contains_any(d, &["doc", "readme", "comment"]),
    },
];

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

pub fn change_type(diff: &str) -> ChangeType {
    TYPE_RULES
        .iter()
        .find(|rule| (rule.matches)(diff))
        .map(|rule| rule.change_type)
        .unwrap_or(ChangeType::Chore)
}

/// Category of review or security attention
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcernFlag {
    HasTodo,
    HasDebugOutput,
    HasSecretLikeString,
    HasNewComment,
    HasProcessSpawn,
    HasUnsafeCall,
    HasUnfreedAllocation,
    HasPermissionChange,
}

impl ConcernFlag {
    pub fn tag(&self) -> &'static str {
        match self {
            ConcernFlag::HasTodo => "has-todo",
            ConcernFlag::HasDebugOutput => "has-debug-output",
            ConcernFlag::HasSecretLikeString => "has-secret-like-string",
            ConcernFlag::HasNewComment => "has-new-comment",
            ConcernFlag::HasProcessSpawn => "has-process-spawn",
            ConcernFlag::HasUnsafeCall => "has-unsafe-call",
            ConcernFlag::HasUnfreedAllocation => "has-unfreed-allocation",
            ConcernFlag::HasPermissionChange => "has-permission-change",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

pub struct ConcernCheck {
    pub flag: ConcernFlag,
    pub severity: Severity,
    pub warning: &'static str,
    matches: fn(&str) -> bool,
}

/// Checks run by the review checklist
pub const REVIEW_CHECKS: &[ConcernCheck] = &[
    ConcernCheck {
        flag: ConcernFlag::HasTodo,
        severity: Severity::Critical,
        warning: "TODO/FIXME comments added - consider addressing before merge",
        matches: |d| contains_any(d, &["TODO", "FIXME"]),
    },
    ConcernCheck {
        flag: ConcernFlag::HasDebugOutput,
        severity: Severity::Warning,
        warning: "Debug prints found - remove before production",
        matches: |d| contains_any(d, &["printf(", "console.log", "print("]),
    },
    ConcernCheck {
        flag: ConcernFlag::HasSecretLikeString,
        severity: Severity::Critical,
        warning: "Potential secrets in code - verify no hardcoded credentials",
        matches: |d| contains_any(d, &["password", "secret", "api_key"]),
    },
    ConcernCheck {
        flag: ConcernFlag::HasNewComment,
        severity: Severity::Info,
        warning: "New comments added - verify they provide useful context",
        matches: has_plain_comment,
    },
];

/// Checks run by the security audit
pub const SECURITY_CHECKS: &[ConcernCheck] = &[
    ConcernCheck {
        flag: ConcernFlag::HasProcessSpawn,
        severity: Severity::Critical,
        warning: "System command execution found - validate input sanitization",
        matches: |d| contains_any(d, &["system(", "exec(", "popen("]),
    },
    ConcernCheck {
        flag: ConcernFlag::HasUnsafeCall,
        severity: Severity::Warning,
        warning: "Unsafe string functions used - consider strncpy/strncat/snprintf",
        matches: |d| contains_any(d, &["strcpy(", "strcat(", "sprintf("]),
    },
    ConcernCheck {
        flag: ConcernFlag::HasUnfreedAllocation,
        severity: Severity::Info,
        warning: "Memory allocation without obvious free - check for leaks",
        matches: |d| d.contains("malloc(") && !d.contains("free("),
    },
    ConcernCheck {
        flag: ConcernFlag::HasSecretLikeString,
        severity: Severity::Warning,
        warning: "Security-related strings modified - verify no sensitive data exposure",
        matches: |d| contains_any(d, &["password", "secret", "key"]),
    },
    ConcernCheck {
        flag: ConcernFlag::HasPermissionChange,
        severity: Severity::Warning,
        warning: "Permission changes detected - review access control requirements",
        matches: |d| contains_any(d, &["permission", "chmod", "access"]),
    },
];

/// A `//` marker that is not the start of a TODO/FIXME note
fn has_plain_comment(diff: &str) -> bool {
    diff.match_indices("//").any(|(i, _)| {
        let rest = &diff[i + 2..];
        !(rest.starts_with(" TODO") || rest.starts_with(" FIXME"))
    })
}

/// A triggered check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Concern {
    pub flag: ConcernFlag,
    pub severity: Severity,
    pub warning: &'static str,
}

/// Run every check in `checks`, in table order
pub fn scan(diff: &str, checks: &[ConcernCheck]) -> Vec<Concern> {
    checks
        .iter()
        .filter(|check| (check.matches)(diff))
        .map(|check| Concern {
            flag: check.flag,
            severity: check.severity,
            warning: check.warning,
        })
        .collect()
}

/// Number of files touched, counted from `diff --git` headers
pub fn count_diff_files(diff: &str) -> usize {
    diff.lines().filter(|l| l.contains("diff --git")).count()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub change_type: ChangeType,
    pub description: &'static str,
    pub flags: BTreeSet<ConcernFlag>,
    pub files_changed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Classification {
    /// No diff text to classify
    Empty,
    Classified(ClassificationResult),
}

/// Assign a change type and collect every concern flag raised by the review
/// and security checks.
pub fn classify(diff: &str) -> Classification {
    if diff.trim().is_empty() {
        return Classification::Empty;
    }

    let change_type = change_type(diff);
    let flags = scan(diff, REVIEW_CHECKS)
        .into_iter()
        .chain(scan(diff, SECURITY_CHECKS))
        .map(|c| c.flag)
        .collect();

    Classification::Classified(ClassificationResult {
        change_type,
        description: change_type.description(),
        flags,
        files_changed: count_diff_files(diff),
    })
}

/// Result of a checklist pass over a diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiffReview {
    pub files_changed: usize,
    pub concerns: Vec<Concern>,
}

impl DiffReview {
    pub fn issues(&self) -> usize {
        self.concerns.len()
    }
}

/// Scan a diff with one check table; `None` when there is nothing to scan
pub fn review_diff(diff: &str, checks: &[ConcernCheck]) -> Option<DiffReview> {
    if diff.trim().is_empty() {
        return None;
    }

    Some(DiffReview {
        files_changed: count_diff_files(diff),
        concerns: scan(diff, checks),
    })
}

const DECLARATION_KEYWORDS: &[&str] = &["class", "function", "def", "fn"];
const MAX_IDENTIFIER_LEN: usize = 50;
pub const FALLBACK_SUBJECT: &str = "implement changes";

/// Subject derived from the first declaration on an added line, e.g.
/// `+pub fn parse_header(` becomes "parse_header implementation".
pub fn suggest_subject(diff: &str) -> String {
    for line in diff.lines() {
        let Some(added) = line.strip_prefix('+') else {
            continue;
        };
        if added.starts_with("++") {
            continue;
        }

        let mut tokens = added.split_whitespace();
        while let Some(token) = tokens.next() {
            if !DECLARATION_KEYWORDS.contains(&token) {
                continue;
            }
            let ident = tokens.next().map(identifier_prefix).unwrap_or("");
            if !ident.is_empty() && ident.chars().count() < MAX_IDENTIFIER_LEN {
                return format!("{} implementation", ident);
            }
            break;
        }
    }

    FALLBACK_SUBJECT.to_string()
}

fn identifier_prefix(token: &str) -> &str {
    let end = token
        .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '$'))
        .unwrap_or(token.len());
    &token[..end]
}

struct KeyChangeRule {
    needles: &'static [&'static str],
    phrase: &'static str,
}

const KEY_CHANGE_RULES: &[KeyChangeRule] = &[
    KeyChangeRule {
        needles: &["TODO", "FIXME"],
        phrase: "address code comments",
    },
    KeyChangeRule {
        needles: &["import", "include", "require"],
        phrase: "update dependencies",
    },
    KeyChangeRule {
        needles: &["config", "setting"],
        phrase: "update configuration",
    },
];

/// Short phrase for the dominant kind of edit, first match wins
pub fn key_change(diff: &str) -> Option<&'static str> {
    KEY_CHANGE_RULES
        .iter()
        .find(|rule| contains_any(diff, rule.needles))
        .map(|rule| rule.phrase)
}

/// Candidate commit messages in conventional commit form
pub fn commit_messages(diff: &str, result: &ClassificationResult) -> Vec<String> {
    let prefix = result.change_type.prefix();
    let mut messages = vec![
        format!("{}: {}", prefix, suggest_subject(diff)),
        format!(
            "{}: update {} files for {}",
            prefix, result.files_changed, result.description
        ),
    ];

    if let Some(phrase) = key_change(diff) {
        messages.push(format!("{}: {}", prefix, phrase));
    }

    messages
}
