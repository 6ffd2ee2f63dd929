use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub limits: Limits,
    pub git: GitSettings,
    pub hotfiles: HotFiles,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Commits fetched from the log
    pub max_commits: usize,
    /// Tracked files examined for change counts
    pub max_files: usize,
    pub max_branches: usize,
    /// Distinct authors tracked by the activity summary
    pub max_authors: usize,
    /// Entries shown in the hot files ranking
    pub hot_files: usize,
    /// Lines shown by blame
    pub blame_lines: usize,
    /// Captured stdout ceiling per query, in bytes
    pub max_output_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_commits: 1000,
            max_files: 500,
            max_branches: 100,
            max_authors: 50,
            hot_files: 10,
            blame_lines: 10,
            max_output_bytes: 1024 * 1024,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitSettings {
    /// Executable used for every query
    pub program: String,
    /// Branches treated as trunk (never merged, never deletable)
    pub trunk_branches: Vec<String>,
    /// Field separator for log listings
    pub delimiter: char,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            program: "git".to_string(),
            trunk_branches: vec!["main".to_string(), "master".to_string()],
            delimiter: '|',
        }
    }
}

impl GitSettings {
    pub fn is_trunk(&self, name: &str) -> bool {
        self.trunk_branches.iter().any(|t| t == name)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct HotFiles {
    /// Glob patterns excluded from the ranking
    pub ignore: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        config.validate()?;

        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    fn validate(&self) -> Result<()> {
        let delimiter = self.git.delimiter;
        if delimiter.is_alphanumeric() || delimiter.is_whitespace() {
            anyhow::bail!(
                "git.delimiter '{}' must be a punctuation character, not a letter, digit or space",
                delimiter
            );
        }
        if delimiter == '%' {
            anyhow::bail!("git.delimiter '%' clashes with git format placeholders");
        }

        if self.git.trunk_branches.len() > 2 {
            anyhow::bail!(
                "git.trunk_branches lists {} branches; at most 2 are supported",
                self.git.trunk_branches.len()
            );
        }

        let limits = [
            ("max_commits", self.limits.max_commits),
            ("max_files", self.limits.max_files),
            ("max_branches", self.limits.max_branches),
            ("max_authors", self.limits.max_authors),
            ("hot_files", self.limits.hot_files),
            ("blame_lines", self.limits.blame_lines),
            ("max_output_bytes", self.limits.max_output_bytes),
        ];
        for (name, value) in limits {
            if value == 0 {
                anyhow::bail!("limits.{} must be greater than zero", name);
            }
        }

        for pattern in &self.hotfiles.ignore {
            glob::Pattern::new(pattern)
                .with_context(|| format!("Invalid hotfiles.ignore pattern '{}'", pattern))?;
        }

        Ok(())
    }

    /// Compiled ignore patterns for the hot files ranking
    pub fn ignore_patterns(&self) -> Vec<glob::Pattern> {
        self.hotfiles
            .ignore
            .iter()
            .filter_map(|p| glob::Pattern::new(p).ok())
            .collect()
    }
}
