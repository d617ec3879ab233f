//! Run configuration.
//!
//! A [`Policy`] bundles everything that used to differ between the two
//! hand-maintained transformers: the active prefix, which prefixes count as
//! "already transformed", which directories are off limits, how candidates are
//! ordered and how files are moved. Two presets exist, [`Policy::st6`] and
//! [`Policy::seal`]; callers may adjust either before building a transformer.

use anyhow::{Context, Result, bail};
use glob::Pattern;
use serde::Serialize;
use std::ffi::{OsStr, OsString};

/// Short code prefix.
pub const ST6_PREFIX: &str = "ST6_";
/// Human-readable prefix.
pub const SEAL_PREFIX: &str = "SEAL-TEAM-Six-";

/// Every prefix this tool has ever written. A name bearing any of them is
/// considered transformed, whatever the active prefix is.
pub const KNOWN_PREFIXES: &[&str] = &[ST6_PREFIX, SEAL_PREFIX];

/// Version-control metadata directories. Always skipped.
pub const VCS_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// How a candidate is moved to its prefixed name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RenameStrategy {
    /// Copy bytes and metadata, then delete the original. Works across devices.
    CopyDelete,
    /// Single `rename(2)`. Same filesystem only.
    Move,
}

/// Order in which candidates are renamed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrder {
    /// Whatever order the directory walk yields.
    WalkOrder,
    /// Lexicographic by path, for reproducible logs.
    Sorted,
}

#[derive(Debug, Clone)]
pub struct Policy {
    /// Prefix prepended to every candidate's file name.
    pub prefix: String,
    /// Prefixes that mark a name as already transformed. Always contains `prefix`.
    pub known_prefixes: Vec<String>,
    /// Dot-names that are not treated as hidden (e.g. `.gitignore`).
    pub hidden_exemptions: Vec<String>,
    /// Directory names never descended into.
    pub denylist: Vec<String>,
    /// Extra name patterns to skip, matched against each path segment.
    pub excludes: Vec<Pattern>,
    pub ordering: CandidateOrder,
    pub strategy: RenameStrategy,
}

impl Policy {
    /// The `ST6_` preset: sorted, atomic moves, skips build directories and
    /// hidden entries other than `.gitignore`.
    pub fn st6() -> Self {
        Self {
            prefix: ST6_PREFIX.to_string(),
            known_prefixes: known_prefixes_with(ST6_PREFIX),
            hidden_exemptions: vec![".gitignore".to_string()],
            denylist: ["node_modules", "__pycache__", ".next", "dist", "build"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            excludes: Vec::new(),
            ordering: CandidateOrder::Sorted,
            strategy: RenameStrategy::Move,
        }
    }

    /// The `SEAL-TEAM-Six-` preset: walk order, copy+delete, skips every
    /// hidden entry and nothing else.
    pub fn seal() -> Self {
        Self {
            prefix: SEAL_PREFIX.to_string(),
            known_prefixes: known_prefixes_with(SEAL_PREFIX),
            hidden_exemptions: Vec::new(),
            denylist: Vec::new(),
            excludes: Vec::new(),
            ordering: CandidateOrder::WalkOrder,
            strategy: RenameStrategy::CopyDelete,
        }
    }

    /// Replaces the active prefix. The old one stays in the known set so files
    /// it produced are still left alone.
    ///
    /// An empty prefix is rejected: every name would count as transformed and
    /// nothing could be renamed.
    pub fn with_prefix(mut self, prefix: &str) -> Result<Self> {
        if prefix.is_empty() {
            bail!("Prefix must not be empty");
        }
        self.prefix = prefix.to_string();
        if !self.known_prefixes.iter().any(|p| p == prefix) {
            self.known_prefixes.insert(0, prefix.to_string());
        }
        Ok(self)
    }

    pub fn with_strategy(mut self, strategy: RenameStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Adds exclusion globs such as `"vendor"` or `"*.generated.js"`.
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self> {
        for raw in patterns {
            let pattern = Pattern::new(raw)
                .with_context(|| format!("Invalid exclude pattern '{}'", raw))?;
            self.excludes.push(pattern);
        }
        Ok(self)
    }

    /// True if `name` starts with any known prefix.
    pub fn is_prefixed(&self, name: &str) -> bool {
        self.known_prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// The target name for `name`. Bytes that are not valid UTF-8 are kept.
    pub fn prefixed(&self, name: impl AsRef<OsStr>) -> OsString {
        let mut target = OsString::from(&self.prefix);
        target.push(name);
        target
    }

    /// True if a path segment (directory or file name below the root) rules
    /// out everything beneath it.
    pub fn is_excluded_segment(&self, segment: &str) -> bool {
        if VCS_DIRS.contains(&segment) {
            return true;
        }
        if segment.starts_with('.') && !self.hidden_exemptions.iter().any(|e| e == segment) {
            return true;
        }
        if self.denylist.iter().any(|d| d == segment) {
            return true;
        }
        self.excludes.iter().any(|p| p.matches(segment))
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::st6()
    }
}

fn known_prefixes_with(active: &str) -> Vec<String> {
    let mut prefixes = vec![active.to_string()];
    prefixes.extend(
        KNOWN_PREFIXES
            .iter()
            .filter(|p| **p != active)
            .map(|p| p.to_string()),
    );
    prefixes
}
