//! Exclusion pattern matching.
//!
//! Patterns are regexes tested against paths relative to the sync root,
//! forward-slash separated on every platform. A path matching *any* pattern
//! never becomes a `LocalEntry`, which also shields its remote counterpart
//! from purge.

use crate::error::{StorageError, StorageResult};
use regex::Regex;
use std::path::Path;

/// Ordered set of compiled exclusion patterns, immutable for the run.
#[derive(Debug, Default)]
pub struct ExclusionSet {
    patterns: Vec<Regex>,
}

impl ExclusionSet {
    /// Compiles patterns, rejecting bad regexes as configuration errors.
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> StorageResult<Self> {
        let mut compiled = Vec::with_capacity(patterns.len());
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let regex = Regex::new(pattern).map_err(|e| {
                StorageError::Config(format!("invalid exclusion pattern '{pattern}': {e}"))
            })?;
            compiled.push(regex);
        }
        Ok(Self { patterns: compiled })
    }

    /// Loads newline-separated patterns from a file.
    ///
    /// Blank lines and `#` comment lines are ignored.
    pub fn from_file(path: &Path) -> StorageResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Config(format!("cannot read exclusion file {}: {e}", path.display()))
        })?;

        let lines: Vec<&str> = contents
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .collect();

        Self::from_patterns(&lines)
    }

    /// Returns true if any pattern matches the relative path.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(rel_path))
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }
}
