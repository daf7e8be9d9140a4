//! Protection predicate: units that must never enter the candidate pool.
//!
//! Applied once by discovery. The search algorithms never consult it again.

use std::collections::BTreeSet;

use anyhow::{Context, Result};
use regex::Regex;

/// Names that are never treated as units, whatever the configuration says.
pub const RESERVED_NAMES: [&str; 4] = ["README", "README.md", "README.txt", "culprit.toml"];

#[derive(Debug, Clone, Default)]
pub struct Protection {
    names: BTreeSet<String>,
    patterns: Vec<Regex>,
}

impl Protection {
    /// Build from configured must-run-always names and regular expressions.
    pub fn new(names: &[String], patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                Regex::new(pattern).with_context(|| format!("compile protected pattern {pattern:?}"))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            names: names.iter().cloned().collect(),
            patterns,
        })
    }

    pub fn is_protected(&self, name: &str) -> bool {
        name.starts_with('.')
            || RESERVED_NAMES.contains(&name)
            || self.names.contains(name)
            || self.patterns.iter().any(|pattern| pattern.is_match(name))
    }
}
