use regex::Regex;

use crate::{IngestError, Result};

/// Include/exclude pattern matcher over logical paths.
///
/// Excludes always dominate: a single exclude match rejects the path no
/// matter what the includes say. With no include match the path is rejected
/// (default-deny).
#[derive(Debug)]
pub struct PathFilter {
    exclude: Vec<Regex>,
    include: Vec<Regex>,
}

impl PathFilter {
    /// Compile the pattern lists. A malformed pattern is a setup-time error:
    /// silently dropping an exclude would widen what gets indexed.
    pub fn new(exclude: &[String], include: &[String]) -> Result<Self> {
        Ok(Self {
            exclude: compile(exclude)?,
            include: compile(include)?,
        })
    }

    pub fn accept(&self, path: &str) -> bool {
        if self.exclude.iter().any(|p| p.is_match(path)) {
            return false;
        }
        self.include.iter().any(|p| p.is_match(path))
    }
}

fn compile(patterns: &[String]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| IngestError::Pattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}
