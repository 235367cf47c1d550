//! Glob rule matching for exclude and skip patterns
//!
//! Patterns and candidate paths are both root-relative and use `/` as the
//! separator. `*` and `?` never cross a separator, `**` does.

use crate::types::DirsyncError;
use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;

/// An ordered, de-duplicated set of glob patterns with a compiled matcher
#[derive(Debug, Clone)]
pub struct PatternSet {
    /// Sorted patterns; index `i` is glob `i` of `compiled`
    patterns: Vec<String>,
    compiled: GlobSet,
}

impl PatternSet {
    /// Create an empty pattern set (matches nothing)
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            compiled: GlobSet::empty(),
        }
    }

    /// Build a set from raw patterns, normalizing separators
    ///
    /// # Errors
    /// Returns `DirsyncError::Pattern` for the first pattern that does not compile.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self, DirsyncError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.extend(patterns)?;
        Ok(set)
    }

    /// Add one pattern. Returns `false` if it was already present.
    pub fn insert(&mut self, pattern: &str) -> Result<bool, DirsyncError> {
        let added = self.push_sorted(pattern)?;
        if added {
            self.rebuild()?;
        }
        Ok(added)
    }

    /// Add many patterns, recompiling once
    pub fn extend<I, S>(&mut self, patterns: I) -> Result<(), DirsyncError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut changed = false;
        for pattern in patterns {
            changed |= self.push_sorted(pattern.as_ref())?;
        }
        if changed {
            self.rebuild()?;
        }
        Ok(())
    }

    /// Check whether any pattern matches `path`
    pub fn is_match(&self, path: &str) -> bool {
        !self.patterns.is_empty() && self.compiled.is_match(normalize(path))
    }

    /// All patterns matching `path`, in sorted order
    pub fn matching(&self, path: &str) -> Vec<&str> {
        if self.patterns.is_empty() {
            return Vec::new();
        }
        let mut hits = self.compiled.matches(normalize(path));
        hits.sort_unstable();
        hits.into_iter().map(|i| self.patterns[i].as_str()).collect()
    }

    /// Keep only the patterns contained in `used`
    pub fn retain_used(&mut self, used: &HashSet<String>) -> Result<Vec<String>, DirsyncError> {
        let (kept, dropped): (Vec<String>, Vec<String>) = std::mem::take(&mut self.patterns)
            .into_iter()
            .partition(|p| used.contains(p));
        self.patterns = kept;
        if !dropped.is_empty() {
            self.rebuild()?;
        }
        Ok(dropped)
    }

    pub fn contains(&self, pattern: &str) -> bool {
        self.patterns.binary_search(&normalize(pattern)).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns as owned strings (sorted), for persisting
    pub fn to_vec(&self) -> Vec<String> {
        self.patterns.clone()
    }

    fn push_sorted(&mut self, pattern: &str) -> Result<bool, DirsyncError> {
        let pattern = normalize(pattern);
        compile(&pattern)?;
        match self.patterns.binary_search(&pattern) {
            Ok(_) => Ok(false),
            Err(pos) => {
                self.patterns.insert(pos, pattern);
                Ok(true)
            }
        }
    }

    fn rebuild(&mut self) -> Result<(), DirsyncError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in &self.patterns {
            builder.add(compile(pattern)?);
        }
        self.compiled = builder.build().map_err(|e| DirsyncError::Pattern {
            pattern: self.patterns.join(", "),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for PatternSet {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl Eq for PatternSet {}

/// Test a root-relative path against a plain list of patterns
pub fn matches<S: AsRef<str>>(path: &str, patterns: &[S]) -> Result<bool, DirsyncError> {
    Ok(PatternSet::from_patterns(patterns)?.is_match(path))
}

/// Convert separators to `/`
pub fn normalize(path: &str) -> String {
    path.replace('\\', "/")
}

/// Turn a literal relative path into a pattern matching only that path
pub fn escape(literal: &str) -> String {
    let mut out = String::with_capacity(literal.len());
    for c in normalize(literal).chars() {
        match c {
            '*' | '?' | '[' | '{' | '}' => {
                out.push('[');
                out.push(c);
                out.push(']');
            }
            _ => out.push(c),
        }
    }
    out
}

/// Join a root-relative directory and an entry name with `/`
pub fn join_relative(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Pattern for every entry with extension `ext` directly inside `dir`
///
/// `ext` includes its leading dot, e.g. `".jpg"`.
pub fn extension_pattern(dir: &str, ext: &str) -> String {
    join_relative(&escape(dir), &format!("*{}", escape(ext)))
}

fn compile(pattern: &str) -> Result<Glob, DirsyncError> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .backslash_escape(false)
        .build()
        .map_err(|e| DirsyncError::Pattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}
