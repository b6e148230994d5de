use std::collections::HashMap;

use crate::domain::{ArtifactKey, ResolvedSnapshots, VersionMap};

/// Property versions discovered during the first pass of a run
///
/// A property declared with a snapshot value in several modules keeps the
/// values of the last module scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyVersions {
    next: HashMap<String, String>,
    release: HashMap<String, String>,
}

impl PropertyVersions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record both values of a property, replacing earlier ones
    pub fn record(&mut self, name: &str, next: String, release: String) {
        self.next.insert(name.to_string(), next);
        self.release.insert(name.to_string(), release);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.next.contains_key(name)
    }

    /// Next development value
    pub fn next_value(&self, name: &str) -> Option<&str> {
        self.next.get(name).map(String::as_str)
    }

    /// Release value
    pub fn release_value(&self, name: &str) -> Option<&str> {
        self.release.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.next.len()
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_empty()
    }
}

/// Version maps consulted while rewriting references
#[derive(Debug, Clone, Copy)]
pub struct VersionTables<'a> {
    pub mapped: &'a VersionMap,
    pub original: &'a VersionMap,
    pub resolved: &'a ResolvedSnapshots,
}

impl<'a> VersionTables<'a> {
    /// Target version, falling back to a resolved snapshot
    pub fn target(&self, key: &ArtifactKey) -> Option<&'a str> {
        self.mapped
            .get(key)
            .or_else(|| self.resolved.get(key).map(|r| &r.mapped))
            .map(String::as_str)
    }

    /// Version being replaced, falling back to a resolved snapshot's original
    pub fn original(&self, key: &ArtifactKey) -> Option<&'a str> {
        self.original
            .get(key)
            .or_else(|| self.resolved.get(key).map(|r| &r.original))
            .map(String::as_str)
    }

    pub fn resolved(&self, key: &ArtifactKey) -> Option<&'a str> {
        self.resolved.get(key).map(|r| r.mapped.as_str())
    }
}
