//! Sandbox registry keyed by hierarchical name

use crate::errors::{IdmapError, Result};
use crate::mapping::RangeEntry;
use serde::Serialize;
use std::collections::HashMap;

/// Absolute host id range occupied by a sandbox, `end` exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HostRange {
    pub start: u64,
    pub end: u64,
}

impl HostRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, id: u64) -> bool {
        id >= self.start && id < self.end
    }
}

/// A nested namespace and its mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sandbox {
    name: String,
    mapping: RangeEntry,
    resolved: Option<HostRange>,
}

impl Sandbox {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mapping(&self) -> &RangeEntry {
        &self.mapping
    }

    /// Absolute host range, once the resolver has run for this sandbox
    pub fn resolved(&self) -> Option<HostRange> {
        self.resolved
    }

    pub fn is_root(&self) -> bool {
        parent_name(&self.name).is_none()
    }
}

/// Name of the enclosing sandbox: `a/b/c` -> `a/b`, `a` -> none.
pub fn parent_name(name: &str) -> Option<&str> {
    name.rsplit_once('/').map(|(parent, _)| parent)
}

/// Sandboxes in input order, addressable by name.
#[derive(Debug, Default)]
pub struct SandboxRegistry {
    sandboxes: Vec<Sandbox>,
    index: HashMap<String, usize>,
}

impl SandboxRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an unresolved sandbox. Names must be unique and have no empty segments.
    pub fn register(&mut self, name: &str, mapping: RangeEntry) -> Result<()> {
        if name.split('/').any(str::is_empty) {
            return Err(IdmapError::InvalidName(name.to_string()));
        }
        if self.index.contains_key(name) {
            return Err(IdmapError::DuplicateName(name.to_string()));
        }

        self.index.insert(name.to_string(), self.sandboxes.len());
        self.sandboxes.push(Sandbox {
            name: name.to_string(),
            mapping,
            resolved: None,
        });
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<&Sandbox> {
        self.index.get(name).map(|&idx| &self.sandboxes[idx])
    }

    pub(crate) fn mark_resolved(&mut self, name: &str, range: HostRange) {
        if let Some(&idx) = self.index.get(name) {
            self.sandboxes[idx].resolved = Some(range);
        }
    }

    /// Sandboxes in registration order
    pub fn iter(&self) -> std::slice::Iter<'_, Sandbox> {
        self.sandboxes.iter()
    }

    pub fn len(&self) -> usize {
        self.sandboxes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sandboxes.is_empty()
    }
}

impl<'a> IntoIterator for &'a SandboxRegistry {
    type Item = &'a Sandbox;
    type IntoIter = std::slice::Iter<'a, Sandbox>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
