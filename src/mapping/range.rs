//! Range entries and overlap-checked range sets

use crate::errors::{IdmapError, Result};
use serde::Serialize;
use std::fmt;

/// Number of distinct ids in the 32-bit Linux uid/gid space.
pub const ID_SPACE: u64 = 1 << 32;

/// Largest id a single spec field may name.
pub const MAX_ID: u64 = ID_SPACE - 1;

/// A contiguous bijection between namespace ids and host ids.
///
/// Namespace id `namespace_start + k` maps to host id `host_start + k`
/// for every `k` in `0..length`. Both intervals lie inside [`ID_SPACE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct RangeEntry {
    namespace_start: u64,
    host_start: u64,
    length: u64,
}

impl RangeEntry {
    /// Build an entry, rejecting empty ranges and ranges that leave the id space.
    pub fn new(namespace_start: u64, host_start: u64, length: u64) -> Result<Self> {
        if length == 0 {
            return Err(IdmapError::InvalidRange(format!(
                "{}:{}:{}: length must be greater than zero",
                namespace_start, host_start, length
            )));
        }
        for (field, value) in [
            ("namespace start", namespace_start),
            ("host start", host_start),
            ("length", length),
        ] {
            if value > MAX_ID {
                return Err(IdmapError::InvalidRange(format!(
                    "{} {} exceeds the maximum id {}",
                    field, value, MAX_ID
                )));
            }
        }
        if namespace_start + length > ID_SPACE || host_start + length > ID_SPACE {
            return Err(IdmapError::InvalidRange(format!(
                "{}:{}:{}: range runs past the maximum id {}",
                namespace_start, host_start, length, MAX_ID
            )));
        }

        Ok(Self {
            namespace_start,
            host_start,
            length,
        })
    }

    pub fn namespace_start(&self) -> u64 {
        self.namespace_start
    }

    /// Exclusive end of the namespace interval
    pub fn namespace_end(&self) -> u64 {
        self.namespace_start + self.length
    }

    pub fn host_start(&self) -> u64 {
        self.host_start
    }

    /// Exclusive end of the host interval
    pub fn host_end(&self) -> u64 {
        self.host_start + self.length
    }

    pub fn length(&self) -> u64 {
        self.length
    }

    pub fn contains_namespace_id(&self, id: u64) -> bool {
        id >= self.namespace_start && id < self.namespace_end()
    }

    pub fn contains_host_id(&self, id: u64) -> bool {
        id >= self.host_start && id < self.host_end()
    }

    pub fn namespace_overlaps(&self, other: &RangeEntry) -> bool {
        self.namespace_start < other.namespace_end() && other.namespace_start < self.namespace_end()
    }

    pub fn host_overlaps(&self, other: &RangeEntry) -> bool {
        self.host_start < other.host_end() && other.host_start < self.host_end()
    }

    /// Translate a namespace id into its host id, if this entry covers it.
    pub fn shift_to_host(&self, id: u64) -> Option<u64> {
        self.contains_namespace_id(id)
            .then(|| self.host_start + (id - self.namespace_start))
    }

    /// Translate a host id into its namespace id, if this entry covers it.
    pub fn shift_to_namespace(&self, id: u64) -> Option<u64> {
        self.contains_host_id(id)
            .then(|| self.namespace_start + (id - self.host_start))
    }
}

impl fmt::Display for RangeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.namespace_start, self.host_start, self.length)
    }
}

/// Ordered collection of non-overlapping range entries.
///
/// Entries are kept sorted by namespace start. Namespace intervals are
/// pairwise disjoint, and so are host intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RangeSet {
    entries: Vec<RangeEntry>,
}

impl RangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A set holding exactly one entry.
    pub fn single(entry: RangeEntry) -> Self {
        Self {
            entries: vec![entry],
        }
    }

    /// Insert an entry, leaving the set untouched if it collides with an existing one.
    pub fn append(&mut self, entry: RangeEntry) -> Result<()> {
        if let Some(conflicting) = self
            .entries
            .iter()
            .find(|e| e.namespace_overlaps(&entry) || e.host_overlaps(&entry))
        {
            return Err(IdmapError::Overlap {
                entry,
                conflicting: *conflicting,
            });
        }

        let idx = self
            .entries
            .partition_point(|e| e.namespace_start < entry.namespace_start);
        self.entries.insert(idx, entry);
        Ok(())
    }

    /// Map a namespace id to the host.
    pub fn shift_to_host(&self, id: u64) -> Result<u64> {
        let idx = self.entries.partition_point(|e| e.namespace_start <= id);
        idx.checked_sub(1)
            .and_then(|i| self.entries[i].shift_to_host(id))
            .ok_or(IdmapError::NotMapped(id))
    }

    /// Map a host id back into the namespace.
    pub fn shift_to_namespace(&self, id: u64) -> Result<u64> {
        self.entries
            .iter()
            .find_map(|e| e.shift_to_namespace(id))
            .ok_or(IdmapError::NotMapped(id))
    }

    pub fn entries(&self) -> &[RangeEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RangeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a RangeSet {
    type Item = &'a RangeEntry;
    type IntoIter = std::slice::Iter<'a, RangeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
