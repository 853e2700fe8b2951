//! Host default id allocation
//!
//! Reads the subordinate id ranges delegated to a user from `/etc/subuid`
//! and `/etc/subgid` (`user:start:count` lines). Hosts without those files
//! get a fixed fallback allocation.

use crate::errors::{IdmapError, Result};
use crate::mapping::{RangeEntry, RangeSet};
use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// First host id of the fallback allocation
pub const FALLBACK_HOST_START: u64 = 1_000_000;
/// Size of the fallback allocation
pub const FALLBACK_LENGTH: u64 = 1_000_000_000;

/// Where to look for the host's subordinate id ranges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostIdConfig {
    pub user: String,
    pub subuid_path: PathBuf,
    pub subgid_path: PathBuf,
}

impl Default for HostIdConfig {
    fn default() -> Self {
        Self {
            user: "root".to_string(),
            subuid_path: PathBuf::from("/etc/subuid"),
            subgid_path: PathBuf::from("/etc/subgid"),
        }
    }
}

/// The host's default uid and gid allocations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultMapping {
    pub uid: RangeSet,
    pub gid: RangeSet,
}

impl DefaultMapping {
    /// Load the allocation for `config.user`, falling back when a file is absent.
    pub fn detect(config: &HostIdConfig) -> Result<Self> {
        Ok(Self {
            uid: load_subid_file(&config.subuid_path, &config.user)?,
            gid: load_subid_file(&config.subgid_path, &config.user)?,
        })
    }

    pub fn fallback() -> Result<Self> {
        Ok(Self {
            uid: fallback_set()?,
            gid: fallback_set()?,
        })
    }

    /// Human readable lines, one per entry, uid entries first.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (kind, set) in [("uid", &self.uid), ("gid", &self.gid)] {
            for entry in set {
                lines.push(describe_entry(kind, entry));
            }
        }
        lines
    }
}

fn describe_entry(kind: &str, entry: &RangeEntry) -> String {
    format!(
        "host {} {} - {} mapping to {} - {} in container",
        kind,
        entry.host_start(),
        entry.host_end() - 1,
        entry.namespace_start(),
        entry.namespace_end() - 1
    )
}

fn fallback_set() -> Result<RangeSet> {
    Ok(RangeSet::single(RangeEntry::new(
        0,
        FALLBACK_HOST_START,
        FALLBACK_LENGTH,
    )?))
}

fn load_subid_file(path: &Path, user: &str) -> Result<RangeSet> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(
                "{} not found, using fallback allocation {}:{}",
                path.display(),
                FALLBACK_HOST_START,
                FALLBACK_LENGTH
            );
            return fallback_set();
        }
        Err(e) => return Err(e.into()),
    };

    let set = parse_subid(&content, user).map_err(|e| {
        IdmapError::HostMapping(format!("{}: {}", path.display(), e))
    })?;
    if set.is_empty() {
        return Err(IdmapError::HostMapping(format!(
            "{}: no entry for user '{}'",
            path.display(),
            user
        )));
    }
    debug!(
        "Loaded {} ranges for '{}' from {}",
        set.len(),
        user,
        path.display()
    );
    Ok(set)
}

/// Collect the ranges delegated to `user`, numbering namespace ids from zero
/// in file order.
pub fn parse_subid(content: &str, user: &str) -> Result<RangeSet> {
    let mut set = RangeSet::new();
    let mut next_namespace_id = 0u64;

    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split(':');
        if fields.next() != Some(user) {
            continue;
        }

        let (start, count) = match (fields.next(), fields.next(), fields.next()) {
            (Some(start), Some(count), None) => (start, count),
            _ => {
                return Err(IdmapError::MalformedSpec(format!(
                    "line {}: expected user:start:count",
                    idx + 1
                )))
            }
        };
        let start = start.parse::<u64>().map_err(|_| {
            IdmapError::MalformedSpec(format!("line {}: invalid start '{}'", idx + 1, start))
        })?;
        let count = count.parse::<u64>().map_err(|_| {
            IdmapError::MalformedSpec(format!("line {}: invalid count '{}'", idx + 1, count))
        })?;

        let entry = RangeEntry::new(next_namespace_id, start, count)
            .map_err(|e| e.at_line(idx + 1))?;
        set.append(entry).map_err(|e| e.at_line(idx + 1))?;
        next_namespace_id = entry.namespace_end();
    }

    Ok(set)
}
