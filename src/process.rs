//! Whole-input processing: lines in, resolved records out
//!
//! Each line is `<name> <spec>`. Sandboxes are registered and resolved one
//! line at a time, so a parent must appear before its children. The first
//! failure aborts the run and no records are returned.

use crate::errors::{IdmapError, Result};
use crate::mapping::{parse_spec, IdKind, RangeEntry};
use crate::registry::{Sandbox, SandboxRegistry};
use crate::resolver::resolve;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// One row of the final report. Ends are exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRecord {
    pub name: String,
    pub namespace_start: u64,
    pub namespace_end: u64,
    pub host_start: u64,
    pub host_end: u64,
}

impl ResolvedRecord {
    /// Build a record from a resolved sandbox; `None` if it was never resolved.
    pub fn from_sandbox(sandbox: &Sandbox) -> Option<Self> {
        let range = sandbox.resolved()?;
        Some(Self {
            name: sandbox.name().to_string(),
            namespace_start: sandbox.mapping().namespace_start(),
            namespace_end: sandbox.mapping().namespace_end(),
            host_start: range.start,
            host_end: range.end,
        })
    }
}

/// A sandbox definition read from one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxLine<'a> {
    pub name: &'a str,
    pub entry: RangeEntry,
}

/// Parse `<name> <spec>`. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<SandboxLine<'_>>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = trimmed.split_whitespace().collect();
    let (name, spec) = match fields.as_slice() {
        [name, spec] => (*name, *spec),
        [name] => {
            return Err(IdmapError::MalformedSpec(format!(
                "sandbox '{}' has no mapping",
                name
            )))
        }
        _ => {
            return Err(IdmapError::MalformedSpec(format!(
                "too many fields: expected '<name> <spec>', got {}",
                fields.len()
            )))
        }
    };

    let spec = parse_spec(spec)?;
    if spec.kind != IdKind::Both {
        return Err(IdmapError::MalformedSpec(format!(
            "sandbox '{}' maps only {}; sandbox mappings apply to both uid and gid",
            name, spec.kind
        )));
    }

    Ok(Some(SandboxLine {
        name,
        entry: spec.entry,
    }))
}

/// Register and resolve every line in order, returning one record per sandbox.
pub fn process_lines<I, S>(lines: I) -> Result<Vec<ResolvedRecord>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut registry = SandboxRegistry::new();

    for (idx, line) in lines.into_iter().enumerate() {
        let line_no = idx + 1;
        let Some(parsed) = parse_line(line.as_ref()).map_err(|e| e.at_line(line_no))? else {
            continue;
        };
        debug!(
            "line {}: sandbox '{}' mapping {}",
            line_no, parsed.name, parsed.entry
        );

        registry
            .register(parsed.name, parsed.entry)
            .map_err(|e| e.at_line(line_no))?;
        resolve(&mut registry, parsed.name).map_err(|e| e.at_line(line_no))?;
    }

    info!("Resolved {} sandboxes", registry.len());
    Ok(registry
        .iter()
        .filter_map(ResolvedRecord::from_sandbox)
        .collect())
}

/// Read the whole input once, then process it.
pub fn process_reader<R: Read>(mut reader: R) -> Result<Vec<ResolvedRecord>> {
    let mut content = String::new();
    reader.read_to_string(&mut content)?;
    process_lines(content.lines())
}

pub fn process_file(path: impl AsRef<Path>) -> Result<Vec<ResolvedRecord>> {
    let path = path.as_ref();
    info!("Processing sandbox file {}", path.display());
    process_reader(File::open(path)?)
}
