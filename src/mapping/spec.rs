//! Parser for `[tag:]namespace:host:length` mapping descriptors

use super::range::RangeEntry;
use crate::errors::{IdmapError, Result};
use serde::Serialize;
use std::fmt;
use std::num::IntErrorKind;
use std::str::FromStr;

/// Which id space a mapping applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdKind {
    Uid,
    Gid,
    #[default]
    Both,
}

impl IdKind {
    fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "u" => Some(IdKind::Uid),
            "g" => Some(IdKind::Gid),
            "b" => Some(IdKind::Both),
            _ => None,
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdKind::Uid => "uid",
            IdKind::Gid => "gid",
            IdKind::Both => "uid+gid",
        })
    }
}

/// A parsed mapping descriptor: the id kind tag plus its range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingSpec {
    pub kind: IdKind,
    pub entry: RangeEntry,
}

/// Parse `[tag:]namespace:host:length`. An untagged spec applies to both kinds.
pub fn parse_spec(input: &str) -> Result<MappingSpec> {
    let input = input.trim();
    let fields: Vec<&str> = input.split(':').collect();

    let (kind, numbers) = match fields.as_slice() {
        [ns, host, len] => (IdKind::Both, [*ns, *host, *len]),
        [tag, ns, host, len] => {
            let kind = IdKind::from_tag(tag).ok_or_else(|| {
                IdmapError::MalformedSpec(format!("unknown id kind '{}' in '{}'", tag, input))
            })?;
            (kind, [*ns, *host, *len])
        }
        _ => {
            return Err(IdmapError::MalformedSpec(format!(
                "expected [tag:]namespace:host:length, got '{}'",
                input
            )))
        }
    };

    let [ns, host, len] = numbers;
    let entry = RangeEntry::new(
        parse_id(ns, input)?,
        parse_id(host, input)?,
        parse_id(len, input)?,
    )?;

    Ok(MappingSpec { kind, entry })
}

fn parse_id(field: &str, input: &str) -> Result<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(IdmapError::MalformedSpec(format!(
            "'{}' is not a non-negative decimal number in '{}'",
            field, input
        )));
    }
    field.parse::<u64>().map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => {
            IdmapError::InvalidRange(format!("'{}' is too large in '{}'", field, input))
        }
        _ => IdmapError::MalformedSpec(format!("invalid number '{}' in '{}'", field, input)),
    })
}

impl FromStr for RangeEntry {
    type Err = IdmapError;

    fn from_str(s: &str) -> Result<Self> {
        parse_spec(s).map(|spec| spec.entry)
    }
}
