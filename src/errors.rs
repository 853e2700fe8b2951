//! Error types for id mapping operations

use crate::mapping::RangeEntry;
use std::io;
use thiserror::Error;

/// Result type for id mapping operations
pub type Result<T> = std::result::Result<T, IdmapError>;

/// Errors that can occur while parsing, validating or resolving id mappings
#[derive(Error, Debug)]
pub enum IdmapError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Malformed mapping: {0}")]
    MalformedSpec(String),

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Mapping {entry} overlaps existing mapping {conflicting}")]
    Overlap {
        entry: RangeEntry,
        conflicting: RangeEntry,
    },

    #[error("Sandbox '{0}' is already defined")]
    DuplicateName(String),

    #[error("Invalid sandbox name: '{0}'")]
    InvalidName(String),

    #[error("Sandbox '{0}' is not defined")]
    Undefined(String),

    #[error("Parent '{parent}' of sandbox '{name}' is not defined")]
    ParentUndefined { name: String, parent: String },

    #[error("Sandbox '{name}' namespace range {child} is not contained in parent '{parent}' range {parent_range}")]
    ContainmentViolation {
        name: String,
        parent: String,
        child: RangeEntry,
        parent_range: RangeEntry,
    },

    #[error("Id {0} is not covered by any mapping")]
    NotMapped(u64),

    #[error("Host mapping error: {0}")]
    HostMapping(String),

    #[error("line {line}: {source}")]
    AtLine {
        line: usize,
        #[source]
        source: Box<IdmapError>,
    },
}

impl IdmapError {
    /// Attach the 1-based input line number to an error.
    pub fn at_line(self, line: usize) -> Self {
        IdmapError::AtLine {
            line,
            source: Box::new(self),
        }
    }

    /// The underlying error with any line context removed.
    pub fn root_cause(&self) -> &IdmapError {
        match self {
            IdmapError::AtLine { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// The input line the error was raised on, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            IdmapError::AtLine { line, .. } => Some(*line),
            _ => None,
        }
    }

    /// Short stable name of the error kind, ignoring line context.
    pub fn kind(&self) -> &'static str {
        match self {
            IdmapError::AtLine { source, .. } => source.kind(),
            IdmapError::Io(_) => "io",
            IdmapError::MalformedSpec(_) => "malformed-spec",
            IdmapError::InvalidRange(_) => "invalid-range",
            IdmapError::Overlap { .. } => "overlap",
            IdmapError::DuplicateName(_) => "duplicate-name",
            IdmapError::InvalidName(_) => "invalid-name",
            IdmapError::Undefined(_) => "undefined",
            IdmapError::ParentUndefined { .. } => "parent-undefined",
            IdmapError::ContainmentViolation { .. } => "containment-violation",
            IdmapError::NotMapped(_) => "not-mapped",
            IdmapError::HostMapping(_) => "host-mapping",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = IdmapError::DuplicateName("c1".to_string());
        assert_eq!(err.to_string(), "Sandbox 'c1' is already defined");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = IdmapError::from(io_err);
        assert!(err.to_string().contains("IO error"));
        assert_eq!(err.kind(), "io");
    }

    #[test]
    fn test_line_context_is_transparent_to_kind() {
        let err = IdmapError::NotMapped(7).at_line(3);
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.kind(), "not-mapped");
        assert!(matches!(err.root_cause(), IdmapError::NotMapped(7)));
        assert_eq!(err.to_string(), "line 3: Id 7 is not covered by any mapping");
    }

    #[test]
    fn test_overlap_display_names_both_entries() {
        let err = IdmapError::Overlap {
            entry: RangeEntry::new(500, 200000, 1000).unwrap(),
            conflicting: RangeEntry::new(0, 100000, 1000).unwrap(),
        };
        let msg = err.to_string();
        assert!(msg.contains("500:200000:1000"));
        assert!(msg.contains("0:100000:1000"));
    }
}
