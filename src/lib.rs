//! sandbox-idmap: uid/gid range mapping for nested sandboxes
//!
//! Validates that nested sandbox namespaces stay inside their parent's
//! namespace and computes the absolute host id range each one occupies.
//!
//! # Modules
//!
//! - **mapping**: Range entries, range sets and the mapping spec parser
//! - **registry**: Sandboxes keyed by hierarchical `/`-separated name
//! - **resolver**: Nested host range resolution
//! - **process**: Whole-input processing into report records
//! - **host**: Host default allocation from `/etc/subuid` and `/etc/subgid`
//!
//! # Example
//!
//! ```
//! use sandbox_idmap::process_lines;
//!
//! let records = process_lines(["c1 0:100000:65536", "c1/c2 0:1000:1000"])?;
//! assert_eq!(records[1].host_start, 101000);
//! assert_eq!(records[1].host_end, 102000);
//! # Ok::<(), sandbox_idmap::IdmapError>(())
//! ```

// Core modules
pub mod errors;
pub mod mapping;

// Layered modules
pub mod host;
pub mod process;
pub mod registry;
pub mod resolver;

// Public API
pub use errors::{IdmapError, Result};
pub use host::{DefaultMapping, HostIdConfig};
pub use mapping::{parse_spec, IdKind, MappingSpec, RangeEntry, RangeSet};
pub use process::{parse_line, process_file, process_lines, process_reader, ResolvedRecord};
pub use registry::{HostRange, Sandbox, SandboxRegistry};
pub use resolver::{resolve, resolve_all};
