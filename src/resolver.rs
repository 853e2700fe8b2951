//! Nested resolution of sandbox host ranges
//!
//! A root sandbox (single-segment name) occupies `host_start..host_start + length`
//! on the host directly. A nested sandbox's `host_start` is its position inside
//! the parent's namespace; the resolver anchors that position at the parent's
//! already-resolved host start to find where the child really lives.
//!
//! Containment rule: the child's namespace interval must start at or after the
//! parent's namespace start and end strictly before the parent's namespace end.

use crate::errors::{IdmapError, Result};
use crate::mapping::{RangeEntry, RangeSet};
use crate::registry::{parent_name, HostRange, SandboxRegistry};
use log::debug;

/// Compute and record the absolute host range of `name`.
///
/// The parent must already be resolved; ancestors are never resolved on demand.
pub fn resolve(registry: &mut SandboxRegistry, name: &str) -> Result<HostRange> {
    let entry = *registry
        .lookup(name)
        .ok_or_else(|| IdmapError::Undefined(name.to_string()))?
        .mapping();

    let range = match parent_name(name) {
        None => HostRange {
            start: entry.host_start(),
            end: entry.host_end(),
        },
        Some(parent) => {
            let (parent_entry, parent_range) = registry
                .lookup(parent)
                .and_then(|p| p.resolved().map(|r| (*p.mapping(), r)))
                .ok_or_else(|| IdmapError::ParentUndefined {
                    name: name.to_string(),
                    parent: parent.to_string(),
                })?;

            check_containment(name, parent, &entry, &parent_entry)?;
            compose(&entry, &parent_entry, parent_range)?
        }
    };

    debug!(
        "Resolved '{}' to host range {}..{}",
        name, range.start, range.end
    );
    registry.mark_resolved(name, range);
    Ok(range)
}

/// Resolve every registered sandbox in registration order.
pub fn resolve_all(registry: &mut SandboxRegistry) -> Result<()> {
    let names: Vec<String> = registry.iter().map(|s| s.name().to_string()).collect();
    for name in &names {
        resolve(registry, name)?;
    }
    Ok(())
}

fn check_containment(
    name: &str,
    parent: &str,
    child: &RangeEntry,
    parent_entry: &RangeEntry,
) -> Result<()> {
    if child.namespace_start() < parent_entry.namespace_start()
        || child.namespace_end() >= parent_entry.namespace_end()
    {
        return Err(IdmapError::ContainmentViolation {
            name: name.to_string(),
            parent: parent.to_string(),
            child: *child,
            parent_range: *parent_entry,
        });
    }
    Ok(())
}

fn compose(child: &RangeEntry, parent: &RangeEntry, parent_range: HostRange) -> Result<HostRange> {
    // The parent's namespace as it actually sits on the host.
    let anchored = RangeSet::single(RangeEntry::new(
        parent.namespace_start(),
        parent_range.start,
        parent.length(),
    )?);

    let start = anchored.shift_to_host(child.host_start())?;
    // Last placed id must map as well, or the child would spill past its parent.
    anchored.shift_to_host(child.host_start() + child.length() - 1)?;

    Ok(HostRange {
        start,
        end: start + child.length(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(ns: u64, host: u64, len: u64) -> RangeEntry {
        RangeEntry::new(ns, host, len).unwrap()
    }

    fn registry_with(lines: &[(&str, RangeEntry)]) -> SandboxRegistry {
        let mut registry = SandboxRegistry::new();
        for (name, e) in lines {
            registry.register(name, *e).unwrap();
        }
        registry
    }

    #[test]
    fn root_resolves_to_its_own_host_range() {
        let mut registry = registry_with(&[("c1", entry(0, 100000, 65536))]);
        let range = resolve(&mut registry, "c1").unwrap();
        assert_eq!(range, HostRange { start: 100000, end: 165536 });
        assert_eq!(registry.lookup("c1").unwrap().resolved(), Some(range));
    }

    #[test]
    fn child_is_anchored_at_parent_resolved_start() {
        let mut registry = registry_with(&[
            ("c1", entry(0, 100000, 65536)),
            ("c1/c2", entry(0, 1000, 1000)),
        ]);
        resolve(&mut registry, "c1").unwrap();
        let range = resolve(&mut registry, "c1/c2").unwrap();
        assert_eq!(range, HostRange { start: 101000, end: 102000 });
    }

    #[test]
    fn grandchild_composes_through_each_level() {
        let mut registry = registry_with(&[
            ("c1", entry(0, 100000, 65536)),
            ("c1/c2", entry(0, 1000, 10000)),
            ("c1/c2/c3", entry(0, 500, 100)),
        ]);
        resolve_all(&mut registry).unwrap();
        assert_eq!(
            registry.lookup("c1/c2/c3").unwrap().resolved(),
            Some(HostRange { start: 101500, end: 101600 })
        );
    }

    #[test]
    fn parent_namespace_offset_is_honoured() {
        // Parent namespace starts at 1000, so child position 1500 is 500 ids in.
        let mut registry = registry_with(&[
            ("p", entry(1000, 300000, 5000)),
            ("p/c", entry(1000, 1500, 100)),
        ]);
        resolve_all(&mut registry).unwrap();
        assert_eq!(
            registry.lookup("p/c").unwrap().resolved(),
            Some(HostRange { start: 300500, end: 300600 })
        );
    }

    #[test]
    fn child_before_parent_is_parent_undefined() {
        let mut registry = registry_with(&[
            ("c1/c2", entry(0, 1000, 1000)),
            ("c1", entry(0, 100000, 65536)),
        ]);
        let err = resolve(&mut registry, "c1/c2").unwrap_err();
        assert!(matches!(
            err,
            IdmapError::ParentUndefined { ref name, ref parent } if name == "c1/c2" && parent == "c1"
        ));
    }

    #[test]
    fn unresolved_parent_is_parent_undefined() {
        let mut registry = registry_with(&[
            ("c1", entry(0, 100000, 65536)),
            ("c1/c2", entry(0, 1000, 1000)),
        ]);
        let err = resolve(&mut registry, "c1/c2").unwrap_err();
        assert!(matches!(err, IdmapError::ParentUndefined { .. }));
        assert_eq!(registry.lookup("c1").unwrap().resolved(), None);
    }

    #[test]
    fn child_wider_than_parent_violates_containment() {
        let mut registry = registry_with(&[
            ("c1", entry(0, 100000, 65536)),
            ("c1/c2", entry(0, 1000, 200000)),
        ]);
        resolve(&mut registry, "c1").unwrap();
        let err = resolve(&mut registry, "c1/c2").unwrap_err();
        assert!(matches!(err, IdmapError::ContainmentViolation { ref name, .. } if name == "c1/c2"));
        assert_eq!(registry.lookup("c1/c2").unwrap().resolved(), None);
    }

    #[test]
    fn child_ending_at_parent_end_violates_containment() {
        let mut registry = registry_with(&[
            ("c1", entry(0, 100000, 65536)),
            ("c1/c2", entry(65535, 0, 1)),
        ]);
        resolve(&mut registry, "c1").unwrap();
        let err = resolve(&mut registry, "c1/c2").unwrap_err();
        assert!(matches!(err, IdmapError::ContainmentViolation { .. }));
    }

    #[test]
    fn child_ending_one_before_parent_end_is_contained() {
        let mut registry = registry_with(&[
            ("c1", entry(0, 100000, 65536)),
            ("c1/c2", entry(65534, 0, 1)),
        ]);
        resolve_all(&mut registry).unwrap();
        assert_eq!(
            registry.lookup("c1/c2").unwrap().resolved(),
            Some(HostRange { start: 100000, end: 100001 })
        );
    }

    #[test]
    fn child_starting_at_parent_start_is_contained() {
        let mut registry = registry_with(&[
            ("c1", entry(100, 100000, 1000)),
            ("c1/c2", entry(100, 100, 10)),
        ]);
        resolve_all(&mut registry).unwrap();
        assert_eq!(
            registry.lookup("c1/c2").unwrap().resolved(),
            Some(HostRange { start: 100000, end: 100010 })
        );
    }

    #[test]
    fn child_starting_before_parent_violates_containment() {
        let mut registry = registry_with(&[
            ("c1", entry(100, 100000, 1000)),
            ("c1/c2", entry(99, 100, 10)),
        ]);
        resolve(&mut registry, "c1").unwrap();
        let err = resolve(&mut registry, "c1/c2").unwrap_err();
        assert!(matches!(err, IdmapError::ContainmentViolation { .. }));
    }

    #[test]
    fn placement_outside_parent_namespace_is_not_mapped() {
        let mut registry = registry_with(&[
            ("c1", entry(0, 100000, 65536)),
            ("c1/c2", entry(0, 70000, 10)),
        ]);
        resolve(&mut registry, "c1").unwrap();
        let err = resolve(&mut registry, "c1/c2").unwrap_err();
        assert!(matches!(err, IdmapError::NotMapped(70000)));
    }

    #[test]
    fn placement_spilling_past_parent_is_not_mapped() {
        let mut registry = registry_with(&[
            ("c1", entry(0, 100000, 65536)),
            ("c1/c2", entry(0, 65000, 1000)),
        ]);
        resolve(&mut registry, "c1").unwrap();
        let err = resolve(&mut registry, "c1/c2").unwrap_err();
        assert!(matches!(err, IdmapError::NotMapped(65999)));
    }

    #[test]
    fn resolve_all_stops_at_first_failure() {
        let mut registry = registry_with(&[
            ("a", entry(0, 100000, 100)),
            ("b/c", entry(0, 0, 1)),
            ("d", entry(0, 200000, 100)),
        ]);
        let err = resolve_all(&mut registry).unwrap_err();
        assert!(matches!(err, IdmapError::ParentUndefined { .. }));
        assert!(registry.lookup("a").unwrap().resolved().is_some());
        assert!(registry.lookup("d").unwrap().resolved().is_none());
    }
}
