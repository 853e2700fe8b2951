//! Id range primitives
//!
//! - **range**: [`RangeEntry`] and the overlap-checked [`RangeSet`]
//! - **spec**: parsing of `[tag:]namespace:host:length` descriptors

pub mod range;
pub mod spec;

pub use range::{RangeEntry, RangeSet, ID_SPACE, MAX_ID};
pub use spec::{parse_spec, IdKind, MappingSpec};
