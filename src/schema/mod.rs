//! Branch hierarchy to OAM schema
//!
//! Naming and grouping are pluggable; the builder walks the hierarchy using them.

pub mod builder;
pub mod grouping;
pub mod naming;

pub use builder::{BuildReport, SchemaBuilder};
pub use grouping::{ConfiguredGrouper, FieldGrouper, IdentityGrouper, UnderscoreGrouper};
pub use naming::{last_segment, LastSegment, NameResolver, RawName};
