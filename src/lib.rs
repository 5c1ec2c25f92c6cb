//! # oamtree - columnar trees to object-array mappings
//!
//! Converts the branch hierarchy of a columnar file into an OAM
//! (object-array-mapping) tree: a schema telling a materialization engine how
//! to rebuild per-entry objects, jagged lists and nested records from flat
//! arrays.
//!
//! ## Modules
//!
//! - **schema**: field naming, underscore grouping and the recursive builder
//! - **oam**: the OAM node types and the array-of-structs rewrite
//! - **description**: JSON tree descriptions standing in for a file driver
//!
//! ## Quick Start
//!
//! ```rust
//! use oamtree::{tree2oam, Oam, TreeDescription};
//! use serde_json::json;
//!
//! # fn main() -> anyhow::Result<()> {
//! let description = TreeDescription::from_json_str(&json!({
//!     "name": "Events",
//!     "branches": [
//!         {"name": "nJet", "type": "i32"},
//!         {"name": "Jet_pt", "type": "f32"},
//!         {"name": "Jet_eta", "type": "f32"}
//!     ],
//!     "counters": {"Jet_pt": "nJet", "Jet_eta": "nJet"}
//! }).to_string())?;
//!
//! let oam = tree2oam(&description.root, &description.counter_map());
//!
//! // Always a list over the dataset's entries
//! assert!(matches!(&oam, Oam::ListCount(list) if list.count.is_none()));
//! # Ok(())
//! # }
//! ```

pub mod description;
pub mod error;
pub mod oam;
pub mod schema;
pub mod types;

// Re-export commonly used types for convenience
pub use description::{BranchDescription, TreeDescription};
pub use error::DescriptionError;
pub use oam::{array_of_structs, drop_list, ListCountOam, Oam, PrimitiveOam, RecordOam};
pub use schema::{
    BuildReport, ConfiguredGrouper, FieldGrouper, IdentityGrouper, LastSegment, NameResolver,
    RawName, SchemaBuilder, UnderscoreGrouper,
};
pub use types::{
    Branch, CountSource, CounterMap, ElementType, GroupingPolicy, NamingPolicy, OamConfig,
};

use tracing::debug;

/// Main entry point: the OAM tree of a branch hierarchy with default settings
pub fn tree2oam<B: Branch>(root: &B, counters: &CounterMap) -> Oam {
    tree2oam_with(&SchemaBuilder::new(), root, counters)
}

/// Like [`tree2oam`], with naming and grouping chosen by `config`
pub fn tree2oam_with_config<B: Branch>(root: &B, counters: &CounterMap, config: &OamConfig) -> Oam {
    tree2oam_with_report(root, counters, config).0
}

/// Like [`tree2oam_with_config`], also reporting the branches left out
pub fn tree2oam_with_report<B: Branch>(
    root: &B,
    counters: &CounterMap,
    config: &OamConfig,
) -> (Oam, BuildReport) {
    let builder = SchemaBuilder::from_parts(config.naming, ConfiguredGrouper::from_config(config));
    let (raw, report) = builder.build_with_report(root, counters);

    let tree = if config.array_of_structs {
        array_of_structs(&raw)
    } else {
        raw
    };

    (over_entries(tree), report)
}

/// Run a custom builder, merge co-counted fields and wrap over the entries
pub fn tree2oam_with<B, N, G>(builder: &SchemaBuilder<N, G>, root: &B, counters: &CounterMap) -> Oam
where
    B: Branch,
    N: NameResolver<B>,
    G: FieldGrouper,
{
    let raw = builder.build(root, counters);
    over_entries(array_of_structs(&raw))
}

/// Wrap a per-entry tree in the list over the dataset's entries
pub fn over_entries(tree: Oam) -> Oam {
    debug!("wrapping schema over dataset entries");
    Oam::list_count(None, tree)
}
