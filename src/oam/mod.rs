//! Object-array-mapping trees
//!
//! An OAM tree tells a materialization engine how to rebuild per-entry values
//! from flat arrays. Trees are immutable values: every rewrite in this crate
//! builds a new tree and leaves its input untouched.

pub mod flatten;
pub mod transform;

pub use flatten::{drop_list, Leaves};
pub use transform::array_of_structs;

use crate::types::CountSource;
use indexmap::IndexMap;
use serde::Serialize;

/// Leaf reading one flat array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrimitiveOam {
    pub source: String,
}

/// Variable-length list whose lengths come from a counter.
///
/// A `count` of `None` stands for the dataset's own entry axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListCountOam {
    pub count: Option<CountSource>,
    pub contents: Box<Oam>,
}

/// Variable-length list addressed by start/stop offset arrays
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListOffsetOam {
    pub starts: String,
    pub stops: String,
    pub contents: Box<Oam>,
}

/// Reference into another OAM tree by position array
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PointerOam {
    pub positions: String,
    pub target: Box<Oam>,
}

/// Named fields in insertion order
#[derive(Debug, Clone, Default, Serialize)]
pub struct RecordOam {
    pub fields: IndexMap<String, Oam>,
}

impl RecordOam {
    pub fn new(fields: IndexMap<String, Oam>) -> Self {
        RecordOam { fields }
    }

    pub fn get(&self, name: &str) -> Option<&Oam> {
        self.fields.get(name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Depth-first leaves of this record, descending through nested records only
    pub fn leaves(&self) -> Leaves<'_> {
        Leaves::new(self)
    }
}

// Field order is part of a record's meaning, so equality is ordered
// (IndexMap's own PartialEq ignores order).
impl PartialEq for RecordOam {
    fn eq(&self, other: &Self) -> bool {
        self.fields.len() == other.fields.len()
            && self
                .fields
                .iter()
                .zip(other.fields.iter())
                .all(|((n1, c1), (n2, c2))| n1 == n2 && c1 == c2)
    }
}

impl Eq for RecordOam {}

/// A node of an OAM tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Oam {
    Primitive(PrimitiveOam),
    ListCount(ListCountOam),
    ListOffset(ListOffsetOam),
    Record(RecordOam),
    Pointer(PointerOam),
}

impl Oam {
    pub fn primitive(source: impl Into<String>) -> Self {
        Oam::Primitive(PrimitiveOam {
            source: source.into(),
        })
    }

    pub fn list_count(count: Option<CountSource>, contents: Oam) -> Self {
        Oam::ListCount(ListCountOam {
            count,
            contents: Box::new(contents),
        })
    }

    pub fn record(fields: IndexMap<String, Oam>) -> Self {
        Oam::Record(RecordOam::new(fields))
    }

    pub fn as_record(&self) -> Option<&RecordOam> {
        match self {
            Oam::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn as_list_count(&self) -> Option<&ListCountOam> {
        match self {
            Oam::ListCount(list) => Some(list),
            _ => None,
        }
    }
}

impl From<RecordOam> for Oam {
    fn from(record: RecordOam) -> Self {
        Oam::Record(record)
    }
}
