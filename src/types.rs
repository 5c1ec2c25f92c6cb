use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Element type of a leaf branch's flat array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    /// Generic placeholder for branches the driver cannot express as a flat array
    Object,
}

impl ElementType {
    /// Whether a leaf of this type can be exposed as a primitive array
    pub fn is_concrete(self) -> bool {
        !matches!(self, ElementType::Object)
    }
}

/// A named column source, as supplied by the columnar-file driver.
///
/// Implementors are read-only from this crate's point of view.
pub trait Branch: Sized {
    /// Raw branch name, possibly a dot-separated path
    fn name(&self) -> &str;

    /// Child branches in declared order
    fn branches(&self) -> &[Self];

    /// Concrete element type of a leaf; `None` means non-primitive
    fn element_type(&self) -> Option<ElementType>;
}

/// The branch that supplies per-entry lengths of one or more counted branches
#[derive(Debug, PartialEq, Eq)]
pub struct CounterBranch {
    pub name: String,
}

/// Handle to a counter branch.
///
/// Equality is identity of the handle, not equality of names: two counters
/// that happen to share a name are still different length sources.
#[derive(Debug, Clone)]
pub struct CountSource(Arc<CounterBranch>);

impl CountSource {
    pub fn new(name: impl Into<String>) -> Self {
        CountSource(Arc::new(CounterBranch { name: name.into() }))
    }

    /// Name of the counter branch
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl PartialEq for CountSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for CountSource {}

impl fmt::Display for CountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for CountSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Mapping from counted-branch name to the counter that gives its lengths
#[derive(Debug, Clone, Default)]
pub struct CounterMap {
    entries: HashMap<String, CountSource>,
}

impl CounterMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a map from `(counted, counter)` name pairs.
    ///
    /// Counter handles are interned by counter name, so all branches counted
    /// by the same counter share one identity.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut interned: HashMap<String, CountSource> = HashMap::new();
        let mut map = CounterMap::new();

        for (counted, counter) in pairs {
            let source = interned
                .entry(counter.as_ref().to_string())
                .or_insert_with(|| CountSource::new(counter.as_ref()))
                .clone();
            map.insert(counted, source);
        }

        map
    }

    pub fn insert(&mut self, counted: impl Into<String>, source: CountSource) {
        self.entries.insert(counted.into(), source);
    }

    /// Counter of the branch with this raw name, if it is counted
    pub fn get(&self, counted: &str) -> Option<&CountSource> {
        self.entries.get(counted)
    }

    pub fn contains(&self, counted: &str) -> bool {
        self.entries.contains_key(counted)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// How branch names become field names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NamingPolicy {
    /// Last dot-separated identifier segment
    #[default]
    LastSegment,
    /// The unmodified branch name
    RawName,
}

/// How sibling fields are regrouped into records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupingPolicy {
    /// Fields are kept as they are
    #[default]
    Identity,
    /// `prefix_suffix` fields are gathered under a `prefix` record
    Underscore,
}

/// Configuration for the tree-to-OAM pipeline
#[derive(Debug, Clone)]
pub struct OamConfig {
    /// Field naming policy
    pub naming: NamingPolicy,

    /// Field grouping policy
    pub grouping: GroupingPolicy,

    /// Smallest underscore group that is collapsed into a record
    pub min_group_size: usize,

    /// Whether to merge co-counted fields into lists of records
    pub array_of_structs: bool,
}

impl Default for OamConfig {
    fn default() -> Self {
        OamConfig {
            naming: NamingPolicy::LastSegment,
            grouping: GroupingPolicy::Identity,
            min_group_size: 1,
            array_of_structs: true,
        }
    }
}
