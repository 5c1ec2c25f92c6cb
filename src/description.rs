//! JSON tree descriptions
//!
//! A serializable stand-in for the columnar-file driver: a branch hierarchy
//! plus its counter mapping, as loaded from a document such as
//!
//! ```json
//! {
//!   "name": "Events",
//!   "branches": [
//!     {"name": "nJet", "type": "i32"},
//!     {"name": "Jet_pt", "type": "f32"}
//!   ],
//!   "counters": {"Jet_pt": "nJet"}
//! }
//! ```

use crate::error::DescriptionError;
use crate::types::{Branch, CounterMap, ElementType};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One branch and its children
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchDescription {
    pub name: String,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub element_type: Option<ElementType>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<BranchDescription>,
}

impl BranchDescription {
    pub fn leaf(name: impl Into<String>, element_type: ElementType) -> Self {
        BranchDescription {
            name: name.into(),
            element_type: Some(element_type),
            branches: Vec::new(),
        }
    }

    pub fn node(name: impl Into<String>, branches: Vec<BranchDescription>) -> Self {
        BranchDescription {
            name: name.into(),
            element_type: None,
            branches,
        }
    }

    fn collect_names<'a>(&'a self, names: &mut HashSet<&'a str>) -> Result<(), DescriptionError> {
        for child in &self.branches {
            if child.name.is_empty() {
                return Err(DescriptionError::EmptyName {
                    parent: self.name.clone(),
                });
            }
            names.insert(child.name.as_str());
            child.collect_names(names)?;
        }
        Ok(())
    }
}

impl Branch for BranchDescription {
    fn name(&self) -> &str {
        &self.name
    }

    fn branches(&self) -> &[Self] {
        &self.branches
    }

    fn element_type(&self) -> Option<ElementType> {
        self.element_type
    }
}

/// A whole tree: the root branch and the counter mapping of its branches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeDescription {
    #[serde(flatten)]
    pub root: BranchDescription,

    /// Counted-branch name to counter-branch name
    #[serde(default)]
    pub counters: IndexMap<String, String>,
}

impl TreeDescription {
    pub fn new(root: BranchDescription, counters: IndexMap<String, String>) -> Self {
        TreeDescription { root, counters }
    }

    /// Parse and validate a description from a JSON string
    pub fn from_json_str(input: &str) -> Result<Self, DescriptionError> {
        let description: TreeDescription = serde_json::from_str(input)?;
        description.validate()?;
        Ok(description)
    }

    /// Parse and validate a description with the SIMD parser.
    ///
    /// The buffer is used as scratch space and is modified.
    pub fn from_json_slice(input: &mut [u8]) -> Result<Self, DescriptionError> {
        let description: TreeDescription = simd_json::serde::from_slice(input)?;
        description.validate()?;
        Ok(description)
    }

    /// Check that names are non-empty and every counter entry refers to
    /// branches of this tree
    pub fn validate(&self) -> Result<(), DescriptionError> {
        let mut names = HashSet::new();
        self.root.collect_names(&mut names)?;

        for (counted, counter) in &self.counters {
            if !names.contains(counted.as_str()) {
                return Err(DescriptionError::UnknownCounted(counted.clone()));
            }
            if !names.contains(counter.as_str()) {
                return Err(DescriptionError::UnknownCounter {
                    counted: counted.clone(),
                    counter: counter.clone(),
                });
            }
        }

        Ok(())
    }

    /// Counter mapping with one shared handle per counter branch
    pub fn counter_map(&self) -> CounterMap {
        CounterMap::from_pairs(self.counters.iter())
    }
}
