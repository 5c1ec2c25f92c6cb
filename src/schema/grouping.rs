//! Regrouping of sibling fields into nested records

use crate::oam::{Oam, RecordOam};
use crate::types::{GroupingPolicy, OamConfig};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

// `prefix_suffix`, where the prefix has no underscores and the suffix may
static UNDERSCORE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([a-zA-Z][a-zA-Z0-9]*)_([a-zA-Z_][a-zA-Z0-9_]*)$").unwrap()
});

/// Turns the named fields of one level into that level's record
pub trait FieldGrouper {
    fn group(&self, fields: IndexMap<String, Oam>) -> RecordOam;
}

impl<F> FieldGrouper for F
where
    F: Fn(IndexMap<String, Oam>) -> RecordOam,
{
    fn group(&self, fields: IndexMap<String, Oam>) -> RecordOam {
        self(fields)
    }
}

/// Keeps every field where it is
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityGrouper;

impl FieldGrouper for IdentityGrouper {
    fn group(&self, fields: IndexMap<String, Oam>) -> RecordOam {
        RecordOam::new(fields)
    }
}

/// Gathers `prefix_suffix` fields into a `prefix` record keyed by suffix.
///
/// A prefix that is itself a field name at the same level is never used as
/// a group. The group appears where its first member was.
#[derive(Debug, Clone, Copy)]
pub struct UnderscoreGrouper {
    min_group_size: usize,
}

impl UnderscoreGrouper {
    pub fn new(min_group_size: usize) -> Self {
        UnderscoreGrouper { min_group_size }
    }
}

impl Default for UnderscoreGrouper {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FieldGrouper for UnderscoreGrouper {
    fn group(&self, fields: IndexMap<String, Oam>) -> RecordOam {
        let mut sizes: IndexMap<String, usize> = IndexMap::new();
        for name in fields.keys() {
            if let Some((prefix, _)) = split_underscore(name) {
                if !fields.contains_key(prefix) {
                    *sizes.entry(prefix.to_string()).or_insert(0) += 1;
                }
            }
        }

        let mut out: IndexMap<String, Oam> = IndexMap::with_capacity(fields.len());
        for (name, node) in fields {
            let member = split_underscore(&name)
                .filter(|(prefix, _)| sizes.get(*prefix).is_some_and(|n| *n >= self.min_group_size))
                .map(|(prefix, suffix)| (prefix.to_string(), suffix.to_string()));

            match member {
                Some((prefix, suffix)) => {
                    let slot = out
                        .entry(prefix)
                        .or_insert_with(|| Oam::Record(RecordOam::default()));
                    if let Oam::Record(group) = slot {
                        group.fields.insert(suffix, node);
                    }
                }
                None => {
                    out.insert(name, node);
                }
            }
        }

        RecordOam::new(out)
    }
}

/// Grouper chosen at runtime from an [`OamConfig`]
#[derive(Debug, Clone, Copy)]
pub enum ConfiguredGrouper {
    Identity(IdentityGrouper),
    Underscore(UnderscoreGrouper),
}

impl ConfiguredGrouper {
    pub fn from_config(config: &OamConfig) -> Self {
        match config.grouping {
            GroupingPolicy::Identity => ConfiguredGrouper::Identity(IdentityGrouper),
            GroupingPolicy::Underscore => {
                ConfiguredGrouper::Underscore(UnderscoreGrouper::new(config.min_group_size))
            }
        }
    }
}

impl FieldGrouper for ConfiguredGrouper {
    fn group(&self, fields: IndexMap<String, Oam>) -> RecordOam {
        match self {
            ConfiguredGrouper::Identity(grouper) => grouper.group(fields),
            ConfiguredGrouper::Underscore(grouper) => grouper.group(fields),
        }
    }
}

/// Split `prefix_suffix` at the first underscore, if the name has that shape
pub fn split_underscore(name: &str) -> Option<(&str, &str)> {
    let caps = UNDERSCORE_REGEX.captures(name)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}
