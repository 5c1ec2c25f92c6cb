//! Field names from branch names

use crate::types::{Branch, NamingPolicy};
use once_cell::sync::Lazy;
use regex::Regex;

// Optional dotted path, then the identifier that follows it
static LAST_SEGMENT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:.*\.)*([a-zA-Z_][a-zA-Z0-9_]*)").unwrap()
});

/// Derives the field name a branch is exposed under.
///
/// Returning `None` drops the branch from the schema.
pub trait NameResolver<B: Branch> {
    fn resolve(&self, branch: &B) -> Option<String>;
}

impl<B, F> NameResolver<B> for F
where
    B: Branch,
    F: Fn(&B) -> Option<String>,
{
    fn resolve(&self, branch: &B) -> Option<String> {
        self(branch)
    }
}

/// Exposes the last identifier segment of a dotted branch name
#[derive(Debug, Clone, Copy, Default)]
pub struct LastSegment;

impl<B: Branch> NameResolver<B> for LastSegment {
    fn resolve(&self, branch: &B) -> Option<String> {
        last_segment(branch.name()).map(str::to_string)
    }
}

/// Exposes the branch name unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct RawName;

impl<B: Branch> NameResolver<B> for RawName {
    fn resolve(&self, branch: &B) -> Option<String> {
        Some(branch.name().to_string())
    }
}

impl<B: Branch> NameResolver<B> for NamingPolicy {
    fn resolve(&self, branch: &B) -> Option<String> {
        match self {
            NamingPolicy::LastSegment => LastSegment.resolve(branch),
            NamingPolicy::RawName => RawName.resolve(branch),
        }
    }
}

/// Last identifier segment of a dotted name, e.g. `"Event.Muon.pt"` -> `"pt"`.
///
/// When the final segment is not an identifier, the last identifier that
/// follows a dot (or starts the name) is used instead.
pub fn last_segment(name: &str) -> Option<&str> {
    LAST_SEGMENT_REGEX
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
