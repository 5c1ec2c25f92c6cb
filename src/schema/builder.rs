//! Schema builder: branch hierarchy to OAM tree
//!
//! Walks the branches of a tree depth-first and emits one record per level.
//! Leaves become primitives, counted leaves become counted lists, and a
//! counted branch with children wraps its whole record in a counted list.
//! The result is still struct-of-arrays shaped; see [`crate::oam::transform`]
//! for the rewrite that follows.

use crate::oam::Oam;
use crate::schema::grouping::{FieldGrouper, IdentityGrouper};
use crate::schema::naming::{LastSegment, NameResolver};
use crate::types::{Branch, CounterMap};
use indexmap::IndexMap;
use tracing::{debug, trace};

/// Branches left out of a schema, by raw branch name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    /// The name resolver gave no field name
    pub unnamed: Vec<String>,

    /// Leaves without a concrete element type
    pub unsupported: Vec<String>,
}

impl BuildReport {
    /// Total number of skipped branches
    pub fn skipped(&self) -> usize {
        self.unnamed.len() + self.unsupported.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skipped() == 0
    }
}

/// Builds the raw OAM tree for a branch hierarchy
#[derive(Debug, Clone)]
pub struct SchemaBuilder<N = LastSegment, G = IdentityGrouper> {
    names: N,
    grouper: G,
}

impl SchemaBuilder {
    /// Builder with the default naming and no regrouping
    pub fn new() -> Self {
        SchemaBuilder {
            names: LastSegment,
            grouper: IdentityGrouper,
        }
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, G> SchemaBuilder<N, G> {
    pub fn from_parts(names: N, grouper: G) -> Self {
        SchemaBuilder { names, grouper }
    }

    /// Replace the name resolver
    pub fn with_names<N2>(self, names: N2) -> SchemaBuilder<N2, G> {
        SchemaBuilder {
            names,
            grouper: self.grouper,
        }
    }

    /// Replace the field grouper
    pub fn with_grouper<G2>(self, grouper: G2) -> SchemaBuilder<N, G2> {
        SchemaBuilder {
            names: self.names,
            grouper,
        }
    }

    /// Build the raw tree rooted at `root`
    pub fn build<B>(&self, root: &B, counters: &CounterMap) -> Oam
    where
        B: Branch,
        N: NameResolver<B>,
        G: FieldGrouper,
    {
        self.build_with_report(root, counters).0
    }

    /// Build the raw tree and report which branches were left out
    pub fn build_with_report<B>(&self, root: &B, counters: &CounterMap) -> (Oam, BuildReport)
    where
        B: Branch,
        N: NameResolver<B>,
        G: FieldGrouper,
    {
        let mut report = BuildReport::default();
        let tree = self.build_level(root, counters, true, &mut report);

        if !report.is_empty() {
            debug!(
                root = root.name(),
                unnamed = report.unnamed.len(),
                unsupported = report.unsupported.len(),
                "skipped branches"
            );
        }

        (tree, report)
    }

    fn build_level<B>(
        &self,
        branch: &B,
        counters: &CounterMap,
        is_root: bool,
        report: &mut BuildReport,
    ) -> Oam
    where
        B: Branch,
        N: NameResolver<B>,
        G: FieldGrouper,
    {
        let mut fields: IndexMap<String, Oam> = IndexMap::new();

        for child in branch.branches() {
            let Some(field_name) = self.names.resolve(child) else {
                debug!(branch = child.name(), "no field name, skipping");
                report.unnamed.push(child.name().to_string());
                continue;
            };

            let node = if child.branches().is_empty() {
                match self.build_leaf(child, counters) {
                    Some(node) => node,
                    None => {
                        debug!(branch = child.name(), "unsupported element type, skipping");
                        report.unsupported.push(child.name().to_string());
                        continue;
                    }
                }
            } else {
                self.build_level(child, counters, false, report)
            };

            if fields.insert(field_name, node).is_some() {
                debug!(branch = child.name(), "field name already used at this level, replacing");
            }
        }

        let record = Oam::Record(self.grouper.group(fields));

        // The counter lookup is keyed on the branch being wrapped
        match counters.get(branch.name()) {
            Some(count) if !is_root => Oam::list_count(Some(count.clone()), record),
            _ => record,
        }
    }

    fn build_leaf<B: Branch>(&self, leaf: &B, counters: &CounterMap) -> Option<Oam> {
        if !leaf.element_type().is_some_and(|t| t.is_concrete()) {
            return None;
        }

        trace!(branch = leaf.name(), "leaf");
        let primitive = Oam::primitive(leaf.name());

        Some(match counters.get(leaf.name()) {
            Some(count) => Oam::list_count(Some(count.clone()), primitive),
            None => primitive,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::BranchDescription;
    use crate::schema::grouping::UnderscoreGrouper;
    use crate::schema::naming::RawName;
    use crate::types::ElementType;

    fn tree(branches: Vec<BranchDescription>) -> BranchDescription {
        BranchDescription::node("Events", branches)
    }

    #[test]
    fn test_plain_leaf_is_primitive() {
        let root = tree(vec![BranchDescription::leaf("run", ElementType::U32)]);
        let oam = SchemaBuilder::new().build(&root, &CounterMap::new());

        let record = oam.as_record().unwrap();
        assert_eq!(record.get("run"), Some(&Oam::primitive("run")));
    }

    #[test]
    fn test_counted_leaf_is_list_count() {
        let root = tree(vec![
            BranchDescription::leaf("nJet", ElementType::I32),
            BranchDescription::leaf("Jet_pt", ElementType::F32),
        ]);
        let counters = CounterMap::from_pairs([("Jet_pt", "nJet")]);

        let oam = SchemaBuilder::new().build(&root, &counters);
        let record = oam.as_record().unwrap();

        let expected = Oam::list_count(counters.get("Jet_pt").cloned(), Oam::primitive("Jet_pt"));
        assert_eq!(record.get("Jet_pt"), Some(&expected));
        assert_eq!(record.get("nJet"), Some(&Oam::primitive("nJet")));
    }

    #[test]
    fn test_unsupported_leaf_is_skipped() {
        let root = tree(vec![
            BranchDescription::leaf("run", ElementType::U32),
            BranchDescription::leaf("blob", ElementType::Object),
            BranchDescription::node("untyped", vec![]),
        ]);

        let (oam, report) = SchemaBuilder::new().build_with_report(&root, &CounterMap::new());
        let record = oam.as_record().unwrap();

        assert_eq!(record.len(), 1);
        assert_eq!(report.unsupported, vec!["blob".to_string(), "untyped".to_string()]);
        assert!(report.unnamed.is_empty());
    }

    #[test]
    fn test_unnamed_branch_is_skipped() {
        let root = tree(vec![
            BranchDescription::leaf("run", ElementType::U32),
            BranchDescription::leaf("2bad", ElementType::F32),
        ]);

        let (oam, report) = SchemaBuilder::new().build_with_report(&root, &CounterMap::new());

        assert_eq!(oam.as_record().unwrap().len(), 1);
        assert_eq!(report.unnamed, vec!["2bad".to_string()]);
        assert_eq!(report.skipped(), 1);
    }

    #[test]
    fn test_nested_branches_use_last_segment() {
        let root = tree(vec![BranchDescription::node(
            "Event.Muon",
            vec![
                BranchDescription::leaf("Event.Muon.pt", ElementType::F32),
                BranchDescription::leaf("Event.Muon.eta", ElementType::F32),
            ],
        )]);

        let oam = SchemaBuilder::new().build(&root, &CounterMap::new());
        let muon = oam.as_record().unwrap().get("Muon").and_then(Oam::as_record).unwrap();

        let names: Vec<&str> = muon.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["pt", "eta"]);
        assert_eq!(muon.get("pt"), Some(&Oam::primitive("Event.Muon.pt")));
    }

    #[test]
    fn test_counted_inner_branch_wraps_record() {
        let root = tree(vec![
            BranchDescription::leaf("nTrack", ElementType::I32),
            BranchDescription::node(
                "Track",
                vec![
                    BranchDescription::leaf("Track.x", ElementType::F32),
                    BranchDescription::leaf("Track.y", ElementType::F32),
                ],
            ),
        ]);
        let counters = CounterMap::from_pairs([("Track", "nTrack")]);

        let oam = SchemaBuilder::new().build(&root, &counters);
        let track = oam.as_record().unwrap().get("Track").and_then(Oam::as_list_count).unwrap();

        assert_eq!(track.count.as_ref(), counters.get("Track"));
        assert!(track.contents.as_record().is_some());
    }

    #[test]
    fn test_counter_lookup_uses_wrapped_branch() {
        // Only the last child is counted; the parent itself is not.
        let root = tree(vec![BranchDescription::node(
            "Track",
            vec![
                BranchDescription::leaf("Track.x", ElementType::F32),
                BranchDescription::leaf("Track.y", ElementType::F32),
            ],
        )]);
        let counters = CounterMap::from_pairs([("Track.y", "nTrack")]);

        let oam = SchemaBuilder::new().build(&root, &counters);
        let track = oam.as_record().unwrap().get("Track").unwrap();

        assert!(track.as_record().is_some());
    }

    #[test]
    fn test_root_is_never_wrapped() {
        let root = tree(vec![BranchDescription::leaf("run", ElementType::U32)]);
        let counters = CounterMap::from_pairs([("Events", "nEvents")]);

        let oam = SchemaBuilder::new().build(&root, &counters);
        assert!(oam.as_record().is_some());
    }

    #[test]
    fn test_grouper_and_names_are_pluggable() {
        let root = tree(vec![
            BranchDescription::leaf("Jet_pt", ElementType::F32),
            BranchDescription::leaf("Jet_eta", ElementType::F32),
        ]);

        let grouped = SchemaBuilder::new()
            .with_grouper(UnderscoreGrouper::default())
            .build(&root, &CounterMap::new());
        assert!(grouped.as_record().unwrap().get("Jet").is_some());

        let only_pt = |b: &BranchDescription| b.name().ends_with("pt").then(|| b.name().to_string());
        let filtered = SchemaBuilder::new()
            .with_names(only_pt)
            .build(&root, &CounterMap::new());
        assert_eq!(filtered.as_record().unwrap().len(), 1);

        let raw = SchemaBuilder::from_parts(RawName, IdentityGrouper).build(&root, &CounterMap::new());
        assert!(raw.as_record().unwrap().get("Jet_eta").is_some());
    }

    #[test]
    fn test_duplicate_field_name_keeps_first_position() {
        let root = tree(vec![
            BranchDescription::leaf("a.x", ElementType::F32),
            BranchDescription::leaf("y", ElementType::F32),
            BranchDescription::leaf("b.x", ElementType::F32),
        ]);

        let oam = SchemaBuilder::new().build(&root, &CounterMap::new());
        let record = oam.as_record().unwrap();

        let names: Vec<&str> = record.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert_eq!(record.get("x"), Some(&Oam::primitive("b.x")));
    }
}
