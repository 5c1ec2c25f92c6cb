//! Struct-of-arrays to array-of-structs rewrite
//!
//! The columnar source pairs each jagged field with its own counter. When
//! every field of a record is a list counted by the same counter, the record
//! really describes one list of fixed-shape records, and is rewritten that way:
//!
//! ```text
//! Record{pt: ListCount(nJet, pt), eta: ListCount(nJet, eta)}
//!   => ListCount(nJet, Record{pt: pt, eta: eta})
//! ```

use super::{drop_list, ListCountOam, ListOffsetOam, Oam, RecordOam};
use crate::types::CountSource;
use tracing::debug;

/// Rewrite a tree to prefer array-of-structs layout wherever it is legal.
///
/// The result is a fixpoint: applying this again returns an equal tree.
pub fn array_of_structs(node: &Oam) -> Oam {
    match node {
        Oam::Primitive(_) | Oam::Pointer(_) => node.clone(),
        Oam::ListCount(ListCountOam { count, contents }) => {
            Oam::list_count(count.clone(), array_of_structs(contents))
        }
        Oam::ListOffset(ListOffsetOam {
            starts,
            stops,
            contents,
        }) => Oam::ListOffset(ListOffsetOam {
            starts: starts.clone(),
            stops: stops.clone(),
            contents: Box::new(array_of_structs(contents)),
        }),
        Oam::Record(record) => match shared_count(record) {
            Some(count) => {
                debug!(counter = %count, fields = record.len(), "merging co-counted fields");
                // The rebuilt record may itself qualify when its fields were
                // counted twice by the same pair of counters.
                Oam::list_count(Some(count.clone()), array_of_structs(&drop_list(node)))
            }
            None => Oam::record(
                record
                    .fields
                    .iter()
                    .map(|(name, field)| (name.clone(), array_of_structs(field)))
                    .collect(),
            ),
        },
    }
}

/// The counter shared by every leaf of the record, if there is one.
///
/// Lists over the dataset axis (`count == None`) never qualify.
fn shared_count(record: &RecordOam) -> Option<&CountSource> {
    let mut shared: Option<&CountSource> = None;

    for (_, leaf) in record.leaves() {
        let count = match leaf {
            Oam::ListCount(ListCountOam {
                count: Some(count), ..
            }) => count,
            _ => return None,
        };

        match shared {
            None => shared = Some(count),
            Some(seen) if seen == count => {}
            Some(_) => return None,
        }
    }

    shared
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn rec(fields: Vec<(&str, Oam)>) -> Oam {
        Oam::record(
            fields
                .into_iter()
                .map(|(n, c)| (n.to_string(), c))
                .collect::<IndexMap<_, _>>(),
        )
    }

    fn jagged(count: &CountSource, source: &str) -> Oam {
        Oam::list_count(Some(count.clone()), Oam::primitive(source))
    }

    #[test]
    fn test_merges_shared_counter() {
        let c = CountSource::new("n");
        let tree = rec(vec![("f1", jagged(&c, "f1")), ("f2", jagged(&c, "f2"))]);

        let expected = Oam::list_count(
            Some(c.clone()),
            rec(vec![
                ("f1", Oam::primitive("f1")),
                ("f2", Oam::primitive("f2")),
            ]),
        );

        assert_eq!(array_of_structs(&tree), expected);
    }

    #[test]
    fn test_distinct_counters_do_not_merge() {
        let c1 = CountSource::new("n");
        let c2 = CountSource::new("n");
        let tree = rec(vec![("f1", jagged(&c1, "f1")), ("f2", jagged(&c2, "f2"))]);

        assert_eq!(array_of_structs(&tree), tree);
    }

    #[test]
    fn test_mixed_kinds_do_not_merge_but_nested_records_do() {
        let c = CountSource::new("nJet");
        let tree = rec(vec![
            ("run", Oam::primitive("run")),
            (
                "Jet",
                rec(vec![("pt", jagged(&c, "Jet_pt")), ("eta", jagged(&c, "Jet_eta"))]),
            ),
        ]);

        let expected = rec(vec![
            ("run", Oam::primitive("run")),
            (
                "Jet",
                Oam::list_count(
                    Some(c.clone()),
                    rec(vec![
                        ("pt", Oam::primitive("Jet_pt")),
                        ("eta", Oam::primitive("Jet_eta")),
                    ]),
                ),
            ),
        ]);

        assert_eq!(array_of_structs(&tree), expected);
    }

    #[test]
    fn test_merge_reaches_through_nested_records() {
        let c = CountSource::new("n");
        let tree = rec(vec![
            ("a", jagged(&c, "a")),
            ("g", rec(vec![("x", jagged(&c, "g_x")), ("y", jagged(&c, "g_y"))])),
        ]);

        let expected = Oam::list_count(
            Some(c.clone()),
            rec(vec![
                ("a", Oam::primitive("a")),
                (
                    "g",
                    rec(vec![
                        ("x", Oam::primitive("g_x")),
                        ("y", Oam::primitive("g_y")),
                    ]),
                ),
            ]),
        );

        assert_eq!(array_of_structs(&tree), expected);
    }

    #[test]
    fn test_empty_record_is_kept() {
        let tree = rec(vec![("empty", rec(vec![]))]);
        assert_eq!(array_of_structs(&tree), tree);
    }

    #[test]
    fn test_dataset_axis_lists_do_not_merge() {
        let tree = rec(vec![
            ("a", Oam::list_count(None, Oam::primitive("a"))),
            ("b", Oam::list_count(None, Oam::primitive("b"))),
        ]);

        assert_eq!(array_of_structs(&tree), tree);
    }

    #[test]
    fn test_list_count_keeps_counter_and_transforms_contents() {
        let outer = CountSource::new("nEvent");
        let c = CountSource::new("n");
        let tree = Oam::list_count(
            Some(outer.clone()),
            rec(vec![("f1", jagged(&c, "f1")), ("f2", jagged(&c, "f2"))]),
        );

        let result = array_of_structs(&tree);
        let list = result.as_list_count().unwrap();
        assert_eq!(list.count, Some(outer));
        assert_eq!(list.contents.as_list_count().unwrap().count, Some(c));
    }

    #[test]
    fn test_doubly_jagged_fields_merge_both_levels() {
        let outer = CountSource::new("nTrack");
        let inner = CountSource::new("nHit");
        let twice = |source: &str| {
            Oam::list_count(
                Some(outer.clone()),
                Oam::list_count(Some(inner.clone()), Oam::primitive(source)),
            )
        };
        let tree = rec(vec![("x", twice("x")), ("y", twice("y"))]);

        let expected = Oam::list_count(
            Some(outer.clone()),
            Oam::list_count(
                Some(inner.clone()),
                rec(vec![("x", Oam::primitive("x")), ("y", Oam::primitive("y"))]),
            ),
        );

        assert_eq!(array_of_structs(&tree), expected);
    }

    #[test]
    fn test_idempotent() {
        let c = CountSource::new("nJet");
        let d = CountSource::new("nMuon");
        let h = CountSource::new("nHit");
        let tree = rec(vec![
            ("run", Oam::primitive("run")),
            (
                "Jet",
                rec(vec![("pt", jagged(&c, "Jet_pt")), ("eta", jagged(&c, "Jet_eta"))]),
            ),
            (
                "Muon",
                rec(vec![("pt", jagged(&d, "Muon_pt")), ("q", jagged(&c, "Muon_q"))]),
            ),
            (
                "Track",
                rec(vec![
                    ("hits", Oam::list_count(Some(c.clone()), jagged(&h, "hits"))),
                    ("ids", Oam::list_count(Some(c.clone()), jagged(&h, "ids"))),
                ]),
            ),
        ]);

        let once = array_of_structs(&tree);
        let twice = array_of_structs(&once);
        assert_eq!(once, twice);
    }
}
