//! Structural helpers used by the array-of-structs rewrite

use super::{ListCountOam, ListOffsetOam, Oam, RecordOam};

/// Lazy depth-first walk over the non-record descendants of a record.
///
/// Nested records are entered; lists, primitives and pointers are yielded
/// without being entered. Names are the field names at the level where the
/// leaf was found, so the same name can appear more than once.
pub struct Leaves<'a> {
    stack: Vec<indexmap::map::Iter<'a, String, Oam>>,
}

impl<'a> Leaves<'a> {
    pub fn new(record: &'a RecordOam) -> Self {
        Leaves {
            stack: vec![record.fields.iter()],
        }
    }
}

impl<'a> Iterator for Leaves<'a> {
    type Item = (&'a str, &'a Oam);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(top) = self.stack.last_mut() {
            match top.next() {
                Some((_, Oam::Record(nested))) => self.stack.push(nested.fields.iter()),
                Some((name, node)) => return Some((name.as_str(), node)),
                None => {
                    self.stack.pop();
                }
            }
        }
        None
    }
}

/// Remove exactly one list level from a node.
///
/// A list is replaced by its contents (the count annotation is discarded),
/// a record has every field stripped, anything else is returned as is.
pub fn drop_list(node: &Oam) -> Oam {
    match node {
        Oam::ListCount(ListCountOam { contents, .. }) => (**contents).clone(),
        Oam::ListOffset(ListOffsetOam { contents, .. }) => (**contents).clone(),
        Oam::Record(record) => Oam::record(
            record
                .fields
                .iter()
                .map(|(name, field)| (name.clone(), drop_list(field)))
                .collect(),
        ),
        Oam::Primitive(_) | Oam::Pointer(_) => node.clone(),
    }
}
