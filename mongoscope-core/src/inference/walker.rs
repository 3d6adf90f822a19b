//! Recursive document traversal.

use super::{FieldObservation, classify};
use crate::models::TypeTag;
use mongodb::bson::Document;

/// Lazily walks a document, emitting one [`FieldObservation`] per field.
///
/// Nested objects produce both their own `object` observation and their
/// children's observations under dotted paths, so a report can show "this
/// field is an object" alongside "this object has these sub-fields". Arrays
/// are not descended into. Absent fields are never visited; an explicit
/// null is observed with tag `null`.
///
/// Restartable: calling [`walk`] again on the same document yields the same
/// observation set. Emission order is unspecified and must not be relied on.
pub fn walk<'a>(document: &'a Document, prefix: &str) -> PathWalker<'a> {
    PathWalker {
        stack: vec![Frame {
            prefix: prefix.to_string(),
            entries: document.iter(),
        }],
    }
}

/// Iterator over the field observations of one document.
///
/// Depth-first with an explicit frame stack, so arbitrarily deep nesting
/// never recurses on the call stack. Documents are acyclic trees by
/// construction, so termination needs no cycle detection.
pub struct PathWalker<'a> {
    stack: Vec<Frame<'a>>,
}

struct Frame<'a> {
    prefix: String,
    entries: mongodb::bson::document::Iter<'a>,
}

impl Iterator for PathWalker<'_> {
    type Item = FieldObservation;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some((name, value)) = frame.entries.next() else {
                self.stack.pop();
                continue;
            };

            let path = if frame.prefix.is_empty() {
                name.clone()
            } else {
                format!("{}.{}", frame.prefix, name)
            };

            let tag = classify(value);
            if tag == TypeTag::Object {
                if let Some(nested) = value.as_document() {
                    self.stack.push(Frame {
                        prefix: path.clone(),
                        entries: nested.iter(),
                    });
                }
            }

            return Some(FieldObservation { path, tag });
        }
    }
}
