//! Schema inference engine.
//!
//! MongoDB is schemaless, so the schema of a collection has to be inferred
//! from its documents. The engine has three parts:
//! - [`classify`]: maps a single BSON value to a canonical [`TypeTag`]
//! - [`walk`]: recursively visits a document's fields, emitting
//!   `(path, type)` observations with dotted paths for nested objects
//! - [`SchemaAccumulator`]: merges observations into per-path statistics
//!   with an order-independent reducer, so sharded scans can combine
//!   partial results in any order
//!
//! Arrays are deliberately opaque: an array classifies as `array` and its
//! elements are never walked, mirroring what server-side aggregation can
//! type-check cheaply. Array element schemas are invisible to this engine.

mod accumulator;
mod classify;
mod walker;

pub use accumulator::SchemaAccumulator;
pub use classify::classify;
pub use walker::{PathWalker, walk};

use crate::models::TypeTag;

/// One `(path, type)` observation from a single document.
///
/// Transient: produced by the walker and consumed immediately by the
/// accumulator. The source document is not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldObservation {
    /// Dot-joined field path.
    pub path: String,
    /// Classified type of the value at that path.
    pub tag: TypeTag,
}
