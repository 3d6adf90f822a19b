//! Index catalog projection.
//!
//! Index definitions are surfaced as descriptive records, straight from the
//! server's `listIndexes` output. Nothing here derives or normalizes: key
//! order, uniqueness, sparsity, TTL and partial-filter predicates pass
//! through as the catalog states them.

use crate::models::{IndexDescriptor, IndexDirection, IndexKey};
use mongodb::IndexModel;
use mongodb::bson::Bson;

/// Projects an [`IndexModel`] into an [`IndexDescriptor`].
pub fn descriptor_from_model(model: &IndexModel) -> IndexDescriptor {
    let keys = model
        .keys
        .iter()
        .map(|(field, value)| IndexKey {
            field: field.clone(),
            direction: direction_from_value(value),
        })
        .collect();

    let options = model.options.as_ref();
    IndexDescriptor {
        name: options
            .and_then(|o| o.name.clone())
            .unwrap_or_else(|| "unnamed".to_string()),
        keys,
        unique: options.and_then(|o| o.unique).unwrap_or(false),
        sparse: options.and_then(|o| o.sparse).unwrap_or(false),
        ttl_seconds: options
            .and_then(|o| o.expire_after)
            .map(|d| d.as_secs()),
        partial_filter: options.and_then(|o| o.partial_filter_expression.clone()),
    }
}

/// Maps an index key value to a direction. The server encodes directions as
/// 1 / -1 (occasionally as doubles); special index types ("text", "hashed",
/// "2dsphere", ...) are surfaced verbatim.
fn direction_from_value(value: &Bson) -> IndexDirection {
    match value {
        Bson::Int32(1) | Bson::Int64(1) => IndexDirection::Ascending,
        Bson::Int32(-1) | Bson::Int64(-1) => IndexDirection::Descending,
        Bson::Double(d) if *d == 1.0 => IndexDirection::Ascending,
        Bson::Double(d) if *d == -1.0 => IndexDirection::Descending,
        Bson::String(s) => IndexDirection::Other(s.clone()),
        other => IndexDirection::Other(other.to_string()),
    }
}
