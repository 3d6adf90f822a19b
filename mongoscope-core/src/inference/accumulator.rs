//! Order-independent aggregation of field observations.

use super::{FieldObservation, walk};
use crate::models::{CollectionSummary, IndexDescriptor, PathSummary, ScanStatus};
use mongodb::bson::Document;
use std::collections::BTreeMap;

/// Accumulates per-path statistics for one collection scan.
///
/// The reducer is commutative and associative over the multiset of
/// observations: recording observations in any order, or recording them into
/// separate accumulators and merging those, produces the same summary. That
/// makes it safe to shard a scan across concurrent workers and [`merge`] the
/// partial results.
///
/// [`merge`]: SchemaAccumulator::merge
#[derive(Debug, Clone, Default)]
pub struct SchemaAccumulator {
    paths: BTreeMap<String, PathSummary>,
    documents_seen: u64,
    documents_skipped: u64,
}

impl SchemaAccumulator {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a single observation. A new path starts at `{types: {tag},
    /// count: 1}`; an existing path unions the tag in (a no-op when already
    /// present) and increments the count.
    pub fn record(&mut self, observation: FieldObservation) {
        let summary = self.paths.entry(observation.path).or_default();
        summary.types.insert(observation.tag);
        summary.count = summary.count.saturating_add(1);
    }

    /// Walks a document and records every observation it produces.
    pub fn record_document(&mut self, document: &Document) {
        self.documents_seen = self.documents_seen.saturating_add(1);
        for observation in walk(document, "") {
            self.record(observation);
        }
    }

    /// Counts a document that failed to decode and was skipped.
    pub fn record_skipped(&mut self) {
        self.documents_skipped = self.documents_skipped.saturating_add(1);
    }

    /// Merges another accumulator into this one: path-wise count addition
    /// and type-set union. Order of merging never changes the result.
    pub fn merge(&mut self, other: SchemaAccumulator) {
        for (path, incoming) in other.paths {
            let summary = self.paths.entry(path).or_default();
            summary.types.extend(incoming.types);
            summary.count = summary.count.saturating_add(incoming.count);
        }
        self.documents_seen = self.documents_seen.saturating_add(other.documents_seen);
        self.documents_skipped = self
            .documents_skipped
            .saturating_add(other.documents_skipped);
    }

    /// Number of documents recorded so far.
    pub fn document_count(&self) -> u64 {
        self.documents_seen
    }

    /// Finishes the scan, producing the collection summary.
    pub fn finish(
        self,
        name: impl Into<String>,
        indexes: Vec<IndexDescriptor>,
        status: ScanStatus,
        warnings: Vec<String>,
    ) -> CollectionSummary {
        CollectionSummary {
            name: name.into(),
            document_count: self.documents_seen,
            skipped_documents: self.documents_skipped,
            paths: self.paths,
            indexes,
            status,
            warnings,
        }
    }
}
