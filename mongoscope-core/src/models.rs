//! Data model for inferred collection schemas.
//!
//! These types carry the output of a survey run: per-collection field paths
//! with their observed types and occurrence counts, plus the index catalog
//! surfaced from the server. Everything is serializable so the collect
//! binary can write reports as JSON.

use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Canonical tag for a BSON value's runtime type.
///
/// The enumeration is closed: every BSON value maps to exactly one tag (see
/// [`crate::inference::classify`]). Numeric subtypes are kept distinct so a
/// path observed as both `int` and `double` reports as mixed rather than
/// being coalesced into a single numeric type.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "camelCase")]
pub enum TypeTag {
    /// Explicit BSON null (distinct from an absent field, which produces no
    /// observation at all).
    Null,
    /// Boolean
    Boolean,
    /// 32-bit integer
    Integer,
    /// 64-bit integer
    Long,
    /// IEEE 754 double
    Double,
    /// Decimal128
    Decimal,
    /// UTF-8 string
    String,
    /// UTC datetime
    Date,
    /// Internal BSON timestamp
    Timestamp,
    /// ObjectId or other document reference
    ObjectId,
    /// Binary data
    Binary,
    /// Array (element types are not inspected)
    Array,
    /// Embedded document
    Object,
    /// Regular expression
    Regex,
    /// JavaScript code (with or without scope)
    Code,
    /// BSON MinKey
    MinKey,
    /// BSON MaxKey
    MaxKey,
}

impl std::fmt::Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // MongoDB's $type aliases, so reports read like server output.
        let alias = match self {
            TypeTag::Null => "null",
            TypeTag::Boolean => "bool",
            TypeTag::Integer => "int",
            TypeTag::Long => "long",
            TypeTag::Double => "double",
            TypeTag::Decimal => "decimal",
            TypeTag::String => "string",
            TypeTag::Date => "date",
            TypeTag::Timestamp => "timestamp",
            TypeTag::ObjectId => "objectId",
            TypeTag::Binary => "binData",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Regex => "regex",
            TypeTag::Code => "code",
            TypeTag::MinKey => "minKey",
            TypeTag::MaxKey => "maxKey",
        };
        write!(f, "{}", alias)
    }
}

/// Per-path statistics within one collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathSummary {
    /// Distinct types observed at this path across scanned documents.
    pub types: BTreeSet<TypeTag>,
    /// Total number of observations (one per document that carries the path).
    pub count: u64,
}

impl PathSummary {
    /// Formats the type set as a comma-separated list of $type aliases.
    pub fn type_list(&self) -> String {
        let mut out = String::new();
        for (i, tag) in self.types.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&tag.to_string());
        }
        out
    }
}

/// Outcome of scanning a single collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScanStatus {
    /// Every fetched document was walked.
    Complete,
    /// The scan degraded mid-stream; the summary covers the documents seen
    /// before the failure.
    Partial {
        /// Description of the failure that cut the scan short.
        error: String,
    },
    /// The scan could not start; the summary carries no observations.
    Failed {
        /// Description of the failure.
        error: String,
    },
}

impl ScanStatus {
    /// Returns true for a fully successful scan.
    pub fn is_complete(&self) -> bool {
        matches!(self, ScanStatus::Complete)
    }

    /// Returns the error message for degraded or failed scans.
    pub fn error(&self) -> Option<&str> {
        match self {
            ScanStatus::Complete => None,
            ScanStatus::Partial { error } | ScanStatus::Failed { error } => Some(error),
        }
    }
}

/// Sort direction (or special key type) of one index key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexDirection {
    /// Key value 1
    Ascending,
    /// Key value -1
    Descending,
    /// Anything else (text, hashed, 2dsphere, ...), surfaced verbatim.
    Other(String),
}

impl std::fmt::Display for IndexDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexDirection::Ascending => write!(f, "1"),
            IndexDirection::Descending => write!(f, "-1"),
            IndexDirection::Other(kind) => write!(f, "{}", kind),
        }
    }
}

/// A single (field, direction) pair within an index key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexKey {
    /// Indexed field path.
    pub field: String,
    /// Direction or special key type.
    pub direction: IndexDirection,
}

/// Descriptive record for one index, taken verbatim from the server's index
/// catalog. Nothing here is derived or normalized by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    /// Index name.
    pub name: String,
    /// Key specification in catalog order.
    pub keys: Vec<IndexKey>,
    /// Whether the index enforces uniqueness.
    pub unique: bool,
    /// Whether the index skips documents missing the indexed fields.
    pub sparse: bool,
    /// TTL in seconds, when the index expires documents.
    pub ttl_seconds: Option<u64>,
    /// Partial-index filter predicate, kept opaque.
    pub partial_filter: Option<Document>,
}

/// Inferred schema for one collection, rebuilt from scratch on every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    /// Collection name.
    pub name: String,
    /// Number of documents that were walked.
    pub document_count: u64,
    /// Documents that failed to decode and were skipped.
    pub skipped_documents: u64,
    /// Field path -> observed types and occurrence count, sorted by path.
    pub paths: BTreeMap<String, PathSummary>,
    /// Index catalog in server order.
    pub indexes: Vec<IndexDescriptor>,
    /// Scan outcome.
    pub status: ScanStatus,
    /// Non-fatal problems hit while scanning (e.g. index listing failed).
    pub warnings: Vec<String>,
}

impl CollectionSummary {
    /// Creates an empty summary for a collection whose scan never started.
    pub fn failed(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            document_count: 0,
            skipped_documents: 0,
            paths: BTreeMap::new(),
            indexes: Vec::new(),
            status: ScanStatus::Failed {
                error: error.into(),
            },
            warnings: Vec::new(),
        }
    }

    /// Number of distinct field paths observed.
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }
}

/// A per-collection failure surfaced at the run level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionError {
    /// Collection whose scan degraded or failed.
    pub collection: String,
    /// Error message.
    pub message: String,
}

/// Run metadata stamped onto every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyMetadata {
    /// When the survey ran.
    pub surveyed_at: chrono::DateTime<chrono::Utc>,
    /// Wall-clock duration of the run.
    pub duration_ms: u64,
    /// Version of the surveyor that produced the report.
    pub surveyor_version: String,
}

/// Complete output of one survey run over a database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyReport {
    /// Database that was surveyed.
    pub database: String,
    /// One summary per non-system collection, sorted by name.
    pub collections: Vec<CollectionSummary>,
    /// Collections whose scans degraded or failed outright.
    pub errors: Vec<CollectionError>,
    /// Run metadata.
    pub metadata: SurveyMetadata,
}

impl SurveyReport {
    /// Total number of distinct paths across all collections.
    pub fn total_paths(&self) -> usize {
        self.collections.iter().map(CollectionSummary::path_count).sum()
    }

    /// Number of collections that scanned without any degradation.
    pub fn complete_count(&self) -> usize {
        self.collections
            .iter()
            .filter(|c| c.status.is_complete())
            .count()
    }
}
