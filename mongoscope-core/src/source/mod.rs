//! The database collaborator seam.
//!
//! The inference engine never talks to a server directly; it consumes a
//! [`DocumentSource`], which supplies the three things a survey needs: the
//! collection list, a document stream per collection, and the index catalog.
//! The MongoDB implementation lives in [`mongo`]; tests drive the engine
//! with in-memory sources instead of a live server.

pub mod mongo;

use crate::config::ScanMode;
use crate::error::SourceError;
use crate::models::IndexDescriptor;
use async_trait::async_trait;
use futures::stream::BoxStream;
use mongodb::bson::Document;

/// Stream of decoded documents from one collection scan.
///
/// Items are individually fallible: a decode failure for one document
/// surfaces as a `MalformedDocument` error without ending the stream's
/// contract, so the scanner can skip it and keep going.
pub type DocumentStream = BoxStream<'static, Result<Document, SourceError>>;

/// Read-only access to a document database.
///
/// All operations are read-only; failures are classified into the
/// [`crate::error::ScanErrorKind`] taxonomy so callers can decide between
/// retrying, skipping, and degrading.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Lists collection names in a database, in no particular order.
    /// System collections are included; filtering is the caller's policy.
    async fn collection_names(&self, database: &str) -> Result<Vec<String>, SourceError>;

    /// Opens a document stream over a collection according to `mode`.
    async fn documents(
        &self,
        database: &str,
        collection: &str,
        mode: ScanMode,
    ) -> Result<DocumentStream, SourceError>;

    /// Retrieves the collection's index catalog, order preserved, contents
    /// surfaced verbatim.
    async fn indexes(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<IndexDescriptor>, SourceError>;
}
