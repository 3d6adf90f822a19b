//! MongoDB implementation of the document source.
//!
//! # Module Structure
//! - `connection`: client creation and connection-string validation
//! - `indexes`: `IndexModel` to [`IndexDescriptor`] projection
//!
//! # Security
//! - All operations are read-only
//! - Connection strings are sanitized in error messages
//! - Timeouts are applied to every server operation

mod connection;
mod indexes;

use super::{DocumentSource, DocumentStream};
use crate::config::ScanMode;
use crate::error::{ScanErrorKind, SourceError};
use crate::models::IndexDescriptor;
use async_trait::async_trait;
use futures::StreamExt;
use mongodb::Client;
use mongodb::bson::{Document, doc};
use mongodb::error::ErrorKind;

pub use connection::{database_from_url, validate_connection_string};
pub use indexes::descriptor_from_model;

/// Command error codes treated as retryable.
///
/// HostUnreachable, HostNotFound, MaxTimeMSExpired, NetworkTimeout,
/// ShutdownInProgress, PrimarySteppedDown, ExceededTimeLimit,
/// SocketException.
const TRANSIENT_COMMAND_CODES: &[i32] = &[6, 7, 50, 89, 91, 189, 262, 9001];

/// Command error codes for authorization failures.
///
/// Unauthorized, AuthenticationFailed.
const PERMISSION_COMMAND_CODES: &[i32] = &[13, 18];

/// Document source backed by a MongoDB deployment.
#[derive(Debug, Clone)]
pub struct MongoSource {
    client: Client,
}

impl MongoSource {
    /// Wraps an existing client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Gets the underlying client reference.
    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl DocumentSource for MongoSource {
    async fn collection_names(&self, database: &str) -> Result<Vec<String>, SourceError> {
        let db = self.client.database(database);
        db.list_collection_names().await.map_err(|e| {
            classify_error(
                format!("Failed to list collections in database '{}'", database),
                &e,
            )
        })
    }

    async fn documents(
        &self,
        database: &str,
        collection: &str,
        mode: ScanMode,
    ) -> Result<DocumentStream, SourceError> {
        let coll = self
            .client
            .database(database)
            .collection::<Document>(collection);
        let context = format!("'{}.{}'", database, collection);

        match mode {
            ScanMode::Sample(size) => {
                // $sample draws pseudo-randomly without replacement and
                // degenerates to the whole collection when size >= count.
                let pipeline = vec![doc! { "$sample": { "size": i64::from(size) } }];
                let cursor = coll.aggregate(pipeline).await.map_err(|e| {
                    classify_error(format!("Failed to sample documents from {}", context), &e)
                })?;
                Ok(cursor
                    .map(move |item| {
                        item.map_err(|e| {
                            classify_error(format!("Failed to read document from {}", context), &e)
                        })
                    })
                    .boxed())
            }
            ScanMode::Full => {
                let cursor = coll.find(doc! {}).await.map_err(|e| {
                    classify_error(format!("Failed to open cursor on {}", context), &e)
                })?;
                Ok(cursor
                    .map(move |item| {
                        item.map_err(|e| {
                            classify_error(format!("Failed to read document from {}", context), &e)
                        })
                    })
                    .boxed())
            }
        }
    }

    async fn indexes(
        &self,
        database: &str,
        collection: &str,
    ) -> Result<Vec<IndexDescriptor>, SourceError> {
        let coll = self
            .client
            .database(database)
            .collection::<Document>(collection);
        let context = format!("'{}.{}'", database, collection);

        let mut cursor = coll.list_indexes().await.map_err(|e| {
            classify_error(format!("Failed to list indexes for {}", context), &e)
        })?;

        let mut descriptors = Vec::new();
        while cursor.advance().await.map_err(|e| {
            classify_error(format!("Failed to iterate indexes for {}", context), &e)
        })? {
            let model = cursor.deserialize_current().map_err(|e| {
                classify_error(format!("Failed to decode index for {}", context), &e)
            })?;
            descriptors.push(descriptor_from_model(&model));
        }

        Ok(descriptors)
    }
}

/// Maps a driver error into the scan taxonomy.
///
/// I/O faults, server selection failures and a short list of retryable
/// command codes come back `Transient`; authorization failures come back
/// `Permission` and are never retried; BSON decode failures come back
/// `MalformedDocument` so the scanner skips the one document.
pub(crate) fn classify_error(context: String, error: &mongodb::error::Error) -> SourceError {
    let kind = match &*error.kind {
        ErrorKind::Io(_)
        | ErrorKind::ServerSelection { .. }
        | ErrorKind::ConnectionPoolCleared { .. } => ScanErrorKind::Transient,
        ErrorKind::Authentication { .. } => ScanErrorKind::Permission,
        ErrorKind::BsonDeserialization(_) => ScanErrorKind::MalformedDocument,
        ErrorKind::Command(command_error) => {
            if PERMISSION_COMMAND_CODES.contains(&command_error.code) {
                ScanErrorKind::Permission
            } else if TRANSIENT_COMMAND_CODES.contains(&command_error.code) {
                ScanErrorKind::Transient
            } else {
                ScanErrorKind::Other
            }
        }
        _ => ScanErrorKind::Other,
    };

    SourceError {
        kind,
        message: format!("{}: {}", context, error),
        source: Some(Box::new(error.clone())),
    }
}
