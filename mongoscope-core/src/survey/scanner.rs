//! Single-collection scanning.

use crate::config::SurveyConfig;
use crate::error::ScanErrorKind;
use crate::inference::SchemaAccumulator;
use crate::models::{CollectionSummary, ScanStatus};
use crate::retry::with_retry;
use crate::source::DocumentSource;
use futures::StreamExt;

/// Scans one collection into a [`CollectionSummary`].
///
/// Never returns an error: a failed or degraded scan comes back as a summary
/// with [`ScanStatus::Failed`] or [`ScanStatus::Partial`], so one
/// collection's problems cannot abort the run. Failure handling:
///
/// - opening the stream retries transient errors per the retry policy;
/// - a document that fails to decode is skipped and counted, and the scan
///   continues;
/// - transient mid-stream errors are noted and the scan keeps pulling; if
///   the stream ends early the summary is `Partial` over the documents seen;
/// - permission errors stop the stream immediately (retrying is pointless);
/// - an index-listing failure degrades to an empty index list plus a
///   warning.
pub async fn scan_collection<S: DocumentSource + ?Sized>(
    source: &S,
    database: &str,
    collection: &str,
    config: &SurveyConfig,
) -> CollectionSummary {
    tracing::debug!("Scanning collection '{}.{}'", database, collection);

    let mut accumulator = SchemaAccumulator::new();
    let mut warnings = Vec::new();

    let stream = with_retry(&config.retry, "open document stream", || {
        source.documents(database, collection, config.mode)
    })
    .await;

    let status = match stream {
        Err(error) => {
            tracing::warn!(
                "Scan of '{}.{}' could not start: {}",
                database,
                collection,
                error
            );
            ScanStatus::Failed {
                error: error.to_string(),
            }
        }
        Ok(mut documents) => {
            let mut stream_error: Option<String> = None;

            while let Some(item) = documents.next().await {
                match item {
                    Ok(document) => accumulator.record_document(&document),
                    Err(error) if error.kind == ScanErrorKind::MalformedDocument => {
                        tracing::debug!(
                            "Skipping malformed document in '{}.{}': {}",
                            database,
                            collection,
                            error
                        );
                        accumulator.record_skipped();
                    }
                    Err(error) if error.kind == ScanErrorKind::Transient => {
                        // Note it and keep pulling; a dead cursor ends the
                        // stream on its own.
                        stream_error = Some(error.to_string());
                    }
                    Err(error) => {
                        stream_error = Some(error.to_string());
                        break;
                    }
                }
            }

            match stream_error {
                None => ScanStatus::Complete,
                Some(error) => {
                    tracing::warn!(
                        "Scan of '{}.{}' degraded after {} documents: {}",
                        database,
                        collection,
                        accumulator.document_count(),
                        error
                    );
                    ScanStatus::Partial { error }
                }
            }
        }
    };

    let indexes = match with_retry(&config.retry, "list indexes", || {
        source.indexes(database, collection)
    })
    .await
    {
        Ok(indexes) => indexes,
        Err(error) => {
            let warning = format!(
                "Failed to list indexes for '{}.{}': {}",
                database, collection, error
            );
            tracing::warn!("{}", warning);
            warnings.push(warning);
            Vec::new()
        }
    };

    accumulator.finish(collection, indexes, status, warnings)
}
