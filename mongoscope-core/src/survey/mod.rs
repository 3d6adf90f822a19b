//! Survey orchestration.
//!
//! A [`Surveyor`] drives one run: enumerate collections, scan each one
//! concurrently through the [`DocumentSource`] seam, and assemble a
//! [`SurveyReport`]. Collection scans are independent of each other; the
//! only fatal failure is being unable to list the collections at all.

mod scanner;

pub use scanner::scan_collection;

use crate::Result;
use crate::config::SurveyConfig;
use crate::error::SurveyError;
use crate::models::{CollectionError, SurveyMetadata, SurveyReport};
use crate::retry::with_retry;
use crate::source::DocumentSource;
use crate::source::mongo::MongoSource;
use futures::StreamExt;
use std::time::Instant;

/// Runs schema surveys against a document source.
pub struct Surveyor<S: DocumentSource> {
    source: S,
    config: SurveyConfig,
}

impl<S: DocumentSource> Surveyor<S> {
    /// Creates a surveyor over a source.
    ///
    /// # Errors
    /// Returns error if the configuration fails validation.
    pub fn new(source: S, config: SurveyConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { source, config })
    }

    /// Gets the active configuration.
    pub fn config(&self) -> &SurveyConfig {
        &self.config
    }

    /// Gets the underlying source reference.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Surveys every collection in `database` and returns the report.
    ///
    /// Collections are scanned up to `config.concurrency` at a time. A
    /// collection whose scan degrades or fails still appears in the report,
    /// with its problem listed under `errors`; the run itself always
    /// completes once the collection list is in hand.
    ///
    /// # Errors
    /// Returns [`SurveyError::Enumeration`] if the collection list cannot be
    /// obtained even after retries. That is the only error this method
    /// returns.
    pub async fn survey(&self, database: &str) -> Result<SurveyReport> {
        let started = Instant::now();
        let surveyed_at = chrono::Utc::now();

        let mut names = with_retry(&self.config.retry, "list collections", || {
            self.source.collection_names(database)
        })
        .await
        .map_err(|source| SurveyError::Enumeration {
            database: database.to_string(),
            source,
        })?;

        if !self.config.include_system {
            names.retain(|name| !name.starts_with("system."));
        }
        names.sort();

        tracing::info!(
            "Surveying {} collections in '{}' (concurrency {})",
            names.len(),
            database,
            self.config.concurrency
        );

        let mut collections: Vec<_> = futures::stream::iter(names)
            .map(|name| {
                let source = &self.source;
                let config = &self.config;
                async move { scan_collection(source, database, &name, config).await }
            })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        collections.sort_by(|a, b| a.name.cmp(&b.name));

        let errors: Vec<CollectionError> = collections
            .iter()
            .filter_map(|summary| {
                summary.status.error().map(|error| CollectionError {
                    collection: summary.name.clone(),
                    message: error.to_string(),
                })
            })
            .collect();

        let report = SurveyReport {
            database: database.to_string(),
            collections,
            errors,
            metadata: SurveyMetadata {
                surveyed_at,
                duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                surveyor_version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        tracing::info!(
            "Survey of '{}' finished: {} paths across {} collections, {} with errors",
            database,
            report.total_paths(),
            report.collections.len(),
            report.errors.len()
        );

        Ok(report)
    }
}

impl Surveyor<MongoSource> {
    /// Connects to a MongoDB deployment and wraps it in a surveyor.
    ///
    /// # Errors
    /// Returns error if the connection string is invalid or the
    /// configuration fails validation.
    pub async fn connect(connection_string: &str, config: SurveyConfig) -> Result<Self> {
        let source = MongoSource::connect(connection_string).await?;
        Self::new(source, config)
    }
}
