//! Core library for mongoscope implicit-schema surveys.
//!
//! MongoDB enforces no schema, but applications always assume one. This
//! crate rebuilds that implicit schema by observation: it scans documents,
//! walks their fields, and reports which dotted paths exist, which BSON
//! types each path was seen with, and how often. Index metadata is surfaced
//! alongside, verbatim from the server's catalog.
//!
//! # Architecture
//! - [`models`]: report data model (type tags, path summaries, indexes)
//! - [`inference`]: the pure engine (classifier, path walker, accumulator)
//! - [`source`]: the database seam ([`DocumentSource`]) and its MongoDB
//!   implementation
//! - [`survey`]: orchestration (per-collection scanner, concurrent driver)
//! - [`config`], [`error`], [`retry`], [`logging`]: run plumbing
//!
//! # Guarantees
//! - Read-only: no writes ever reach the surveyed deployment.
//! - A run completes whenever collections can be enumerated; individual
//!   collection failures degrade that collection's summary, never the run.
//! - Merging observations is order-independent, so concurrent scans produce
//!   the same report as sequential ones.
//!
//! # Example
//! ```rust,no_run
//! use mongoscope_core::{ScanMode, SurveyConfig, Surveyor};
//!
//! # async fn run() -> mongoscope_core::Result<()> {
//! let config = SurveyConfig::new().with_mode(ScanMode::Sample(500));
//! let surveyor = Surveyor::connect("mongodb://localhost:27017/app", config).await?;
//! let report = surveyor.survey("app").await?;
//! for collection in &report.collections {
//!     println!("{}: {} paths", collection.name, collection.path_count());
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod inference;
pub mod logging;
pub mod models;
pub mod retry;
pub mod source;
pub mod survey;

pub use config::{RetryPolicy, ScanMode, SurveyConfig};
pub use error::{Result, ScanErrorKind, SourceError, SurveyError, redact_database_url};
pub use logging::init_logging;
pub use models::{
    CollectionError, CollectionSummary, IndexDescriptor, IndexDirection, IndexKey, PathSummary,
    ScanStatus, SurveyMetadata, SurveyReport, TypeTag,
};
pub use source::{DocumentSource, DocumentStream};
pub use source::mongo::MongoSource;
pub use survey::{Surveyor, scan_collection};
