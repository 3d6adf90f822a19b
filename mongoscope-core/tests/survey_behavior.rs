//! End-to-end survey behavior against an in-memory document source.
//!
//! These tests drive the full pipeline (enumeration, scanning, inference,
//! report assembly) without a live server, exercising the degradation rules
//! for malformed documents, transient faults, and permission failures.

use async_trait::async_trait;
use futures::StreamExt;
use mongodb::bson::{Document, doc};
use mongoscope_core::{
    DocumentSource, DocumentStream, IndexDescriptor, IndexDirection, IndexKey, RetryPolicy,
    ScanErrorKind, ScanMode, ScanStatus, SourceError, SurveyConfig, SurveyError, Surveyor,
    TypeTag,
};
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;

/// One item the fake stream will yield.
enum Event {
    Doc(Document),
    Malformed,
    Transient,
    Permission,
}

#[derive(Default)]
struct Fixture {
    events: Vec<Event>,
    /// Transient open failures before the stream opens successfully.
    open_failures: u32,
    /// Open fails with a permission error every time.
    open_denied: bool,
    indexes: Vec<IndexDescriptor>,
    index_listing_fails: bool,
}

impl Fixture {
    fn with_docs(docs: Vec<Document>) -> Self {
        Self {
            events: docs.into_iter().map(Event::Doc).collect(),
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct FakeSource {
    fixtures: BTreeMap<String, Fixture>,
    enumeration_denied: bool,
    open_attempts: Mutex<BTreeMap<String, u32>>,
    modes_seen: Mutex<BTreeMap<String, ScanMode>>,
}

impl FakeSource {
    fn add(mut self, name: &str, fixture: Fixture) -> Self {
        self.fixtures.insert(name.to_string(), fixture);
        self
    }

    fn open_attempts_for(&self, collection: &str) -> u32 {
        *self
            .open_attempts
            .lock()
            .unwrap()
            .get(collection)
            .unwrap_or(&0)
    }

    fn mode_for(&self, collection: &str) -> Option<ScanMode> {
        self.modes_seen.lock().unwrap().get(collection).copied()
    }
}

fn io_reset() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset")
}

#[async_trait]
impl DocumentSource for FakeSource {
    async fn collection_names(&self, _database: &str) -> Result<Vec<String>, SourceError> {
        if self.enumeration_denied {
            return Err(SourceError::permission("not authorized to list collections"));
        }
        // Deliberately reversed so output ordering has to come from the
        // surveyor, not from us.
        Ok(self.fixtures.keys().rev().cloned().collect())
    }

    async fn documents(
        &self,
        _database: &str,
        collection: &str,
        mode: ScanMode,
    ) -> Result<DocumentStream, SourceError> {
        self.modes_seen
            .lock()
            .unwrap()
            .insert(collection.to_string(), mode);

        let fixture = self
            .fixtures
            .get(collection)
            .ok_or_else(|| SourceError::permission("unknown collection"))?;

        let attempt = {
            let mut attempts = self.open_attempts.lock().unwrap();
            let entry = attempts.entry(collection.to_string()).or_insert(0);
            *entry += 1;
            *entry
        };

        if fixture.open_denied {
            return Err(SourceError::permission("not authorized to read collection"));
        }
        if attempt <= fixture.open_failures {
            return Err(SourceError::transient("cursor open failed", io_reset()));
        }

        let items: Vec<Result<Document, SourceError>> = fixture
            .events
            .iter()
            .map(|event| match event {
                Event::Doc(document) => Ok(document.clone()),
                Event::Malformed => Err(SourceError::malformed("invalid BSON", io_reset())),
                Event::Transient => Err(SourceError::transient("batch fetch failed", io_reset())),
                Event::Permission => Err(SourceError::permission("cursor access revoked")),
            })
            .collect();
        Ok(futures::stream::iter(items).boxed())
    }

    async fn indexes(
        &self,
        _database: &str,
        collection: &str,
    ) -> Result<Vec<IndexDescriptor>, SourceError> {
        let fixture = self
            .fixtures
            .get(collection)
            .ok_or_else(|| SourceError::permission("unknown collection"))?;
        if fixture.index_listing_fails {
            return Err(SourceError::other("listIndexes failed", io_reset()));
        }
        Ok(fixture.indexes.clone())
    }
}

fn fast_config() -> SurveyConfig {
    SurveyConfig::new().with_retry(RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    })
}

fn surveyor(source: FakeSource) -> Surveyor<FakeSource> {
    Surveyor::new(source, fast_config()).unwrap()
}

fn id_index() -> IndexDescriptor {
    IndexDescriptor {
        name: "_id_".to_string(),
        keys: vec![IndexKey {
            field: "_id".to_string(),
            direction: IndexDirection::Ascending,
        }],
        unique: false,
        sparse: false,
        ttl_seconds: None,
        partial_filter: None,
    }
}

#[tokio::test]
async fn test_clean_survey_produces_sorted_complete_report() {
    let source = FakeSource::default()
        .add(
            "users",
            Fixture {
                indexes: vec![id_index()],
                ..Fixture::with_docs(vec![
                    doc! { "name": "ada", "age": 36 },
                    doc! { "name": "grace", "profile": { "active": true } },
                ])
            },
        )
        .add(
            "orders",
            Fixture::with_docs(vec![doc! { "total": 12.5, "items": [1, 2] }]),
        );

    let report = surveyor(source).survey("app").await.unwrap();

    assert_eq!(report.database, "app");
    assert!(report.errors.is_empty());
    assert_eq!(report.complete_count(), 2);

    // Enumeration returned reversed names; the report is sorted.
    let names: Vec<&str> = report.collections.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["orders", "users"]);

    let users = &report.collections[1];
    assert_eq!(users.document_count, 2);
    assert_eq!(users.paths["name"].count, 2);
    assert!(users.paths["profile"].types.contains(&TypeTag::Object));
    assert!(users.paths["profile.active"].types.contains(&TypeTag::Boolean));
    assert_eq!(users.indexes, vec![id_index()]);

    let orders = &report.collections[0];
    assert!(orders.paths["items"].types.contains(&TypeTag::Array));
    // Array elements are opaque.
    assert!(!orders.paths.contains_key("items.0"));
}

#[tokio::test]
async fn test_malformed_documents_are_skipped_and_counted() {
    let source = FakeSource::default().add(
        "events",
        Fixture {
            events: vec![
                Event::Doc(doc! { "a": 1 }),
                Event::Malformed,
                Event::Doc(doc! { "a": 2 }),
                Event::Malformed,
            ],
            ..Fixture::default()
        },
    );

    let report = surveyor(source).survey("app").await.unwrap();
    let events = &report.collections[0];

    assert_eq!(events.status, ScanStatus::Complete);
    assert_eq!(events.document_count, 2);
    assert_eq!(events.skipped_documents, 2);
    assert_eq!(events.paths["a"].count, 2);
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_transient_mid_stream_error_degrades_to_partial() {
    let source = FakeSource::default().add(
        "logs",
        Fixture {
            events: vec![
                Event::Doc(doc! { "msg": "a" }),
                Event::Transient,
                Event::Doc(doc! { "msg": "b" }),
            ],
            ..Fixture::default()
        },
    );

    let report = surveyor(source).survey("app").await.unwrap();
    let logs = &report.collections[0];

    // The scan keeps pulling past the fault; observations before and after
    // it are retained, and the summary is marked degraded.
    assert!(matches!(logs.status, ScanStatus::Partial { .. }));
    assert_eq!(logs.document_count, 2);
    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].collection, "logs");
    assert!(report.errors[0].message.contains("batch fetch failed"));
}

#[tokio::test]
async fn test_permission_mid_stream_stops_the_scan() {
    let source = FakeSource::default().add(
        "audit",
        Fixture {
            events: vec![
                Event::Doc(doc! { "a": 1 }),
                Event::Permission,
                Event::Doc(doc! { "b": 1 }),
            ],
            ..Fixture::default()
        },
    );

    let report = surveyor(source).survey("app").await.unwrap();
    let audit = &report.collections[0];

    assert!(matches!(audit.status, ScanStatus::Partial { .. }));
    // Nothing past the permission failure is read.
    assert_eq!(audit.document_count, 1);
    assert!(!audit.paths.contains_key("b"));
}

#[tokio::test]
async fn test_permission_on_open_fails_without_retry() {
    let source = FakeSource::default()
        .add(
            "secrets",
            Fixture {
                open_denied: true,
                ..Fixture::default()
            },
        )
        .add("public", Fixture::with_docs(vec![doc! { "x": 1 }]));

    let surveyor = surveyor(source);
    let report = surveyor.survey("app").await.unwrap();

    let secrets = report
        .collections
        .iter()
        .find(|c| c.name == "secrets")
        .unwrap();
    assert!(matches!(secrets.status, ScanStatus::Failed { .. }));
    assert_eq!(secrets.document_count, 0);
    assert_eq!(secrets.path_count(), 0);

    // One failing collection does not touch its neighbors.
    let public = report
        .collections
        .iter()
        .find(|c| c.name == "public")
        .unwrap();
    assert_eq!(public.status, ScanStatus::Complete);
    assert_eq!(public.document_count, 1);

    assert_eq!(report.errors.len(), 1);
    assert_eq!(report.errors[0].collection, "secrets");
}

#[tokio::test]
async fn test_transient_open_failures_are_retried() {
    let source = FakeSource::default().add(
        "flaky",
        Fixture {
            open_failures: 2,
            ..Fixture::with_docs(vec![doc! { "ok": true }])
        },
    );

    let surveyor = surveyor(source);
    let report = surveyor.survey("app").await.unwrap();

    let flaky = &report.collections[0];
    assert_eq!(flaky.status, ScanStatus::Complete);
    assert_eq!(flaky.document_count, 1);
    // Two transient failures plus the successful third attempt.
    assert_eq!(surveyor_source(&surveyor).open_attempts_for("flaky"), 3);
}

#[tokio::test]
async fn test_open_failures_beyond_the_attempt_bound_fail_the_scan() {
    let source = FakeSource::default().add(
        "down",
        Fixture {
            open_failures: 10,
            ..Fixture::with_docs(vec![doc! { "never": 1 }])
        },
    );

    let surveyor = surveyor(source);
    let report = surveyor.survey("app").await.unwrap();

    let down = &report.collections[0];
    assert!(matches!(down.status, ScanStatus::Failed { .. }));
    assert_eq!(surveyor_source(&surveyor).open_attempts_for("down"), 3);
}

#[tokio::test]
async fn test_index_listing_failure_degrades_to_warning() {
    let source = FakeSource::default().add(
        "items",
        Fixture {
            index_listing_fails: true,
            ..Fixture::with_docs(vec![doc! { "sku": "a-1" }])
        },
    );

    let report = surveyor(source).survey("app").await.unwrap();
    let items = &report.collections[0];

    // Document data still comes through; only the index catalog is lost.
    assert_eq!(items.status, ScanStatus::Complete);
    assert_eq!(items.document_count, 1);
    assert!(items.indexes.is_empty());
    assert_eq!(items.warnings.len(), 1);
    assert!(items.warnings[0].contains("indexes"));
    assert!(report.errors.is_empty());
}

#[tokio::test]
async fn test_enumeration_failure_is_fatal() {
    let source = FakeSource {
        enumeration_denied: true,
        ..FakeSource::default()
    };

    let result = surveyor(source).survey("app").await;
    match result {
        Err(SurveyError::Enumeration { database, source }) => {
            assert_eq!(database, "app");
            assert_eq!(source.kind, ScanErrorKind::Permission);
        }
        other => panic!("expected enumeration error, got {:?}", other.map(|r| r.database)),
    }
}

#[tokio::test]
async fn test_system_collections_are_filtered_by_default() {
    let make = || {
        FakeSource::default()
            .add("users", Fixture::with_docs(vec![doc! { "a": 1 }]))
            .add("system.views", Fixture::with_docs(vec![doc! { "viewOn": "users" }]))
    };

    let report = surveyor(make()).survey("app").await.unwrap();
    let names: Vec<&str> = report.collections.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["users"]);

    let config = fast_config().with_include_system(true);
    let report = Surveyor::new(make(), config)
        .unwrap()
        .survey("app")
        .await
        .unwrap();
    let names: Vec<&str> = report.collections.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["system.views", "users"]);
}

#[tokio::test]
async fn test_report_is_identical_across_concurrency_levels() {
    let make = || {
        FakeSource::default()
            .add("a", Fixture::with_docs(vec![doc! { "x": 1 }, doc! { "x": "s" }]))
            .add("b", Fixture::with_docs(vec![doc! { "y": { "z": true } }]))
            .add("c", Fixture::with_docs(vec![doc! { "w": null }]))
    };

    let serial = Surveyor::new(make(), fast_config().with_concurrency(1))
        .unwrap()
        .survey("app")
        .await
        .unwrap();
    let parallel = Surveyor::new(make(), fast_config().with_concurrency(8))
        .unwrap()
        .survey("app")
        .await
        .unwrap();

    assert_eq!(serial.collections, parallel.collections);
    assert_eq!(serial.errors, parallel.errors);
}

#[tokio::test]
async fn test_configured_scan_mode_reaches_the_source() {
    let make = || FakeSource::default().add("users", Fixture::with_docs(vec![doc! { "a": 1 }]));

    let surveyor = Surveyor::new(make(), fast_config().with_mode(ScanMode::Full)).unwrap();
    surveyor.survey("app").await.unwrap();
    assert_eq!(surveyor.source().mode_for("users"), Some(ScanMode::Full));

    let surveyor = Surveyor::new(make(), fast_config().with_mode(ScanMode::Sample(250))).unwrap();
    surveyor.survey("app").await.unwrap();
    assert_eq!(
        surveyor.source().mode_for("users"),
        Some(ScanMode::Sample(250))
    );
}

#[tokio::test]
async fn test_invalid_config_is_rejected_up_front() {
    let config = SurveyConfig::new().with_mode(ScanMode::Sample(0));
    let result = Surveyor::new(FakeSource::default(), config);
    assert!(matches!(result, Err(SurveyError::Configuration { .. })));
}

#[tokio::test]
async fn test_report_round_trips_through_json() {
    let source = FakeSource::default().add(
        "users",
        Fixture {
            indexes: vec![id_index()],
            ..Fixture::with_docs(vec![doc! { "name": "ada" }])
        },
    );

    let report = surveyor(source).survey("app").await.unwrap();
    let json = serde_json::to_string_pretty(&report).unwrap();
    let back: mongoscope_core::SurveyReport = serde_json::from_str(&json).unwrap();

    assert_eq!(back.collections, report.collections);
    assert_eq!(back.database, report.database);
}

/// Test-only peek at the source behind a surveyor, for attempt counting.
fn surveyor_source(surveyor: &Surveyor<FakeSource>) -> &FakeSource {
    surveyor.source()
}
