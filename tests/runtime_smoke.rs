use std::{fs, time::Duration};

use tempfile::TempDir;

use swimcast::{
    analytics::{
        AnalysisError,
        predictor::{PredictionRequest, TrainingScore},
    },
    config::ServiceConfig,
    core::store::ResultStore,
    ingest::{IngestError, directory::LoadHints},
    model::{EntryError, Event, ManualEntry, Swimmer},
    runtime::{
        events::StoreEvent,
        handle::{ServiceError, spawn_service},
    },
};

const ROSTER: &str = "\
S1,Alex,2008,F,100,Free,SCY,2024-01-01,60.0
S1,Alex,2008,F,100,Free,SCY,2024-03-01,58.0
S2,Blair,2007,M,200,Free,SCY,2024-02-01,123.9
not,a,record
";

fn entry(date: &str, time: &str) -> ManualEntry {
    ManualEntry {
        swimmer_id: "S3".into(),
        name: "Casey".into(),
        birth_year: "2006".into(),
        sex: "F".into(),
        distance: "50".into(),
        stroke: "Fly".into(),
        course: "LCM".into(),
        date: date.into(),
        time: time.into(),
    }
}

async fn next_event(sub: &mut tokio::sync::broadcast::Receiver<StoreEvent>) -> StoreEvent {
    tokio::time::timeout(Duration::from_secs(1), sub.recv())
        .await
        .expect("event")
        .expect("recv")
}

#[tokio::test]
async fn load_query_predict_and_events() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("roster.csv");
    fs::write(&path, ROSTER).expect("write");

    let handle = spawn_service(ResultStore::new(), ServiceConfig::default());
    let mut sub = handle.subscribe();

    let summary = handle.load_file(&path).await.expect("load");
    assert_eq!(summary.results, 3);
    assert_eq!(summary.diagnostics.len(), 1);
    assert_eq!(
        next_event(&mut sub).await,
        StoreEvent::Loaded {
            results: 3,
            skipped: 1,
            files: 1
        }
    );

    let swimmers = handle.swimmers(None).await.expect("swimmers");
    assert_eq!(swimmers.len(), 2);
    assert_eq!(swimmers[0].name, "Alex");

    let alex = Swimmer::new("S1", "Alex", 2008, "F");
    let events = handle.events_for(alex.clone()).await.expect("events");
    assert_eq!(events.len(), 1);

    let bundle = handle
        .predict(PredictionRequest::new(
            alex,
            Event::new(100, "Free", "SCY"),
            Event::new(200, "Free", "SCY"),
            TrainingScore::default(),
        ))
        .await
        .expect("predict");
    assert!((bundle.ratio - 2.1).abs() < 1e-9);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn failed_load_leaves_store_unchanged() {
    let tmp = TempDir::new().expect("tmp");
    let path = tmp.path().join("roster.csv");
    fs::write(&path, ROSTER).expect("write");
    let empty = TempDir::new().expect("tmp");

    let handle = spawn_service(ResultStore::new(), ServiceConfig::default());
    handle.load_file(&path).await.expect("load");
    let before = handle.snapshot().await.expect("snapshot");

    let mut sub = handle.subscribe();
    let err = handle
        .load_directory(empty.path(), LoadHints::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Ingest(IngestError::NoInput { .. })));
    assert!(matches!(next_event(&mut sub).await, StoreEvent::LoadFailed { .. }));

    let after = handle.snapshot().await.expect("snapshot");
    assert!(std::sync::Arc::ptr_eq(&before, &after));
    assert_eq!(handle.stats().await.expect("stats").result_count, 3);

    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn manual_entries_append_or_explain() {
    let handle = spawn_service(ResultStore::new(), ServiceConfig::default());
    let mut sub = handle.subscribe();

    handle.add_result(entry("2024-06-01", "31.5")).await.expect("add");
    assert_eq!(
        next_event(&mut sub).await,
        StoreEvent::ResultAdded {
            swimmer_id: "S3".into()
        }
    );

    let err = handle.add_result(entry("June 2", "31.0")).await.unwrap_err();
    assert!(matches!(err, ServiceError::Entry(EntryError::Invalid(_))));

    let err = handle
        .predict(PredictionRequest::new(
            Swimmer::new("S3", "Casey", 2006, "F"),
            Event::new(50, "Fly", "LCM"),
            Event::new(50, "Fly", "LCM"),
            TrainingScore::default(),
        ))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Analysis(AnalysisError::InsufficientData { found: 1, .. })
    ));

    assert_eq!(handle.snapshot().await.expect("snapshot").len(), 1);
    handle.shutdown().await.expect("shutdown");
}

#[tokio::test]
async fn calls_after_shutdown_report_closed_channel() {
    let handle = spawn_service(ResultStore::new(), ServiceConfig::default());
    handle.shutdown().await.expect("shutdown");
    tokio::time::sleep(Duration::from_millis(20)).await;

    let err = handle.stats().await.unwrap_err();
    assert!(matches!(err, ServiceError::ChannelClosed));
}
