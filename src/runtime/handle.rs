use std::{path::PathBuf, sync::Arc};

use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    analytics::{
        AnalysisError,
        compare::{Comparison, compare_swimmers},
        predictor::{PredictionBundle, PredictionRequest, Predictor},
    },
    config::ServiceConfig,
    core::store::{DatasetStats, ResultStore, StoreSnapshot},
    ingest::{
        IngestError, IngestReport, LineDiagnostic,
        directory::{LoadHints, ingest_directory},
        ingest_file,
    },
    model::{EntryError, Event, ManualEntry, Swimmer},
};

use super::events::StoreEvent;

/// Failure of a request sent through a [`ServiceHandle`].
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Load failed; the store is unchanged.
    #[error(transparent)]
    Ingest(#[from] IngestError),
    /// Manual entry rejected.
    #[error(transparent)]
    Entry(#[from] EntryError),
    /// Prediction or comparison failed.
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    /// The blocking load task panicked or was cancelled.
    #[error("load task failed: {0}")]
    LoadTask(String),
    /// The service loop has stopped.
    #[error("service is no longer running")]
    ChannelClosed,
}

/// What a successful load installed.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadSummary {
    /// Files read, in read order.
    pub files: Vec<PathBuf>,
    /// Results now in the store.
    pub results: usize,
    /// Skipped lines.
    pub diagnostics: Vec<LineDiagnostic>,
}

/// Cloneable client for the service loop started by [`spawn_service`].
pub struct ServiceHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<StoreEvent>,
}

impl Clone for ServiceHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

enum Command {
    LoadFile {
        path: PathBuf,
        resp: oneshot::Sender<Result<LoadSummary, ServiceError>>,
    },
    LoadDirectory {
        dir: PathBuf,
        hints: LoadHints,
        resp: oneshot::Sender<Result<LoadSummary, ServiceError>>,
    },
    AddResult {
        entry: ManualEntry,
        resp: oneshot::Sender<Result<(), ServiceError>>,
    },
    Snapshot {
        resp: oneshot::Sender<Arc<StoreSnapshot>>,
    },
    Swimmers {
        query: Option<String>,
        resp: oneshot::Sender<Vec<Arc<Swimmer>>>,
    },
    EventsFor {
        swimmer: Swimmer,
        resp: oneshot::Sender<Vec<Arc<Event>>>,
    },
    Stats {
        resp: oneshot::Sender<DatasetStats>,
    },
    Predict {
        request: PredictionRequest,
        resp: oneshot::Sender<Result<PredictionBundle, ServiceError>>,
    },
    Compare {
        first: Swimmer,
        second: Swimmer,
        event: Event,
        resp: oneshot::Sender<Result<Comparison, ServiceError>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Starts the service loop that owns `store`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_service(store: ResultStore, config: ServiceConfig) -> ServiceHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound.max(1));
    let (events_tx, _) = broadcast::channel::<StoreEvent>(config.event_queue_bound.max(1));

    let events_tx_loop = events_tx.clone();
    let predictor = Predictor::new(config.predictor.clone());

    tokio::spawn(async move {
        let mut store = store;

        while let Some(cmd) = cmd_rx.recv().await {
            let done = handle_command(cmd, &mut store, &predictor, &events_tx_loop).await;
            if done {
                break;
            }
        }
    });

    ServiceHandle { cmd_tx, events_tx }
}

impl ServiceHandle {
    /// Receives every [`StoreEvent`] sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events_tx.subscribe()
    }

    /// Replaces the store with the contents of one file.
    pub async fn load_file(&self, path: impl Into<PathBuf>) -> Result<LoadSummary, ServiceError> {
        let path = path.into();
        self.call(|resp| Command::LoadFile { path, resp }).await?
    }

    /// Replaces the store with a directory load; see [`ingest_directory`].
    pub async fn load_directory(
        &self,
        dir: impl Into<PathBuf>,
        hints: LoadHints,
    ) -> Result<LoadSummary, ServiceError> {
        let dir = dir.into();
        self.call(|resp| Command::LoadDirectory { dir, hints, resp }).await?
    }

    /// Validates `entry` and appends it.
    pub async fn add_result(&self, entry: ManualEntry) -> Result<(), ServiceError> {
        self.call(|resp| Command::AddResult { entry, resp }).await?
    }

    /// Current snapshot, for callers that run their own queries off the loop.
    pub async fn snapshot(&self) -> Result<Arc<StoreSnapshot>, ServiceError> {
        self.call(|resp| Command::Snapshot { resp }).await
    }

    /// Swimmers sorted by name, optionally filtered by a name substring.
    pub async fn swimmers(&self, query: Option<String>) -> Result<Vec<Arc<Swimmer>>, ServiceError> {
        self.call(|resp| Command::Swimmers { query, resp }).await
    }

    /// Distinct events a swimmer has results in.
    pub async fn events_for(&self, swimmer: Swimmer) -> Result<Vec<Arc<Event>>, ServiceError> {
        self.call(|resp| Command::EventsFor { swimmer, resp }).await
    }

    /// Whole-dataset summary.
    pub async fn stats(&self) -> Result<DatasetStats, ServiceError> {
        self.call(|resp| Command::Stats { resp }).await
    }

    /// Runs one prediction on the current snapshot.
    pub async fn predict(&self, request: PredictionRequest) -> Result<PredictionBundle, ServiceError> {
        self.call(|resp| Command::Predict { request, resp }).await?
    }

    /// Compares two swimmers in one event.
    pub async fn compare(
        &self,
        first: Swimmer,
        second: Swimmer,
        event: Event,
    ) -> Result<Comparison, ServiceError> {
        self.call(|resp| Command::Compare {
            first,
            second,
            event,
            resp,
        })
        .await?
    }

    /// Stops the loop after earlier commands finish.
    pub async fn shutdown(&self) -> Result<(), ServiceError> {
        self.call(|resp| Command::Shutdown { resp }).await
    }

    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T, ServiceError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(make(tx))
            .await
            .map_err(|_| ServiceError::ChannelClosed)?;
        rx.await.map_err(|_| ServiceError::ChannelClosed)
    }
}

async fn handle_command(
    cmd: Command,
    store: &mut ResultStore,
    predictor: &Predictor,
    events_tx: &broadcast::Sender<StoreEvent>,
) -> bool {
    match cmd {
        Command::LoadFile { path, resp } => {
            let res = run_load(move || ingest_file(&path)).await;
            let _ = resp.send(install(store, events_tx, res));
        }
        Command::LoadDirectory { dir, hints, resp } => {
            let res = run_load(move || ingest_directory(&dir, &hints)).await;
            let _ = resp.send(install(store, events_tx, res));
        }
        Command::AddResult { entry, resp } => {
            let res = entry.validate().map_err(ServiceError::from).map(|result| {
                let swimmer_id = result.swimmer().id.clone();
                store.append(result);
                let _ = events_tx.send(StoreEvent::ResultAdded { swimmer_id });
            });
            let _ = resp.send(res);
        }
        Command::Snapshot { resp } => {
            let _ = resp.send(store.snapshot());
        }
        Command::Swimmers { query, resp } => {
            let snapshot = store.snapshot();
            let out = match query {
                Some(q) => snapshot.search_swimmers(&q),
                None => snapshot.swimmers(),
            };
            let _ = resp.send(out);
        }
        Command::EventsFor { swimmer, resp } => {
            let _ = resp.send(store.snapshot().events_for(&swimmer));
        }
        Command::Stats { resp } => {
            let _ = resp.send(store.snapshot().stats());
        }
        Command::Predict { request, resp } => {
            let res = predictor
                .predict(&store.snapshot(), &request)
                .map_err(ServiceError::from);
            let _ = resp.send(res);
        }
        Command::Compare {
            first,
            second,
            event,
            resp,
        } => {
            let res = compare_swimmers(&store.snapshot(), &first, &second, &event)
                .map_err(ServiceError::from);
            let _ = resp.send(res);
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

async fn run_load<F>(load: F) -> Result<IngestReport, ServiceError>
where
    F: FnOnce() -> Result<IngestReport, IngestError> + Send + 'static,
{
    tokio::task::spawn_blocking(load)
        .await
        .map_err(|e| ServiceError::LoadTask(format!("join error: {e}")))?
        .map_err(ServiceError::from)
}

/// Swaps a finished load into the store. A failed load leaves it untouched.
fn install(
    store: &mut ResultStore,
    events_tx: &broadcast::Sender<StoreEvent>,
    res: Result<IngestReport, ServiceError>,
) -> Result<LoadSummary, ServiceError> {
    match res {
        Ok(report) => {
            let summary = LoadSummary {
                files: report.files,
                results: report.results.len(),
                diagnostics: report.diagnostics,
            };
            store.replace_all(report.results);
            let _ = events_tx.send(StoreEvent::Loaded {
                results: summary.results,
                skipped: summary.diagnostics.len(),
                files: summary.files.len(),
            });
            Ok(summary)
        }
        Err(err) => {
            tracing::warn!(error = %err, "load failed, store unchanged");
            let _ = events_tx.send(StoreEvent::LoadFailed {
                reason: err.to_string(),
            });
            Err(err)
        }
    }
}
