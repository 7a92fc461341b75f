//! Swim time prediction from historical race results.
//!
//! Results are ingested from comma-separated lines into an in-memory
//! [`core::store::ResultStore`]. A prediction fits a least-squares trend to one
//! swimmer's anchor event, scales it to the target event by the population
//! mean-time ratio, and nudges it by a training score.
//!
//! # Examples
//!
//! In-memory usage:
//! ```
//! use swimcast::{
//!     analytics::predictor::{PredictionRequest, Predictor, TrainingScore},
//!     core::store::ResultStore,
//!     ingest::parse_str,
//!     model::{Event, Swimmer},
//! };
//!
//! let report = parse_str(
//!     "S1,Alex,2008,F,100,Free,SCY,2024-01-01,60.0\n\
//!      S1,Alex,2008,F,100,Free,SCY,2024-03-01,58.0\n",
//! );
//! assert_eq!(report.skipped(), 0);
//!
//! let mut store = ResultStore::new();
//! store.replace_all(report.results);
//!
//! let request = PredictionRequest::new(
//!     Swimmer::new("S1", "Alex", 2008, "F"),
//!     Event::new(100, "Free", "SCY"),
//!     Event::new(100, "Free", "SCY"),
//!     TrainingScore::default(),
//! );
//! let bundle = Predictor::default().predict(&store.snapshot(), &request).expect("predict");
//! assert!((bundle.final_estimate - 58.0).abs() < 1e-9);
//! ```
//!
//! Service usage, with loads and queries serialized through one task:
//! ```no_run
//! use swimcast::{
//!     config::ServiceConfig,
//!     core::store::ResultStore,
//!     ingest::directory::LoadHints,
//!     runtime::handle::spawn_service,
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let handle = spawn_service(ResultStore::new(), ServiceConfig::default());
//! let summary = handle
//!     .load_directory("swim-db", LoadHints::new("Providence", "M", "2024"))
//!     .await
//!     .expect("load");
//! println!("{} results, {} skipped", summary.results, summary.diagnostics.len());
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// Trend fitting, cohort scaling and prediction.
pub mod analytics;
/// Service and predictor settings.
pub mod config;
/// In-memory result store and index helpers.
pub mod core;
/// CSV line and directory ingestion.
pub mod ingest;
/// Swimmer, event and result records.
pub mod model;
/// Single-writer async service and events.
pub mod runtime;
/// Shared primitive types and constants.
pub mod types;
