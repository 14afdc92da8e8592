//! Metric documents produced by a pipeline run.
//!
//! A run writes one JSON file per metrics group into its results directory.
//! [`MetricsLoader`] reads the fixed set of groups the dashboard binds to and
//! [`MetricsStore`] tracks each one as Pending, Loaded or Failed.

mod document;
mod loader;

pub use document::{Distribution, DocumentError, DocumentName, MetricValue, MetricsDocument};
pub use loader::{DocumentState, LoadOutcome, MetricsLoader, MetricsStore, PendingLoads};
