//! Lookup metrics (feature `metrics`).
//!
//! Recording, snapshotting and exporting are split the same way for every
//! counter: [`MemoMetrics`](metrics_impl::MemoMetrics) is written by the
//! engine, [`MemoMetricsSnapshot`](snapshot::MemoMetricsSnapshot) is a
//! `Copy` view for tests and benches, and exporters publish snapshots.

pub mod cell;
pub mod exporter;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
