//! # Metrics Trait Hierarchy
//!
//! ```text
//!   ┌─────────────────────────────┐   ┌─────────────────────────────┐
//!   │    MemoMetricsRecorder      │   │  MemoMetricsReadRecorder    │
//!   │  lookup/hit/miss/compute    │   │  probe / probe_hit  (&self) │
//!   │  failure/entry/scan/collide │   │                             │
//!   └──────────────┬──────────────┘   └──────────────┬──────────────┘
//!                  └──────────────┬──────────────────┘
//!                                 ▼
//!                           MemoMetrics
//!                                 │ snapshot
//!                                 ▼
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```
//!
//! Recorders only write counters; providers only read them; exporters only
//! publish snapshots.

/// Counters written while walking and filling the trie.
pub trait MemoMetricsRecorder {
    /// A key sequence resolved to a slot that was already computed.
    fn record_hit(&mut self);
    /// A key sequence resolved to a pending slot.
    fn record_miss(&mut self);
    /// A pending slot received its value.
    fn record_compute(&mut self);
    /// A compute callback failed; the slot stays pending.
    fn record_compute_failure(&mut self);
    /// A `fill` found the slot already computed and kept the first value.
    fn record_fill_refused(&mut self);
    /// A new entry was created at some trie level.
    fn record_entry_created(&mut self);
    /// A new entry was appended to a non-empty bucket.
    fn record_collision(&mut self);
    /// One `equals` comparison during a bucket scan.
    fn record_scan_step(&mut self);
}

/// Counters bumped from `&self` probes.
pub trait MemoMetricsReadRecorder {
    fn record_probe(&self);
    fn record_probe_hit(&self);
}

/// Snapshot provider for benches and tests.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to production monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
