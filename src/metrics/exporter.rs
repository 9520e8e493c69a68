use std::io::Write;
use std::sync::{Mutex, PoisonError};

use crate::metrics::snapshot::MemoMetricsSnapshot;
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for memo metrics snapshots.
///
/// Writes the Prometheus text exposition format so it can be scraped by
/// Prometheus or forwarded to an OpenTelemetry collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send + Sync> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send + Sync> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_metric(&self, kind: &str, name: &str, value: u64) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_metric("counter", &self.metric_name(suffix), value);
    }

    fn write_gauge(&self, suffix: &str, value: usize) {
        self.write_metric("gauge", &self.metric_name(suffix), value as u64);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send + Sync> MetricsExporter<MemoMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &MemoMetricsSnapshot) {
        self.write_counter("lookups_total", snapshot.lookups);
        self.write_counter("hits_total", snapshot.hits);
        self.write_counter("misses_total", snapshot.misses);
        self.write_counter("computes_total", snapshot.computes);
        self.write_counter("compute_failures_total", snapshot.compute_failures);
        self.write_counter("fills_refused_total", snapshot.fills_refused);
        self.write_counter("entries_created_total", snapshot.entries_created);
        self.write_counter("collisions_total", snapshot.collisions);
        self.write_counter("scan_steps_total", snapshot.scan_steps);
        self.write_counter("probes_total", snapshot.probes);
        self.write_counter("probe_hits_total", snapshot.probe_hits);
        self.write_gauge("entries", snapshot.entries);
        self.write_gauge("computed", snapshot.computed);
        self.write_gauge("levels", snapshot.levels);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exports_prefixed_counters_and_gauges() {
        let exporter = PrometheusTextExporter::new("fib", Vec::new());
        let snapshot = MemoMetricsSnapshot {
            lookups: 3,
            hits: 1,
            misses: 2,
            entries: 2,
            ..MemoMetricsSnapshot::default()
        };
        exporter.export(&snapshot);
        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.contains("# TYPE fib_lookups_total counter\nfib_lookups_total 3\n"));
        assert!(text.contains("fib_hits_total 1\n"));
        assert!(text.contains("# TYPE fib_entries gauge\nfib_entries 2\n"));
    }

    #[test]
    fn empty_prefix_uses_bare_names() {
        let exporter = PrometheusTextExporter::new("", Vec::new());
        exporter.export(&MemoMetricsSnapshot::default());
        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.contains("\nlevels 0\n"));
    }
}
