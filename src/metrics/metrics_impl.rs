use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{MemoMetricsReadRecorder, MemoMetricsRecorder};

#[derive(Debug, Default)]
pub struct MemoMetrics {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,
    pub computes: u64,
    pub compute_failures: u64,
    pub fills_refused: u64,
    pub entries_created: u64,
    pub collisions: u64,
    pub scan_steps: u64,
    pub probes: MetricsCell,
    pub probe_hits: MetricsCell,
}

impl MemoMetricsRecorder for MemoMetrics {
    fn record_hit(&mut self) {
        self.lookups += 1;
        self.hits += 1;
    }

    fn record_miss(&mut self) {
        self.lookups += 1;
        self.misses += 1;
    }

    fn record_compute(&mut self) {
        self.computes += 1;
    }

    fn record_compute_failure(&mut self) {
        self.compute_failures += 1;
    }

    fn record_fill_refused(&mut self) {
        self.fills_refused += 1;
    }

    fn record_entry_created(&mut self) {
        self.entries_created += 1;
    }

    fn record_collision(&mut self) {
        self.collisions += 1;
    }

    fn record_scan_step(&mut self) {
        self.scan_steps += 1;
    }
}

impl MemoMetricsReadRecorder for MemoMetrics {
    fn record_probe(&self) {
        self.probes.incr();
    }

    fn record_probe_hit(&self) {
        self.probe_hits.incr();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hit_and_miss_both_count_as_lookups() {
        let mut m = MemoMetrics::default();
        m.record_hit();
        m.record_miss();
        m.record_miss();
        assert_eq!(m.lookups, 3);
        assert_eq!(m.hits, 1);
        assert_eq!(m.misses, 2);
    }

    #[test]
    fn probe_counters_work_through_shared_ref() {
        let m = MemoMetrics::default();
        let r = &m;
        r.record_probe();
        r.record_probe();
        r.record_probe_hit();
        assert_eq!(m.probes.get(), 2);
        assert_eq!(m.probe_hits.get(), 1);
    }
}
