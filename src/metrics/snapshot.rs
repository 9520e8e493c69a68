#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MemoMetricsSnapshot {
    pub lookups: u64,
    pub hits: u64,
    pub misses: u64,

    pub computes: u64,
    pub compute_failures: u64,
    pub fills_refused: u64,

    pub entries_created: u64,
    pub collisions: u64, // entries appended to an already non-empty bucket
    pub scan_steps: u64, // equals() calls while scanning buckets

    pub probes: u64,
    pub probe_hits: u64,

    // gauges captured at snapshot time
    pub entries: usize,
    pub computed: usize,
    pub levels: usize,
}

impl MemoMetricsSnapshot {
    /// Fraction of lookups answered from the trie, `0.0` when there were none.
    pub fn hit_ratio(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}
