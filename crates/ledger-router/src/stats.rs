use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::transaction::Protocol;

/// Router-wide counters, behind their own mutex so a snapshot never
/// blocks on the (potentially slower) queue mutex.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Stats {
    pub total_routed: u64,
    pub routed_by_protocol: HashMap<String, u64>,
    pub rolling_avg_validation_ms: f64,
    pub rollup_blocks_created: u64,
    pub rolling_avg_rollup_ms: f64,
}

impl Stats {
    /// Folds `sample_ms` into the running average, weighting by how many
    /// samples of this kind have been seen so far (`count_before`).
    fn fold_average(current: f64, count_before: u64, sample_ms: f64) -> f64 {
        if count_before == 0 {
            sample_ms
        } else {
            let n = count_before as f64;
            (current * n + sample_ms) / (n + 1.0)
        }
    }

    pub fn record_route(&mut self, protocol: Protocol) {
        self.total_routed += 1;
        *self.routed_by_protocol.entry(protocol.as_str().to_string()).or_insert(0) += 1;
    }

    pub fn record_validation(&mut self, count_before: u64, elapsed_ms: f64) {
        self.rolling_avg_validation_ms = Self::fold_average(self.rolling_avg_validation_ms, count_before, elapsed_ms);
    }

    pub fn record_rollup(&mut self, elapsed_ms: f64) {
        let count_before = self.rollup_blocks_created;
        self.rollup_blocks_created += 1;
        self.rolling_avg_rollup_ms = Self::fold_average(self.rolling_avg_rollup_ms, count_before, elapsed_ms);
    }
}

/// A read-only snapshot of queue depths per protocol, split by status.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct QueueStatus {
    pub pending: usize,
    pub validated: usize,
    pub failed: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rolling_average_folds_samples() {
        let mut s = Stats::default();
        s.record_validation(0, 100.0);
        assert_eq!(s.rolling_avg_validation_ms, 100.0);
        s.record_validation(1, 200.0);
        assert_eq!(s.rolling_avg_validation_ms, 150.0);
    }

    #[test]
    fn record_route_tallies_by_protocol() {
        let mut s = Stats::default();
        s.record_route(Protocol::Bank);
        s.record_route(Protocol::Bank);
        s.record_route(Protocol::Message);
        assert_eq!(s.total_routed, 3);
        assert_eq!(s.routed_by_protocol.get("BANK"), Some(&2));
        assert_eq!(s.routed_by_protocol.get("MESSAGE"), Some(&1));
    }
}
