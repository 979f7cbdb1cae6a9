//! Run-scoped diagnostics counters.
//!
//! Counters only ever grow during a run and are safe to bump from any number
//! of worker threads. Reporting layers read them through [`Statistics::snapshot`].

use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// The counters tracked for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StatisticsKey {
    /// The grammar matcher recognized an entity declaration.
    ParsingHits,
    /// An entity keyword was found but the grammar matcher rejected the read-ahead.
    ParsingMisses,
    ExtractedFileResults,
    ExtractedEntityResults,
}

impl StatisticsKey {
    pub const ALL: [StatisticsKey; 4] = [
        Self::ParsingHits,
        Self::ParsingMisses,
        Self::ExtractedFileResults,
        Self::ExtractedEntityResults,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::ParsingHits => "parsing_hits",
            Self::ParsingMisses => "parsing_misses",
            Self::ExtractedFileResults => "extracted_file_results",
            Self::ExtractedEntityResults => "extracted_entity_results",
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Monotonic atomic counters, one per [`StatisticsKey`].
#[derive(Debug, Default)]
pub struct Statistics {
    counters: [AtomicU64; StatisticsKey::ALL.len()],
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&self, key: StatisticsKey) {
        self.add(key, 1);
    }

    pub fn add(&self, key: StatisticsKey, amount: u64) {
        self.counters[key.slot()].fetch_add(amount, Ordering::Relaxed);
    }

    pub fn get(&self, key: StatisticsKey) -> u64 {
        self.counters[key.slot()].load(Ordering::Relaxed)
    }

    /// Fraction of keyword occurrences the grammar matcher accepted, if any were seen.
    pub fn parsing_hit_rate(&self) -> Option<f64> {
        let hits = self.get(StatisticsKey::ParsingHits);
        let total = hits + self.get(StatisticsKey::ParsingMisses);
        (total > 0).then(|| hits as f64 / total as f64)
    }

    pub fn snapshot(&self) -> StatisticsSnapshot {
        StatisticsSnapshot {
            counters: StatisticsKey::ALL
                .iter()
                .map(|key| (key.name().to_string(), self.get(*key)))
                .collect(),
            parsing_hit_rate: self.parsing_hit_rate(),
        }
    }
}

/// A point-in-time copy of the counters, for printing or JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatisticsSnapshot {
    pub counters: BTreeMap<String, u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parsing_hit_rate: Option<f64>,
}
