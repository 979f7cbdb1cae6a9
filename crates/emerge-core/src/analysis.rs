//! The shared context of one analysis run.

use crate::statistics::Statistics;
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Run-scoped state shared by every result produced in one analysis.
///
/// Created once at the start of a run and handed out as `Arc<Analysis>`;
/// the diagnostics counters inside are never reset while the run is alive.
#[derive(Debug)]
pub struct Analysis {
    pub name: String,
    pub started_at: DateTime<Utc>,
    pub statistics: Statistics,
}

impl Analysis {
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            started_at: Utc::now(),
            statistics: Statistics::new(),
        })
    }
}
