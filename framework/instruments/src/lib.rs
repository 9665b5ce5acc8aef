mod report;
mod stats;

pub use report::{ReportCollector, ReportConfig, Reporter};
pub use stats::{CheckStats, OperationStats, RunStats, Threshold, ThresholdOutcome};

use std::time::{Duration, Instant};

/// One timed exchange with the service under test.
///
/// A record is created just before the request is issued and finished as soon as the response
/// body has been read. The `is_error` flag covers transport failures as well as 4xx/5xx
/// responses, matching what counts as a failed request in the aggregate failure rate.
#[derive(Debug, Clone)]
pub struct OperationRecord {
    pub operation_id: String,
    pub started: Instant,
    pub elapsed: Option<Duration>,
    pub is_error: bool,
}

impl OperationRecord {
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: operation_id.into(),
            started: Instant::now(),
            elapsed: None,
            is_error: false,
        }
    }

    /// Stop the clock on this record.
    pub fn finish(&mut self, is_error: bool) {
        self.elapsed = Some(self.started.elapsed());
        self.is_error = is_error;
    }

    pub fn duration(&self) -> Option<Duration> {
        self.elapsed
    }
}
