mod influx_reporter;
mod summary_report;

use crate::stats::{RunStats, StatsAccumulator};
use crate::OperationRecord;
use flow_probe_core::prelude::DelegatedShutdownListener;
use tokio::runtime::Runtime;

pub use influx_reporter::InfluxReporter;
pub use summary_report::SummaryReporter;

/// A sink for the three measurement streams the probe produces: timed operations, named checks
/// and iteration outcomes.
pub trait ReportCollector {
    fn add_operation(&mut self, operation_record: &OperationRecord);

    fn add_check(&mut self, name: &str, passed: bool);

    fn add_iteration(&mut self, success: bool);

    fn finalize(&self);
}

/// Configures which collectors a [Reporter] will forward measurements to.
///
/// The reporter always accumulates [RunStats] internally, so a default config with no collectors
/// is valid and useful in tests.
#[derive(Default)]
pub struct ReportConfig {
    collectors: Vec<Box<dyn ReportCollector + Send>>,
}

impl ReportConfig {
    /// Print operation and check tables to stdout when the run finishes.
    pub fn enable_summary(mut self) -> Self {
        self.collectors.push(Box::new(SummaryReporter::new()));
        self
    }

    /// Stream measurements to InfluxDB as they are recorded.
    ///
    /// Requires the `INFLUX_HOST`, `INFLUX_BUCKET` and `INFLUX_TOKEN` environment variables.
    pub fn enable_influx(
        mut self,
        runtime: &Runtime,
        shutdown_listener: DelegatedShutdownListener,
    ) -> anyhow::Result<Self> {
        self.collectors
            .push(Box::new(InfluxReporter::new(runtime, shutdown_listener)?));
        Ok(self)
    }

    pub fn init(self) -> Reporter {
        Reporter {
            inner: parking_lot::Mutex::new(ReporterInner {
                collectors: self.collectors,
                stats: StatsAccumulator::default(),
            }),
        }
    }
}

struct ReporterInner {
    collectors: Vec<Box<dyn ReportCollector + Send>>,
    stats: StatsAccumulator,
}

/// Shared measurement funnel for a run.
///
/// VU threads record into the reporter concurrently; contention is low because each record is a
/// short critical section.
pub struct Reporter {
    inner: parking_lot::Mutex<ReporterInner>,
}

impl Reporter {
    pub fn add_operation(&self, operation_record: OperationRecord) {
        let mut inner = self.inner.lock();
        inner.stats.add_operation(&operation_record);
        for collector in inner.collectors.iter_mut() {
            collector.add_operation(&operation_record);
        }
    }

    /// Record one boolean assertion under a stable name. Returns `passed` so that checks can be
    /// chained into an overall step outcome.
    pub fn check(&self, name: &str, passed: bool) -> bool {
        let mut inner = self.inner.lock();
        inner.stats.add_check(name, passed);
        for collector in inner.collectors.iter_mut() {
            collector.add_check(name, passed);
        }
        passed
    }

    /// Record the overall outcome of one VU iteration. This is the error-rate stream that the
    /// iteration error-rate threshold is evaluated against.
    pub fn add_iteration(&self, success: bool) {
        let mut inner = self.inner.lock();
        inner.stats.add_iteration(success);
        for collector in inner.collectors.iter_mut() {
            collector.add_iteration(success);
        }
    }

    /// Finish all collectors and reduce the accumulated samples to [RunStats].
    pub fn finalize(&self) -> RunStats {
        let inner = self.inner.lock();
        for collector in inner.collectors.iter() {
            collector.finalize();
        }
        inner.stats.build()
    }
}
