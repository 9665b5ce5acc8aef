use std::collections::BTreeMap;
use std::fmt;

use crate::OperationRecord;

/// Aggregated statistics for one run, produced by [crate::Reporter::finalize].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub operations: BTreeMap<String, OperationStats>,
    pub checks: BTreeMap<String, CheckStats>,
    pub iterations: u64,
    pub failed_iterations: u64,
    pub request_count: u64,
    pub failed_request_count: u64,
    /// 95th percentile of all request durations across every operation, in milliseconds.
    pub request_duration_p95_ms: f64,
}

impl RunStats {
    pub fn iteration_error_rate(&self) -> f64 {
        if self.iterations == 0 {
            0.0
        } else {
            self.failed_iterations as f64 / self.iterations as f64
        }
    }

    pub fn request_failure_rate(&self) -> f64 {
        if self.request_count == 0 {
            0.0
        } else {
            self.failed_request_count as f64 / self.request_count as f64
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationStats {
    pub count: u64,
    pub error_count: u64,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckStats {
    pub passes: u64,
    pub fails: u64,
}

impl CheckStats {
    pub fn pass_rate(&self) -> f64 {
        let total = self.passes + self.fails;
        if total == 0 {
            0.0
        } else {
            self.passes as f64 / total as f64
        }
    }
}

/// An aggregate pass/fail criterion evaluated over the whole run.
///
/// Thresholds never abort an in-progress run. They are evaluated once at the end and included in
/// the run summary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// p95 of all request durations must stay below this bound, in milliseconds.
    RequestDurationP95BelowMs(f64),
    /// Share of requests that failed (transport error or 4xx/5xx) must stay below this rate.
    RequestFailureRateBelow(f64),
    /// Share of VU iterations that failed their flow must stay below this rate.
    IterationErrorRateBelow(f64),
}

impl Threshold {
    pub fn evaluate(&self, stats: &RunStats) -> ThresholdOutcome {
        let observed = match self {
            Threshold::RequestDurationP95BelowMs(_) => stats.request_duration_p95_ms,
            Threshold::RequestFailureRateBelow(_) => stats.request_failure_rate(),
            Threshold::IterationErrorRateBelow(_) => stats.iteration_error_rate(),
        };
        let bound = match self {
            Threshold::RequestDurationP95BelowMs(bound)
            | Threshold::RequestFailureRateBelow(bound)
            | Threshold::IterationErrorRateBelow(bound) => *bound,
        };

        ThresholdOutcome {
            description: self.to_string(),
            observed,
            passed: observed < bound,
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Threshold::RequestDurationP95BelowMs(bound) => {
                write!(f, "request duration p(95) < {bound}ms")
            }
            Threshold::RequestFailureRateBelow(bound) => {
                write!(f, "request failure rate < {bound}")
            }
            Threshold::IterationErrorRateBelow(bound) => {
                write!(f, "iteration error rate < {bound}")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdOutcome {
    pub description: String,
    pub observed: f64,
    pub passed: bool,
}

/// Accumulates raw samples while the run is in progress and reduces them to [RunStats] once.
#[derive(Debug, Default)]
pub(crate) struct StatsAccumulator {
    /// Duration (ms) and error flag for every finished operation, per operation id.
    operations: BTreeMap<String, Vec<(f64, bool)>>,
    checks: BTreeMap<String, CheckStats>,
    iterations: u64,
    failed_iterations: u64,
}

impl StatsAccumulator {
    pub(crate) fn add_operation(&mut self, record: &OperationRecord) {
        let Some(elapsed) = record.elapsed else {
            log::warn!(
                "Discarding unfinished operation record: {}",
                record.operation_id
            );
            return;
        };
        self.operations
            .entry(record.operation_id.clone())
            .or_default()
            .push((elapsed.as_secs_f64() * 1000.0, record.is_error));
    }

    pub(crate) fn add_check(&mut self, name: &str, passed: bool) {
        let entry = self.checks.entry(name.to_string()).or_default();
        if passed {
            entry.passes += 1;
        } else {
            entry.fails += 1;
        }
    }

    pub(crate) fn add_iteration(&mut self, success: bool) {
        self.iterations += 1;
        if !success {
            self.failed_iterations += 1;
        }
    }

    pub(crate) fn build(&self) -> RunStats {
        let mut all_durations = Vec::new();
        let mut request_count = 0;
        let mut failed_request_count = 0;

        let operations = self
            .operations
            .iter()
            .map(|(operation_id, samples)| {
                let mut durations: Vec<f64> = samples.iter().map(|(ms, _)| *ms).collect();
                let error_count = samples.iter().filter(|(_, is_error)| *is_error).count() as u64;
                let count = samples.len() as u64;

                request_count += count;
                failed_request_count += error_count;
                all_durations.extend_from_slice(&durations);

                let sum: f64 = durations.iter().sum();
                let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
                let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let p95 = percentile(&mut durations, 0.95);

                (
                    operation_id.clone(),
                    OperationStats {
                        count,
                        error_count,
                        mean_ms: sum / count as f64,
                        min_ms: min,
                        max_ms: max,
                        p95_ms: p95,
                    },
                )
            })
            .collect();

        RunStats {
            operations,
            checks: self.checks.clone(),
            iterations: self.iterations,
            failed_iterations: self.failed_iterations,
            request_count,
            failed_request_count,
            request_duration_p95_ms: percentile(&mut all_durations, 0.95),
        }
    }
}

/// Nearest-rank percentile. Returns 0.0 for an empty sample set.
fn percentile(samples: &mut [f64], q: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.sort_by(|a, b| a.partial_cmp(b).expect("duration samples must be finite"));
    let rank = (q * samples.len() as f64).ceil() as usize;
    samples[rank.clamp(1, samples.len()) - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn record(operation_id: &str, ms: u64, is_error: bool) -> OperationRecord {
        let mut record = OperationRecord::new(operation_id);
        record.elapsed = Some(Duration::from_millis(ms));
        record.is_error = is_error;
        record
    }

    #[test]
    fn percentile_nearest_rank() {
        let mut samples: Vec<f64> = (1..=100).map(|n| n as f64).collect();
        assert_eq!(95.0, percentile(&mut samples, 0.95));

        let mut small = vec![10.0, 20.0];
        assert_eq!(20.0, percentile(&mut small, 0.95));

        let mut empty: Vec<f64> = Vec::new();
        assert_eq!(0.0, percentile(&mut empty, 0.95));
    }

    #[test]
    fn operation_stats_are_reduced_per_operation() {
        let mut acc = StatsAccumulator::default();
        acc.add_operation(&record("login", 100, false));
        acc.add_operation(&record("login", 300, true));
        acc.add_operation(&record("ping", 10, false));

        let stats = acc.build();

        let login = &stats.operations["login"];
        assert_eq!(2, login.count);
        assert_eq!(1, login.error_count);
        assert_eq!(200.0, login.mean_ms);
        assert_eq!(100.0, login.min_ms);
        assert_eq!(300.0, login.max_ms);

        assert_eq!(3, stats.request_count);
        assert_eq!(1, stats.failed_request_count);
    }

    #[test]
    fn unfinished_records_are_discarded() {
        let mut acc = StatsAccumulator::default();
        acc.add_operation(&OperationRecord::new("login"));

        assert_eq!(RunStats::default(), acc.build());
    }

    #[test]
    fn check_and_iteration_rates() {
        let mut acc = StatsAccumulator::default();
        acc.add_check("login status is 200", true);
        acc.add_check("login status is 200", false);
        acc.add_check("login status is 200", false);
        acc.add_iteration(true);
        acc.add_iteration(false);

        let stats = acc.build();
        let check = &stats.checks["login status is 200"];
        assert_eq!(1, check.passes);
        assert_eq!(2, check.fails);
        assert_eq!(0.5, stats.iteration_error_rate());
    }

    #[test]
    fn threshold_evaluation() {
        let mut acc = StatsAccumulator::default();
        acc.add_operation(&record("ping", 100, false));
        acc.add_operation(&record("ping", 200, true));
        let stats = acc.build();

        let outcome = Threshold::RequestDurationP95BelowMs(1500.0).evaluate(&stats);
        assert!(outcome.passed);
        assert_eq!(200.0, outcome.observed);

        let outcome = Threshold::RequestFailureRateBelow(0.05).evaluate(&stats);
        assert!(!outcome.passed);
        assert_eq!(0.5, outcome.observed);

        let outcome = Threshold::IterationErrorRateBelow(0.05).evaluate(&stats);
        assert!(outcome.passed, "no iterations recorded means no errors");
    }
}
