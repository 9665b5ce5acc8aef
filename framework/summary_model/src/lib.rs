use serde::{Deserialize, Serialize};
use sha3::Digest;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use std::path::Path;

/// Summary of one probe run.
///
/// Written once, at teardown, to a path templated with the scenario and environment names. There
/// are no partial or incremental writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// The unique run id, chosen by the runner.
    pub run_id: String,
    /// The name of the scenario that was run.
    pub scenario_name: String,
    /// The environment the run targeted (`local`, `staging`, `prod`).
    pub environment: String,
    /// The name of the load profile that drove the run.
    pub load_profile: String,
    /// The time the run started, as a Unix timestamp in seconds.
    pub started_at: i64,
    /// The duration the run was configured with, in seconds.
    ///
    /// Not set for soak runs, which have no planned end.
    pub run_duration: Option<u64>,
    /// The peak number of virtual users the load profile called for.
    pub vu_count: usize,
    /// The number of virtual users still running at the end of the run.
    ///
    /// VUs that bail or fail their setup are not counted, so this can be less than
    /// [RunSummary::vu_count].
    pub vu_end_count: usize,
    /// Total flow iterations executed across all VUs.
    pub iterations: u64,
    /// Share of iterations whose flow did not fully succeed.
    pub iteration_error_rate: f64,
    /// Total requests issued across all operations.
    pub request_count: u64,
    /// Share of requests that failed (transport error or 4xx/5xx response).
    pub request_failure_rate: f64,
    /// 95th percentile of all request durations, in milliseconds.
    pub request_duration_p95_ms: f64,
    /// Latency statistics per operation.
    pub operations: BTreeMap<String, OperationSummary>,
    /// Pass/fail counts per named check.
    pub checks: BTreeMap<String, CheckSummary>,
    /// Outcome of every configured threshold.
    pub thresholds: Vec<ThresholdSummary>,
    /// The version of the flow probe that produced this summary.
    pub probe_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OperationSummary {
    pub count: u64,
    pub error_count: u64,
    pub mean_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckSummary {
    pub passes: u64,
    pub fails: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdSummary {
    pub description: String,
    pub observed: f64,
    pub passed: bool,
}

impl RunSummary {
    /// Compute a fingerprint that identifies the configuration used for this run, so that runs of
    /// the same scenario/environment/profile can be grouped when comparing results over time.
    ///
    /// Uses the scenario name, environment, load profile, run duration and probe version, hashed
    /// with [sha3::Sha3_256]. Measured values are deliberately excluded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = sha3::Sha3_256::new();
        Digest::update(&mut hasher, self.scenario_name.as_bytes());
        Digest::update(&mut hasher, self.environment.as_bytes());
        Digest::update(&mut hasher, self.load_profile.as_bytes());
        if let Some(run_duration) = self.run_duration {
            Digest::update(&mut hasher, run_duration.to_le_bytes());
        }
        Digest::update(&mut hasher, self.probe_version.as_bytes());

        format!("{:x}", hasher.finalize())
    }
}

/// Write the run summary to a file as a single pretty-printed JSON document, creating parent
/// directories as needed.
pub fn write_run_summary(run_summary: &RunSummary, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut file = std::fs::File::create(path)?;
    store_run_summary(run_summary, &mut file)?;
    Ok(())
}

/// Serialize the run summary to a writer.
pub fn store_run_summary<W: Write>(run_summary: &RunSummary, writer: &mut W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(writer, run_summary)?;
    Ok(())
}

/// Load a run summary from a reader.
pub fn load_run_summary<R: Read>(reader: R) -> anyhow::Result<RunSummary> {
    let reader = std::io::BufReader::new(reader);
    let run_summary: RunSummary = serde_json::from_reader(reader)?;
    Ok(run_summary)
}
