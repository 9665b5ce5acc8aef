use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
pub struct ProbeScenarioCli {
    /// The environment to target: `local`, `staging` or `prod`.
    ///
    /// Falls back to the `ENVIRONMENT` variable, then to `local`. Names outside the known set
    /// fail the run at setup.
    #[clap(long, short)]
    pub environment: Option<String>,

    /// The named load profile to run.
    ///
    /// Defaults to the first profile the scenario registers. Naming a profile the scenario does
    /// not define is an error.
    #[clap(long)]
    pub load_profile: Option<String>,

    /// Cap the run duration in seconds, cutting the load profile short if it is longer.
    #[clap(long)]
    pub duration: Option<u64>,

    /// Run as a soak test: hold the profile's peak VU count until stopped.
    #[clap(long, default_value = "false")]
    pub soak: bool,

    /// Do not show a progress bar on the CLI.
    ///
    /// Recommended for CI environments where the bar only adds noise to the logs.
    #[clap(long, default_value = "false")]
    pub no_progress: bool,

    /// Where to send measurements while the run is in progress.
    #[clap(long, value_enum, default_value_t = ReporterOpt::Summary)]
    pub reporter: ReporterOpt,

    /// Base seed for the per-VU random sources.
    ///
    /// Randomized branching (think-time jitter, stress endpoint selection, upload probability)
    /// is reproducible for a given seed and VU count.
    #[clap(long)]
    pub seed: Option<u64>,

    /// Override the output path for the run summary.
    ///
    /// Defaults to `results/<scenario>-test-results-<environment>.json`.
    #[clap(long)]
    pub summary_path: Option<PathBuf>,

    /// Assign a run id instead of generating one.
    #[clap(long)]
    pub run_id: Option<String>,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReporterOpt {
    /// Print operation and check tables at the end of the run.
    #[default]
    Summary,
    /// Stream measurements to InfluxDB (requires `INFLUX_HOST`, `INFLUX_BUCKET`, `INFLUX_TOKEN`).
    Influx,
    /// Discard measurements. Aggregate stats for thresholds and the run summary are still kept.
    Noop,
}
