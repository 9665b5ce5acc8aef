use crate::cli::ProbeScenarioCli;
use clap::Parser;

/// Initialise logging and parse the CLI for a scenario binary.
pub fn init() -> ProbeScenarioCli {
    env_logger::init();

    ProbeScenarioCli::parse()
}
