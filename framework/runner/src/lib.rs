mod cli;
mod context;
mod definition;
mod executor;
mod init;
mod load;
mod monitor;
mod pacer;
mod progress;
mod run;
mod shutdown;
mod types;

pub mod prelude {
    pub use crate::cli::{ProbeScenarioCli, ReporterOpt};
    pub use crate::context::{RunnerContext, UserValuesConstraint, VuContext};
    pub use crate::definition::{HookResult, ScenarioDefinitionBuilder};
    pub use crate::executor::Executor;
    pub use crate::load::{LoadProfile, RampStage};
    pub use crate::run::run;
    pub use crate::types::ProbeResult;

    pub use flow_probe_core::prelude::{
        DelegatedShutdownListener, ShutdownSignalError, VuBailError,
    };
    pub use flow_probe_instruments::{Reporter, RunStats, Threshold};
}
