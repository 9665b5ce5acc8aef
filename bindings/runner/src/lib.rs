mod common;
mod context;
mod environment;
mod runner_context;
pub mod steps;
mod stress;

pub mod prelude {
    /// Common operations for FeedPulse scenarios.
    ///
    /// This is a good place to start if you are getting started writing scenarios.
    pub use crate::common::*;

    pub use crate::context::FeedPulseVuContext;
    pub use crate::environment::{Environment, UnknownEnvironmentError};
    pub use crate::runner_context::FeedPulseRunnerContext;
    pub use crate::steps;
    pub use crate::stress::{pick_stress_endpoint, StressEndpoint};

    /// Re-export of the `flow_probe_runner` prelude.
    ///
    /// This is for convenience so that you can depend on a single crate for the runner in your scenarios.
    pub use flow_probe_runner::prelude::*;

    /// Re-export of the instrumented client for convenience.
    pub use feedpulse_client_instrumented::prelude::*;
}
