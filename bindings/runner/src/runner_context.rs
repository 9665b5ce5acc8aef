use flow_probe_runner::prelude::UserValuesConstraint;
use url::Url;

/// Run-wide values for FeedPulse scenarios, populated during global setup.
#[derive(Default, Debug)]
pub struct FeedPulseRunnerContext {
    pub(crate) base_url: Option<Url>,
}

impl UserValuesConstraint for FeedPulseRunnerContext {}

impl FeedPulseRunnerContext {
    /// The base URL of the target deployment.
    ///
    /// Only available after [crate::common::configure_base_url] has run.
    pub fn base_url(&self) -> anyhow::Result<Url> {
        self.base_url
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Base URL has not been configured for this run"))
    }
}
