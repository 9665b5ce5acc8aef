use feedpulse_client_instrumented::prelude::FeedPulseClient;
use flow_probe_runner::prelude::UserValuesConstraint;

/// Per-VU values for FeedPulse scenarios.
///
/// Scenarios that need their own per-VU state can provide it as `SV`.
#[derive(Default, Debug)]
pub struct FeedPulseVuContext<SV: UserValuesConstraint = ()> {
    pub(crate) client: Option<FeedPulseClient>,
    pub scenario_values: SV,
}

impl<SV: UserValuesConstraint> UserValuesConstraint for FeedPulseVuContext<SV> {}

impl<SV: UserValuesConstraint> FeedPulseVuContext<SV> {
    /// The connected API client for this VU.
    ///
    /// Only available after [crate::common::connect_client] has run for this VU.
    pub fn client(&self) -> anyhow::Result<FeedPulseClient> {
        self.client
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No client connected for this VU"))
    }
}
