use std::time::Duration;

use rand::Rng;
use url::Url;

use crate::context::FeedPulseVuContext;
use crate::runner_context::FeedPulseRunnerContext;
use crate::steps;
use feedpulse_client_instrumented::prelude::{
    FeedPulseClient, FeedbackItem, FetchFeedbacksRequest, RegisterRequest,
};
use flow_probe_runner::prelude::{
    HookResult, RunnerContext, ShutdownSignalError, UserValuesConstraint, VuContext,
};

/// Resolves the target environment and sets the `base_url` value in [FeedPulseRunnerContext].
///
/// Use this as the global setup hook for every FeedPulse scenario. An environment name outside
/// the known set fails the run here, before any VUs have started.
///
/// ```rust
/// use feedpulse_probe_runner::prelude::*;
///
/// fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
///     configure_base_url(ctx)
/// }
/// ```
pub fn configure_base_url(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    let environment: crate::environment::Environment = ctx.environment().parse()?;
    let base_url = Url::parse(environment.base_url())?;

    log::debug!("Scenario will target {}", base_url);
    ctx.get_mut().base_url = Some(base_url);

    Ok(())
}

/// Point the scenario at an explicit base URL instead of a named environment.
///
/// This replaces [configure_base_url] in the global setup hook when the target is not one of the
/// known environments, such as a locally started mock server.
pub fn use_base_url(ctx: &mut RunnerContext<FeedPulseRunnerContext>, base_url: Url) {
    ctx.get_mut().base_url = Some(base_url);
}

/// Creates the API client for this VU and stores it in [FeedPulseVuContext].
///
/// Use this as the VU setup hook, after [configure_base_url] has run globally.
pub fn connect_client<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
) -> HookResult {
    let base_url = ctx.runner_context().get().base_url()?;
    let reporter = ctx.runner_context().reporter();

    ctx.get_mut().client = Some(FeedPulseClient::new(base_url, reporter)?);

    Ok(())
}

/// Pause the VU for a fixed think time.
///
/// The pause ends early if the run shuts down, in which case the iteration is abandoned with a
/// shutdown error.
pub fn think_time<RV: UserValuesConstraint, V: UserValuesConstraint>(
    ctx: &mut VuContext<RV, V>,
    seconds: f64,
) -> HookResult {
    ctx.runner_context().executor().execute_in_place(async move {
        tokio::time::sleep(Duration::from_secs_f64(seconds)).await;
        Ok(())
    })
}

/// Pause the VU for `base` seconds plus a uniform draw from `[0, spread)` seconds.
pub fn think_time_jitter<RV: UserValuesConstraint, V: UserValuesConstraint>(
    ctx: &mut VuContext<RV, V>,
    base: f64,
    spread: f64,
) -> HookResult {
    let seconds = base + ctx.rng().gen::<f64>() * spread;
    think_time(ctx, seconds)
}

/// Reduce a step result to a success flag.
///
/// A transport error fails the step rather than aborting the whole iteration, which is how a
/// request that never got a response should count. Shutdown still propagates so the VU stops
/// promptly.
pub fn step_outcome(result: anyhow::Result<bool>) -> anyhow::Result<bool> {
    match result {
        Ok(success) => Ok(success),
        Err(e) if e.is::<ShutdownSignalError>() => Err(e),
        Err(e) => {
            log::warn!("Step failed: {:?}", e);
            Ok(false)
        }
    }
}

/// [step_outcome] for the login steps that yield a token.
pub fn token_outcome(result: anyhow::Result<Option<String>>) -> anyhow::Result<Option<String>> {
    match result {
        Ok(token) => Ok(token),
        Err(e) if e.is::<ShutdownSignalError>() => Err(e),
        Err(e) => {
            log::warn!("Step failed: {:?}", e);
            Ok(None)
        }
    }
}

/// Record the overall outcome of one flow iteration.
pub fn record_iteration<RV: UserValuesConstraint, V: UserValuesConstraint>(
    ctx: &mut VuContext<RV, V>,
    success: bool,
) {
    ctx.runner_context().reporter().add_iteration(success);
}

/// Run [steps::ping] from a synchronous behaviour hook.
pub fn ping_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    bound_ms: u64,
) -> anyhow::Result<bool> {
    let client = ctx.get().client()?;
    ctx.runner_context()
        .executor()
        .execute_in_place(async move { steps::ping(&client, bound_ms).await })
}

/// Run [steps::login] from a synchronous behaviour hook.
pub fn login_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    bound_ms: u64,
) -> anyhow::Result<Option<String>> {
    let client = ctx.get().client()?;
    ctx.runner_context()
        .executor()
        .execute_in_place(async move { steps::login(&client, bound_ms).await })
}

/// Run [steps::login_probe] from a synchronous behaviour hook.
pub fn login_probe_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    bound_ms: u64,
) -> anyhow::Result<bool> {
    let client = ctx.get().client()?;
    ctx.runner_context()
        .executor()
        .execute_in_place(async move { steps::login_probe(&client, bound_ms).await })
}

/// Run [steps::acquire_token] from a synchronous behaviour hook.
pub fn acquire_token_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
) -> anyhow::Result<Option<String>> {
    let client = ctx.get().client()?;
    ctx.runner_context()
        .executor()
        .execute_in_place(async move { steps::acquire_token(&client).await })
}

/// Run [steps::register] from a synchronous behaviour hook.
pub fn register_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    request: RegisterRequest,
    bound_ms: u64,
) -> anyhow::Result<bool> {
    let client = ctx.get().client()?;
    ctx.runner_context()
        .executor()
        .execute_in_place(async move { steps::register(&client, &request, bound_ms).await })
}

/// Run [steps::user_info] from a synchronous behaviour hook.
///
/// Fails the step without issuing a request when no token is available.
pub fn user_info_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    token: Option<&str>,
    bound_ms: u64,
    verify_body: bool,
) -> anyhow::Result<bool> {
    let Some(token) = token.map(|token| token.to_string()) else {
        return Ok(false);
    };
    let client = ctx.get().client()?;
    ctx.runner_context().executor().execute_in_place(async move {
        steps::user_info(&client, &token, bound_ms, verify_body).await
    })
}

/// Run [steps::logout] from a synchronous behaviour hook.
///
/// Fails the step without issuing a request when no token is available.
pub fn logout_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    token: Option<&str>,
    bound_ms: u64,
) -> anyhow::Result<bool> {
    let Some(token) = token.map(|token| token.to_string()) else {
        return Ok(false);
    };
    let client = ctx.get().client()?;
    ctx.runner_context()
        .executor()
        .execute_in_place(async move { steps::logout(&client, &token, bound_ms).await })
}

/// Run [steps::board_metrics] from a synchronous behaviour hook.
///
/// Fails the step without issuing a request when no token is available.
pub fn board_metrics_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    token: Option<&str>,
    bound_ms: u64,
    verify_body: bool,
) -> anyhow::Result<bool> {
    let Some(token) = token.map(|token| token.to_string()) else {
        return Ok(false);
    };
    let client = ctx.get().client()?;
    ctx.runner_context().executor().execute_in_place(async move {
        steps::board_metrics(&client, &token, bound_ms, verify_body).await
    })
}

/// Run [steps::fetch_feedbacks] from a synchronous behaviour hook.
///
/// Fails the step without issuing a request when no token is available.
pub fn fetch_feedbacks_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    token: Option<&str>,
    request: FetchFeedbacksRequest,
    bound_ms: u64,
    verify_body: bool,
) -> anyhow::Result<bool> {
    let Some(token) = token.map(|token| token.to_string()) else {
        return Ok(false);
    };
    let client = ctx.get().client()?;
    ctx.runner_context().executor().execute_in_place(async move {
        steps::fetch_feedbacks(&client, &token, &request, bound_ms, verify_body).await
    })
}

/// Run [steps::feedback_analyses] from a synchronous behaviour hook.
///
/// Fails the step without issuing a request when no token is available.
pub fn feedback_analyses_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    token: Option<&str>,
    bound_ms: u64,
    verify_body: bool,
) -> anyhow::Result<bool> {
    let Some(token) = token.map(|token| token.to_string()) else {
        return Ok(false);
    };
    let client = ctx.get().client()?;
    ctx.runner_context().executor().execute_in_place(async move {
        steps::feedback_analyses(&client, &token, bound_ms, verify_body).await
    })
}

/// Run [steps::upload_feedbacks] from a synchronous behaviour hook.
///
/// Fails the step without issuing a request when no token is available.
pub fn upload_feedbacks_step<SV: UserValuesConstraint>(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<SV>>,
    token: Option<&str>,
    items: Vec<FeedbackItem>,
) -> anyhow::Result<bool> {
    let Some(token) = token.map(|token| token.to_string()) else {
        return Ok(false);
    };
    let client = ctx.get().client()?;
    ctx.runner_context()
        .executor()
        .execute_in_place(async move { steps::upload_feedbacks(&client, &token, &items).await })
}
