use std::collections::HashMap;

use feedpulse_probe_runner::prelude::*;
use rand::Rng;

#[derive(Debug, Default)]
struct ScenarioValues {
    picks: HashMap<StressEndpoint, u64>,
}

impl UserValuesConstraint for ScenarioValues {}

fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    configure_base_url(ctx)
}

fn vu_setup(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<ScenarioValues>>,
) -> HookResult {
    connect_client(ctx)
}

/// Each iteration stresses one endpoint, drawn uniformly, so the mix stays even across the whole
/// run regardless of how the VU count moves.
fn vu_behaviour(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<ScenarioValues>>,
) -> HookResult {
    let draw = ctx.rng().gen::<f64>();
    let endpoint = pick_stress_endpoint(draw);
    *ctx
        .get_mut()
        .scenario_values
        .picks
        .entry(endpoint)
        .or_default() += 1;

    let success = match endpoint {
        StressEndpoint::Ping => step_outcome(ping_step(ctx, 1000))?,
        StressEndpoint::Login => step_outcome(login_probe_step(ctx, 2000))?,
        StressEndpoint::UserInfo => match token_outcome(acquire_token_step(ctx))? {
            Some(token) => step_outcome(user_info_step(ctx, Some(&token), 1500, false))?,
            None => false,
        },
        StressEndpoint::FeedbackFetch => match token_outcome(acquire_token_step(ctx))? {
            Some(token) => {
                let offset = ctx.rng().gen_range(0..50);
                step_outcome(fetch_feedbacks_step(
                    ctx,
                    Some(&token),
                    FetchFeedbacksRequest { limit: 10, offset },
                    2500,
                    false,
                ))?
            }
            None => false,
        },
        StressEndpoint::BoardMetrics => match token_outcome(acquire_token_step(ctx))? {
            Some(token) => step_outcome(board_metrics_step(ctx, Some(&token), 2000, false))?,
            None => false,
        },
    };

    record_iteration(ctx, success);
    think_time_jitter(ctx, 0.5, 1.5)
}

fn vu_teardown(
    ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext<ScenarioValues>>,
) -> HookResult {
    let vu_id = ctx.vu_id().to_string();
    for (endpoint, count) in &ctx.get().scenario_values.picks {
        log::debug!("{}: exercised {:?} {} times", vu_id, endpoint, count);
    }

    Ok(())
}

fn main() -> ProbeResult<()> {
    let builder = ScenarioDefinitionBuilder::<
        FeedPulseRunnerContext,
        FeedPulseVuContext<ScenarioValues>,
    >::new_with_init(env!("CARGO_PKG_NAME"))
    .use_load_profile(
        "stress_test",
        LoadProfile::ramping(
            0,
            [
                (120, 50),
                (300, 100),
                (120, 150),
                (180, 150),
                (120, 50),
                (120, 0),
            ],
        ),
    )
    .use_load_profile(
        "spike_test",
        LoadProfile::ramping(10, [(60, 10), (30, 200), (60, 200), (30, 10), (60, 10)]),
    )
    .with_threshold(Threshold::RequestFailureRateBelow(0.15))
    .with_threshold(Threshold::IterationErrorRateBelow(0.15))
    .use_setup(setup)
    .use_vu_setup(vu_setup)
    .use_vu_behaviour(vu_behaviour)
    .use_vu_teardown(vu_teardown);

    run(builder)?;

    Ok(())
}
