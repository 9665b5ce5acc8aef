use feedpulse_probe_runner::prelude::*;

fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    configure_base_url(ctx)
}

fn vu_setup(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    connect_client(ctx)
}

/// One complete user journey: health check, login, profile, feedback page, dashboard, analyses,
/// logout.
///
/// Body verification is left to the focused scenarios; this one watches latency across the whole
/// journey, so the per-step bounds are the checks that matter here.
fn vu_behaviour(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    let ping_ok = step_outcome(ping_step(ctx, 200))?;
    think_time(ctx, 0.3)?;

    let Some(token) = token_outcome(login_step(ctx, 1000))? else {
        record_iteration(ctx, false);
        return think_time(ctx, 2.0);
    };
    think_time(ctx, 0.5)?;

    let user_info_ok = step_outcome(user_info_step(ctx, Some(&token), 500, false))?;
    think_time(ctx, 0.5)?;

    let fetch_ok = step_outcome(fetch_feedbacks_step(
        ctx,
        Some(&token),
        FetchFeedbacksRequest {
            limit: 5,
            offset: 0,
        },
        1000,
        false,
    ))?;
    think_time(ctx, 0.7)?;

    let metrics_ok = step_outcome(board_metrics_step(ctx, Some(&token), 1000, false))?;
    think_time(ctx, 0.5)?;

    let analyses_ok = step_outcome(feedback_analyses_step(ctx, Some(&token), 1000, false))?;
    think_time(ctx, 0.5)?;

    let logout_ok = step_outcome(logout_step(ctx, Some(&token), 500))?;

    record_iteration(
        ctx,
        ping_ok && user_info_ok && fetch_ok && metrics_ok && analyses_ok && logout_ok,
    );
    think_time_jitter(ctx, 1.0, 2.0)
}

fn main() -> ProbeResult<()> {
    let builder =
        ScenarioDefinitionBuilder::<FeedPulseRunnerContext, FeedPulseVuContext>::new_with_init(
            env!("CARGO_PKG_NAME"),
        )
        .use_load_profile("full_flow_test", LoadProfile::constant(8, 120))
        .use_load_profile(
            "user_journey",
            LoadProfile::ramping(0, [(60, 12), (180, 12), (60, 0)]),
        )
        .with_threshold(Threshold::RequestDurationP95BelowMs(2500.0))
        .with_threshold(Threshold::RequestFailureRateBelow(0.08))
        .with_threshold(Threshold::IterationErrorRateBelow(0.08))
        .use_setup(setup)
        .use_vu_setup(vu_setup)
        .use_vu_behaviour(vu_behaviour);

    run(builder)?;

    Ok(())
}
