use feedpulse_probe_runner::prelude::*;

fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    configure_base_url(ctx)
}

fn vu_setup(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    connect_client(ctx)
}

/// Sign in and load the dashboard aggregates, the way the board page does on refresh.
fn vu_behaviour(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    let Some(token) = token_outcome(acquire_token_step(ctx))? else {
        record_iteration(ctx, false);
        return think_time(ctx, 1.0);
    };

    think_time(ctx, 0.5)?;

    let metrics_ok = step_outcome(board_metrics_step(ctx, Some(&token), 1000, true))?;

    record_iteration(ctx, metrics_ok);
    think_time(ctx, 1.0)
}

fn main() -> ProbeResult<()> {
    let builder =
        ScenarioDefinitionBuilder::<FeedPulseRunnerContext, FeedPulseVuContext>::new_with_init(
            env!("CARGO_PKG_NAME"),
        )
        .use_load_profile("board_test", LoadProfile::constant(15, 30))
        .use_load_profile(
            "ramping_board",
            LoadProfile::ramping(0, [(30, 20), (30, 20), (30, 0)]),
        )
        .use_load_profile(
            "dashboard_load",
            LoadProfile::ramping(0, [(60, 30), (120, 30), (60, 0)]),
        )
        .with_threshold(Threshold::RequestDurationP95BelowMs(1500.0))
        .with_threshold(Threshold::RequestFailureRateBelow(0.05))
        .with_threshold(Threshold::IterationErrorRateBelow(0.05))
        .use_setup(setup)
        .use_vu_setup(vu_setup)
        .use_vu_behaviour(vu_behaviour);

    run(builder)?;

    Ok(())
}
