use feedpulse_probe_runner::prelude::*;

fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    configure_base_url(ctx)
}

fn vu_setup(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    connect_client(ctx)
}

fn vu_behaviour(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    let success = step_outcome(ping_step(ctx, 500))?;

    record_iteration(ctx, success);
    think_time(ctx, 1.0)
}

fn main() -> ProbeResult<()> {
    let builder =
        ScenarioDefinitionBuilder::<FeedPulseRunnerContext, FeedPulseVuContext>::new_with_init(
            env!("CARGO_PKG_NAME"),
        )
        .use_load_profile("constant_load", LoadProfile::constant(20, 30))
        .use_load_profile(
            "ramping_load",
            LoadProfile::ramping(0, [(30, 10), (30, 20), (30, 0)]),
        )
        .use_load_profile(
            "stress_test",
            LoadProfile::ramping(0, [(60, 30), (120, 30), (60, 0)]),
        )
        .with_threshold(Threshold::RequestFailureRateBelow(0.01))
        .use_setup(setup)
        .use_vu_setup(vu_setup)
        .use_vu_behaviour(vu_behaviour);

    run(builder)?;

    Ok(())
}
