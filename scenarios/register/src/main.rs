use feedpulse_probe_runner::prelude::*;
use rand::Rng;

fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    configure_base_url(ctx)
}

fn vu_setup(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    connect_client(ctx)
}

fn vu_behaviour(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    // A fresh account for each iteration. Collisions just mean a 400, which the step accepts.
    let unique_id = ctx.rng().gen_range(0..1_000_000);
    let request = RegisterRequest {
        username: format!("testuser{unique_id}"),
        email: format!("test{unique_id}@example.com"),
        password: "testpassword123".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
    };

    let success = step_outcome(register_step(ctx, request, 1000))?;

    record_iteration(ctx, success);
    think_time(ctx, 1.0)
}

fn main() -> ProbeResult<()> {
    let builder =
        ScenarioDefinitionBuilder::<FeedPulseRunnerContext, FeedPulseVuContext>::new_with_init(
            env!("CARGO_PKG_NAME"),
        )
        .use_load_profile("register_test", LoadProfile::constant(10, 30))
        .use_load_profile(
            "ramping_register",
            LoadProfile::ramping(0, [(30, 15), (30, 15), (30, 0)]),
        )
        .with_threshold(Threshold::RequestFailureRateBelow(0.1))
        .with_threshold(Threshold::IterationErrorRateBelow(0.1))
        .use_setup(setup)
        .use_vu_setup(vu_setup)
        .use_vu_behaviour(vu_behaviour);

    run(builder)?;

    Ok(())
}
