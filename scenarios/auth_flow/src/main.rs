use feedpulse_probe_runner::prelude::*;

fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    configure_base_url(ctx)
}

fn vu_setup(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    connect_client(ctx)
}

/// Login, read the user profile, log out.
fn vu_behaviour(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    let token = token_outcome(login_step(ctx, 1000))?;

    if let Some(token) = token {
        think_time(ctx, 0.5)?;

        let user_info_ok = step_outcome(user_info_step(ctx, Some(&token), 500, true))?;
        think_time(ctx, 0.5)?;

        let logout_ok = step_outcome(logout_step(ctx, Some(&token), 500))?;

        record_iteration(ctx, user_info_ok && logout_ok);
    } else {
        record_iteration(ctx, false);
    }

    think_time(ctx, 1.0)
}

fn main() -> ProbeResult<()> {
    let builder =
        ScenarioDefinitionBuilder::<FeedPulseRunnerContext, FeedPulseVuContext>::new_with_init(
            env!("CARGO_PKG_NAME"),
        )
        .use_load_profile("auth_flow_test", LoadProfile::constant(15, 60))
        .use_load_profile(
            "ramping_auth",
            LoadProfile::ramping(0, [(30, 20), (60, 20), (30, 0)]),
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
