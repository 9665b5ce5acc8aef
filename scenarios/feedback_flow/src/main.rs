use feedpulse_probe_runner::prelude::*;
use rand::Rng;

const UPLOAD_PROBABILITY: f64 = 0.33;

fn sample_feedback_batch() -> Vec<FeedbackItem> {
    vec![
        FeedbackItem {
            id: "fb_001".to_string(),
            date: "2025-04-14T10:30:00Z".to_string(),
            channel: "twitter".to_string(),
            text: "Le support client a été très réactif et efficace.".to_string(),
        },
        FeedbackItem {
            id: "fb_002".to_string(),
            date: "2025-04-14T11:00:00Z".to_string(),
            channel: "facebook".to_string(),
            text: "Je trouve les tarifs un peu élevés pour les fonctionnalités proposées."
                .to_string(),
        },
    ]
}

fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    configure_base_url(ctx)
}

fn vu_setup(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    connect_client(ctx)
}

/// Occasionally upload a feedback batch, then read a page of feedbacks and their analyses.
///
/// The upload only happens on a fraction of iterations so the run does not flood the target with
/// new data.
fn vu_behaviour(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    let Some(token) = token_outcome(acquire_token_step(ctx))? else {
        record_iteration(ctx, false);
        return think_time(ctx, 1.0);
    };

    think_time(ctx, 0.5)?;

    let mut upload_ok = true;
    if ctx.rng().gen::<f64>() < UPLOAD_PROBABILITY {
        upload_ok = step_outcome(upload_feedbacks_step(
            ctx,
            Some(&token),
            sample_feedback_batch(),
        ))?;
        think_time(ctx, 1.0)?;
    }

    let fetch_ok = step_outcome(fetch_feedbacks_step(
        ctx,
        Some(&token),
        FetchFeedbacksRequest {
            limit: 10,
            offset: 0,
        },
        1000,
        true,
    ))?;
    think_time(ctx, 0.5)?;

    let analyses_ok = step_outcome(feedback_analyses_step(ctx, Some(&token), 1000, true))?;

    record_iteration(ctx, upload_ok && fetch_ok && analyses_ok);
    think_time(ctx, 1.0)
}

fn main() -> ProbeResult<()> {
    let builder =
        ScenarioDefinitionBuilder::<FeedPulseRunnerContext, FeedPulseVuContext>::new_with_init(
            env!("CARGO_PKG_NAME"),
        )
        .use_load_profile("feedback_test", LoadProfile::constant(10, 45))
        .use_load_profile(
            "ramping_feedback",
            LoadProfile::ramping(0, [(30, 10), (45, 15), (30, 0)]),
        )
        .with_threshold(Threshold::RequestFailureRateBelow(0.1))
        .with_threshold(Threshold::IterationErrorRateBelow(0.1))
        .use_setup(setup)
        .use_vu_setup(vu_setup)
        .use_vu_behaviour(vu_behaviour);

    run(builder)?;

    Ok(())
}
