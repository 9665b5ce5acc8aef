use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use feedpulse_probe_runner::prelude::*;

static BASE_URL: OnceLock<Url> = OnceLock::new();
static DEPENDENT_STEPS_GATED: AtomicBool = AtomicBool::new(false);

const AUTHENTICATED_PATHS: [&str; 6] = [
    "/api/auth/user",
    "/api/auth/logout",
    "/api/board/metrics",
    "/api/feedbacks/fetch",
    "/api/feedbacks/analyses",
    "/api/feedbacks/upload",
];

fn setup(ctx: &mut RunnerContext<FeedPulseRunnerContext>) -> HookResult {
    let base_url = BASE_URL.get().cloned().expect("mock server not started");
    use_base_url(ctx, base_url);
    Ok(())
}

fn vu_setup(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    connect_client(ctx)
}

fn vu_behaviour(ctx: &mut VuContext<FeedPulseRunnerContext, FeedPulseVuContext>) -> HookResult {
    let token = token_outcome(acquire_token_step(ctx))?;

    let mut any_succeeded = false;
    any_succeeded |= step_outcome(user_info_step(ctx, token.as_deref(), 500, false))?;
    any_succeeded |= step_outcome(logout_step(ctx, token.as_deref(), 500))?;
    any_succeeded |= step_outcome(board_metrics_step(ctx, token.as_deref(), 500, false))?;
    any_succeeded |= step_outcome(fetch_feedbacks_step(
        ctx,
        token.as_deref(),
        FetchFeedbacksRequest {
            limit: 10,
            offset: 0,
        },
        500,
        false,
    ))?;
    any_succeeded |= step_outcome(feedback_analyses_step(ctx, token.as_deref(), 500, false))?;
    any_succeeded |= step_outcome(upload_feedbacks_step(ctx, token.as_deref(), Vec::new()))?;

    DEPENDENT_STEPS_GATED.store(token.is_none() && !any_succeeded, Ordering::SeqCst);
    record_iteration(ctx, any_succeeded);

    // One iteration is enough to observe the gating.
    ctx.runner_context().force_stop_scenario();
    Ok(())
}

#[test]
fn missing_token_fails_dependent_steps_without_a_request() {
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;

        // Login responds without the authorization header, so no token is ever issued.
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})),
            )
            .mount(&server)
            .await;

        for authenticated_path in AUTHENTICATED_PATHS {
            Mock::given(path(authenticated_path))
                .respond_with(ResponseTemplate::new(200))
                .expect(0)
                .mount(&server)
                .await;
        }

        server
    });
    BASE_URL.set(Url::parse(&server.uri()).unwrap()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let scenario = ScenarioDefinitionBuilder::<FeedPulseRunnerContext, FeedPulseVuContext>::new(
        "missing_token_fails_dependent_steps_without_a_request",
        ProbeScenarioCli {
            environment: Some("local".to_string()),
            load_profile: None,
            duration: None,
            soak: false,
            no_progress: true,
            reporter: ReporterOpt::Noop,
            seed: Some(42),
            summary_path: Some(dir.path().join("token_gating.json")),
            run_id: None,
        },
    )
    .use_load_profile("short", LoadProfile::constant(1, 5))
    .use_setup(setup)
    .use_vu_setup(vu_setup)
    .use_vu_behaviour(vu_behaviour);

    let result = run(scenario);

    assert_eq!(1, result.unwrap());
    assert!(DEPENDENT_STEPS_GATED.load(Ordering::SeqCst));

    // The only traffic the whole run produced is the login attempt itself.
    let requests = runtime
        .block_on(server.received_requests())
        .expect("request recording is enabled");
    assert!(!requests.is_empty());
    assert!(requests
        .iter()
        .all(|request| request.url.path() == "/api/auth/login"));
    runtime.block_on(server.verify());
}
