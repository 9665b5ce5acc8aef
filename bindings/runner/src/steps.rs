//! The individual API exchanges that scenarios compose into flows.
//!
//! Every step issues one request, runs its checks against the response and reduces them to a
//! single outcome. Checks are recorded individually, so a slow-but-correct response still shows
//! up in the check tables even though the step as a whole failed.
//!
//! Steps are async and operate on a [FeedPulseClient] directly. Scenario behaviours are
//! synchronous, so they go through the wrappers in [crate::common] instead.

use feedpulse_client_instrumented::prelude::{
    FeedPulseClient, FeedbackItem, FetchFeedbacksRequest, LoginRequest, RegisterRequest,
};

/// The account every read-only flow signs in with.
///
/// This account must exist in the target environment before a run starts.
pub fn probe_credentials() -> LoginRequest {
    LoginRequest {
        login: "ftecher3".to_string(),
        password: "12345678".to_string(),
    }
}

/// Health check against `/ping`.
pub async fn ping(client: &FeedPulseClient, bound_ms: u64) -> anyhow::Result<bool> {
    let response = client.ping().await?;

    let reporter = client.reporter();
    let status_ok = reporter.check("ping status is 200", response.status_is(200));
    let latency_ok = reporter.check(
        &format!("ping response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );

    Ok(status_ok && latency_ok)
}

/// Checked login. Returns the session token only if the login passed all of its checks.
pub async fn login(client: &FeedPulseClient, bound_ms: u64) -> anyhow::Result<Option<String>> {
    let response = client.login(&probe_credentials()).await?;

    let reporter = client.reporter();
    let status_ok = reporter.check("login status is 200", response.status_is(200));
    let latency_ok = reporter.check(
        &format!("login response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );
    let token_ok = reporter.check(
        "has authorization header",
        response.authorization().is_some(),
    );

    if status_ok && latency_ok && token_ok {
        Ok(response.authorization().map(|token| token.to_string()))
    } else {
        Ok(None)
    }
}

/// Login with status and latency checks only, for stressing the endpoint itself rather than
/// starting a flow.
pub async fn login_probe(client: &FeedPulseClient, bound_ms: u64) -> anyhow::Result<bool> {
    let response = client.login(&probe_credentials()).await?;

    let reporter = client.reporter();
    let status_ok = reporter.check("login status is 200", response.status_is(200));
    let latency_ok = reporter.check(
        &format!("login response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );

    Ok(status_ok && latency_ok)
}

/// Unchecked login, for flows where the login is scaffolding rather than the thing under test.
///
/// Failing to get a token is still visible through the recorded `login` operation, it just does
/// not contribute to the check tables.
pub async fn acquire_token(client: &FeedPulseClient) -> anyhow::Result<Option<String>> {
    let response = client.login(&probe_credentials()).await?;

    if response.status_is(200) {
        Ok(response.authorization().map(|token| token.to_string()))
    } else {
        Ok(None)
    }
}

/// Register a new account. A 400 counts as success because it means the account already exists.
pub async fn register(
    client: &FeedPulseClient,
    request: &RegisterRequest,
    bound_ms: u64,
) -> anyhow::Result<bool> {
    let response = client.register(request).await?;

    let reporter = client.reporter();
    let status_ok = reporter.check(
        "register status is 201 or 400",
        response.status_in(&[201, 400]),
    );
    let latency_ok = reporter.check(
        &format!("register response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );
    let message_ok = reporter.check(
        "register response has message",
        response.json_check(|body| !body["message"].is_null()),
    );

    Ok(status_ok && latency_ok && message_ok)
}

/// Fetch the signed-in user's profile.
pub async fn user_info(
    client: &FeedPulseClient,
    token: &str,
    bound_ms: u64,
    verify_body: bool,
) -> anyhow::Result<bool> {
    let response = client.user_info(token).await?;

    let reporter = client.reporter();
    let mut ok = reporter.check("user info status is 200", response.status_is(200));
    ok &= reporter.check(
        &format!("user info response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );
    if verify_body {
        ok &= reporter.check(
            "response contains user data",
            response.json_check(|body| !body["data"]["id"].is_null()),
        );
    }

    Ok(ok)
}

/// End the session.
pub async fn logout(
    client: &FeedPulseClient,
    token: &str,
    bound_ms: u64,
) -> anyhow::Result<bool> {
    let response = client.logout(token).await?;

    let reporter = client.reporter();
    let status_ok = reporter.check("logout status is 200", response.status_is(200));
    let latency_ok = reporter.check(
        &format!("logout response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );

    Ok(status_ok && latency_ok)
}

/// Fetch the dashboard aggregates.
pub async fn board_metrics(
    client: &FeedPulseClient,
    token: &str,
    bound_ms: u64,
    verify_body: bool,
) -> anyhow::Result<bool> {
    let response = client.board_metrics(token).await?;

    let reporter = client.reporter();
    let mut ok = reporter.check("board metrics status is 200", response.status_is(200));
    ok &= reporter.check(
        &format!("board metrics response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );
    if verify_body {
        ok &= reporter.check(
            "metrics response has data",
            response.json_check(|body| !body["data"].is_null()),
        );
        ok &= reporter.check(
            "metrics contains expected fields",
            response.json_check(|body| {
                let data = &body["data"];
                !data.is_null()
                    && (!data["totalFeedbacks"].is_null()
                        || !data["averageRating"].is_null()
                        || !data["sentimentDistribution"].is_null()
                        || data.as_object().is_some_and(|fields| !fields.is_empty()))
            }),
        );
    }

    Ok(ok)
}

/// Fetch a page of feedback entries.
pub async fn fetch_feedbacks(
    client: &FeedPulseClient,
    token: &str,
    request: &FetchFeedbacksRequest,
    bound_ms: u64,
    verify_body: bool,
) -> anyhow::Result<bool> {
    let response = client.fetch_feedbacks(token, request).await?;

    let reporter = client.reporter();
    let mut ok = reporter.check("fetch feedbacks status is 200", response.status_is(200));
    ok &= reporter.check(
        &format!("fetch feedbacks response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );
    if verify_body {
        ok &= reporter.check(
            "fetch response has data",
            response.json_check(|body| !body["data"].is_null()),
        );
    }

    Ok(ok)
}

/// Fetch the stored feedback analyses.
pub async fn feedback_analyses(
    client: &FeedPulseClient,
    token: &str,
    bound_ms: u64,
    verify_body: bool,
) -> anyhow::Result<bool> {
    let response = client.feedback_analyses(token).await?;

    let reporter = client.reporter();
    let mut ok = reporter.check("feedback analyses status is 200", response.status_is(200));
    ok &= reporter.check(
        &format!("feedback analyses response time < {bound_ms}ms"),
        response.latency_below_ms(bound_ms),
    );
    if verify_body {
        ok &= reporter.check(
            "analyses response has data",
            response.json_check(|body| !body["data"].is_null()),
        );
    }

    Ok(ok)
}

/// Upload a batch of feedback entries as a JSON file.
pub async fn upload_feedbacks(
    client: &FeedPulseClient,
    token: &str,
    items: &[FeedbackItem],
) -> anyhow::Result<bool> {
    let content = serde_json::to_vec_pretty(items)?;
    let response = client
        .upload_feedbacks(token, "feedback.json", content, "application/json")
        .await?;

    let reporter = client.reporter();
    let status_ok = reporter.check("upload status is 200 or 201", response.status_in(&[200, 201]));
    let message_ok = reporter.check(
        "upload response has message",
        response.json_check(|body| !body["message"].is_null()),
    );

    Ok(status_ok && message_ok)
}
