use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::Value;

/// A fully-read API response, captured so that checks can be run against it after the fact.
///
/// The body is buffered up front. The FeedPulse API returns small JSON documents, so holding them
/// in memory is not a concern even at high VU counts.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub(crate) status: StatusCode,
    pub(crate) authorization: Option<String>,
    pub(crate) body: Bytes,
    pub(crate) duration: Duration,
}

impl ApiResponse {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn status_is(&self, status: u16) -> bool {
        self.status.as_u16() == status
    }

    pub fn status_in(&self, statuses: &[u16]) -> bool {
        statuses.contains(&self.status.as_u16())
    }

    /// The value of the `Authorization` response header, if the server sent one.
    pub fn authorization(&self) -> Option<&str> {
        self.authorization.as_deref()
    }

    /// Time from sending the request to having read the whole response body.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn latency_below_ms(&self, bound_ms: u64) -> bool {
        self.duration < Duration::from_millis(bound_ms)
    }

    /// Parse the body as JSON and apply a predicate to it.
    ///
    /// A body that is not valid JSON fails the check rather than erroring, matching how a missing
    /// or mangled body should count against the scenario.
    pub fn json_check(&self, f: impl FnOnce(&Value) -> bool) -> bool {
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(value) => f(&value),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> ApiResponse {
        ApiResponse {
            status: StatusCode::from_u16(status).unwrap(),
            authorization: None,
            body: Bytes::copy_from_slice(body.as_bytes()),
            duration: Duration::from_millis(42),
        }
    }

    #[test]
    fn status_predicates() {
        let r = response(201, "{}");
        assert!(r.status_is(201));
        assert!(!r.status_is(200));
        assert!(r.status_in(&[200, 201]));
        assert!(!r.status_in(&[200, 400]));
    }

    #[test]
    fn latency_bound_is_exclusive() {
        let r = response(200, "{}");
        assert!(r.latency_below_ms(43));
        assert!(!r.latency_below_ms(42));
    }

    #[test]
    fn json_check_fails_closed_on_invalid_body() {
        let r = response(200, "not json at all");
        assert!(!r.json_check(|_| true));

        let r = response(200, r#"{"data":{"id":7}}"#);
        assert!(r.json_check(|body| !body["data"]["id"].is_null()));
    }
}
