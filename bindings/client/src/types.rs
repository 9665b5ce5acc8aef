use serde::{Deserialize, Serialize};

/// Credentials payload for `POST /api/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

/// New account payload for `POST /api/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// Page request for `POST /api/feedbacks/fetch`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FetchFeedbacksRequest {
    pub limit: u32,
    pub offset: u32,
}

/// One feedback entry, as uploaded to `POST /api/feedbacks/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackItem {
    pub id: String,
    pub date: String,
    pub channel: String,
    pub text: String,
}
