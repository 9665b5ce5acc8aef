mod client;
mod response;
mod types;

pub mod prelude {
    pub use crate::client::FeedPulseClient;
    pub use crate::response::ApiResponse;
    pub use crate::types::{FeedbackItem, FetchFeedbacksRequest, LoginRequest, RegisterRequest};
}
