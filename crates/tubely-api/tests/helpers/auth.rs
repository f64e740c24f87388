use chrono::Duration;
use tubely_api::auth::issue_token;
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-at-least-32-characters-long";

/// `Authorization` header value for `user_id`.
pub fn bearer(user_id: Uuid) -> String {
    let token = issue_token(user_id, TEST_JWT_SECRET, Duration::hours(1)).expect("issue token");
    format!("Bearer {}", token)
}
