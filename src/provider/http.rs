//! Shared HTTP client and status mapping.

use std::sync::OnceLock;
use std::time::Duration;

use crate::error::AskwebError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("askweb/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> AskwebError {
    let message = extract_error_message(body).unwrap_or_else(|| body.to_string());
    match status {
        401 | 403 => AskwebError::Authentication(message),
        // Gemini rejects a bad key with 400 INVALID_ARGUMENT.
        400 if has_error_reason(body, "API_KEY_INVALID") => AskwebError::Authentication(message),
        429 => AskwebError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => AskwebError::api(status, message),
    }
}

// Google-style bodies: {"error": {"code": 400, "message": "...", "status": "..."}}
fn extract_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()?
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

fn has_error_reason(body: &str, reason: &str) -> bool {
    error_details(body)
        .iter()
        .any(|detail| detail.get("reason").and_then(|r| r.as_str()) == Some(reason))
}

fn error_details(body: &str) -> Vec<serde_json::Value> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("error")?.get("details")?.as_array().cloned())
        .unwrap_or_default()
}

fn extract_retry_after(body: &str) -> Option<u64> {
    error_details(body).iter().find_map(|detail| {
        let delay = detail.get("retryDelay")?.as_str()?;
        let seconds: f64 = delay.strip_suffix('s')?.parse().ok()?;
        Some((seconds * 1000.0) as u64)
    })
}
