//! Shared reqwest plumbing for the provider adapters

use crate::error::{ProviderError, ProviderResult};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Longest provider error body kept in a `ProviderError::Status`
const MAX_ERROR_BODY: usize = 512;

/// Build an HTTP client with explicit timeouts and user agent
pub fn build_client(
    timeout: Duration,
    connect_timeout: Duration,
    user_agent: &str,
) -> ProviderResult<Client> {
    Client::builder()
        .timeout(timeout)
        .connect_timeout(connect_timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| ProviderError::InvalidRequest(format!("Failed to build HTTP client: {}", e)))
}

/// Join a base URL and an absolute path without doubling the slash
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Check status and decode a JSON body
///
/// `what` names the requested entity in `NotFound` errors.
pub async fn decode_json<T: DeserializeOwned>(response: Response, what: &str) -> ProviderResult<T> {
    let status = response.status();

    if status == StatusCode::NOT_FOUND {
        return Err(ProviderError::NotFound(what.to_string()));
    }

    if !status.is_success() {
        let mut body = response.text().await.unwrap_or_default();
        if body.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !body.is_char_boundary(cut) {
                cut -= 1;
            }
            body.truncate(cut);
        }
        return Err(ProviderError::Status(status.as_u16(), body));
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Parse(format!("{}: {}", what, e)))
}
