//! Shared `reqwest` plumbing for the providers that speak HTTP directly.

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::agent::provider::ProviderKind;
use crate::error::AgentError;

/// Builds a client with an explicit timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client, AgentError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Joins a base URL and a path without doubling the slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Sends a prepared request once and returns the raw body of a 2xx response.
///
/// Any other status becomes [`AgentError::Transport`] carrying the status
/// code and body verbatim.
pub(crate) async fn send_once(
    provider: ProviderKind,
    request: RequestBuilder,
) -> Result<String, AgentError> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(AgentError::Transport {
            provider,
            status: status.as_u16(),
            body,
        });
    }

    Ok(body)
}

/// Deserializes a response body, keeping the raw content on failure.
pub(crate) fn parse_body<T: DeserializeOwned>(body: &str) -> Result<T, AgentError> {
    serde_json::from_str(body).map_err(|e| AgentError::ResponseParse {
        message: e.to_string(),
        content: body.to_string(),
    })
}
