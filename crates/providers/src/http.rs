//! Shared HTTP plumbing for gateway implementations.

use wayfarer_core::error::ProviderError;
use tracing::warn;

/// Client with a transport-level ceiling. The agent applies its own, tighter
/// per-call timeout on top of this.
pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(120))
        .build()
        .unwrap_or_default()
}

/// Map a transport failure onto the gateway error taxonomy.
pub(crate) fn transport_error(e: reqwest::Error) -> ProviderError {
    if e.is_timeout() {
        ProviderError::Timeout(e.to_string())
    } else {
        ProviderError::Network(e.to_string())
    }
}

/// Turn a non-success HTTP response into a [`ProviderError`].
///
/// Returns the response untouched when the status is 200.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();

    if status == 200 {
        return Ok(response);
    }

    if status == 429 {
        let retry_after_secs = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(5);
        return Err(ProviderError::RateLimited { retry_after_secs });
    }

    if status == 401 || status == 403 {
        return Err(ProviderError::AuthenticationFailed(
            "Invalid API key or insufficient permissions".into(),
        ));
    }

    let error_body = response.text().await.unwrap_or_default();
    warn!(provider, status, body = %error_body, "Provider returned error");
    Err(ProviderError::ApiError {
        status_code: status,
        message: error_body,
    })
}
