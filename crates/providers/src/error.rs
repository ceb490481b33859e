/// Errors from an external provider call.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The HTTP request itself failed (network, DNS, TLS, client timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a non-2xx status code.
    #[error("Provider API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The call did not finish within the configured bound.
    #[error("Provider call timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The response parsed but lacked something required.
    #[error("Malformed provider response: {0}")]
    Malformed(String),

    /// A webhook failed signature verification.
    #[error("Invalid webhook signature: {0}")]
    InvalidSignature(String),

    /// A provider was selected but a required setting is missing.
    #[error("Provider not configured: {0} is not set")]
    NotConfigured(&'static str),
}

/// Ensure the response has a success status code, capturing the body on
/// failure.
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<unreadable body>".to_string());
        return Err(ProviderError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

/// Parse a successful JSON response body into the expected type.
pub(crate) async fn parse_response<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ProviderError> {
    let response = ensure_success(response).await?;
    Ok(response.json::<T>().await?)
}

/// Build a client with a per-request timeout.
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, ProviderError> {
    Ok(reqwest::Client::builder().timeout(timeout).build()?)
}
