//! Shared request handling for the HTTP sources.

use crate::error::LookupError;
use reqwest::{RequestBuilder, StatusCode};

/// Send a request and return the body of a successful response.
///
/// 429 maps to `RateLimited`; any other non-2xx status and every transport
/// or body-read failure map to `Network`.
pub(crate) async fn fetch_body(source: &str, request: RequestBuilder) -> Result<String, LookupError> {
    let response = request.send().await.map_err(|e| {
        debug!("{} request failed: {}", source, e);
        LookupError::Network(e.to_string())
    })?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!("{} is rate limiting requests", source);
        return Err(LookupError::RateLimited);
    }
    if !status.is_success() {
        debug!("{} answered HTTP {}", source, status.as_u16());
        return Err(LookupError::Network(format!("HTTP {}", status.as_u16())));
    }

    response
        .text()
        .await
        .map_err(|e| LookupError::Network(e.to_string()))
}
