use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Errors raised while resolving a client's time, location and weather
#[derive(Error, Debug)]
pub enum AppError {
    /// Neither proxy headers nor the connection yielded a client address
    #[error("no remote address found")]
    NoAddressFound,

    /// Transport-level failure talking to an upstream provider
    #[error("upstream unreachable: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    /// Upstream answered with something other than 200 OK
    #[error("bad response: {0}")]
    UpstreamBadStatus(reqwest::StatusCode),

    /// Upstream body is not JSON or does not have the expected shape
    #[error("failed to unmarshal the response: {0}")]
    UpstreamMalformedBody(String),

    /// No weather provider credential configured
    #[error("weather api key is not configured")]
    MissingApiKey,

    /// The coordinate-based weather provider has no location to query
    #[error("no coordinates available for weather lookup")]
    MissingCoordinates,

    /// The response body could not be encoded as JSON
    #[error("response marshal failed: {0}")]
    ResponseSerializationFailed(#[source] serde_json::Error),

    /// Missing or empty bearer token
    #[error("unauthorized")]
    Unauthorized,

    /// Environment variable holds a value that cannot be used
    #[error("invalid value {value:?} for {name}")]
    InvalidConfig { name: &'static str, value: String },
}

impl IntoResponse for AppError {
    /// Error responses never carry a body; details go to the log only.
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
            _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
