use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;

use crate::error::AppError;

/// Opaque client identifier taken from `Authorization: Bearer <token>`.
///
/// The token is not verified against any issuer. Extraction fails with
/// `AppError::Unauthorized` (401, empty body) when the header is missing or
/// the token is empty, before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerToken(pub String);

impl BearerToken {
    pub fn from_header(value: &str) -> Option<Self> {
        let token = value.strip_prefix("Bearer").unwrap_or(value).trim();
        (!token.is_empty()).then(|| Self(token.to_string()))
    }
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(BearerToken::from_header)
            .ok_or(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_prefix_stripped() {
        assert_eq!(
            BearerToken::from_header("Bearer abc123"),
            Some(BearerToken("abc123".to_string()))
        );
    }

    #[test]
    fn test_empty_token_rejected() {
        assert_eq!(BearerToken::from_header("Bearer"), None);
        assert_eq!(BearerToken::from_header("Bearer    "), None);
        assert_eq!(BearerToken::from_header(""), None);
    }

    #[test]
    fn test_token_without_scheme_is_opaque() {
        assert_eq!(
            BearerToken::from_header("device-42"),
            Some(BearerToken("device-42".to_string()))
        );
    }
}
