use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::error::AppError;

/// Shared HTTP client used by every upstream provider.
///
/// Issues a single unauthenticated GET per call. No retries and no timeout
/// beyond the transport defaults.
#[derive(Debug, Clone, Default)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches `url` and decodes the body as `T`.
    ///
    /// # Errors
    /// * `UpstreamUnreachable` on transport failure, including a broken body stream
    /// * `UpstreamBadStatus` when the status is not 200
    /// * `UpstreamMalformedBody` when the body does not decode into `T`
    pub async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, AppError> {
        debug!("Fetching {}{}", url.host_str().unwrap_or_default(), url.path());

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(AppError::UpstreamUnreachable)?;

        if response.status() != StatusCode::OK {
            error!("Upstream returned {}", response.status());
            return Err(AppError::UpstreamBadStatus(response.status()));
        }

        let body = response.bytes().await.map_err(AppError::UpstreamUnreachable)?;

        serde_json::from_slice(&body).map_err(|e| AppError::UpstreamMalformedBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Payload {
        value: i32,
    }

    fn url(server: &MockServer, p: &str) -> Url {
        Url::parse(&format!("{}{}", server.uri(), p)).unwrap()
    }

    #[tokio::test]
    async fn test_get_json_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"value": 42})))
            .expect(1)
            .mount(&server)
            .await;

        let payload: Payload = Fetcher::new().get_json(url(&server, "/ok")).await.unwrap();
        assert_eq!(payload.value, 42);
    }

    #[tokio::test]
    async fn test_get_json_non_200_is_bad_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"value": 1})))
            .mount(&server)
            .await;

        let result: Result<Payload, _> = Fetcher::new().get_json(url(&server, "/created")).await;
        assert!(matches!(result, Err(AppError::UpstreamBadStatus(s)) if s == StatusCode::CREATED));
    }

    #[tokio::test]
    async fn test_get_json_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result: Result<Payload, _> = Fetcher::new().get_json(url(&server, "/")).await;
        assert!(matches!(result, Err(AppError::UpstreamMalformedBody(_))));
    }

    #[tokio::test]
    async fn test_get_json_wrong_shape() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"other": true})))
            .mount(&server)
            .await;

        let result: Result<Payload, _> = Fetcher::new().get_json(url(&server, "/")).await;
        assert!(matches!(result, Err(AppError::UpstreamMalformedBody(_))));
    }

    #[tokio::test]
    async fn test_truncated_body_is_unreachable() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            // Promise more bytes than are sent, then hang up
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 100\r\n\r\n{\"value\":")
                .await;
        });

        let result: Result<Payload, _> = Fetcher::new()
            .get_json(Url::parse(&format!("http://{addr}/")).unwrap())
            .await;
        assert!(matches!(result, Err(AppError::UpstreamUnreachable(_))));
    }

    #[tokio::test]
    async fn test_get_json_unreachable() {
        // Nothing listens on the discard port
        let result: Result<Payload, _> = Fetcher::new()
            .get_json(Url::parse("http://127.0.0.1:9/").unwrap())
            .await;
        assert!(matches!(result, Err(AppError::UpstreamUnreachable(_))));
    }
}
