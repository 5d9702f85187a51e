//! HTTP handlers for every API generation.
//!
//! All generations share one resolution pipeline and differ only in the
//! [`ResponseShape`] used to render its result.

mod auth;
mod pipeline;
mod shape;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::rejection::QueryRejection;
use axum::extract::{ConnectInfo, Query, Request, State};
use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::{Instrument, debug, error, field, info_span, warn};

use crate::config::Config;
use crate::error::AppError;
use crate::fetch::Fetcher;
use crate::geo_location::{GeoCache, GeoResolver};
use crate::timezone::TzResolver;
use crate::weather::WeatherResolver;

pub use auth::BearerToken;
pub use pipeline::{Inputs, Resolved, resolve};
pub use shape::{FlatResponse, GeoBlock, MeResponse, ResponseShape, ShapedResponse, TimestampBlock};

/// Upstream resolvers shared by all requests of one service instance.
pub struct Services {
    pub geo: GeoResolver,
    pub weather: WeatherResolver,
    pub tz: TzResolver,
}

impl Services {
    /// Builds the resolvers described by `config`. One cache per instance.
    pub fn from_config(config: &Config) -> Self {
        let fetcher = Fetcher::new();

        if config.weather_api_key.is_none() {
            warn!("empty weather api key, weather lookups will fail");
        }

        Self {
            geo: GeoResolver::new(
                fetcher.clone(),
                config.geoip_url.clone(),
                GeoCache::new(config.geo_cache_capacity),
            ),
            weather: WeatherResolver::new(
                fetcher,
                config.weather_provider,
                config.weather_url.clone(),
                config.weather_api_key.clone(),
            ),
            tz: TzResolver::new(config.tz_table.clone()),
        }
    }
}

pub type AppState = Arc<Services>;

#[derive(Debug, Default, Deserialize)]
pub struct TzQuery {
    pub tz: Option<String>,
}

/// `GET /v0`
pub async fn handle_legacy(
    State(services): State<AppState>,
    query: Result<Query<TzQuery>, QueryRejection>,
    request: Request,
) -> Response {
    serve(ResponseShape::Legacy, &services, query, request, None).await
}

/// `GET /` and `GET /v1`
pub async fn handle_v1(
    State(services): State<AppState>,
    query: Result<Query<TzQuery>, QueryRejection>,
    request: Request,
) -> Response {
    serve(ResponseShape::V1, &services, query, request, None).await
}

/// `GET /v2/me`
pub async fn handle_me(
    State(services): State<AppState>,
    token: BearerToken,
    query: Result<Query<TzQuery>, QueryRejection>,
    request: Request,
) -> Response {
    serve(ResponseShape::V2, &services, query, request, Some(token)).await
}

async fn serve(
    shape: ResponseShape,
    services: &Services,
    query: Result<Query<TzQuery>, QueryRejection>,
    request: Request,
    token: Option<BearerToken>,
) -> Response {
    let (parts, _body) = request.into_parts();

    let span = info_span!(
        "request",
        method = %parts.method,
        uri = %parts.uri,
        ua = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default(),
        remote = field::Empty,
        client_id = field::Empty,
    );
    if let Some(BearerToken(token)) = &token {
        span.record("client_id", token.as_str());
    }

    // An undecodable query only loses the override
    let query = match query {
        Ok(Query(query)) => query,
        Err(e) => {
            warn!(parent: &span, error = %e, "query decode failed, ignoring tz override");
            TzQuery::default()
        }
    };

    let inputs = Inputs {
        remote: parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr),
        headers: parts.headers,
        tz_override: query.tz,
    };

    async move {
        let resolved = resolve(services, inputs).await;
        write_json(&shape.render(&resolved))
    }
    .instrument(span)
    .await
}

/// Serializes `body` into a 200 JSON response.
///
/// Serialization failure is the only way to get an error status here: 500
/// with an empty body.
pub fn write_json<T: Serialize>(body: &T) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => {
            debug!(data = %String::from_utf8_lossy(&bytes), "response");
            (
                StatusCode::OK,
                [(CONTENT_TYPE, HeaderValue::from_static("application/json"))],
                bytes,
            )
                .into_response()
        }
        Err(e) => {
            let e = AppError::ResponseSerializationFailed(e);
            error!(error = %e, "response marshal failed");
            e.into_response()
        }
    }
}
