use std::time::Duration;

use axum::{
    Json, Router,
    http::{HeaderName, HeaderValue, Method, Request, Response, StatusCode, Uri, header},
    response::IntoResponse,
    routing::get,
};
use serde::Serialize;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    error::AppResult,
    response::ApiResponse,
    session::session_cookie,
    state::AppState,
    uploads::ASSET_ROUTE,
};

pub mod admin;
pub mod doc;
pub mod health;
pub mod params;
pub mod user;
pub mod vendor;

const REQUEST_ID_HEADER: &str = "x-request-id";

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/v1/user", user::router())
        .nest("/admin", admin::router())
        .nest("/vendor", vendor::router())
}

/// The whole service: API, static assets, docs and the middleware stack.
pub fn create_app(state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(|request: &Request<_>| {
            let request_id = request
                .headers()
                .get(REQUEST_ID_HEADER)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_request(|request: &Request<_>, _span: &tracing::Span| {
            tracing::info!(
                method = %request.method(),
                uri = %request.uri(),
                "request started"
            );
        })
        .on_response(|response: &Response<_>, latency: Duration, _span: &tracing::Span| {
            tracing::info!(
                status = %response.status(),
                ms = %latency.as_millis(),
                "request finished"
            );
        });

    let assets = ServeDir::new(&state.config.upload_dir);
    let body_limit = state.config.max_body_bytes;
    let cors = cors_layer(state.config.frontend_origin.as_deref());

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", create_api_router())
        .nest_service(ASSET_ROUTE, assets)
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
        .layer(trace_layer)
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(cors)
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(ConcurrencyLimitLayer::new(100))
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let Some(origin) = origin.and_then(|o| HeaderValue::from_str(o).ok()) else {
        return CorsLayer::new();
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

/// Render `body` as JSON and, when a token was issued, set it as the session cookie.
pub(crate) fn with_session_cookie<T: Serialize>(
    state: &AppState,
    token: Option<&str>,
    body: ApiResponse<T>,
) -> AppResult<axum::response::Response> {
    let mut response = Json(body).into_response();
    if let Some(token) = token {
        let cookie = session_cookie(&state.config, token)?;
        response.headers_mut().insert(header::SET_COOKIE, cookie);
    }
    Ok(response)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<serde_json::Value>>) {
    let message = "Not Found";
    let body = ApiResponse::failure(
        message,
        serde_json::json!({ "error": message, "path": uri.path() }),
    );
    (StatusCode::NOT_FOUND, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_router_builds_without_state() {
        let _router: Router<AppState> = create_api_router();
    }

    #[tokio::test]
    async fn unknown_paths_use_the_failure_envelope() {
        let uri: Uri = "/nowhere".parse().unwrap();
        let (status, Json(body)) = not_found(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(!body.success);
        assert_eq!(body.data.unwrap()["path"], "/nowhere");
    }
}
