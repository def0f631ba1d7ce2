mod auth;
mod products;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use katalog_core::CategorySet;
use katalog_upstream::{UpstreamClient, UpstreamError};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, REQUEST_ID_HEADER};
use crate::session::TokenStore;

#[derive(Clone)]
pub struct AppState {
    pub upstream: UpstreamClient,
    pub tokens: TokenStore,
    pub categories: Arc<CategorySet>,
}

impl AppState {
    pub fn new(upstream: UpstreamClient, tokens: TokenStore, categories: CategorySet) -> Self {
        Self {
            upstream,
            tokens,
            categories: Arc::new(categories),
        }
    }
}

/// Error response, serialized as `{"error": "<message>"}`.
///
/// `code` selects the HTTP status and is kept out of the body; clients
/// match on the message text.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: &'static str,
    pub error: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    authenticated: bool,
}

impl ApiError {
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            error: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self.code {
            "not_found" => StatusCode::NOT_FOUND,
            "missing_token" | "login_rejected" => StatusCode::UNAUTHORIZED,
            "bad_request" | "missing_credentials" => StatusCode::BAD_REQUEST,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

/// Maps an upstream failure to the client-facing error.
///
/// A login refusal is an auth error; everything else (network, timeout,
/// non-2xx, malformed body) is reported as a gateway failure with the cause
/// appended to `context`.
pub(super) fn map_upstream_error(
    request_id: &str,
    context: &str,
    error: &UpstreamError,
) -> ApiError {
    if error.is_auth_rejection() {
        tracing::warn!(request_id, error = %error, "upstream rejected login");
        return ApiError::new("login_rejected", "Login failed: Token not received.");
    }

    tracing::error!(
        request_id,
        error = %error,
        timeout = error.is_timeout(),
        "upstream request failed"
    );
    ApiError::new("upstream_error", format!("{context}: {error}"))
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/login", post(auth::login))
        .route("/products", get(products::list_products))
        .route("/products/{id}", get(products::get_product))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthData {
        status: "ok",
        authenticated: state.tokens.is_set().await,
    })
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
