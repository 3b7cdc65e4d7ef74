//! Exact-origin CORS
//!
//! The storefront runs on a small, fixed set of origins. A response only
//! carries CORS headers when the request's `Origin` equals one of them; any
//! other origin gets a plain response and the browser blocks it.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, ORIGIN,
        },
    },
    middleware::Next,
    response::Response,
};

pub const ALLOWED_METHODS: &str = "GET,PUT,POST,OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type,Authorization";

#[derive(Debug, Clone, Default)]
pub struct CorsPolicy {
    allowed_origins: Arc<Vec<String>>,
}

impl CorsPolicy {
    pub fn new<I, S>(origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed_origins: Arc::new(origins.into_iter().map(Into::into).collect()),
        }
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    fn decorate(&self, origin: &HeaderValue, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

/// Middleware adding CORS headers to every response for allowed origins.
pub async fn apply_cors(
    State(policy): State<CorsPolicy>,
    request: Request,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(ORIGIN)
        .filter(|origin| origin.to_str().is_ok_and(|value| policy.is_allowed(value)))
        .cloned();

    let mut response = next.run(request).await;
    if let Some(origin) = origin {
        policy.decorate(&origin, response.headers_mut());
    }
    response
}

/// Answers `OPTIONS` on every API route.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}
