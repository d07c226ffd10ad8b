//! Bearer-token HTTP middleware
//!
//! Every request (including WebSocket upgrades) must carry
//! `Authorization: Bearer <token>` when a token is configured; otherwise the
//! server answers 401 before any JSON-RPC processing happens.

use http::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use http::StatusCode;
use jsonrpsee::core::BoxError;
use jsonrpsee::server::{HttpBody, HttpRequest, HttpResponse};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};
use tracing::warn;

const BEARER_PREFIX: &str = "Bearer ";

/// Layer producing [`BearerAuth`]. `None` disables the check while keeping
/// the same middleware type.
#[derive(Debug, Clone)]
pub struct BearerAuthLayer {
    token: Option<Arc<str>>,
}

impl BearerAuthLayer {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()).map(Arc::from),
        }
    }
}

impl<S> Layer<S> for BearerAuthLayer {
    type Service = BearerAuth<S>;

    fn layer(&self, inner: S) -> Self::Service {
        BearerAuth {
            inner,
            token: self.token.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BearerAuth<S> {
    inner: S,
    token: Option<Arc<str>>,
}

impl<S> BearerAuth<S> {
    fn is_authorized(&self, request: &HttpRequest) -> bool {
        let Some(expected) = self.token.as_deref() else {
            return true;
        };

        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix(BEARER_PREFIX))
            .is_some_and(|presented| presented == expected)
    }
}

impl<S> Service<HttpRequest> for BearerAuth<S>
where
    S: Service<HttpRequest, Response = HttpResponse>,
    S::Error: Into<BoxError> + 'static,
    S::Future: Send + 'static,
{
    type Response = HttpResponse;
    type Error = BoxError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: HttpRequest) -> Self::Future {
        if self.is_authorized(&request) {
            let response = self.inner.call(request);
            return Box::pin(async move { response.await.map_err(Into::into) });
        }

        warn!(uri = %request.uri(), "Rejected request with missing or invalid token");
        Box::pin(async { Ok(unauthorized()) })
    }
}

fn unauthorized() -> HttpResponse {
    let mut response = HttpResponse::new(HttpBody::from("Unauthorized\n"));
    *response.status_mut() = StatusCode::UNAUTHORIZED;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guard(token: Option<&str>) -> BearerAuth<()> {
        BearerAuthLayer::new(token.map(str::to_string)).layer(())
    }

    fn request(authorization: Option<&str>) -> HttpRequest {
        let mut builder = HttpRequest::builder().uri("/");
        if let Some(value) = authorization {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(HttpBody::default()).unwrap()
    }

    #[test]
    fn test_no_token_allows_everything() {
        assert!(guard(None).is_authorized(&request(None)));
        assert!(guard(Some("")).is_authorized(&request(None)));
    }

    #[test]
    fn test_token_must_match_bearer_header() {
        let auth = guard(Some("s3cret"));
        assert!(auth.is_authorized(&request(Some("Bearer s3cret"))));
        assert!(!auth.is_authorized(&request(None)));
        assert!(!auth.is_authorized(&request(Some("Bearer wrong"))));
        assert!(!auth.is_authorized(&request(Some("s3cret"))));
    }

    #[test]
    fn test_unauthorized_response_status() {
        assert_eq!(unauthorized().status(), StatusCode::UNAUTHORIZED);
    }
}
