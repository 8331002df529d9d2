//! Reverse-proxy normalization middleware.
//!
//! Wraps the whole router (not `Router::layer`) so the rewritten path is
//! what routing sees:
//!
//! ```text
//! connection → ReverseProxied → Router → page/API handlers
//!                                      → realtime upgrade
//! ```

use std::borrow::Cow;
use std::task::{Context, Poll};

use axum::http::{header, uri::PathAndQuery, HeaderValue, Request, Uri};
use tower::{Layer, Service};

use crate::config::ProxyTrustConfig;
use crate::http::request::RequestContext;
use crate::observability::metrics;
use crate::security::forwarded::apply_forwarded_headers;

/// Layer installing [`ReverseProxied`] in front of a service.
#[derive(Debug, Clone, Copy)]
pub struct ReverseProxiedLayer {
    trust: ProxyTrustConfig,
}

impl ReverseProxiedLayer {
    pub fn new(trust: ProxyTrustConfig) -> Self {
        Self { trust }
    }
}

impl<S> Layer<S> for ReverseProxiedLayer {
    type Service = ReverseProxied<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ReverseProxied {
            inner,
            trust: self.trust,
        }
    }
}

/// Normalizes a request as seen through trusted proxies, then delegates.
#[derive(Debug, Clone)]
pub struct ReverseProxied<S> {
    inner: S,
    trust: ProxyTrustConfig,
}

impl<S, B> Service<Request<B>> for ReverseProxied<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        normalize_request(&mut req, &self.trust);
        self.inner.call(req)
    }
}

/// Attach a normalized [`RequestContext`] to `req`.
///
/// Returns false without touching the request if it already carries a
/// context, so a prefix is never stripped twice.
pub fn normalize_request<B>(req: &mut Request<B>, trust: &ProxyTrustConfig) -> bool {
    if req.extensions().get::<RequestContext>().is_some() {
        return false;
    }

    let mut ctx = RequestContext::from_request(req);
    let applied = apply_forwarded_headers(&mut ctx, req.headers(), trust);

    for name in applied.header_names() {
        metrics::record_forwarded_header(name);
    }

    if applied.path_stripped {
        rewrite_path(req, &ctx.path);
    }

    if applied.host || applied.port {
        if let Some(value) = ctx.host.as_deref().and_then(|h| HeaderValue::from_str(h).ok()) {
            req.headers_mut().insert(header::HOST, value);
        }
    }

    tracing::trace!(
        remote_addr = ?ctx.remote_addr,
        scheme = %ctx.scheme,
        script_name = %ctx.script_name,
        path = %ctx.path,
        original_path = %ctx.original.path,
        "Request normalized"
    );

    req.extensions_mut().insert(ctx);
    true
}

fn rewrite_path<B>(req: &mut Request<B>, path: &str) {
    let path: Cow<'_, str> = if path.starts_with('/') {
        Cow::Borrowed(path)
    } else {
        Cow::Owned(format!("/{}", path))
    };
    let path_and_query = match req.uri().query() {
        Some(query) => format!("{}?{}", path, query),
        None => path.into_owned(),
    };

    let Ok(path_and_query) = PathAndQuery::try_from(path_and_query) else {
        return;
    };
    let mut parts = req.uri().clone().into_parts();
    parts.path_and_query = Some(path_and_query);
    if let Ok(uri) = Uri::from_parts(parts) {
        *req.uri_mut() = uri;
    }
}
