//! Per-request addressing context.
//!
//! # Responsibilities
//! - Describe how the client addressed the console (scheme, host, prefix, path)
//! - Keep the pre-normalization values for logging
//! - Hand the context to the page/API layer as an extractor
//!
//! # Design Decisions
//! - The normalizer stores the context in request extensions exactly once
//! - Without the normalizer the context is derived from the connection itself
//! - Request ID added as early as possible for tracing

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts, Extensions, HeaderMap, Request, Uri},
};
use serde::Serialize;

/// Request metadata as received on the connection, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OriginalRequest {
    pub remote_addr: Option<IpAddr>,
    pub scheme: String,
    pub host: Option<String>,
    pub path: String,
}

/// Request metadata as the client actually requested it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContext {
    /// Client address.
    pub remote_addr: Option<IpAddr>,
    /// Externally visible scheme used for redirects and URL generation.
    pub scheme: String,
    /// Externally visible host, including port if any.
    pub host: Option<String>,
    /// Prefix the console is mounted under; empty at the root.
    pub script_name: String,
    /// Path relative to `script_name`.
    pub path: String,
    /// Values before normalization.
    pub original: OriginalRequest,
}

impl RequestContext {
    /// Build a context that trusts only the connection.
    pub fn direct(uri: &Uri, headers: &HeaderMap, extensions: &Extensions) -> Self {
        let remote_addr = extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        let scheme = uri.scheme_str().unwrap_or("http").to_string();
        let host = headers
            .get(header::HOST)
            .and_then(|h| h.to_str().ok())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()));
        let path = uri.path().to_string();

        Self {
            remote_addr,
            scheme: scheme.clone(),
            host: host.clone(),
            script_name: String::new(),
            path: path.clone(),
            original: OriginalRequest {
                remote_addr,
                scheme,
                host,
                path,
            },
        }
    }

    /// Build a direct context from a request.
    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::direct(req.uri(), req.headers(), req.extensions())
    }

    /// Root URL of the console as seen by the client, with trailing slash.
    pub fn url_root(&self) -> String {
        format!(
            "{}://{}{}/",
            self.scheme,
            self.host.as_deref().unwrap_or("localhost"),
            self.script_name.trim_end_matches('/')
        )
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .unwrap_or_else(|| Self::direct(&parts.uri, &parts.headers, &parts.extensions)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_direct_context_from_connection() {
        let mut req = Request::builder()
            .uri("/browser/?x=1")
            .header("Host", "db.example.com:5050")
            .header("X-Forwarded-For", "203.0.113.9")
            .body(Body::empty())
            .unwrap();
        req.extensions_mut()
            .insert(ConnectInfo("10.0.0.2:41000".parse::<SocketAddr>().unwrap()));

        let ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.remote_addr, Some("10.0.0.2".parse().unwrap()));
        assert_eq!(ctx.scheme, "http");
        assert_eq!(ctx.host.as_deref(), Some("db.example.com:5050"));
        assert_eq!(ctx.path, "/browser/");
        assert_eq!(ctx.script_name, "");
        assert_eq!(ctx.original.path, ctx.path);
    }

    #[test]
    fn test_url_root() {
        let req = Request::builder()
            .uri("/")
            .header("Host", "console.local")
            .body(Body::empty())
            .unwrap();
        let mut ctx = RequestContext::from_request(&req);
        assert_eq!(ctx.url_root(), "http://console.local/");

        ctx.scheme = "https".into();
        ctx.script_name = "/console/".into();
        assert_eq!(ctx.url_root(), "https://console.local/console/");
    }

    #[tokio::test]
    async fn test_extractor_prefers_stored_context() {
        let req = Request::builder().uri("/a").body(Body::empty()).unwrap();
        let mut stored = RequestContext::from_request(&req);
        stored.path = "/stored".into();

        let (mut parts, _) = Request::builder()
            .uri("/a")
            .extension(stored.clone())
            .body(Body::empty())
            .unwrap()
            .into_parts();

        let extracted = RequestContext::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(extracted, stored);
    }
}
