//! Minimal page layer used when no external page/API router is supplied.
//!
//! The real console pages are mounted by the embedding application through
//! [`crate::http::HttpServer::with_pages`].

use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;

use crate::auth::AuthSource;
use crate::http::request::RequestContext;
use crate::lifecycle::startup::BuildInfo;

#[derive(Serialize)]
struct IndexBody {
    version: &'static str,
    commit_hash: Option<String>,
    url_root: String,
    auth_source: AuthSource,
}

/// Liveness path polled by the desktop controller.
pub const PING_PATH: &str = "/misc/ping";

/// Paths served by [`default_pages`].
pub const BUILTIN_PATHS: &[&str] = &["/", PING_PATH];

/// Router with `/` and `/misc/ping`.
pub fn default_pages() -> Router {
    Router::new()
        .route("/", get(index))
        .route(PING_PATH, get(ping))
}

async fn index(
    ctx: RequestContext,
    Extension(build): Extension<BuildInfo>,
    Extension(auth_source): Extension<AuthSource>,
) -> Json<IndexBody> {
    Json(IndexBody {
        version: build.version,
        commit_hash: build.commit_hash,
        url_root: ctx.url_root(),
        auth_source,
    })
}

/// Liveness probe polled by the desktop controller.
async fn ping() -> &'static str {
    "PING"
}
