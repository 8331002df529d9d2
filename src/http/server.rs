//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router from the realtime route and the page/API layer
//! - Publish runtime state, auth source and build info as extensions
//! - Wire up middleware (tracing, limits, request ID, panic surfacing)
//! - Install the reverse-proxy normalizer in front of routing when standalone
//! - Serve on the bound listener and stop the realtime channel with it

use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Extension, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::util::Either;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::http::middleware::{panic_layer, ReverseProxied, ReverseProxiedLayer};
use crate::http::pages::default_pages;
use crate::http::websocket::realtime_upgrade;
use crate::lifecycle::startup::{Bootstrap, ServeMode};
use crate::observability::metrics;
use crate::realtime::{ChannelHandler, EchoHandler, RealtimeHub};

/// The request pipeline, with or without the reverse-proxy normalizer.
pub type ConsoleService = Either<ReverseProxied<Router>, Router>;

/// HTTP server for the console.
pub struct HttpServer {
    service: ConsoleService,
    hub: Arc<RealtimeHub>,
    mode: ServeMode,
    normalizer_installed: bool,
}

impl HttpServer {
    /// Create a server with the built-in page layer.
    pub fn new(bootstrap: &Bootstrap) -> Self {
        Self::with_pages(bootstrap, default_pages())
    }

    /// Create a server serving `pages` and an echoing realtime channel.
    pub fn with_pages(bootstrap: &Bootstrap, pages: Router) -> Self {
        Self::with_handler(bootstrap, pages, Arc::new(EchoHandler))
    }

    /// Create a server serving `pages` with a custom realtime handler.
    pub fn with_handler(
        bootstrap: &Bootstrap,
        pages: Router,
        handler: Arc<dyn ChannelHandler>,
    ) -> Self {
        let hub = Arc::new(RealtimeHub::new(&bootstrap.config.realtime, handler));
        let router = Self::build_router(bootstrap, hub.clone(), pages);

        let normalizer = bootstrap
            .installs_proxy_normalizer()
            .then(|| ReverseProxiedLayer::new(bootstrap.config.proxy));

        if normalizer.is_some() {
            let trust = &bootstrap.config.proxy;
            if !trust.trusts_any() {
                tracing::info!("No proxy hops trusted, only X-Script-Name and X-Scheme will be honored");
            }
            tracing::info!(
                fix_enabled = trust.fix_enabled,
                x_for = trust.x_for,
                x_proto = trust.x_proto,
                x_host = trust.x_host,
                x_port = trust.x_port,
                x_prefix = trust.x_prefix,
                "Reverse-proxy normalization installed"
            );
        } else {
            tracing::info!("Embedded runtime, forwarded headers will not be honored");
        }

        let normalizer_installed = normalizer.is_some();
        let service = ServiceBuilder::new().option_layer(normalizer).service(router);

        Self {
            service,
            hub,
            mode: bootstrap.mode,
            normalizer_installed,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(bootstrap: &Bootstrap, hub: Arc<RealtimeHub>, pages: Router) -> Router {
        let config = &bootstrap.config;

        // The realtime route is matched first and the page layer handles the
        // rest, so a page route on the same path is shadowed instead of
        // conflicting.
        Router::new()
            .route(&config.realtime.path, get(realtime_upgrade))
            .with_state(hub)
            .fallback_service(pages)
            .layer(Extension(bootstrap.runtime.clone()))
            .layer(Extension(bootstrap.auth_source.clone()))
            .layer(Extension(bootstrap.build.clone()))
            .layer(middleware::from_fn(record_request_metrics))
            .layer(RequestBodyLimitLayer::new(config.security.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(panic_layer(bootstrap.mode.verbose_errors()))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Returns true if requests pass through the reverse-proxy normalizer.
    pub fn proxy_normalizer_installed(&self) -> bool {
        self.normalizer_installed
    }

    /// The realtime hub attached to this server.
    pub fn hub(&self) -> Arc<RealtimeHub> {
        self.hub.clone()
    }

    /// The request pipeline, for driving in-process without a listener.
    pub fn into_service(self) -> ConsoleService {
        self.service
    }

    /// Run the server until `shutdown` fires.
    ///
    /// Stops accepting, lets in-flight plain HTTP requests finish, then stops
    /// the realtime channel, dropping any open sessions.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mode = ?self.mode,
            reloader = self.mode.use_reloader(),
            proxy_normalizer = self.normalizer_installed,
            "HTTP server starting"
        );

        let hub = self.hub.clone();
        hub.start();

        let app = axum::ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(
            self.service,
        );

        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Listener no longer accepting connections");
            })
            .await;

        hub.stop();
        result?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn record_request_metrics(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let response = next.run(request).await;
    metrics::record_request(&method, response.status().as_u16(), start);
    response
}
