//! Panic surfacing per serve mode.

use std::any::Any;

use axum::{
    body::Body,
    http::{header, Response, StatusCode},
};
use tower_http::catch_panic::{CatchPanicLayer, ResponseForPanic};

/// Converts a handler panic into a 500 response.
///
/// In verbose (debug) mode the panic message is included in the body;
/// otherwise the body is generic.
#[derive(Debug, Clone, Copy)]
pub struct PanicResponder {
    verbose: bool,
}

impl PanicResponder {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ResponseForPanic for PanicResponder {
    type ResponseBody = Body;

    fn response_for_panic(&mut self, err: Box<dyn Any + Send + 'static>) -> Response<Body> {
        let message = if let Some(s) = err.downcast_ref::<String>() {
            s.as_str()
        } else if let Some(s) = err.downcast_ref::<&str>() {
            s
        } else {
            "unknown panic payload"
        };

        tracing::error!(panic = %message, "Request handler panicked");

        let body = if self.verbose {
            format!("Internal Server Error\n\n{}", message)
        } else {
            "Internal Server Error".to_string()
        };

        let mut response = Response::new(Body::from(body));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        response
    }
}

/// Panic-catching layer for the given verbosity.
pub fn panic_layer(verbose: bool) -> CatchPanicLayer<PanicResponder> {
    CatchPanicLayer::custom(PanicResponder::new(verbose))
}
