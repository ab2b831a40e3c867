//! HTTP request/response tracing middleware.

use axum::{extract::MatchedPath, http::Request};
use tower_http::LatencyUnit;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::{Level, Span};

type MakeSpan = fn(&Request<axum::body::Body>) -> Span;

/// Creates a tracing middleware for HTTP requests.
///
/// Each request gets an `INFO` span carrying the method, the route template
/// (so `/r/{code}` is logged as a template, not per code) and the raw path.
/// The response is logged with status and latency in milliseconds.
///
/// ```text
/// INFO request{method=GET route=/r/{code} path=/r/aZ3-_q}: finished processing request
///     latency=1 ms status=302
/// ```
pub fn layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>, MakeSpan> {
    TraceLayer::new_for_http()
        .make_span_with(make_span as MakeSpan)
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        )
}

fn make_span(req: &Request<axum::body::Body>) -> Span {
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map(MatchedPath::as_str)
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %req.method(),
        route = %route,
        path = %req.uri().path(),
    )
}
