use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use tower_http::request_id::{MakeRequestId, RequestId, SetRequestIdLayer};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct MakeUuidRequestId;

impl MakeRequestId for MakeUuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Build the request-id layer. Apply with `.layer(request_id_layer())` in router.
pub fn request_id_layer() -> SetRequestIdLayer<MakeUuidRequestId> {
    SetRequestIdLayer::new(
        axum::http::HeaderName::from_static("x-request-id"),
        MakeUuidRequestId,
    )
}

/// Host names the service answers for. `*` matches any host.
#[derive(Debug, Clone)]
pub struct AllowedHosts {
    hosts: Vec<String>,
}

impl AllowedHosts {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            hosts: hosts
                .into_iter()
                .map(|h| h.into().trim().to_ascii_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    /// Whether a `Host` header value (port optional) is served.
    pub fn permits(&self, host_header: &str) -> bool {
        let host = strip_port(host_header).to_ascii_lowercase();
        self.hosts.iter().any(|allowed| allowed == "*" || *allowed == host)
    }
}

fn strip_port(host: &str) -> &str {
    // Bracketed IPv6 literal, e.g. "[::1]:8000".
    if let Some(rest) = host.strip_prefix('[') {
        return rest.split(']').next().unwrap_or(rest);
    }
    host.split(':').next().unwrap_or(host)
}

/// Reject requests whose `Host` is not in the allow-list with 400.
///
/// Apply with `axum::middleware::from_fn_with_state(Arc<AllowedHosts>, enforce_allowed_hosts)`.
pub async fn enforce_allowed_hosts(
    State(hosts): State<Arc<AllowedHosts>>,
    request: Request,
    next: Next,
) -> Response {
    let host = request
        .headers()
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .or_else(|| request.uri().host().map(str::to_owned));

    match host {
        Some(ref h) if hosts.permits(h) => next.run(request).await,
        _ => {
            tracing::warn!(host = ?host, "rejected request with disallowed host");
            (StatusCode::BAD_REQUEST, "Invalid Host header").into_response()
        }
    }
}
