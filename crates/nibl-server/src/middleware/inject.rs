//! Reload client injection.
//!
//! Page-like responses (paths ending in `.html` or `/`) get cache-disabling
//! headers, and successful ones are buffered so the reload script can be
//! spliced in before the first `</body>`. Everything else streams through
//! untouched.

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

/// Script connecting the page to the live reload socket.
pub const RELOAD_SCRIPT: &str = r#"<script>
(function () {
  var socket = new WebSocket("ws://" + window.location.host + "/ws");
  socket.onmessage = function () {
    window.location.reload();
  };
  socket.onerror = function () {
    console.error("Live reload connection error. Please restart 'nibl serve'.");
  };
})();
</script>"#;

const CLOSING_BODY: &[u8] = b"</body>";

/// Whether `path` names a page rather than an asset.
#[must_use]
pub fn is_page_like(path: &str) -> bool {
    path.ends_with(".html") || path.ends_with('/')
}

/// Captured response, held in memory until rewritten.
#[derive(Debug)]
pub struct BufferedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl BufferedResponse {
    /// Read `response` fully into memory.
    ///
    /// # Errors
    ///
    /// Returns the body error if the inner body fails mid-stream.
    pub async fn capture(response: Response) -> Result<Self, axum::Error> {
        let (parts, body) = response.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX).await?;
        Ok(Self {
            status: parts.status,
            headers: parts.headers,
            body,
        })
    }

    /// Insert [`RELOAD_SCRIPT`] before the first `</body>` and fix up
    /// `Content-Length`.
    ///
    /// Responses other than `200 OK` are returned unchanged.
    #[must_use]
    pub fn with_reload_client(mut self) -> Self {
        if self.status != StatusCode::OK {
            return self;
        }

        if let Some(at) = find(&self.body, CLOSING_BODY) {
            let mut body = Vec::with_capacity(self.body.len() + RELOAD_SCRIPT.len());
            body.extend_from_slice(&self.body[..at]);
            body.extend_from_slice(RELOAD_SCRIPT.as_bytes());
            body.extend_from_slice(&self.body[at..]);
            self.body = Bytes::from(body);
        }
        self.headers
            .insert(header::CONTENT_LENGTH, HeaderValue::from(self.body.len()));
        self
    }
}

impl IntoResponse for BufferedResponse {
    fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn disable_caching(headers: &mut HeaderMap) {
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
}

/// Middleware injecting the reload client into page responses.
pub async fn inject_reload_client(request: Request, next: Next) -> Response {
    if !is_page_like(request.uri().path()) {
        return next.run(request).await;
    }
    let rewrite = request.method() != Method::HEAD;

    let response = next.run(request).await;
    let mut response = if rewrite && response.status() == StatusCode::OK {
        match BufferedResponse::capture(response).await {
            Ok(buffered) => buffered.with_reload_client().into_response(),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to buffer page response");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    } else {
        response
    };

    disable_caching(response.headers_mut());
    response
}
