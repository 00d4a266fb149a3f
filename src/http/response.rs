//! Response handling and transformation.
//!
//! # Responsibilities
//! - Force configured headers onto upstream responses
//! - Build the small plain-text error responses the proxy produces itself
//!
//! # Design Decisions
//! - Both configured header sets land on the response. The `-r-header` set is
//!   labelled "send to target" but has always been applied here, not upstream.
//! - Forward-labelled headers are applied first so return-to-client values win
//!   on collision

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Response, StatusCode};

use crate::config::HeaderSet;

/// Overwrites response headers with the configured sets.
#[derive(Debug, Clone, Default)]
pub struct HeaderInjector {
    headers: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderInjector {
    pub fn new(forward: &HeaderSet, returned: &HeaderSet) -> Self {
        let mut headers = forward.compile();
        headers.extend(returned.compile());
        Self { headers }
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.headers {
            headers.insert(name.clone(), value.clone());
        }
    }
}

/// Plain-text response with the given status and body.
pub fn text_response(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    response
        .headers_mut()
        .insert(header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    response
}

/// Empty-bodied response with the given status.
pub fn status_response(status: StatusCode) -> Response<Body> {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = status;
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_return_headers_win() {
        let injector = HeaderInjector::new(
            &HeaderSet::parse("X-Shared: forward; X-Forward-Only: 1"),
            &HeaderSet::parse("X-Shared: return"),
        );

        let mut headers = HeaderMap::new();
        headers.insert("x-shared", HeaderValue::from_static("upstream"));
        headers.insert("x-upstream", HeaderValue::from_static("kept"));
        injector.apply(&mut headers);

        assert_eq!(headers["x-shared"], "return");
        assert_eq!(headers["x-forward-only"], "1");
        assert_eq!(headers["x-upstream"], "kept");
    }

    #[test]
    fn test_later_entry_wins_regardless_of_case() {
        let injector = HeaderInjector::new(&HeaderSet::parse("x-a: 1; X-A: 2"), &HeaderSet::default());

        let mut headers = HeaderMap::new();
        injector.apply(&mut headers);
        assert_eq!(headers["x-a"], "2");
        assert_eq!(headers.get_all("x-a").iter().count(), 1);

        let injector = HeaderInjector::new(
            &HeaderSet::parse("X-Env: forward"),
            &HeaderSet::parse("x-env: return"),
        );
        injector.apply(&mut headers);
        assert_eq!(headers["x-env"], "return");
    }

    #[test]
    fn test_overwrites_multi_valued_header() {
        let injector = HeaderInjector::new(&HeaderSet::default(), &HeaderSet::parse("Vary: Origin"));

        let mut headers = HeaderMap::new();
        headers.append("vary", HeaderValue::from_static("Accept"));
        headers.append("vary", HeaderValue::from_static("Cookie"));
        injector.apply(&mut headers);

        let values: Vec<_> = headers.get_all("vary").iter().collect();
        assert_eq!(values, vec!["Origin"]);
    }

    #[test]
    fn test_empty_injector_is_noop() {
        let injector = HeaderInjector::default();

        let mut headers = HeaderMap::new();
        headers.insert("x-a", HeaderValue::from_static("1"));
        injector.apply(&mut headers);
        assert_eq!(headers.len(), 1);
    }

    #[test]
    fn test_text_response() {
        let response = text_response(StatusCode::FORBIDDEN, "Forbidden");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
    }
}
