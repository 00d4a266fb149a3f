//! Route matching logic.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - Plain prefix comparison, no segment boundary: `/apiary` matches `/api`
//! - Prefixes are compared against the percent-decoded path, so `/%61pi`
//!   matches `/api`

use std::borrow::Cow;

use axum::body::Body;
use axum::http::Request;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};

/// Bytes escaped when a decoded path is put back on the wire.
const PATH: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Percent-decode a request path. Invalid UTF-8 is replaced, not rejected.
pub fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

/// Escape a decoded path so it is valid in a request URI.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH).to_string()
}

/// A condition a request either satisfies or not.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    fn matches_path(&self, path: &str) -> bool;

    fn matches(&self, req: &Request<Body>) -> bool {
        self.matches_path(req.uri().path())
    }
}

/// Selects requests whose path begins with a fixed prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Path with the prefix cut off. Paths outside the prefix come back as-is.
    pub fn strip<'a>(&self, path: &'a str) -> &'a str {
        path.strip_prefix(self.prefix.as_str()).unwrap_or(path)
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches_path(&self, path: &str) -> bool {
        path.starts_with(&self.prefix) || decode_path(path).starts_with(&self.prefix)
    }
}
