//! Route handlers.
//!
//! Each configured destination is a route object built once at startup.
//! Proxy routes implement [`Director`]: they retarget an inbound request at
//! their upstream and may touch the upstream's response headers on the way
//! back. The static route resolves request paths against a directory.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use axum::body::Body;
use axum::http::uri::{Authority, Parts, PathAndQuery, Scheme};
use axum::http::{header, HeaderMap, HeaderValue, Request, Uri};
use thiserror::Error;
use url::{Position, Url};

use crate::http::response::HeaderInjector;
use crate::routing::matcher::{decode_path, encode_path, PathPrefixMatcher};
use crate::routing::path::join;
use crate::security::access_control::AccessGuard;

/// Path prefix routed to the API upstream.
pub const API_PREFIX: &str = "/api";

/// Reasons an upstream URL is rejected.
#[derive(Debug, Error)]
pub enum TargetError {
    #[error(transparent)]
    Url(#[from] url::ParseError),

    #[error("unsupported scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("missing host")]
    MissingHost,

    #[error("invalid authority `{0}`")]
    InvalidAuthority(String),
}

/// A parsed upstream: scheme, host (with port if given) and base path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    scheme: Scheme,
    authority: Authority,
    base_path: String,
}

impl UpstreamTarget {
    pub fn parse(input: &str) -> Result<Self, TargetError> {
        let url = Url::parse(input)?;

        let scheme = match url.scheme() {
            "http" => Scheme::HTTP,
            "https" => Scheme::HTTPS,
            other => return Err(TargetError::UnsupportedScheme(other.to_string())),
        };
        if url.host_str().map_or(true, str::is_empty) {
            return Err(TargetError::MissingHost);
        }

        let host = &url[Position::BeforeHost..Position::AfterPort];
        let authority = Authority::from_str(host)
            .map_err(|_| TargetError::InvalidAuthority(host.to_string()))?;

        Ok(Self {
            scheme,
            authority,
            base_path: url.path().to_string(),
        })
    }

    pub fn scheme(&self) -> &Scheme {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        self.authority.as_str()
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// Point `req` at this upstream, joining `suffix` onto the base path and
    /// keeping the original query string.
    fn retarget(&self, req: &mut Request<Body>, suffix: &str) {
        let mut path = join(&self.base_path, suffix);
        if path.is_empty() {
            path.push('/');
        }
        if let Some(query) = req.uri().query() {
            path.push('?');
            path.push_str(query);
        }

        let mut parts = Parts::default();
        parts.scheme = Some(self.scheme.clone());
        parts.authority = Some(self.authority.clone());
        parts.path_and_query = match PathAndQuery::from_str(&path) {
            Ok(pq) => Some(pq),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Rewritten path is not a valid URI");
                return;
            }
        };

        match Uri::from_parts(parts) {
            Ok(uri) => *req.uri_mut() = uri,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to build upstream URI");
                return;
            }
        }

        if let Ok(host) = HeaderValue::from_str(self.host()) {
            req.headers_mut().insert(header::HOST, host);
        }
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme, self.authority, self.base_path)
    }
}

/// Retargets requests at an upstream.
pub trait Director: Send + Sync + fmt::Debug {
    /// Route label used in logs and metrics.
    fn name(&self) -> &'static str;

    fn target(&self) -> &UpstreamTarget;

    /// Rewrite scheme, host, path and `Host` header in place.
    fn rewrite(&self, req: &mut Request<Body>);

    /// Adjust the upstream response headers before they reach the client.
    fn inject_headers(&self, _headers: &mut HeaderMap) {}
}

/// The primary upstream. Gets every request not claimed by the API route.
#[derive(Debug, Clone)]
pub struct PrimaryRoute {
    target: UpstreamTarget,
    injector: HeaderInjector,
}

impl PrimaryRoute {
    pub fn new(target: UpstreamTarget, injector: HeaderInjector) -> Self {
        Self { target, injector }
    }
}

impl Director for PrimaryRoute {
    fn name(&self) -> &'static str {
        "primary"
    }

    fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    fn rewrite(&self, req: &mut Request<Body>) {
        let path = req.uri().path().to_string();
        self.target.retarget(req, &path);
    }

    fn inject_headers(&self, headers: &mut HeaderMap) {
        self.injector.apply(headers);
    }
}

/// The API upstream. Receives `/api...` with the prefix removed; responses
/// pass through untouched.
#[derive(Debug, Clone)]
pub struct ApiRoute {
    target: UpstreamTarget,
    prefix: PathPrefixMatcher,
}

impl ApiRoute {
    pub fn new(target: UpstreamTarget) -> Self {
        Self {
            target,
            prefix: PathPrefixMatcher::new(API_PREFIX),
        }
    }

    pub fn matcher(&self) -> &PathPrefixMatcher {
        &self.prefix
    }
}

impl Director for ApiRoute {
    fn name(&self) -> &'static str {
        "api"
    }

    fn target(&self) -> &UpstreamTarget {
        &self.target
    }

    fn rewrite(&self, req: &mut Request<Body>) {
        let raw = req.uri().path();
        // Keep the client's escaping unless the prefix itself was escaped.
        let path = if raw.starts_with(self.prefix.prefix()) {
            self.prefix.strip(raw).to_string()
        } else {
            encode_path(self.prefix.strip(&decode_path(raw)))
        };
        self.target.retarget(req, &path);
    }
}

/// Serves files from a directory, optionally behind a query token.
#[derive(Debug, Clone)]
pub struct StaticRoute {
    root: String,
    guard: AccessGuard,
}

impl StaticRoute {
    pub fn new(root: impl Into<String>, guard: AccessGuard) -> Self {
        Self {
            root: root.into(),
            guard,
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn guard(&self) -> &AccessGuard {
        &self.guard
    }

    /// Filesystem path for an already-decoded request path.
    pub fn resolve(&self, path: &str) -> PathBuf {
        PathBuf::from(join(&self.root, path))
    }
}
