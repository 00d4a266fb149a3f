//! Query-token access control for static mode.
//!
//! The token is compared with plain string equality. It is not constant-time.

use url::form_urlencoded;

/// Name of the query parameter carrying the token.
pub const TOKEN_PARAM: &str = "token";

/// Outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    Deny,
}

/// Shared-secret guard for static file requests.
#[derive(Debug, Clone, Default)]
pub struct AccessGuard {
    token: Option<String>,
}

impl AccessGuard {
    /// Create a guard. `None` or an empty token disables the check.
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
        }
    }

    /// Check a raw query string. Only the first `token` parameter counts.
    pub fn check(&self, query: Option<&str>) -> Access {
        let Some(expected) = self.token.as_deref() else {
            return Access::Allow;
        };

        let provided = query.and_then(|q| {
            form_urlencoded::parse(q.as_bytes())
                .find(|(key, _)| key == TOKEN_PARAM)
                .map(|(_, value)| value.into_owned())
        });

        match provided {
            Some(value) if value == expected => Access::Allow,
            _ => Access::Deny,
        }
    }
}
