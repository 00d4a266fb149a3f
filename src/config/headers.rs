//! Header list parsing.
//!
//! Header sets arrive as a single string such as `X-Frame-Options: DENY; X-Env: prod`.
//! Entries are separated by `;`, name and value by the first `:`. Anything that
//! does not split into two parts is dropped without error.

use std::collections::BTreeMap;
use std::fmt;

use axum::http::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

/// Last-write-wins mapping of header names to values.
///
/// Names compare case-insensitively, as HTTP does. The spelling of the last
/// entry for a name is the one kept for display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub struct HeaderSet {
    entries: BTreeMap<String, (String, String)>,
}

impl HeaderSet {
    /// Parse a `Name: Value; Name: Value` list.
    pub fn parse(spec: &str) -> Self {
        let mut entries = BTreeMap::new();
        for entry in spec.split(';') {
            if let Some((name, value)) = entry.split_once(':') {
                let name = name.trim();
                entries.insert(
                    name.to_ascii_lowercase(),
                    (name.to_string(), value.trim().to_string()),
                );
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .get(&name.to_ascii_lowercase())
            .map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .values()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Convert into wire headers, skipping entries HTTP cannot carry.
    pub fn compile(&self) -> Vec<(HeaderName, HeaderValue)> {
        self.iter()
            .filter_map(|(name, value)| {
                match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
                    (Ok(name), Ok(value)) => Some((name, value)),
                    _ => {
                        tracing::warn!(header = %name, "Skipping header that is not valid HTTP");
                        None
                    }
                }
            })
            .collect()
    }
}

impl From<String> for HeaderSet {
    fn from(spec: String) -> Self {
        Self::parse(&spec)
    }
}

impl From<HeaderSet> for String {
    fn from(set: HeaderSet) -> Self {
        set.to_string()
    }
}

impl fmt::Display for HeaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}: {}", name, value)?;
        }
        Ok(())
    }
}
