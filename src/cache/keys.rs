//! Cache key derivation.
//!
//! A read is identified by its request path plus its query parameters in the
//! order the caller supplied them. Two reads that differ only in parameter
//! order are distinct entries.

use std::fmt;

use url::form_urlencoded;

/// Identity of a cached read.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for `path` with `query` pairs, as `path?k=v&k2=v2`.
    ///
    /// The separator is always present, so a read without parameters is
    /// keyed as `path?`.
    pub fn for_request(path: &str, query: &[(&str, String)]) -> Self {
        let path = path.trim_start_matches('/');
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (name, value) in query {
            serializer.append_pair(name, value);
        }
        Self(format!("/{path}?{}", serializer.finish()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CacheKey {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
