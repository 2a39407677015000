//! Utility functions shared across the crate.

mod secret;

pub use secret::SecretString;

use std::fmt::Display;

/// Builder for URL query parameters.
///
/// Provides a fluent API for constructing query strings with proper URL encoding.
///
/// # Example
/// ```ignore
/// let query = QueryBuilder::new()
///     .param("uid", 7)
///     .extend([("keyword", "db"), ("direction", "")])
///     .build();
/// // Returns "?uid=7&keyword=db"
/// ```
#[derive(Default)]
pub struct QueryBuilder {
    params: Vec<(String, String)>,
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a required parameter (always included).
    pub fn param(mut self, key: &str, value: impl Display) -> Self {
        self.params.push((
            key.to_string(),
            urlencoding::encode(&value.to_string()).into_owned(),
        ));
        self
    }

    /// Add every `(key, value)` pair, skipping empty values.
    pub fn extend<K, V, I>(mut self, pairs: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in pairs {
            if !value.as_ref().is_empty() {
                self = self.param(key.as_ref(), value.as_ref());
            }
        }
        self
    }

    /// Whether a parameter with this key has been added
    pub fn contains(&self, key: &str) -> bool {
        self.params.iter().any(|(k, _)| k == key)
    }

    /// Build the query string.
    ///
    /// Returns an empty string if no parameters were added,
    /// otherwise returns "?key1=value1&key2=value2...".
    pub fn build(self) -> String {
        if self.params.is_empty() {
            String::new()
        } else {
            format!(
                "?{}",
                self.params
                    .into_iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join("&")
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query() {
        assert_eq!(QueryBuilder::new().build(), "");
    }

    #[test]
    fn test_params_are_encoded() {
        let query = QueryBuilder::new()
            .param("uid", 7)
            .param("keyword", "a b&c")
            .build();
        assert_eq!(query, "?uid=7&keyword=a%20b%26c");
    }

    #[test]
    fn test_extend_skips_empty_values() {
        let builder = QueryBuilder::new().extend([("order_by", "name"), ("keyword", "")]);
        assert!(builder.contains("order_by"));
        assert!(!builder.contains("keyword"));
        assert_eq!(builder.build(), "?order_by=name");
    }
}
