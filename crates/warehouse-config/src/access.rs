//! Placeholder tokens for the permission interceptor.
//!
//! Stored permission paths name their dynamic segments with `{...}` tokens.
//! The interceptor rewrites the trailing segment of an incoming path into
//! these tokens before looking the path up, so they must match what the
//! permission table uses.
//!
//! - `ACCESS_NUMERIC_PLACEHOLDER` (default `{id}`)
//! - `ACCESS_ALPHANUMERIC_PLACEHOLDER` (default `{productCode}`)

use crate::env_var;

pub const DEFAULT_NUMERIC_PLACEHOLDER: &str = "{id}";
pub const DEFAULT_ALPHANUMERIC_PLACEHOLDER: &str = "{productCode}";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessConfig {
    pub numeric_placeholder: String,
    pub alphanumeric_placeholder: String,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            numeric_placeholder: DEFAULT_NUMERIC_PLACEHOLDER.to_string(),
            alphanumeric_placeholder: DEFAULT_ALPHANUMERIC_PLACEHOLDER.to_string(),
        }
    }
}

impl AccessConfig {
    pub fn from_env() -> Self {
        Self {
            numeric_placeholder: env_var("ACCESS_NUMERIC_PLACEHOLDER")
                .filter(|p| is_placeholder(p))
                .unwrap_or_else(|| DEFAULT_NUMERIC_PLACEHOLDER.to_string()),
            alphanumeric_placeholder: env_var("ACCESS_ALPHANUMERIC_PLACEHOLDER")
                .filter(|p| is_placeholder(p))
                .unwrap_or_else(|| DEFAULT_ALPHANUMERIC_PLACEHOLDER.to_string()),
        }
    }
}

/// `{name}` with a non-empty name and no nested braces or slashes.
pub fn is_placeholder(token: &str) -> bool {
    token
        .strip_prefix('{')
        .and_then(|rest| rest.strip_suffix('}'))
        .is_some_and(|name| {
            !name.is_empty() && !name.contains(['{', '}', '/'])
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_placeholders() {
        let config = AccessConfig::default();
        assert_eq!(config.numeric_placeholder, "{id}");
        assert_eq!(config.alphanumeric_placeholder, "{productCode}");
    }

    #[test]
    fn test_is_placeholder() {
        assert!(is_placeholder("{id}"));
        assert!(is_placeholder("{productCode}"));
        assert!(!is_placeholder("{}"));
        assert!(!is_placeholder("id"));
        assert!(!is_placeholder("{a/b}"));
        assert!(!is_placeholder("{{id}}"));
    }
}
