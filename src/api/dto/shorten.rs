//! DTOs for link shortening endpoint.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use validator::Validate;

/// Upper bound for `ttl_days`, roughly one hundred years.
pub const MAX_TTL_DAYS: u32 = 36_500;

/// Compiled regex for alias validation.
static ALIAS_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("alias regex is valid"));

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The target URL to shorten.
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Optional caller-chosen short code.
    #[validate(length(min = 1, max = 64))]
    #[validate(regex(path = "*ALIAS_REGEX"))]
    pub alias: Option<String>,

    /// Lifetime in days; absent or `0` means the link never expires.
    #[validate(range(max = 36500))]
    pub ttl_days: Option<u32>,
}

impl ShortenRequest {
    /// Trims the alias; a blank alias becomes `None` and a code is generated.
    pub fn normalized(mut self) -> Self {
        self.alias = self
            .alias
            .map(|alias| alias.trim().to_string())
            .filter(|alias| !alias.is_empty());
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub code: String,
    pub short_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str, alias: Option<&str>, ttl_days: Option<u32>) -> ShortenRequest {
        ShortenRequest {
            url: url.to_string(),
            alias: alias.map(str::to_string),
            ttl_days,
        }
    }

    #[test]
    fn test_valid_request() {
        assert!(
            request("https://example.com/a", Some("my_link-1"), Some(7))
                .validate()
                .is_ok()
        );
        assert!(request("https://example.com", None, None).validate().is_ok());
    }

    #[test]
    fn test_invalid_url() {
        let errors = request("not a url", None, None).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("url"));
    }

    #[test]
    fn test_alias_rules() {
        assert!(request("https://a.io", Some("has space"), None).validate().is_err());
        assert!(request("https://a.io", Some("slash/no"), None).validate().is_err());
        assert!(
            request("https://a.io", Some(&"a".repeat(65)), None)
                .validate()
                .is_err()
        );
        assert!(
            request("https://a.io", Some(&"a".repeat(64)), None)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_normalized_trims_alias() {
        let req = request("https://a.io", Some("  go "), None).normalized();
        assert_eq!(req.alias.as_deref(), Some("go"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_normalized_blank_alias_is_none() {
        for blank in ["", "   ", "\t"] {
            let req = request("https://a.io", Some(blank), None).normalized();
            assert_eq!(req.alias, None);
            assert!(req.validate().is_ok());
        }
    }

    #[test]
    fn test_normalized_keeps_inner_space_invalid() {
        let req = request("https://a.io", Some(" has space "), None).normalized();
        assert_eq!(req.alias.as_deref(), Some("has space"));
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_ttl_bounds() {
        assert!(
            request("https://a.io", None, Some(MAX_TTL_DAYS))
                .validate()
                .is_ok()
        );
        assert!(
            request("https://a.io", None, Some(MAX_TTL_DAYS + 1))
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_deserialize_rejects_negative_ttl() {
        let parsed: Result<ShortenRequest, _> =
            serde_json::from_str(r#"{"url":"https://a.io","ttl_days":-1}"#);
        assert!(parsed.is_err());
    }
}
