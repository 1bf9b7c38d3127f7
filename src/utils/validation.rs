use crate::utils::error::{BlogError, Result};
use std::fmt::Display;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid_value(field_name: &str, value: impl Display, reason: impl Into<String>) -> BlogError {
    BlogError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn out_of_range<T: PartialOrd + Display>(value: &T, min: &T, max: &T) -> Option<String> {
    if value < min || value > max {
        Some(format!("must be between {} and {}, got {}", min, max, value))
    } else {
        None
    }
}

/// 解析 WordPress REST API 根路徑 (例如 `https://host/wp-json/wp/v2`)
///
/// Endpoints are appended as path segments, so the base must be an absolute
/// http(s) URL without query or fragment.
pub fn parse_api_base(field_name: &str, url_str: &str) -> Result<Url> {
    if url_str.trim().is_empty() {
        return Err(invalid_value(field_name, url_str, "URL cannot be empty"));
    }

    let url = Url::parse(url_str)
        .map_err(|e| invalid_value(field_name, url_str, format!("Invalid URL format: {}", e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid_value(
            field_name,
            url_str,
            format!("Unsupported URL scheme: {}", url.scheme()),
        ));
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(invalid_value(field_name, url_str, "Expected an absolute http(s) URL"));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(invalid_value(
            field_name,
            url_str,
            "API base must not carry a query or fragment",
        ));
    }

    Ok(url)
}

/// 設定值範圍檢查 (例如 timeout 秒數)
pub fn validate_setting_range<T: PartialOrd + Display>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    match out_of_range(&value, &min, &max) {
        Some(reason) => Err(invalid_value(field_name, value, reason)),
        None => Ok(()),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid_value(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// WordPress term and post ids start at 1.
pub fn validate_ids(field_name: &str, ids: &[i64]) -> Result<()> {
    match ids.iter().find(|id| **id < 1) {
        Some(id) => Err(invalid_value(
            field_name,
            format!("{:?}", ids),
            format!("Ids must be positive, got {}", id),
        )),
        None => Ok(()),
    }
}

/// Request parameters (page numbers, months) outside their range are
/// validation errors, not configuration errors.
pub fn validate_range<T: PartialOrd + Display>(field_name: &str, value: T, min: T, max: T) -> Result<()> {
    match out_of_range(&value, &min, &max) {
        Some(reason) => Err(BlogError::ValidationError {
            message: format!("{} {}", field_name, reason),
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_api_base() {
        let base = parse_api_base("api.base_url", "https://example.com/wp-json/wp/v2").unwrap();
        assert_eq!(base.path(), "/wp-json/wp/v2");
        assert!(parse_api_base("api.base_url", "http://localhost:8080").is_ok());

        for bad in [
            "",
            "invalid-url",
            "ftp://example.com",
            "mailto:editor@example.com",
            "https://example.com/wp-json/wp/v2?per_page=3",
            "https://example.com/wp-json/wp/v2#posts",
        ] {
            let err = parse_api_base("api.base_url", bad).unwrap_err();
            assert!(
                matches!(err, BlogError::InvalidConfigValueError { ref field, .. } if field == "api.base_url"),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_validate_setting_range() {
        assert!(validate_setting_range("api.timeout_seconds", 5u64, 1, 300).is_ok());
        let err = validate_setting_range("api.timeout_seconds", 0u64, 1, 300).unwrap_err();
        assert!(matches!(err, BlogError::InvalidConfigValueError { .. }));
        assert!(validate_setting_range("api.timeout_seconds", 301u64, 1, 300).is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("month", 1, 1, 12).is_ok());
        assert!(validate_range("month", 12, 1, 12).is_ok());
        let err = validate_range("month", 13, 1, 12).unwrap_err();
        match err {
            BlogError::ValidationError { message } => {
                assert_eq!(message, "month must be between 1 and 12, got 13")
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_validate_ids() {
        assert!(validate_ids("blog.tag_ids", &[]).is_ok());
        assert!(validate_ids("blog.tag_ids", &[1, 1175]).is_ok());
        assert!(validate_ids("blog.tag_ids", &[3, 0]).is_err());
        assert!(validate_ids("blog.excluded_tags", &[-4]).is_err());
    }

    #[test]
    fn test_validate_non_empty_string() {
        assert!(validate_non_empty_string("blog.title", "Ubuntu Blog").is_ok());
        assert!(validate_non_empty_string("blog.title", "   ").is_err());
    }
}
