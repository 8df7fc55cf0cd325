use crate::utils::error::{Result, RotationError};
use std::collections::HashSet;
use std::str::FromStr;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

fn invalid(field_name: &str, value: &str, reason: impl Into<String>) -> RotationError {
    RotationError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(invalid(field_name, url_str, "URL cannot be empty"));
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(invalid(
                field_name,
                url_str,
                format!("Unsupported URL scheme: {}", scheme),
            )),
        },
        Err(e) => Err(invalid(
            field_name,
            url_str,
            format!("Invalid URL format: {}", e),
        )),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(invalid(field_name, path, "Path cannot be empty"));
    }

    if path.contains('\0') {
        return Err(invalid(field_name, path, "Path contains null bytes"));
    }

    Ok(())
}

/// Unset and empty values are both reported as missing.
pub fn validate_required_field<'a>(field_name: &str, value: &'a Option<String>) -> Result<&'a str> {
    match value.as_deref() {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(RotationError::MissingConfigError {
            field: field_name.to_string(),
        }),
    }
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(invalid(
            field_name,
            value,
            "Value cannot be empty or whitespace-only",
        ));
    }
    Ok(())
}

/// 去除前後空白後解析數值
pub fn parse_number<T>(field_name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| invalid(field_name, value, format!("Not a valid integer: {}", e)))
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(invalid(
            field_name,
            &value.to_string(),
            format!("Value must be between {} and {}", min, max),
        ));
    }
    Ok(())
}

pub fn validate_unique(field_name: &str, values: &[String]) -> Result<()> {
    let mut seen = HashSet::with_capacity(values.len());
    for value in values {
        if !seen.insert(value.as_str()) {
            return Err(invalid(field_name, value, "Duplicate entry"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("api_endpoint", "https://api.hetzner.cloud/v1").is_ok());
        assert!(validate_url("api_endpoint", "http://127.0.0.1:8080").is_ok());
        assert!(validate_url("api_endpoint", "").is_err());
        assert!(validate_url("api_endpoint", "invalid-url").is_err());
        assert!(validate_url("api_endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_required_field() {
        assert_eq!(
            validate_required_field("token", &Some("abc".to_string())).unwrap(),
            "abc"
        );
        assert!(matches!(
            validate_required_field("token", &Some(String::new())),
            Err(RotationError::MissingConfigError { .. })
        ));
        assert!(matches!(
            validate_required_field("token", &None),
            Err(RotationError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_parse_number_trims_whitespace() {
        assert_eq!(parse_number::<i64>("load_balancer_id", " 42\n").unwrap(), 42);
        assert!(parse_number::<i64>("load_balancer_id", "lb-42").is_err());
        assert!(parse_number::<u16>("listen_port", "70000").is_err());
    }

    #[test]
    fn test_validate_unique() {
        let unique = vec!["a.example".to_string(), "b.example".to_string()];
        assert!(validate_unique("domains", &unique).is_ok());

        let duplicated = vec!["a.example".to_string(), "a.example".to_string()];
        assert!(validate_unique("domains", &duplicated).is_err());
    }
}
