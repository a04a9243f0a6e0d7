use crate::utils::error::{FolioError, Result};
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<()> {
    if url_str.is_empty() {
        return Err(FolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(FolioError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(FolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(FolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(FolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_required_field<'a, T>(field_name: &str, value: &'a Option<T>) -> Result<&'a T> {
    value.as_ref().ok_or_else(|| FolioError::MissingConfigError {
        field: field_name.to_string(),
    })
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(FolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(FolioError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// 編譯設定中的正規表達式，失敗時回報欄位名稱
pub fn compile_pattern(field_name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| FolioError::InvalidConfigValueError {
        field: field_name.to_string(),
        value: pattern.to_string(),
        reason: format!("Invalid regular expression: {}", e),
    })
}

pub fn validate_template_id(pattern: &Regex, template_id: &str) -> Result<()> {
    if pattern.is_match(template_id) {
        Ok(())
    } else {
        Err(FolioError::InvalidTemplateId {
            id: template_id.to_string(),
        })
    }
}

fn handle_pattern() -> &'static Regex {
    static HANDLE: OnceLock<Regex> = OnceLock::new();
    HANDLE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.-]{1,64}$").expect("handle pattern is a valid regex")
    })
}

/// 公開網址中的使用者代稱，不允許路徑字元
pub fn is_valid_handle(handle: &str) -> bool {
    handle_pattern().is_match(handle) && !handle.starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("record_store.endpoint", "https://example.com").is_ok());
        assert!(validate_url("record_store.endpoint", "http://example.com").is_ok());
        assert!(validate_url("record_store.endpoint", "").is_err());
        assert!(validate_url("record_store.endpoint", "invalid-url").is_err());
        assert!(validate_url("record_store.endpoint", "ftp://example.com").is_err());
    }

    #[test]
    fn test_validate_template_id() {
        let pattern = compile_pattern("templates.id_pattern", r"^template\d{2}$").unwrap();
        assert!(validate_template_id(&pattern, "template01").is_ok());
        assert!(matches!(
            validate_template_id(&pattern, "template1"),
            Err(FolioError::InvalidTemplateId { .. })
        ));
        assert!(validate_template_id(&pattern, "../template01").is_err());
    }

    #[test]
    fn test_handles() {
        assert!(is_valid_handle("jane-doe"));
        assert!(is_valid_handle("alex.rivera_2"));
        assert!(!is_valid_handle("../secrets"));
        assert!(!is_valid_handle(".hidden"));
        assert!(!is_valid_handle(""));
        assert!(!is_valid_handle("a/b"));
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("server.port", 8080u16, 1, 65535).is_ok());
        assert!(validate_range("server.port", 0u16, 1, 65535).is_err());
    }
}
