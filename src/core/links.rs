use serde::{Deserialize, Serialize};

/// 連結欄位的種類，決定缺少協定時補上的前綴
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkScheme {
    #[default]
    Web,
    Email,
    Tel,
}

impl LinkScheme {
    pub fn from_attr(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("email") | Some("mailto") => LinkScheme::Email,
            Some("tel") | Some("phone") => LinkScheme::Tel,
            _ => LinkScheme::Web,
        }
    }
}

const KNOWN_PREFIXES: [&str; 3] = ["http", "mailto:", "tel:"];

/// 將使用者輸入整理成可用的 href
pub fn normalize_link(value: &str, scheme: LinkScheme) -> String {
    let value = value.trim();
    if KNOWN_PREFIXES.iter().any(|p| value.starts_with(p)) {
        return value.to_string();
    }
    match scheme {
        LinkScheme::Web => format!("https://{}", value),
        LinkScheme::Email => format!("mailto:{}", value),
        LinkScheme::Tel => {
            let digits: String = value
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '+')
                .collect();
            format!("tel:{}", digits)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_web_links() {
        assert_eq!(
            normalize_link("github.com/alex", LinkScheme::Web),
            "https://github.com/alex"
        );
        assert_eq!(
            normalize_link("https://x.com/alex", LinkScheme::Web),
            "https://x.com/alex"
        );
        assert_eq!(
            normalize_link("http://old.example.com", LinkScheme::Web),
            "http://old.example.com"
        );
    }

    #[test]
    fn test_normalize_email_links() {
        assert_eq!(normalize_link("a@b.com", LinkScheme::Email), "mailto:a@b.com");
        assert_eq!(
            normalize_link("mailto:a@b.com", LinkScheme::Email),
            "mailto:a@b.com"
        );
    }

    #[test]
    fn test_normalize_phone_links() {
        assert_eq!(
            normalize_link("+1 (555) 010-2030", LinkScheme::Tel),
            "tel:+15550102030"
        );
    }
}
