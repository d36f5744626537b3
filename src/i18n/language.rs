//! Language types: codes and the supported-language records the API serves.

use serde::{Deserialize, Serialize};

/// Source language assumed when a caller does not pass one.
pub const DEFAULT_SOURCE_LANGUAGE: &str = "en";

/// A language the translation backend can target.
///
/// Wire format is `{ "code": "fr", "language": "French" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguage {
    /// Language code (e.g., "en", "fr")
    pub code: String,

    /// Human readable name shown in the language picker
    #[serde(rename = "language")]
    pub display_name: String,
}

impl SupportedLanguage {
    pub fn new(code: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
        }
    }
}

/// Normalize a user or network supplied language code.
///
/// Trims whitespace; case is preserved since backends use codes like "zh-CN".
/// Returns `None` for an empty code.
pub fn normalize_code(code: &str) -> Option<String> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else {
        Some(code.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supported_language_deserializes_wire_format() {
        let json = r#"[{"code":"en","language":"English"},{"code":"fr","language":"French"}]"#;
        let languages: Vec<SupportedLanguage> = serde_json::from_str(json).expect("parse");

        assert_eq!(languages.len(), 2);
        assert_eq!(languages[1], SupportedLanguage::new("fr", "French"));
    }

    #[test]
    fn test_supported_language_serializes_wire_format() {
        let json = serde_json::to_value(SupportedLanguage::new("de", "German")).unwrap();
        assert_eq!(json["code"], "de");
        assert_eq!(json["language"], "German");
    }

    #[test]
    fn test_normalize_code() {
        assert_eq!(normalize_code("zh-CN"), Some("zh-CN".to_string()));
        assert_eq!(normalize_code("  es "), Some("es".to_string()));
        assert_eq!(normalize_code(""), None);
        assert_eq!(normalize_code("   "), None);
    }
}
