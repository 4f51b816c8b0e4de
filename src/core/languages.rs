//! Fixed set of supported languages
//!
//! Every language has a short code (sent to the translation provider) and a
//! display name (shown in the form dropdowns). Both directions are resolved
//! from the same static table.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::core::errors::{PipelineError, Result};

/// Supported language
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum LanguageCode {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "es")]
    Spanish,
    #[serde(rename = "fr")]
    French,
    #[serde(rename = "de")]
    German,
    #[serde(rename = "nl")]
    Dutch,
    #[serde(rename = "it")]
    Italian,
    #[serde(rename = "zh")]
    Chinese,
    #[serde(rename = "ja")]
    Japanese,
    #[serde(rename = "ar")]
    Arabic,
}

impl LanguageCode {
    /// All languages, in dropdown order
    pub const ALL: [LanguageCode; 9] = [
        LanguageCode::English,
        LanguageCode::Spanish,
        LanguageCode::French,
        LanguageCode::German,
        LanguageCode::Dutch,
        LanguageCode::Italian,
        LanguageCode::Chinese,
        LanguageCode::Japanese,
        LanguageCode::Arabic,
    ];

    /// Short code, e.g. `es`
    pub const fn code(self) -> &'static str {
        match self {
            LanguageCode::English => "en",
            LanguageCode::Spanish => "es",
            LanguageCode::French => "fr",
            LanguageCode::German => "de",
            LanguageCode::Dutch => "nl",
            LanguageCode::Italian => "it",
            LanguageCode::Chinese => "zh",
            LanguageCode::Japanese => "ja",
            LanguageCode::Arabic => "ar",
        }
    }

    /// Human-readable name, e.g. `Spanish`
    pub const fn name(self) -> &'static str {
        match self {
            LanguageCode::English => "English",
            LanguageCode::Spanish => "Spanish",
            LanguageCode::French => "French",
            LanguageCode::German => "German",
            LanguageCode::Dutch => "Dutch",
            LanguageCode::Italian => "Italian",
            LanguageCode::Chinese => "Chinese",
            LanguageCode::Japanese => "Japanese",
            LanguageCode::Arabic => "Arabic",
        }
    }

    /// Resolve a display name. Exact, case-sensitive match.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.name() == name)
            .ok_or_else(|| PipelineError::LanguageNotFound {
                name: name.to_string(),
            })
    }

    /// Resolve a short code. Exact match.
    pub fn from_code(code: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == code)
            .ok_or_else(|| PipelineError::LanguageNotFound {
                name: code.to_string(),
            })
    }
}

impl LanguageCode {
    /// Resolve a source/target pair of display names. A missing source
    /// means English.
    pub fn resolve_pair(source: Option<&str>, target: &str) -> Result<(Self, Self)> {
        let source = source.map(Self::from_name).transpose()?.unwrap_or_default();
        Ok((source, Self::from_name(target)?))
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_spanish_resolves_to_es() {
        assert_eq!(LanguageCode::from_name("Spanish").unwrap().code(), "es");
    }

    #[test]
    fn test_unknown_name_fails() {
        match LanguageCode::from_name("Klingon") {
            Err(PipelineError::LanguageNotFound { name }) => assert_eq!(name, "Klingon"),
            other => panic!("expected LanguageNotFound, got {:?}", other),
        }
        // Codes are not names
        assert!(LanguageCode::from_name("es").is_err());
        assert!(LanguageCode::from_name("spanish").is_err());
    }

    #[test]
    fn test_resolve_pair() {
        assert_eq!(
            LanguageCode::resolve_pair(None, "Spanish").unwrap(),
            (LanguageCode::English, LanguageCode::Spanish)
        );
        assert_eq!(
            LanguageCode::resolve_pair(Some("Dutch"), "Japanese").unwrap(),
            (LanguageCode::Dutch, LanguageCode::Japanese)
        );
        assert!(matches!(
            LanguageCode::resolve_pair(None, "Klingon"),
            Err(PipelineError::LanguageNotFound { .. })
        ));
        assert!(matches!(
            LanguageCode::resolve_pair(Some("Elvish"), "German"),
            Err(PipelineError::LanguageNotFound { name }) if name == "Elvish"
        ));
    }

    #[test]
    fn test_table_is_a_bijection() {
        let codes: HashSet<_> = LanguageCode::ALL.iter().map(|l| l.code()).collect();
        let names: HashSet<_> = LanguageCode::ALL.iter().map(|l| l.name()).collect();
        assert_eq!(codes.len(), LanguageCode::ALL.len());
        assert_eq!(names.len(), LanguageCode::ALL.len());

        for lang in LanguageCode::ALL {
            let by_name = LanguageCode::from_name(lang.name()).unwrap();
            assert_eq!(by_name, lang);
            assert_eq!(LanguageCode::from_code(by_name.code()).unwrap(), lang);
        }
    }

    #[test]
    fn test_serializes_as_code() {
        let json = serde_json::to_string(&LanguageCode::Japanese).unwrap();
        assert_eq!(json, "\"ja\"");
        let back: LanguageCode = serde_json::from_str("\"ar\"").unwrap();
        assert_eq!(back, LanguageCode::Arabic);
    }
}
