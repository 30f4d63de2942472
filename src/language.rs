//! The target-language table shared by the CLI menu and the web dropdown.
//!
//! Both front ends read from [`TARGET_LANGUAGES`]; menu keys are the 1-based
//! position of an entry, so adding a language appends a new menu number
//! without renumbering the existing ones.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A language the user can translate into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetLanguage {
    /// Display name, e.g. "French".
    pub name: &'static str,
    /// Code passed to the translation backend, e.g. "fr".
    pub code: &'static str,
}

/// Every selectable target language, in menu order.
pub const TARGET_LANGUAGES: &[TargetLanguage] = &[
    TargetLanguage { name: "Hindi", code: "hi" },
    TargetLanguage { name: "French", code: "fr" },
    TargetLanguage { name: "Spanish", code: "es" },
    TargetLanguage { name: "Chinese", code: "zh-CN" },
    TargetLanguage { name: "English", code: "en" },
    TargetLanguage { name: "Tamil", code: "ta" },
];

/// Fallback when a menu choice is not recognised.
pub const ENGLISH: TargetLanguage = TargetLanguage { name: "English", code: "en" };

impl TargetLanguage {
    /// Resolve a numbered menu choice. Anything unrecognised resolves to English.
    pub fn from_menu_choice(choice: &str) -> Self {
        choice
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| TARGET_LANGUAGES.get(i).copied())
            .unwrap_or(ENGLISH)
    }

    /// Look up by code, case-insensitively (`zh-cn` matches `zh-CN`).
    pub fn from_code(code: &str) -> Option<Self> {
        let code = code.trim();
        TARGET_LANGUAGES
            .iter()
            .find(|l| l.code.eq_ignore_ascii_case(code))
            .copied()
    }

    /// Look up by display name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        TARGET_LANGUAGES
            .iter()
            .find(|l| l.name.eq_ignore_ascii_case(name))
            .copied()
    }

    /// Look up by code or name; used for `--target` and the web form field.
    pub fn parse(value: &str) -> Option<Self> {
        Self::from_code(value).or_else(|| Self::from_name(value))
    }
}

impl Default for TargetLanguage {
    fn default() -> Self {
        ENGLISH
    }
}

impl fmt::Display for TargetLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}

impl<'de> Deserialize<'de> for TargetLanguage {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        TargetLanguage::parse(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown target language '{raw}'")))
    }
}

/// The numbered menu shown by the CLI, one line per entry.
pub fn menu_lines() -> Vec<String> {
    TARGET_LANGUAGES
        .iter()
        .enumerate()
        .map(|(i, l)| format!("{}. {}", i + 1, l.name))
        .collect()
}

/// A short language identifier such as `en`, `hi` or `zh-CN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LanguageCode(String);

impl LanguageCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_choice_two_is_french() {
        assert_eq!(TargetLanguage::from_menu_choice("2").code, "fr");
    }

    #[test]
    fn unrecognised_menu_choice_is_english() {
        assert_eq!(TargetLanguage::from_menu_choice("9").code, "en");
        assert_eq!(TargetLanguage::from_menu_choice("0").code, "en");
        assert_eq!(TargetLanguage::from_menu_choice("abc").code, "en");
        assert_eq!(TargetLanguage::from_menu_choice("").code, "en");
    }

    #[test]
    fn menu_choice_tolerates_whitespace() {
        assert_eq!(TargetLanguage::from_menu_choice(" 1\n").code, "hi");
    }

    #[test]
    fn menu_lines_are_numbered_from_one() {
        let lines = menu_lines();
        assert_eq!(lines.len(), TARGET_LANGUAGES.len());
        assert_eq!(lines[0], "1. Hindi");
        assert_eq!(lines[3], "4. Chinese");
    }

    #[test]
    fn parse_accepts_code_or_name() {
        assert_eq!(TargetLanguage::parse("zh-cn").map(|l| l.code), Some("zh-CN"));
        assert_eq!(TargetLanguage::parse("tamil").map(|l| l.code), Some("ta"));
        assert_eq!(TargetLanguage::parse("klingon"), None);
    }

    #[test]
    fn deserialises_from_code_string() {
        let lang: TargetLanguage = serde_json::from_str("\"es\"").expect("valid");
        assert_eq!(lang.name, "Spanish");
        assert!(serde_json::from_str::<TargetLanguage>("\"xx\"").is_err());
    }
}
