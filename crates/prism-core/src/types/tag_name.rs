//! Validated custom-element tag names.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Names the platform reserves even though they contain a hyphen.
const RESERVED_NAMES: &[&str] = &[
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

/// A valid custom-element name: starts with a lowercase ASCII letter,
/// contains a hyphen, has no ASCII uppercase, and is not reserved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TagName(String);

impl TagName {
    /// Validates and wraps a tag name.
    pub fn parse(name: impl Into<String>) -> Result<Self, AppError> {
        let name = name.into();

        let starts_lower = name.chars().next().is_some_and(|c| c.is_ascii_lowercase());
        if !starts_lower {
            return Err(AppError::validation(format!(
                "'{name}' is not a valid custom element name: must start with a lowercase ASCII letter"
            )));
        }
        if !name.contains('-') {
            return Err(AppError::validation(format!(
                "'{name}' is not a valid custom element name: must contain a hyphen"
            )));
        }
        let bad_char = name.chars().find(|&c| {
            !(c.is_ascii_lowercase()
                || c.is_ascii_digit()
                || matches!(c, '-' | '.' | '_')
                || (!c.is_ascii() && !c.is_whitespace()))
        });
        if let Some(c) = bad_char {
            return Err(AppError::validation(format!(
                "'{name}' is not a valid custom element name: invalid character {c:?}"
            )));
        }
        if RESERVED_NAMES.contains(&name.as_str()) {
            return Err(AppError::validation(format!(
                "'{name}' is a reserved element name"
            )));
        }

        Ok(Self(name))
    }

    /// Returns the tag name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TagName {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for TagName {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<TagName> for String {
    fn from(value: TagName) -> Self {
        value.0
    }
}
