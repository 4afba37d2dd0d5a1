//! CSS custom properties (design tokens).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A CSS custom-property name. Always begins with `--`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CssVariable(String);

impl CssVariable {
    /// Validates and wraps a custom-property name.
    pub fn parse(name: impl Into<String>) -> Result<Self, AppError> {
        let name = name.into();
        if !name.starts_with("--") || name.len() == 2 {
            return Err(AppError::validation(format!(
                "'{name}' is not a CSS custom property: must begin with '--'"
            )));
        }
        if name.chars().any(|c| c.is_whitespace() || matches!(c, ':' | ';' | '{' | '}')) {
            return Err(AppError::validation(format!(
                "'{name}' is not a CSS custom property: contains a forbidden character"
            )));
        }
        Ok(Self(name))
    }

    /// Returns the property name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CssVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CssVariable {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<CssVariable> for String {
    fn from(value: CssVariable) -> Self {
        value.0
    }
}

/// A set of token values keyed by custom-property name.
///
/// Ordered so that injected CSS is deterministic.
pub type TokenMap = BTreeMap<CssVariable, String>;

/// Checks that a token value stays inside its declaration when rendered.
fn check_value(name: &CssVariable, value: &str) -> Result<(), AppError> {
    if value.chars().any(|c| matches!(c, ';' | '{' | '}')) {
        return Err(AppError::validation(format!(
            "Value for '{name}' contains a forbidden character"
        )));
    }
    Ok(())
}

/// Builds a [`TokenMap`] from string pairs, validating every name and value.
pub fn token_map<I, K, V>(pairs: I) -> Result<TokenMap, AppError>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| -> Result<(CssVariable, String), AppError> {
            let name = CssVariable::parse(k)?;
            let value: String = v.into();
            check_value(&name, &value)?;
            Ok((name, value))
        })
        .collect()
}

/// Renders tokens as `name: value;` declarations, one per line, indented
/// by `indent` spaces.
pub fn render_declarations(tokens: &TokenMap, indent: usize) -> String {
    let pad = " ".repeat(indent);
    tokens
        .iter()
        .map(|(name, value)| format!("{pad}{name}: {value};\n"))
        .collect()
}
