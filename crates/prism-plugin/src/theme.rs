//! Theme definitions and how they are applied to a document.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use prism_core::result::AppResult;
use prism_core::types::{TokenMap, render_declarations, token_map};

/// Dark-mode overrides for a theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DarkTheme {
    /// Custom-property overrides applied under `prefers-color-scheme: dark`.
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
    /// Extra raw CSS injected alongside the dark block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<String>,
}

/// A named set of custom-property values plus optional dark overrides and
/// raw CSS.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeDefinition {
    /// Theme name.
    pub name: String,
    /// Light-mode custom properties, set on the document root.
    #[serde(default)]
    pub tokens: BTreeMap<String, String>,
    /// Dark-mode overrides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark: Option<DarkTheme>,
    /// Raw CSS injected when the theme is applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub styles: Option<String>,
}

/// The validated effects of applying a theme, in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeApplication {
    /// Properties to set on the document root.
    pub root_tokens: TokenMap,
    /// Style blocks to inject: theme styles, then the dark block, then dark
    /// styles.
    pub styles: Vec<String>,
}

impl ThemeDefinition {
    /// Creates an empty theme.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a light-mode token.
    pub fn token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(name.into(), value.into());
        self
    }

    /// Adds a dark-mode token, creating the dark section if needed.
    pub fn dark_token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.dark
            .get_or_insert_with(DarkTheme::default)
            .tokens
            .insert(name.into(), value.into());
        self
    }

    /// Sets the raw CSS for the theme.
    pub fn styles(mut self, css: impl Into<String>) -> Self {
        self.styles = Some(css.into());
        self
    }

    /// Sets the raw CSS for dark mode, creating the dark section if needed.
    pub fn dark_styles(mut self, css: impl Into<String>) -> Self {
        self.dark.get_or_insert_with(DarkTheme::default).styles = Some(css.into());
        self
    }

    /// Renders the dark-mode media-query block, if the theme has a dark
    /// section.
    pub fn dark_css(&self) -> AppResult<Option<String>> {
        let Some(dark) = &self.dark else {
            return Ok(None);
        };
        let tokens = token_map(dark.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        Ok(Some(format!(
            "@media (prefers-color-scheme: dark) {{\n  :root {{\n{}  }}\n}}",
            render_declarations(&tokens, 4)
        )))
    }

    /// Validates every token name and computes what applying the theme does.
    ///
    /// The dark block is emitted whenever a dark section exists, whether or
    /// not this theme is the one in use; the media query alone decides.
    pub fn application(&self) -> AppResult<ThemeApplication> {
        let root_tokens =
            token_map(self.tokens.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;

        let mut styles = Vec::new();
        if let Some(css) = &self.styles {
            styles.push(css.clone());
        }
        if let Some(block) = self.dark_css()? {
            styles.push(block);
        }
        if let Some(css) = self.dark.as_ref().and_then(|d| d.styles.clone()) {
            styles.push(css);
        }

        Ok(ThemeApplication {
            root_tokens,
            styles,
        })
    }
}
