//! Configuration for the texturizer.

use crate::error::OptionsError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Elements whose contents are never texturized.
pub const DEFAULT_EXCLUDED_TAGS: &[&str] = &["pre", "code", "kbd", "style", "script", "tt"];

/// Typographic quote and prime replacements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QuoteChars {
    /// Opening single quote.
    pub left_single: String,
    /// Closing single quote, also used for apostrophes.
    pub right_single: String,
    /// Opening double quote.
    pub left_double: String,
    /// Closing double quote.
    pub right_double: String,
    /// Prime (feet, minutes).
    pub prime: String,
    /// Double prime (inches, seconds).
    pub double_prime: String,
}

impl Default for QuoteChars {
    fn default() -> Self {
        Self {
            left_single: "&#8216;".to_string(),
            right_single: "&#8217;".to_string(),
            left_double: "&#8220;".to_string(),
            right_double: "&#8221;".to_string(),
            prime: "&#8242;".to_string(),
            double_prime: "&#8243;".to_string(),
        }
    }
}

/// Dash replacements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashChars {
    /// Replaces `---` and a spaced `--`. Defaults to `&#8211;`.
    pub em_dash: String,
    /// Replaces `--` and a spaced `-`. Defaults to `&#8212;`.
    pub en_dash: String,
}

impl Default for DashChars {
    fn default() -> Self {
        Self {
            em_dash: "&#8211;".to_string(),
            en_dash: "&#8212;".to_string(),
        }
    }
}

/// Options for [`texturize`](crate::texturize::texturize).
///
/// Every field has a default, so a partial JSON object is a valid payload:
///
/// ```
/// use prosefmt_core::TexturizeOptions;
///
/// let options = TexturizeOptions::from_json(&serde_json::json!({
///     "quotes": { "leftDouble": "\u{201c}", "rightDouble": "\u{201d}" },
///     "excludedTags": ["pre"]
/// }))
/// .unwrap();
/// assert_eq!(options.quotes.left_double, "\u{201c}");
/// assert_eq!(options.quotes.left_single, "&#8216;");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TexturizeOptions {
    /// Quote and prime replacements.
    pub quotes: QuoteChars,
    /// Dash replacements.
    pub dashes: DashChars,
    /// Element names whose contents are left untouched.
    pub excluded_tags: Vec<String>,
    /// Literal replacements applied before any contextual rule.
    pub static_translations: BTreeMap<String, String>,
}

impl Default for TexturizeOptions {
    fn default() -> Self {
        Self {
            quotes: QuoteChars::default(),
            dashes: DashChars::default(),
            excluded_tags: DEFAULT_EXCLUDED_TAGS
                .iter()
                .map(|tag| tag.to_string())
                .collect(),
            static_translations: default_static_translations(),
        }
    }
}

impl TexturizeOptions {
    /// Reads options from a JSON payload, filling gaps with defaults.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, OptionsError> {
        serde_json::from_value(value.clone()).map_err(|err| OptionsError::invalid("texturize", err))
    }
}

/// The default literal replacement table.
pub fn default_static_translations() -> BTreeMap<String, String> {
    [
        ("(c)", "&#169;"),
        ("(r)", "&#174;"),
        ("...", "&#8230;"),
        ("(tm)", "&#8242;"),
    ]
    .into_iter()
    .map(|(from, to)| (from.to_string(), to.to_string()))
    .collect()
}
