//! Allowlist HTML sanitizer built on lol_html.

use crate::error::PipelineError;
use lol_html::html_content::Element;
use lol_html::{RewriteStrSettings, doc_comments, element, rewrite_str};
use serde::{Deserialize, Serialize};

/// Strips disallowed markup from an HTML fragment.
pub trait Sanitizer: Send + Sync {
    /// Returns the sanitized form of `html`.
    fn sanitize(&self, html: &str) -> Result<String, PipelineError>;
}

/// Allowlist sanitizer settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SanitizerConfig {
    /// Elements kept as-is. Others are unwrapped, keeping their content.
    pub allowed_elements: Vec<String>,
    /// Attributes kept on allowed elements.
    pub allowed_attributes: Vec<String>,
    /// Elements removed together with their content.
    pub dropped_elements: Vec<String>,
}

const DEFAULT_ALLOWED_ELEMENTS: &[&str] = &[
    "a", "abbr", "acronym", "address", "b", "bdo", "big", "blockquote", "br", "caption", "center",
    "cite", "code", "col", "colgroup", "dd", "del", "dfn", "div", "dl", "dt", "em", "figcaption",
    "figure", "font", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "i", "img", "ins", "kbd", "li",
    "ol", "p", "pre", "q", "s", "samp", "small", "span", "strike", "strong", "sub", "sup", "table",
    "tbody", "td", "tfoot", "th", "thead", "tr", "tt", "u", "ul", "var",
];

const DEFAULT_ALLOWED_ATTRIBUTES: &[&str] = &[
    "href", "title", "alt", "src", "width", "height", "class", "id", "lang", "dir", "cite",
    "datetime", "colspan", "rowspan", "align",
];

const DEFAULT_DROPPED_ELEMENTS: &[&str] = &["script", "style", "iframe", "object", "embed"];

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            allowed_elements: owned(DEFAULT_ALLOWED_ELEMENTS),
            allowed_attributes: owned(DEFAULT_ALLOWED_ATTRIBUTES),
            dropped_elements: owned(DEFAULT_DROPPED_ELEMENTS),
        }
    }
}

/// Sanitizer that keeps only allowlisted elements and attributes.
///
/// Event handler attributes (`on*`) and `javascript:` URLs are removed even
/// when allowlisted. Comments are removed.
#[derive(Debug, Clone, Default)]
pub struct AllowlistSanitizer {
    config: SanitizerConfig,
}

impl AllowlistSanitizer {
    /// Creates a sanitizer; names are compared case-insensitively.
    pub fn new(config: SanitizerConfig) -> Self {
        let lower = |names: Vec<String>| {
            names
                .into_iter()
                .map(|name| name.to_ascii_lowercase())
                .collect()
        };
        Self {
            config: SanitizerConfig {
                allowed_elements: lower(config.allowed_elements),
                allowed_attributes: lower(config.allowed_attributes),
                dropped_elements: lower(config.dropped_elements),
            },
        }
    }

    fn is_listed(names: &[String], name: &str) -> bool {
        names.iter().any(|candidate| candidate == name)
    }

    fn filter_element(&self, el: &mut Element<'_, '_>) {
        let tag = el.tag_name().to_ascii_lowercase();
        if Self::is_listed(&self.config.dropped_elements, &tag) {
            el.remove();
            return;
        }
        if !Self::is_listed(&self.config.allowed_elements, &tag) {
            el.remove_and_keep_content();
            return;
        }

        let rejected: Vec<String> = el
            .attributes()
            .iter()
            .filter(|attr| !self.keeps_attribute(&attr.name(), &attr.value()))
            .map(|attr| attr.name())
            .collect();
        for name in rejected {
            el.remove_attribute(&name);
        }
    }

    fn keeps_attribute(&self, name: &str, value: &str) -> bool {
        let name = name.to_ascii_lowercase();
        !name.starts_with("on")
            && !is_script_url(value)
            && Self::is_listed(&self.config.allowed_attributes, &name)
    }
}

impl Sanitizer for AllowlistSanitizer {
    fn sanitize(&self, html: &str) -> Result<String, PipelineError> {
        let output = rewrite_str(
            html,
            RewriteStrSettings {
                element_content_handlers: vec![element!("*", |el| {
                    self.filter_element(el);
                    Ok(())
                })],
                document_content_handlers: vec![doc_comments!(|comment| {
                    comment.remove();
                    Ok(())
                })],
                ..RewriteStrSettings::new()
            },
        )?;
        Ok(output)
    }
}

/// True for `javascript:` URLs, ignoring case, whitespace, and control characters.
fn is_script_url(value: &str) -> bool {
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .take("javascript:".len())
        .collect();
    compact.eq_ignore_ascii_case("javascript:")
}
