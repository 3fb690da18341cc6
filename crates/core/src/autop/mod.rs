//! Automatic paragraph formatting.
//!
//! Blank-line separated text becomes `<p>` blocks, block-level elements are
//! kept out of paragraphs, and single newlines optionally become `<br />`.
//! `<pre>` regions are set aside before any pass runs and restored verbatim.

mod patterns;
mod preserve;

pub use patterns::BLOCK_ELEMENTS;

use crate::error::OptionsError;
use crate::split::replace_in_tags;
use crate::translate::TranslationTable;
use once_cell::sync::Lazy;
use patterns::*;
use preserve::{NEWLINE_FLAG, PRESERVED_NEWLINE, PreBlocks, convert_line_breaks};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

static NEWLINES_IN_TAGS: Lazy<TranslationTable> =
    Lazy::new(|| TranslationTable::new([("\n", NEWLINE_FLAG)]));

/// Options for [`autop`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AutopOptions {
    /// Convert single newlines inside paragraphs to `<br />`.
    pub convert_breaks: bool,
}

impl Default for AutopOptions {
    fn default() -> Self {
        Self {
            convert_breaks: true,
        }
    }
}

impl AutopOptions {
    /// Reads options from a JSON payload, filling gaps with defaults.
    pub fn from_json(value: &serde_json::Value) -> Result<Self, OptionsError> {
        serde_json::from_value(value.clone()).map_err(|err| OptionsError::invalid("autop", err))
    }
}

/// Wraps blank-line separated text in paragraphs.
///
/// Never fails: unterminated tags and `<pre>` regions are treated as running
/// to the end of input.
///
/// # Examples
///
/// ```
/// use prosefmt_core::{autop, AutopOptions};
///
/// let out = autop("line one.\nline two.", &AutopOptions::default());
/// assert_eq!(out, "<p>line one.<br />\nline two.</p>");
/// ```
pub fn autop(input: &str, options: &AutopOptions) -> String {
    if input.trim().is_empty() {
        return String::new();
    }

    let (text, pre_blocks) = PreBlocks::extract(&format!("{input}\n"));

    let text = replace_all(text, &DOUBLE_BR, "\n\n");
    let text = replace_all(text, &BLOCK_OPEN, "\n$1");
    let text = replace_all(text, &BLOCK_CLOSE, "$1\n\n");
    let text = replace_in_tags(&text, &NEWLINES_IN_TAGS).into_owned();
    let text = collapse_embedded_whitespace(text);
    let text = replace_all(text, &EXTRA_NEWLINES, "\n\n");

    let text = wrap_paragraphs(&text);
    let text = replace_all(text, &EMPTY_PARAGRAPH, "");
    let text = replace_all(text, &OPEN_IN_CONTAINER, "<p>$1</p></$2>");
    let text = replace_all(text, &WRAPPED_BLOCK, "$1");
    let text = replace_all(text, &WRAPPED_LIST_ITEM, "$1");
    let text = replace_all(text, &BLOCKQUOTE_OPEN, "<blockquote$1><p>");
    let text = text.replace("</blockquote></p>", "</p></blockquote>");
    let text = replace_all(text, &P_BEFORE_BLOCK, "$1");
    let mut text = replace_all(text, &P_AFTER_BLOCK, "$1");

    if options.convert_breaks {
        text = SCRIPT_OR_STYLE
            .replace_all(&text, |caps: &Captures<'_>| {
                caps[0].replace('\n', PRESERVED_NEWLINE)
            })
            .into_owned();
        text = text.replace("<br>", "<br />").replace("<br/>", "<br />");
        text = convert_line_breaks(&text).replace(PRESERVED_NEWLINE, "\n");
    }

    let text = replace_all(text, &BR_AFTER_BLOCK, "$1");
    let text = replace_all(text, &BR_BEFORE_TAG, "$1");
    let text = replace_all(text, &TRAILING_PARAGRAPH, "</p>$1");

    let text = pre_blocks.restore(text);
    text.replace(NEWLINE_FLAG, "\n").trim().to_string()
}

/// Keeps `<option>` lists and object/media embeds on one line.
fn collapse_embedded_whitespace(mut text: String) -> String {
    if text.contains("<option") {
        text = replace_all(text, &OPTION_OPEN, "<option");
        text = replace_all(text, &OPTION_CLOSE, "</option>");
    }
    if text.contains("</object>") {
        text = replace_all(text, &OBJECT_OPEN, "$1");
        text = replace_all(text, &OBJECT_CLOSE, "</object>");
        text = replace_all(text, &OBJECT_CHILD, "$1");
    }
    if text.contains("<source") || text.contains("<track") {
        text = replace_all(text, &MEDIA_OPEN, "$1");
        text = replace_all(text, &MEDIA_CLOSE, "$1");
        text = replace_all(text, &MEDIA_CHILD, "$1");
    }
    text
}

/// Splits on blank lines and wraps every non-empty piece in `<p>`.
fn wrap_paragraphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for block in PARAGRAPH_BREAK.split(text).filter(|block| !block.is_empty()) {
        out.push_str("<p>");
        out.push_str(block.trim_matches('\n'));
        out.push_str("</p>\n");
    }
    out
}

fn replace_all(text: String, pattern: &Regex, replacement: &str) -> String {
    if !pattern.is_match(&text) {
        return text;
    }
    pattern.replace_all(&text, replacement).into_owned()
}
