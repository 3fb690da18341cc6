//! Compiled patterns for the paragraph passes.

use once_cell::sync::Lazy;
use regex::Regex;

/// Elements that form their own blocks and are never wrapped in paragraphs.
pub const BLOCK_ELEMENTS: &[&str] = &[
    "table",
    "thead",
    "tfoot",
    "caption",
    "col",
    "colgroup",
    "tbody",
    "tr",
    "td",
    "th",
    "div",
    "dl",
    "dd",
    "dt",
    "ul",
    "ol",
    "li",
    "pre",
    "form",
    "map",
    "area",
    "blockquote",
    "address",
    "math",
    "style",
    "p",
    "h[1-6]",
    "hr",
    "fieldset",
    "legend",
    "section",
    "article",
    "aside",
    "hgroup",
    "header",
    "footer",
    "nav",
    "figure",
    "figcaption",
    "details",
    "menu",
    "summary",
    "iframe",
];

fn blocks() -> String {
    format!("(?:{})", BLOCK_ELEMENTS.join("|"))
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid autop pattern")
}

pub(super) static DOUBLE_BR: Lazy<Regex> = Lazy::new(|| compile(r"<br\s*/?>\s*<br\s*/?>"));
pub(super) static BLOCK_OPEN: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(<{}[\s/>])", blocks())));
pub(super) static BLOCK_CLOSE: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(</{}>)", blocks())));

pub(super) static OPTION_OPEN: Lazy<Regex> = Lazy::new(|| compile(r"\s*<option"));
pub(super) static OPTION_CLOSE: Lazy<Regex> = Lazy::new(|| compile(r"</option>\s*"));
pub(super) static OBJECT_OPEN: Lazy<Regex> = Lazy::new(|| compile(r"(<object[^>]*>)\s*"));
pub(super) static OBJECT_CLOSE: Lazy<Regex> = Lazy::new(|| compile(r"\s*</object>"));
pub(super) static OBJECT_CHILD: Lazy<Regex> =
    Lazy::new(|| compile(r"\s*(</?(?:param|embed)[^>]*>)\s*"));
pub(super) static MEDIA_OPEN: Lazy<Regex> =
    Lazy::new(|| compile(r"([<\[](?:audio|video)[^>\]]*[>\]])\s*"));
pub(super) static MEDIA_CLOSE: Lazy<Regex> =
    Lazy::new(|| compile(r"\s*([<\[]/(?:audio|video)[>\]])"));
pub(super) static MEDIA_CHILD: Lazy<Regex> =
    Lazy::new(|| compile(r"\s*(<(?:source|track)[^>]*>)\s*"));

pub(super) static EXTRA_NEWLINES: Lazy<Regex> = Lazy::new(|| compile(r"\n\n+"));
pub(super) static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| compile(r"\n\s*\n"));

pub(super) static EMPTY_PARAGRAPH: Lazy<Regex> = Lazy::new(|| compile(r"<p>\s*</p>"));
pub(super) static OPEN_IN_CONTAINER: Lazy<Regex> =
    Lazy::new(|| compile(r"<p>([^<]+)</(div|address|form)>"));
pub(super) static WRAPPED_BLOCK: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"<p>\s*(</?{}[^>]*>)\s*</p>", blocks())));
pub(super) static WRAPPED_LIST_ITEM: Lazy<Regex> = Lazy::new(|| compile(r"<p>(<li.+?)</p>"));
pub(super) static BLOCKQUOTE_OPEN: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)<p><blockquote([^>]*)>"));
pub(super) static P_BEFORE_BLOCK: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"<p>\s*(</?{}[^>]*>)", blocks())));
pub(super) static P_AFTER_BLOCK: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(</?{}[^>]*>)\s*</p>", blocks())));

pub(super) static SCRIPT_OR_STYLE: Lazy<Regex> =
    Lazy::new(|| compile(r"(?s)<script.*?</script>|<style.*?</style>"));
pub(super) static BR_AFTER_BLOCK: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(</?{}[^>]*>)\s*<br />", blocks())));
pub(super) static BR_BEFORE_TAG: Lazy<Regex> = Lazy::new(|| {
    compile(r"<br />(\s*</?(?:p|li|div|dl|dd|dt|th|pre|td|ul|ol)[^>]*>)")
});
pub(super) static TRAILING_PARAGRAPH: Lazy<Regex> = Lazy::new(|| compile(r"\n</p>(\n?)\z"));
