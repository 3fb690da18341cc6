//! Splits HTML into tag and text tokens without building a tree.
//!
//! The scan is byte-oriented: every delimiter it looks for (`<`, `>`, `-`, `]`)
//! is ASCII, so token boundaries always fall on UTF-8 character boundaries.

use crate::translate::TranslationTable;
use std::borrow::Cow;

/// Kind of a token produced by [`split_html`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// A start tag, end tag, comment, or CDATA section, delimiters included.
    Tag,
    /// Everything between tags, whitespace included.
    Text,
}

/// A contiguous slice of the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// Whether this slice is markup or text.
    pub kind: TokenKind,
    /// The literal source text.
    pub text: &'a str,
}

impl<'a> Token<'a> {
    /// Creates a tag token.
    pub fn tag(text: &'a str) -> Self {
        Self {
            kind: TokenKind::Tag,
            text,
        }
    }

    /// Creates a text token.
    pub fn text(text: &'a str) -> Self {
        Self {
            kind: TokenKind::Text,
            text,
        }
    }

    /// Returns true for tag tokens.
    pub fn is_tag(&self) -> bool {
        self.kind == TokenKind::Tag
    }

    /// Returns true for an HTML comment (`<!-- ... -->`).
    pub fn is_comment(&self) -> bool {
        self.is_tag() && self.text.starts_with("<!--")
    }

    /// Returns true for a CDATA section (`<![CDATA[ ... ]]>`).
    pub fn is_cdata(&self) -> bool {
        self.is_tag() && self.text.starts_with("<![CDATA[")
    }

    /// Comments and CDATA sections carry no element semantics.
    pub fn is_inert(&self) -> bool {
        self.is_comment() || self.is_cdata()
    }
}

/// Splits `input` into an ordered sequence of tag and text tokens.
///
/// Concatenating the token texts yields `input` exactly, and no token is empty.
///
/// # Examples
///
/// ```
/// use prosefmt_core::split::{split_html, TokenKind};
///
/// let tokens = split_html("a <b>c</b><!-- x > y -->");
/// let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
/// assert_eq!(
///     kinds,
///     [TokenKind::Text, TokenKind::Tag, TokenKind::Text, TokenKind::Tag, TokenKind::Tag]
/// );
/// assert_eq!(tokens[4].text, "<!-- x > y -->");
/// ```
pub fn split_html(input: &str) -> Vec<Token<'_>> {
    let bytes = input.as_bytes();
    let mut tokens = Vec::new();
    let mut text_start = 0usize;
    let mut cursor = 0usize;

    while let Some(offset) = input[cursor..].find('<') {
        let tag_start = cursor + offset;
        if tag_start > text_start {
            tokens.push(Token::text(&input[text_start..tag_start]));
        }
        let tag_end = scan_tag_end(bytes, tag_start);
        tokens.push(Token::tag(&input[tag_start..tag_end]));
        cursor = tag_end;
        text_start = tag_end;
    }

    if text_start < input.len() {
        tokens.push(Token::text(&input[text_start..]));
    }

    tokens
}

/// Joins tokens back into a string.
pub fn join_tokens<'a, I>(tokens: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    tokens.into_iter().collect()
}

/// Applies `replacements` inside tag tokens only, leaving text untouched.
pub fn replace_in_tags<'a>(haystack: &'a str, replacements: &TranslationTable) -> Cow<'a, str> {
    let tokens = split_html(haystack);
    if !tokens
        .iter()
        .any(|token| token.is_tag() && replacements.matches_any(token.text))
    {
        return Cow::Borrowed(haystack);
    }

    let mut out = String::with_capacity(haystack.len());
    for token in tokens {
        if token.is_tag() {
            out.push_str(&replacements.apply(token.text));
        } else {
            out.push_str(token.text);
        }
    }
    Cow::Owned(out)
}

/// Returns the exclusive end offset of the tag starting at `start` (which holds `<`).
fn scan_tag_end(bytes: &[u8], start: usize) -> usize {
    let after = &bytes[start + 1..];
    if after.starts_with(b"!--") {
        scan_escaped(bytes, start + 2, b'-', b"->")
    } else if after.starts_with(b"![CDATA[") {
        scan_escaped(bytes, start + 9, b']', b"]>")
    } else {
        match bytes[start + 1..].iter().position(|b| *b == b'>') {
            Some(pos) => start + 1 + pos + 1,
            None => bytes.len(),
        }
    }
}

/// Scans an escaped section (comment or CDATA) from `pos`.
///
/// Runs of non-`marker` bytes are consumed, and each `marker` byte is consumed
/// unless it begins the terminator (`marker` followed by `rest`). The
/// terminator itself is consumed when present; otherwise the section runs to
/// the end of input.
fn scan_escaped(bytes: &[u8], mut pos: usize, marker: u8, rest: &[u8]) -> usize {
    while pos < bytes.len() {
        if bytes[pos] == marker {
            if bytes[pos + 1..].starts_with(rest) {
                return pos + 1 + rest.len();
            }
            pos += 1;
        } else {
            pos += bytes[pos..]
                .iter()
                .position(|b| *b == marker)
                .unwrap_or(bytes.len() - pos);
        }
    }
    bytes.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.text).collect()
    }

    fn assert_lossless(input: &str) {
        let tokens = split_html(input);
        assert_eq!(join_tokens(tokens.iter().map(|t| t.text)), input);
        assert!(tokens.iter().all(|t| !t.text.is_empty()));
    }

    #[test]
    fn splits_tags_and_text() {
        let tokens = split_html("Hello <em class=\"x\">world</em>!");
        assert_eq!(
            texts(&tokens),
            ["Hello ", "<em class=\"x\">", "world", "</em>", "!"]
        );
        assert!(tokens[1].is_tag());
        assert!(!tokens[0].is_tag());
    }

    #[test]
    fn comment_is_atomic_even_with_angle_brackets() {
        let tokens = split_html("a<!-- <b> -> - -- x -->b");
        assert_eq!(texts(&tokens), ["a", "<!-- <b> -> - -- x -->", "b"]);
        assert!(tokens[1].is_comment());
    }

    #[test]
    fn empty_comment_closes_immediately() {
        let tokens = split_html("<!---->x<!-->y");
        assert_eq!(texts(&tokens), ["<!---->", "x", "<!-->", "y"]);
    }

    #[test]
    fn unterminated_comment_runs_to_end() {
        let tokens = split_html("a<!-- open <p> -- ");
        assert_eq!(texts(&tokens), ["a", "<!-- open <p> -- "]);
    }

    #[test]
    fn cdata_is_atomic() {
        let tokens = split_html("x<![CDATA[ a ] ]] <y> ]]>z");
        assert_eq!(texts(&tokens), ["x", "<![CDATA[ a ] ]] <y> ]]>", "z"]);
        assert!(tokens[1].is_cdata());
        assert!(tokens[1].is_inert());
    }

    #[test]
    fn unterminated_tag_runs_to_end() {
        let tokens = split_html("text <a href=\"x");
        assert_eq!(texts(&tokens), ["text ", "<a href=\"x"]);
    }

    #[test]
    fn lone_angle_bracket_at_end() {
        let tokens = split_html("1 <");
        assert_eq!(texts(&tokens), ["1 ", "<"]);
    }

    #[test]
    fn adjacent_tags_emit_no_empty_text() {
        let tokens = split_html("<p></p>");
        assert_eq!(texts(&tokens), ["<p>", "</p>"]);
    }

    #[test]
    fn empty_input_has_no_tokens() {
        assert!(split_html("").is_empty());
    }

    #[test]
    fn lossless_on_varied_input() {
        for input in [
            "",
            "plain",
            "<",
            ">",
            "a > b < c",
            "<!--",
            "<![CDATA[",
            "<p>héllo — wörld</p>\n\n<pre>x</pre>",
            "<!-- a --><![CDATA[b]]><c d='e'>f</c>",
            "<<<>>>",
        ] {
            assert_lossless(input);
        }
    }

    #[test]
    fn replace_in_tags_leaves_text_alone() {
        let table = TranslationTable::new([("\n", " NL ")]);
        let out = replace_in_tags("a\n<div\nid=\"x\">b\n</div>", &table);
        assert_eq!(out, "a\n<div NL id=\"x\">b\n</div>");
    }

    #[test]
    fn replace_in_tags_borrows_without_matches() {
        let table = TranslationTable::new([("\n", " NL ")]);
        let out = replace_in_tags("a\n<b>c</b>", &table);
        assert!(matches!(out, Cow::Borrowed(_)));
    }
}
