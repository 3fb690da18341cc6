//! Contextual substitution rules.
//!
//! Each rule is a consuming pattern plus zero-width conditions on the text
//! before and after the match. Conditions always look at the subject of the
//! current pass, not at output already produced, and a rejected candidate
//! resumes the search one character later.

use super::options::{DashChars, QuoteChars};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::borrow::Cow;

/// Replacement for `×` between two numbers.
pub(crate) const MULTIPLICATION_SIGN: &str = "&#215;";

const NBSP_ENTITY: &str = "&nbsp;";

static SINGLE_TWO_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'([0-9]{2})'").expect("valid single two-digit pattern"));
static SINGLE_TWO_DIGITS_DOUBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'([0-9]{2})""#).expect("valid mixed two-digit pattern"));
static SINGLE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"'([0-9][.,0-9]*)'").expect("valid single number pattern"));
static DOUBLE_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([0-9][.,0-9]*)""#).expect("valid double number pattern"));
static SINGLE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new("'").expect("valid quote pattern"));
static DOUBLE_QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new("\"").expect("valid quote pattern"));
static TRIPLE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new("---").expect("valid dash pattern"));
static DOUBLE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new("--").expect("valid dash pattern"));
static SINGLE_DASH: Lazy<Regex> = Lazy::new(|| Regex::new("-").expect("valid dash pattern"));
static DIGIT_X_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new("[0-9]x[0-9]").expect("valid dimension probe"));
static DIMENSIONS: Lazy<Regex> = Lazy::new(|| {
    Regex::new("([0-9][0-9.,]*)x([0-9][0-9.,]*)").expect("valid dimension pattern")
});

/// Zero-width condition on the text before (or after) a match.
pub(crate) type Condition = fn(&str) -> bool;

/// What a matched rule writes in place of the match.
#[derive(Debug, Clone)]
pub(crate) enum Replacement {
    /// Replace the whole match.
    Literal(String),
    /// Keep capture group 1, surrounded by `open` and `close`.
    Wrap { open: String, close: String },
}

impl Replacement {
    fn write(&self, caps: &Captures<'_>, out: &mut String) {
        match self {
            Replacement::Literal(text) => out.push_str(text),
            Replacement::Wrap { open, close } => {
                out.push_str(open);
                if let Some(inner) = caps.get(1) {
                    out.push_str(inner.as_str());
                }
                out.push_str(close);
            }
        }
    }
}

/// A pattern with lookaround-style boundary checks.
#[derive(Debug, Clone)]
pub(crate) struct SubstitutionRule {
    pattern: &'static Regex,
    before: Option<Condition>,
    after: Option<Condition>,
    replacement: Replacement,
}

impl SubstitutionRule {
    fn new(pattern: &'static Regex, replacement: Replacement) -> Self {
        Self {
            pattern,
            before: None,
            after: None,
            replacement,
        }
    }

    fn preceded_by(mut self, condition: Condition) -> Self {
        self.before = Some(condition);
        self
    }

    fn followed_by(mut self, condition: Condition) -> Self {
        self.after = Some(condition);
        self
    }

    fn accepts(&self, text: &str, start: usize, end: usize) -> bool {
        self.before.is_none_or(|check| check(&text[..start]))
            && self.after.is_none_or(|check| check(&text[end..]))
    }

    /// Replaces every accepted, non-overlapping match in `text`.
    pub(crate) fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut out = String::new();
        let mut copied = 0usize;
        let mut search = 0usize;

        while search <= text.len() {
            let Some(caps) = self.pattern.captures_at(text, search) else {
                break;
            };
            let Some(whole) = caps.get(0) else {
                break;
            };
            if self.accepts(text, whole.start(), whole.end()) {
                out.push_str(&text[copied..whole.start()]);
                self.replacement.write(&caps, &mut out);
                copied = whole.end();
                search = whole.end();
            } else {
                search = whole.start() + char_len_at(text, whole.start());
            }
        }

        if copied == 0 {
            return Cow::Borrowed(text);
        }
        out.push_str(&text[copied..]);
        Cow::Owned(out)
    }
}

/// Applies `rules` in order, each over the output of the previous one.
pub(crate) fn apply_group<'a>(rules: &[SubstitutionRule], text: &'a str) -> Cow<'a, str> {
    let mut current = Cow::Borrowed(text);
    for rule in rules {
        if let Some(next) = into_changed(rule.apply(&current)) {
            current = Cow::Owned(next);
        }
    }
    current
}

/// Returns the new text when a transform produced one.
pub(crate) fn into_changed(result: Cow<'_, str>) -> Option<String> {
    match result {
        Cow::Owned(changed) => Some(changed),
        Cow::Borrowed(_) => None,
    }
}

/// Rules for `'`, in application order.
pub(crate) fn single_quote_rules(quotes: &QuoteChars) -> Vec<SubstitutionRule> {
    let left = quotes.left_single.as_str();
    let right = quotes.right_single.as_str();
    let mut rules = Vec::new();

    // '99' and '99" at the end of a quotation.
    if left != "'" || right != "'" {
        rules.push(
            SubstitutionRule::new(&SINGLE_TWO_DIGITS, wrap(left, right)).followed_by(is_closer),
        );
    }
    if left != "'" || quotes.right_double != "\"" {
        rules.push(
            SubstitutionRule::new(&SINGLE_TWO_DIGITS_DOUBLE, wrap(left, &quotes.right_double))
                .followed_by(is_closer),
        );
    }
    // '99, '99s, '99's but not '9, '99%, '999 or '99.0.
    if left != "'" {
        rules.push(
            SubstitutionRule::new(&SINGLE_QUOTE, literal(left)).followed_by(abbreviated_year),
        );
    }
    // '0.42'
    if left != "'" && right != "'" {
        rules.push(
            SubstitutionRule::new(&SINGLE_NUMBER, wrap(left, right))
                .preceded_by(at_start_or_space),
        );
    }
    if left != "'" {
        rules.push(
            SubstitutionRule::new(&SINGLE_QUOTE, literal(left)).preceded_by(opens_single_quote),
        );
    }
    // Apostrophe inside a word.
    if right != "'" {
        rules.push(
            SubstitutionRule::new(&SINGLE_QUOTE, literal(right))
                .preceded_by(not_after_space)
                .followed_by(inside_word),
        );
    }

    rules
}

/// Rules for `"`, in application order.
pub(crate) fn double_quote_rules(quotes: &QuoteChars) -> Vec<SubstitutionRule> {
    let left = quotes.left_double.as_str();
    let right = quotes.right_double.as_str();
    let mut rules = Vec::new();

    // "42"
    if left != "\"" && right != "\"" {
        rules.push(
            SubstitutionRule::new(&DOUBLE_NUMBER, wrap(left, right))
                .preceded_by(at_start_or_space),
        );
    }
    if left != "\"" {
        rules.push(
            SubstitutionRule::new(&DOUBLE_QUOTE, literal(left))
                .preceded_by(opens_double_quote)
                .followed_by(not_space),
        );
    }

    rules
}

/// Rules for `-`, in application order.
pub(crate) fn dash_rules(dashes: &DashChars) -> Vec<SubstitutionRule> {
    vec![
        SubstitutionRule::new(&TRIPLE_DASH, literal(&dashes.em_dash)),
        SubstitutionRule::new(&DOUBLE_DASH, literal(&dashes.em_dash))
            .preceded_by(at_start_or_space)
            .followed_by(at_end_or_space),
        SubstitutionRule::new(&DOUBLE_DASH, literal(&dashes.en_dash)).preceded_by(not_after_xn),
        SubstitutionRule::new(&SINGLE_DASH, literal(&dashes.en_dash))
            .preceded_by(at_start_or_space)
            .followed_by(at_end_or_space),
    ]
}

/// Turns `NxM` into `N×M` between numbers.
///
/// A number made of a single `0` is left alone so hex literals like `0x1f`
/// survive.
pub(crate) fn texturize_dimensions(text: &str) -> Cow<'_, str> {
    if !DIGIT_X_DIGIT.is_match(text) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut copied = 0usize;
    let mut search = 0usize;

    while let Some(caps) = DIMENSIONS.captures_at(text, search) {
        let (Some(whole), Some(left), Some(right)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };
        let start_ok = !text[..whole.start()].ends_with(is_word_char) && left.as_str() != "0";
        let end = if start_ok {
            word_boundary_end(text, right.start(), right.end())
        } else {
            None
        };

        match end {
            Some(end) => {
                out.push_str(&text[copied..whole.start()]);
                out.push_str(left.as_str());
                out.push_str(MULTIPLICATION_SIGN);
                out.push_str(&text[right.start()..end]);
                copied = end;
                search = end;
            }
            None => search = whole.start() + char_len_at(text, whole.start()),
        }
    }

    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

/// Escapes every `&` that does not start a character reference.
pub(crate) fn escape_ampersands(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len() + 8);
    let mut copied = 0usize;
    for (idx, _) in text.match_indices('&') {
        if starts_character_reference(&text[idx + 1..]) {
            continue;
        }
        out.push_str(&text[copied..idx]);
        out.push_str("&amp;");
        copied = idx + 1;
    }

    if copied == 0 {
        return Cow::Borrowed(text);
    }
    out.push_str(&text[copied..]);
    Cow::Owned(out)
}

/// `#123;`, `#x1F;`, or up to eight of `[a-z1-4]` followed by `;`.
fn starts_character_reference(rest: &str) -> bool {
    if let Some(numeric) = rest.strip_prefix('#') {
        let (digits, hex) = match numeric.strip_prefix(['x', 'X']) {
            Some(hex_digits) => (hex_digits, true),
            None => (numeric, false),
        };
        let len = digits
            .bytes()
            .take_while(|b| {
                if hex {
                    b.is_ascii_hexdigit()
                } else {
                    b.is_ascii_digit()
                }
            })
            .count();
        return len > 0 && digits.as_bytes().get(len) == Some(&b';');
    }

    let bytes = rest.as_bytes();
    let len = bytes
        .iter()
        .take_while(|b| b.is_ascii_alphabetic() || (b'1'..=b'4').contains(*b))
        .count();
    (1..=8).contains(&len) && bytes.get(len) == Some(&b';')
}

fn literal(text: &str) -> Replacement {
    Replacement::Literal(text.to_string())
}

fn wrap(open: &str, close: &str) -> Replacement {
    Replacement::Wrap {
        open: open.to_string(),
        close: close.to_string(),
    }
}

fn is_space_char(c: char) -> bool {
    matches!(c, '\r' | '\n' | '\t' | ' ' | '\u{a0}')
}

pub(crate) fn ends_with_space(text: &str) -> bool {
    text.ends_with(is_space_char) || text.ends_with(NBSP_ENTITY)
}

pub(crate) fn starts_with_space(text: &str) -> bool {
    text.starts_with(is_space_char) || text.starts_with(NBSP_ENTITY)
}

/// End of text, closing punctuation, `&gt;`, or whitespace.
pub(crate) fn is_closer(after: &str) -> bool {
    after.is_empty()
        || after.starts_with(['.', ',', ':', ';', '!', '?', ')', '}', '-', ']'])
        || after.starts_with("&gt;")
        || starts_with_space(after)
}

fn at_start_or_space(before: &str) -> bool {
    before.is_empty() || ends_with_space(before)
}

fn at_end_or_space(after: &str) -> bool {
    after.is_empty() || starts_with_space(after)
}

fn not_after_space(before: &str) -> bool {
    !ends_with_space(before)
}

fn not_space(after: &str) -> bool {
    !starts_with_space(after)
}

fn not_after_xn(before: &str) -> bool {
    !before.ends_with("xn")
}

fn opens_single_quote(before: &str) -> bool {
    before.is_empty()
        || before.ends_with(['(', '[', '{', '"', '-'])
        || before.ends_with("&lt;")
        || ends_with_space(before)
}

fn opens_double_quote(before: &str) -> bool {
    before.is_empty()
        || before.ends_with(['(', '[', '{', '-'])
        || before.ends_with("&lt;")
        || ends_with_space(before)
}

fn abbreviated_year(after: &str) -> bool {
    let bytes = after.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_digit() || !bytes[1].is_ascii_digit() {
        return false;
    }
    let rest = &bytes[2..];
    match rest {
        [] => true,
        [b'%', ..] => false,
        [first, ..] if first.is_ascii_digit() => false,
        [b'.' | b',', next, ..] if next.is_ascii_digit() => false,
        _ => true,
    }
}

fn inside_word(after: &str) -> bool {
    !(after.is_empty()
        || after.starts_with([
            '.', ',', ':', ';', '!', '?', '"', '\'', '(', ')', '{', '}', '[', ']', '-',
        ])
        || after.starts_with("&lt;")
        || after.starts_with("&gt;")
        || starts_with_space(after))
}

fn is_word_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Longest end in `start + 1..=max_end` that sits on an ASCII word boundary.
fn word_boundary_end(text: &str, start: usize, max_end: usize) -> Option<usize> {
    (start + 1..=max_end).rev().find(|&end| {
        let last_is_word = text[..end].ends_with(is_word_char);
        let next_is_word = text[end..].starts_with(is_word_char);
        last_is_word != next_is_word
    })
}

fn char_len_at(text: &str, idx: usize) -> usize {
    text[idx..].chars().next().map_or(1, char::len_utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rules: &[SubstitutionRule], text: &str) -> String {
        apply_group(rules, text).into_owned()
    }

    #[test]
    fn apostrophes_and_opening_quotes() {
        let rules = single_quote_rules(&QuoteChars::default());
        assert_eq!(run(&rules, "don't"), "don&#8217;t");
        assert_eq!(run(&rules, "'tis"), "&#8216;tis");
        assert_eq!(run(&rules, "say 'hi"), "say &#8216;hi");
        assert_eq!(run(&rules, "(\u{a0}'x"), "(\u{a0}&#8216;x");
    }

    #[test]
    fn abbreviated_years() {
        let rules = single_quote_rules(&QuoteChars::default());
        assert_eq!(run(&rules, "in '99 we"), "in &#8216;99 we");
        assert_eq!(run(&rules, "the '90s"), "the &#8216;90s");

        assert!(abbreviated_year("99"));
        assert!(abbreviated_year("99's"));
        assert!(!abbreviated_year("9 "));
        assert!(!abbreviated_year("99%"));
        assert!(!abbreviated_year("999"));
        assert!(!abbreviated_year("99.5"));
        assert!(abbreviated_year("99."));
    }

    #[test]
    fn quoted_numbers() {
        let rules = single_quote_rules(&QuoteChars::default());
        assert_eq!(run(&rules, "'0.42'"), "&#8216;0.42&#8217;");
        assert_eq!(run(&rules, "it was '99'."), "it was &#8216;99&#8217;.");

        let rules = double_quote_rules(&QuoteChars::default());
        assert_eq!(run(&rules, "a \"42\" b"), "a &#8220;42&#8221; b");
    }

    #[test]
    fn opening_double_quote_needs_following_text() {
        let rules = double_quote_rules(&QuoteChars::default());
        assert_eq!(run(&rules, "\"Hi"), "&#8220;Hi");
        assert_eq!(run(&rules, "a \" b"), "a \" b");
        assert_eq!(run(&rules, "x\"y"), "x\"y");
    }

    #[test]
    fn ascii_quotes_disable_their_rules() {
        let quotes = QuoteChars {
            left_single: "'".to_string(),
            right_single: "'".to_string(),
            ..QuoteChars::default()
        };
        let rules = single_quote_rules(&quotes);
        assert_eq!(rules.len(), 1);
        assert_eq!(run(&rules, "don't"), "don't");
    }

    #[test]
    fn dashes() {
        let rules = dash_rules(&DashChars::default());
        assert_eq!(run(&rules, "a---b"), "a&#8211;b");
        assert_eq!(run(&rules, "a -- b"), "a &#8211; b");
        assert_eq!(run(&rules, "1--2"), "1&#8212;2");
        assert_eq!(run(&rules, "a - b"), "a &#8212; b");
        assert_eq!(run(&rules, "xn--bcher"), "xn--bcher");
        assert_eq!(run(&rules, "well-known"), "well-known");
    }

    #[test]
    fn dimensions() {
        assert_eq!(texturize_dimensions("2x2"), "2&#215;2");
        assert_eq!(texturize_dimensions("a 1.5x3, b"), "a 1.5&#215;3, b");
        assert_eq!(texturize_dimensions("0x1f"), "0x1f");
        assert_eq!(texturize_dimensions("0.5x2"), "0.5&#215;2");
        assert_eq!(texturize_dimensions("a2x3"), "a2x3");
        assert_eq!(texturize_dimensions("3x4."), "3&#215;4.");
        assert_eq!(texturize_dimensions("x2"), "x2");
    }

    #[test]
    fn ampersands() {
        assert_eq!(escape_ampersands("a & b"), "a &amp; b");
        assert_eq!(escape_ampersands("&amp; &#169; &#xA9; &nbsp;"), "&amp; &#169; &#xA9; &nbsp;");
        assert_eq!(escape_ampersands("&abcdefghi; &#; &x"), "&amp;abcdefghi; &amp;#; &amp;x");
        assert!(matches!(escape_ampersands("no refs"), Cow::Borrowed(_)));
    }
}
