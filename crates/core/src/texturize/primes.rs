//! Decides whether a leftover `'` or `"` closes a quotation or marks a prime.
//!
//! A raw quote after a digit is ambiguous (`5'` can end a quote or mean five
//! feet). The heuristic works per quotation: the text is split on the opening
//! quote already substituted earlier in the pass, and within each piece the
//! candidates are ranked by digit adjacency and position.

use super::rules::is_closer;

/// Temporary marker for a quote that may turn out to be a prime.
///
/// Text tokens never contain `<`, so the marker cannot collide with input.
const PRIME_OR_QUOTE_FLAG: &str = "<!--prime-or-quote-->";

/// The characters involved in disambiguating one kind of quote.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PrimeMarks<'a> {
    /// Raw ASCII quote, `'` or `"`.
    pub needle: &'static str,
    /// Replacement when the quote is a prime.
    pub prime: &'a str,
    /// Opening quote already put in place by the quote rules.
    pub open: &'a str,
    /// Closing quote replacement.
    pub close: &'a str,
}

/// Replaces the remaining raw `marks.needle` characters in `haystack`.
pub(crate) fn texturize_primes(haystack: &str, marks: &PrimeMarks<'_>) -> String {
    if marks.open.is_empty() {
        return disambiguate(haystack, 0, marks);
    }

    haystack
        .split(marks.open)
        .enumerate()
        .map(|(index, sentence)| disambiguate(sentence, index, marks))
        .collect::<Vec<_>>()
        .join(marks.open)
}

fn disambiguate(sentence: &str, index: usize, marks: &PrimeMarks<'_>) -> String {
    if !sentence.contains(marks.needle) {
        return sentence.to_string();
    }

    let mut sentence = if index != 0 && !sentence.contains(marks.close) {
        let (flagged, candidates) = replace_where(
            sentence,
            marks.needle,
            PRIME_OR_QUOTE_FLAG,
            |_, after| closes_quotation(after, marks),
        );
        match candidates {
            0 => replace_primes(&flagged, marks),
            1 => replace_primes(&flagged.replace(PRIME_OR_QUOTE_FLAG, marks.close), marks),
            _ => resolve_candidates(&flagged, marks),
        }
    } else {
        let primed = replace_primes(sentence, marks);
        replace_where(&primed, marks.needle, marks.close, |_, after| {
            closes_quotation(after, marks)
        })
        .0
    };

    if marks.needle == "\"" && sentence.contains('"') {
        sentence = sentence.replace('"', marks.close);
    }
    sentence
}

/// Several candidates in one quotation: pick the closing quote among them.
fn resolve_candidates(flagged: &str, marks: &PrimeMarks<'_>) -> String {
    let (mut sentence, closed) = replace_where(
        flagged,
        PRIME_OR_QUOTE_FLAG,
        marks.close,
        |before, _| !ends_with_digit(before),
    );

    if closed == 0 {
        // Every candidate follows a digit. Prefer the rightmost one ending a
        // sentence, else the rightmost one.
        let before_period = format!("{PRIME_OR_QUOTE_FLAG}.");
        let pos = sentence
            .rfind(&before_period)
            .or_else(|| sentence.rfind(PRIME_OR_QUOTE_FLAG));
        if let Some(pos) = pos {
            sentence.replace_range(pos..pos + PRIME_OR_QUOTE_FLAG.len(), marks.close);
        }
    }

    let sentence = replace_primes(&sentence, marks);
    let (sentence, _) = replace_where(
        &sentence,
        PRIME_OR_QUOTE_FLAG,
        marks.prime,
        |before, _| ends_with_digit(before),
    );
    sentence.replace(PRIME_OR_QUOTE_FLAG, marks.close)
}

/// A single quote directly inside a closing double quote also ends its
/// quotation; the double quote group has not run yet, so it is still raw.
fn closes_quotation(after: &str, marks: &PrimeMarks<'_>) -> bool {
    is_closer(after) || (marks.needle == "'" && after.starts_with('"'))
}

fn replace_primes(sentence: &str, marks: &PrimeMarks<'_>) -> String {
    replace_where(sentence, marks.needle, marks.prime, |before, _| {
        ends_with_digit(before)
    })
    .0
}

/// Replaces each occurrence of `needle` for which `keep(before, after)` holds.
///
/// Conditions see the original `text`. Returns the new text and the number of
/// replacements.
fn replace_where(
    text: &str,
    needle: &str,
    replacement: &str,
    keep: impl Fn(&str, &str) -> bool,
) -> (String, usize) {
    let mut out = String::with_capacity(text.len());
    let mut copied = 0usize;
    let mut count = 0usize;

    for (idx, _) in text.match_indices(needle) {
        let end = idx + needle.len();
        if keep(&text[..idx], &text[end..]) {
            out.push_str(&text[copied..idx]);
            out.push_str(replacement);
            copied = end;
            count += 1;
        }
    }

    out.push_str(&text[copied..]);
    (out, count)
}

fn ends_with_digit(text: &str) -> bool {
    text.ends_with(|c: char| c.is_ascii_digit())
}
