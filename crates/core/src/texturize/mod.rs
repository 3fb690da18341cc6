//! Typographic substitutions on the text portions of an HTML fragment.
//!
//! - `options`: quote, dash, exclusion, and literal replacement settings.
//! - `rules`: contextual quote and dash rules, dimensions, ampersand escaping.
//! - `primes`: quote-versus-prime disambiguation.

/// Texturizer configuration.
pub mod options;
mod primes;
mod rules;

pub use options::{DEFAULT_EXCLUDED_TAGS, DashChars, QuoteChars, TexturizeOptions};

use crate::scope::ExclusionStack;
use crate::split::split_html;
use crate::translate::TranslationTable;
use primes::{PrimeMarks, texturize_primes};
use rules::{
    SubstitutionRule, apply_group, dash_rules, double_quote_rules, escape_ampersands,
    into_changed, single_quote_rules, texturize_dimensions,
};
use std::borrow::Cow;

/// Formats text for presentation by replacing ASCII punctuation with
/// typographic entities.
///
/// Building a `Texturizer` compiles the rule groups for one set of options; the
/// value is immutable afterwards and can be shared across threads.
#[derive(Debug, Clone)]
pub struct Texturizer {
    quotes: QuoteChars,
    excluded_tags: Vec<String>,
    static_translations: TranslationTable,
    single_quotes: Vec<SubstitutionRule>,
    double_quotes: Vec<SubstitutionRule>,
    dashes: Vec<SubstitutionRule>,
}

impl Texturizer {
    /// Compiles `options` into a reusable texturizer.
    pub fn new(options: &TexturizeOptions) -> Self {
        let mut static_translations = TranslationTable::new(
            options
                .static_translations
                .iter()
                .map(|(from, to)| (from.as_str(), to.as_str())),
        );
        static_translations.insert("``", options.quotes.left_double.as_str());
        static_translations.insert("''", options.quotes.right_double.as_str());

        Self {
            quotes: options.quotes.clone(),
            excluded_tags: options
                .excluded_tags
                .iter()
                .map(|tag| tag.to_ascii_lowercase())
                .collect(),
            static_translations,
            single_quotes: single_quote_rules(&options.quotes),
            double_quotes: double_quote_rules(&options.quotes),
            dashes: dash_rules(&options.dashes),
        }
    }

    /// Texturizes `input`, leaving markup, comments, and excluded elements untouched.
    pub fn texturize(&self, input: &str) -> String {
        let mut stack = ExclusionStack::new();
        let mut out = String::with_capacity(input.len() + input.len() / 8);

        for token in split_html(input) {
            if token.is_tag() {
                if token.is_inert() {
                    out.push_str(token.text);
                    continue;
                }
                out.push_str(&escape_ampersands(token.text));
                stack.push_or_pop(token.text, self.excluded_tags.as_slice());
            } else if token.text.trim().is_empty() || !stack.is_empty() {
                out.push_str(token.text);
            } else {
                out.push_str(&self.texturize_text(token.text));
            }
        }

        if !stack.is_empty() {
            log::debug!(
                "texturize reached end of input inside <{}>; trailing text left as-is",
                stack.top().unwrap_or_default()
            );
        }

        out
    }

    /// Applies every substitution group to one text run.
    fn texturize_text<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let mut text = self.static_translations.apply(text);

        if text.contains('\'') {
            let replaced = apply_group(&self.single_quotes, &text).into_owned();
            text = Cow::Owned(texturize_primes(
                &replaced,
                &PrimeMarks {
                    needle: "'",
                    prime: &self.quotes.prime,
                    open: &self.quotes.left_single,
                    close: &self.quotes.right_single,
                },
            ));
        }

        if text.contains('"') {
            let replaced = apply_group(&self.double_quotes, &text).into_owned();
            text = Cow::Owned(texturize_primes(
                &replaced,
                &PrimeMarks {
                    needle: "\"",
                    prime: &self.quotes.double_prime,
                    open: &self.quotes.left_double,
                    close: &self.quotes.right_double,
                },
            ));
        }

        if text.contains('-') {
            text = Cow::Owned(apply_group(&self.dashes, &text).into_owned());
        }

        if let Some(dimensions) = into_changed(texturize_dimensions(&text)) {
            text = Cow::Owned(dimensions);
        }

        if let Some(escaped) = into_changed(escape_ampersands(&text)) {
            text = Cow::Owned(escaped);
        }
        text
    }
}

impl Default for Texturizer {
    fn default() -> Self {
        Self::new(&TexturizeOptions::default())
    }
}

/// Texturizes `input` with `options`.
///
/// Builds a [`Texturizer`] per call; reuse one directly when formatting many
/// strings with the same options.
///
/// # Examples
///
/// ```
/// use prosefmt_core::{texturize, TexturizeOptions};
///
/// let out = texturize("This is \"some text...\" (c)", &TexturizeOptions::default());
/// assert_eq!(out, "This is &#8220;some text&#8230;&#8221; &#169;");
/// ```
pub fn texturize(input: &str, options: &TexturizeOptions) -> String {
    Texturizer::new(options).texturize(input)
}
