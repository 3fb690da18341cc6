//! Literal translation tables applied longest-key-first.

use std::borrow::Cow;

/// A set of literal `from -> to` replacements.
///
/// At every position the longest matching key wins and the scan resumes after
/// it, so replacements are never re-examined. Empty keys are ignored.
#[derive(Debug, Clone, Default)]
pub struct TranslationTable {
    // Sorted by key length, longest first.
    pairs: Vec<(String, String)>,
}

impl TranslationTable {
    /// Builds a table from `(from, to)` pairs. A later duplicate key replaces an earlier one.
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut table = Self::default();
        for (from, to) in pairs {
            table.insert(from, to);
        }
        table
    }

    /// Adds or replaces a single entry.
    pub fn insert(&mut self, from: impl Into<String>, to: impl Into<String>) {
        let from = from.into();
        if from.is_empty() {
            return;
        }
        let to = to.into();
        if let Some(existing) = self.pairs.iter_mut().find(|(key, _)| *key == from) {
            existing.1 = to;
            return;
        }
        self.pairs.push((from, to));
        self.pairs.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    }

    /// Returns true when the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Returns true if any key occurs in `haystack`.
    pub fn matches_any(&self, haystack: &str) -> bool {
        self.pairs.iter().any(|(from, _)| haystack.contains(from.as_str()))
    }

    /// Applies the table to `haystack`.
    pub fn apply<'a>(&self, haystack: &'a str) -> Cow<'a, str> {
        if !self.matches_any(haystack) {
            return Cow::Borrowed(haystack);
        }

        let mut out = String::with_capacity(haystack.len());
        let mut rest = haystack;
        'scan: while let Some(ch) = rest.chars().next() {
            for (from, to) in &self.pairs {
                if let Some(after) = rest.strip_prefix(from.as_str()) {
                    out.push_str(to);
                    rest = after;
                    continue 'scan;
                }
            }
            out.push(ch);
            rest = &rest[ch.len_utf8()..];
        }
        Cow::Owned(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_key_wins() {
        let table = TranslationTable::new([("-", "a"), ("--", "b"), ("---", "c")]);
        assert_eq!(table.apply("- -- --- ----"), "a b c ca");
    }

    #[test]
    fn replacements_are_not_rescanned() {
        let table = TranslationTable::new([("a", "b"), ("b", "c")]);
        assert_eq!(table.apply("ab"), "bc");
    }

    #[test]
    fn borrows_when_nothing_matches() {
        let table = TranslationTable::new([("(c)", "&#169;")]);
        assert!(matches!(table.apply("plain"), Cow::Borrowed("plain")));
    }

    #[test]
    fn later_duplicate_replaces_earlier() {
        let mut table = TranslationTable::new([("''", "x")]);
        table.insert("''", "y");
        assert_eq!(table.apply("a''b"), "ayb");
    }

    #[test]
    fn handles_multibyte_text() {
        let table = TranslationTable::new([("...", "\u{2026}")]);
        assert_eq!(table.apply("héllo... ✓"), "héllo\u{2026} ✓");
    }
}
