//! Tracks whether the current position sits inside an excluded element.

/// Stack of currently open elements whose contents must be left alone.
///
/// Only names from the caller's exclusion list are ever pushed. An end tag pops
/// only when it matches the top of the stack; stray or mismatched end tags are
/// ignored. Unbalanced input can leave the stack non-empty, in which case the
/// rest of the document counts as excluded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionStack {
    open: Vec<String>,
}

/// Whether a tag token opens or closes an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagEdge {
    /// `<name ...>`
    Open,
    /// `</name>`
    Close,
}

impl ExclusionStack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true when no excluded element is open.
    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    /// Number of excluded elements currently open.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Innermost open excluded element, lowercased.
    pub fn top(&self) -> Option<&str> {
        self.open.last().map(String::as_str)
    }

    /// Updates the stack for one tag token.
    ///
    /// `excluded` holds lowercase element names. Comment and CDATA tokens must
    /// not be passed here.
    pub fn push_or_pop<S: AsRef<str>>(&mut self, tag: &str, excluded: &[S]) {
        let Some((edge, name)) = parse_tag(tag) else {
            return;
        };
        if edge == TagEdge::Close && self.open.is_empty() {
            return;
        }

        let name = name.to_ascii_lowercase();
        if !excluded.iter().any(|candidate| candidate.as_ref() == name) {
            return;
        }

        match edge {
            TagEdge::Open => self.open.push(name),
            TagEdge::Close => {
                if self.top() == Some(name.as_str()) {
                    self.open.pop();
                }
            }
        }
    }
}

/// Reads the edge and element name from a tag token.
///
/// The name is the run after `<` or `</`, ending at whitespace, `>`, `/`, or
/// the end of the token. Returns `None` when the token is not a tag or has no
/// name.
pub fn parse_tag(tag: &str) -> Option<(TagEdge, &str)> {
    let body = tag.strip_prefix('<')?;
    let (edge, body) = match body.strip_prefix('/') {
        Some(rest) => (TagEdge::Close, rest),
        None => (TagEdge::Open, body),
    };
    let end = body
        .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
        .unwrap_or(body.len());
    let name = &body[..end];
    if name.is_empty() {
        None
    } else {
        Some((edge, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXCLUDED: &[&str] = &["pre", "code"];

    #[test]
    fn parses_open_and_close_tags() {
        assert_eq!(parse_tag("<pre>"), Some((TagEdge::Open, "pre")));
        assert_eq!(
            parse_tag("<code class=\"x\">"),
            Some((TagEdge::Open, "code"))
        );
        assert_eq!(parse_tag("</pre>"), Some((TagEdge::Close, "pre")));
        assert_eq!(parse_tag("<br/>"), Some((TagEdge::Open, "br")));
        assert_eq!(parse_tag("<pre\n>"), Some((TagEdge::Open, "pre")));
        assert_eq!(parse_tag("<pre"), Some((TagEdge::Open, "pre")));
        assert_eq!(parse_tag("<>"), None);
        assert_eq!(parse_tag("</ >"), None);
        assert_eq!(parse_tag("text"), None);
    }

    #[test]
    fn pushes_and_pops_excluded_elements() {
        let mut stack = ExclusionStack::new();
        stack.push_or_pop("<pre>", EXCLUDED);
        stack.push_or_pop("<code>", EXCLUDED);
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top(), Some("code"));

        stack.push_or_pop("</code>", EXCLUDED);
        stack.push_or_pop("</pre>", EXCLUDED);
        assert!(stack.is_empty());
    }

    #[test]
    fn ignores_other_elements() {
        let mut stack = ExclusionStack::new();
        stack.push_or_pop("<strong>", EXCLUDED);
        stack.push_or_pop("<prefix>", EXCLUDED);
        assert!(stack.is_empty());
    }

    #[test]
    fn mismatched_close_is_ignored() {
        let mut stack = ExclusionStack::new();
        stack.push_or_pop("<pre>", EXCLUDED);
        stack.push_or_pop("<code>", EXCLUDED);
        stack.push_or_pop("</pre>", EXCLUDED);
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.top(), Some("code"));
    }

    #[test]
    fn stray_close_on_empty_stack() {
        let mut stack = ExclusionStack::new();
        stack.push_or_pop("</pre>", EXCLUDED);
        assert!(stack.is_empty());
    }

    #[test]
    fn names_compare_case_insensitively() {
        let mut stack = ExclusionStack::new();
        stack.push_or_pop("<PRE>", EXCLUDED);
        assert_eq!(stack.top(), Some("pre"));
        stack.push_or_pop("</Pre>", EXCLUDED);
        assert!(stack.is_empty());
    }
}
