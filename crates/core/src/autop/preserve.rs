//! Regions and characters that the paragraph passes must not disturb.

/// Stands in for a newline inside a tag until the final restore.
pub(super) const NEWLINE_FLAG: &str = "<!-- pnl -->";

/// Stands in for a newline inside `<script>` or `<style>` during break conversion.
pub(super) const PRESERVED_NEWLINE: &str = "<!-- preserveNewline -->";

const PRE_CLOSE: &str = "</pre>";

/// `<pre>` regions swapped out for placeholder elements.
#[derive(Debug, Default)]
pub(super) struct PreBlocks {
    entries: Vec<(String, String)>,
}

impl PreBlocks {
    /// Replaces each `<pre>…</pre>` region of `text` with a placeholder.
    ///
    /// An unterminated `<pre` runs to the end of input. A `</pre>` without an
    /// opener is dropped.
    pub(super) fn extract(text: &str) -> (String, Self) {
        let mut blocks = Self::default();
        if !text.contains("<pre") {
            return (text.to_string(), blocks);
        }

        let mut out = String::with_capacity(text.len());
        let mut parts = text.split(PRE_CLOSE).peekable();
        while let Some(part) = parts.next() {
            let closed = parts.peek().is_some();
            let Some(start) = part.find("<pre") else {
                if closed {
                    log::debug!("autop dropped a stray </pre> with no opening tag");
                }
                out.push_str(part);
                continue;
            };

            let mut region = part[start..].to_string();
            if closed {
                region.push_str(PRE_CLOSE);
            } else {
                log::debug!("autop found an unterminated <pre>; preserving it to end of input");
            }

            let name = format!("<pre pre-tag-{}></pre>", blocks.entries.len());
            out.push_str(&part[..start]);
            out.push_str(&name);
            blocks.entries.push((name, region));
        }

        (out, blocks)
    }

    /// Puts the original regions back in place of their placeholders.
    pub(super) fn restore(&self, mut text: String) -> String {
        for (name, region) in &self.entries {
            text = text.replace(name, region);
        }
        text
    }
}

/// Inserts `<br />` before each newline that does not already follow one.
///
/// Whitespace leading up to the converted newline is absorbed into the break,
/// and the check looks only at the text before the whitespace run's start.
pub(super) fn convert_line_breaks(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = String::with_capacity(text.len() + text.len() / 16);
    let mut copied = 0usize;
    let mut pos = 0usize;

    while pos < bytes.len() {
        if !is_space(bytes[pos]) || text[..pos].ends_with("<br />") {
            pos += 1;
            continue;
        }

        let run_end = pos
            + bytes[pos..]
                .iter()
                .take_while(|byte| is_space(**byte))
                .count();
        match bytes[pos..run_end].iter().rposition(|byte| *byte == b'\n') {
            Some(last_newline) => {
                let end = pos + last_newline + 1;
                out.push_str(&text[copied..pos]);
                out.push_str("<br />\n");
                copied = end;
                pos = end;
            }
            None => pos = run_end,
        }
    }

    out.push_str(&text[copied..]);
    out
}

fn is_space(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r' | 0x0b | 0x0c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_and_restores_pre_regions() {
        let input = "a<pre>x\n\ny</pre>b<pre class=\"c\">z</pre>\n";
        let (text, blocks) = PreBlocks::extract(input);
        assert_eq!(
            text,
            "a<pre pre-tag-0></pre>b<pre pre-tag-1></pre>\n"
        );
        assert_eq!(blocks.restore(text), input);
    }

    #[test]
    fn unterminated_pre_runs_to_end() {
        let (text, blocks) = PreBlocks::extract("a<pre>b\n\nc");
        assert_eq!(text, "a<pre pre-tag-0></pre>");
        assert_eq!(blocks.restore(text), "a<pre>b\n\nc");
    }

    #[test]
    fn stray_close_is_dropped() {
        let (text, _) = PreBlocks::extract("<pre></pre>x</pre>y");
        assert_eq!(text, "<pre pre-tag-0></pre>xy");
    }

    #[test]
    fn text_without_pre_is_untouched() {
        let (text, blocks) = PreBlocks::extract("plain </pre> text");
        assert_eq!(text, "plain </pre> text");
        assert_eq!(blocks.restore(text.clone()), text);
    }

    #[test]
    fn converts_bare_newlines() {
        assert_eq!(convert_line_breaks("a\nb"), "a<br />\nb");
        assert_eq!(convert_line_breaks("a  \nb"), "a<br />\nb");
        assert_eq!(convert_line_breaks("a<br />\nb"), "a<br />\nb");
        assert_eq!(convert_line_breaks("a b"), "a b");
    }

    #[test]
    fn absorbs_whitespace_up_to_the_last_newline() {
        assert_eq!(convert_line_breaks("a\n \nb"), "a<br />\nb");
        assert_eq!(convert_line_breaks("a\n  b"), "a<br />\n  b");
    }
}
