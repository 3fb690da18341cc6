//! Replaces bare media URLs with provider embed markup.

use crate::error::PipelineError;
use once_cell::sync::Lazy;
use prosefmt_core::{ExclusionStack, split_html};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Replaces media URLs in an HTML fragment with embed markup.
pub trait EmbedResolver: Send + Sync {
    /// Returns `text` with recognized URLs replaced.
    fn resolve(&self, text: &str) -> Result<String, PipelineError>;
}

/// One embed provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmbedProvider {
    /// Provider name, used in diagnostics.
    pub name: String,
    /// Pattern a URL must match in full. Capture group 1 is the media id.
    pub pattern: String,
    /// Markup with `{url}` and `{id}` placeholders.
    pub template: String,
}

impl EmbedProvider {
    fn new(name: &str, pattern: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
            template: template.to_string(),
        }
    }
}

/// Embed resolver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmbedConfig {
    /// Providers tried in order; the first full match wins.
    pub providers: Vec<EmbedProvider>,
}

const YOUTUBE_TEMPLATE: &str = r#"<iframe width="480" height="270" src="https://www.youtube.com/embed/{id}?feature=oembed" frameborder="0" allowfullscreen></iframe>"#;
const VIMEO_TEMPLATE: &str = r#"<iframe src="https://player.vimeo.com/video/{id}" width="480" height="270" frameborder="0" allow="autoplay; fullscreen" allowfullscreen></iframe>"#;

impl Default for EmbedConfig {
    fn default() -> Self {
        Self {
            providers: vec![
                EmbedProvider::new(
                    "youtube",
                    r"https?://(?:www\.|m\.)?youtube\.com/watch\?v=([A-Za-z0-9_-]+)(?:&\S*)?",
                    YOUTUBE_TEMPLATE,
                ),
                EmbedProvider::new(
                    "youtube",
                    r"https?://youtu\.be/([A-Za-z0-9_-]+)(?:\?\S*)?",
                    YOUTUBE_TEMPLATE,
                ),
                EmbedProvider::new(
                    "vimeo",
                    r"https?://(?:www\.)?vimeo\.com/([0-9]+)/?",
                    VIMEO_TEMPLATE,
                ),
            ],
        }
    }
}

/// Elements whose text never gets embeds.
const SKIPPED_ELEMENTS: &[&str] = &["a", "pre", "code", "script", "style", "textarea"];

static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("valid url pattern"));

#[derive(Debug, Clone)]
struct CompiledProvider {
    pattern: Regex,
    template: String,
}

/// Resolver that matches URLs against configured provider patterns.
#[derive(Debug, Clone)]
pub struct ProviderEmbedResolver {
    providers: Vec<CompiledProvider>,
}

impl ProviderEmbedResolver {
    /// Compiles every provider pattern.
    pub fn new(config: EmbedConfig) -> Result<Self, PipelineError> {
        let providers = config
            .providers
            .into_iter()
            .map(|provider| {
                let pattern = Regex::new(&format!("^(?:{})$", provider.pattern)).map_err(
                    |source| PipelineError::Pattern {
                        provider: provider.name.clone(),
                        source,
                    },
                )?;
                Ok(CompiledProvider {
                    pattern,
                    template: provider.template,
                })
            })
            .collect::<Result<Vec<_>, PipelineError>>()?;
        Ok(Self { providers })
    }

    /// Embed markup for `url`, if a provider recognizes it.
    pub fn embed_for(&self, url: &str) -> Option<String> {
        self.providers.iter().find_map(|provider| {
            let caps = provider.pattern.captures(url)?;
            let id = caps.get(1).map_or("", |m| m.as_str());
            Some(
                provider
                    .template
                    .replace("{url}", &html_escape::encode_double_quoted_attribute(url))
                    .replace("{id}", &html_escape::encode_double_quoted_attribute(id)),
            )
        })
    }

    fn embed_urls<'a>(&self, text: &'a str) -> Cow<'a, str> {
        URL.replace_all(text, |caps: &Captures<'_>| {
            let found = &caps[0];
            let url = found.trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
            match self.embed_for(url) {
                Some(markup) => {
                    log::debug!("embedding {url}");
                    format!("{markup}{}", &found[url.len()..])
                }
                None => found.to_string(),
            }
        })
    }
}

impl Default for ProviderEmbedResolver {
    fn default() -> Self {
        Self::new(EmbedConfig::default()).expect("valid default embed providers")
    }
}

impl EmbedResolver for ProviderEmbedResolver {
    fn resolve(&self, text: &str) -> Result<String, PipelineError> {
        if self.providers.is_empty() || !text.contains("http") {
            return Ok(text.to_string());
        }

        let mut stack = ExclusionStack::new();
        let mut out = String::with_capacity(text.len());
        for token in split_html(text) {
            if token.is_tag() {
                if !token.is_inert() {
                    stack.push_or_pop(token.text, SKIPPED_ELEMENTS);
                }
                out.push_str(token.text);
            } else if stack.is_empty() {
                out.push_str(&self.embed_urls(token.text));
            } else {
                out.push_str(token.text);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const IFRAME: &str = r#"<iframe width="480" height="270" src="https://www.youtube.com/embed/9bZkp7q19f0?feature=oembed" frameborder="0" allowfullscreen></iframe>"#;

    fn resolve(text: &str) -> String {
        ProviderEmbedResolver::default()
            .resolve(text)
            .expect("resolve succeeds")
    }

    #[test]
    fn default_providers_compile() {
        let resolver = ProviderEmbedResolver::new(EmbedConfig::default()).unwrap();
        assert_eq!(resolver.providers.len(), 3);
    }

    #[test]
    fn replaces_youtube_urls() {
        let text = "This is some content that should be processed.\n\nhttps://www.youtube.com/watch?v=9bZkp7q19f0";
        assert_eq!(
            resolve(text),
            format!("This is some content that should be processed.\n\n{IFRAME}")
        );
        assert_eq!(resolve("https://youtu.be/9bZkp7q19f0"), IFRAME);
    }

    #[test]
    fn keeps_trailing_punctuation() {
        assert_eq!(
            resolve("See https://youtu.be/9bZkp7q19f0."),
            format!("See {IFRAME}.")
        );
    }

    #[test]
    fn vimeo_urls() {
        assert!(resolve("https://vimeo.com/76979871").contains("player.vimeo.com/video/76979871"));
    }

    #[test]
    fn skips_links_attributes_and_code() {
        for text in [
            "<a href=\"https://youtu.be/9bZkp7q19f0\">https://youtu.be/9bZkp7q19f0</a>",
            "<code>https://youtu.be/9bZkp7q19f0</code>",
            "<img src=\"https://youtu.be/9bZkp7q19f0\">",
        ] {
            assert_eq!(resolve(text), text);
        }
    }

    #[test]
    fn leaves_unknown_urls() {
        let text = "Visit https://example.com/watch?v=1 today";
        assert_eq!(resolve(text), text);
    }

    #[test]
    fn custom_provider_escapes_substitutions() {
        let resolver = ProviderEmbedResolver::new(EmbedConfig {
            providers: vec![EmbedProvider::new(
                "gist",
                r"https://gist\.github\.com/(\w+)/?\S*",
                "<script src=\"{url}.js\" data-id=\"{id}\"></script>",
            )],
        })
        .unwrap();
        assert_eq!(
            resolver.resolve("https://gist.github.com/abc/?a=1&b=2").unwrap(),
            "<script src=\"https://gist.github.com/abc/?a=1&amp;b=2.js\" data-id=\"abc\"></script>"
        );
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = ProviderEmbedResolver::new(EmbedConfig {
            providers: vec![EmbedProvider::new("broken", "(", "")],
        })
        .unwrap_err();
        assert!(matches!(err, PipelineError::Pattern { provider, .. } if provider == "broken"));
    }

    #[test]
    fn empty_provider_list_disables_embedding() {
        let resolver = ProviderEmbedResolver::new(EmbedConfig { providers: vec![] }).unwrap();
        let text = "https://youtu.be/9bZkp7q19f0";
        assert_eq!(resolver.resolve(text).unwrap(), text);
    }
}
