#![deny(missing_docs)]
//! Prosefmt core: HTML-aware texturizing and automatic paragraph formatting.

/// Automatic paragraph and line-break formatting.
pub mod autop;
/// Core error types.
pub mod error;
/// Tracking of excluded element scopes.
pub mod scope;
/// Lossless tag/text tokenizer.
pub mod split;
/// Typographic character substitutions.
pub mod texturize;
/// Literal translation tables.
pub mod translate;

pub use autop::{AutopOptions, autop};
pub use error::OptionsError;
pub use scope::{ExclusionStack, TagEdge, parse_tag};
pub use split::{Token, TokenKind, join_tokens, replace_in_tags, split_html};
pub use texturize::{
    DEFAULT_EXCLUDED_TAGS, DashChars, QuoteChars, TexturizeOptions, Texturizer, texturize,
};
pub use translate::TranslationTable;
