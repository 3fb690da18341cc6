#![deny(missing_docs)]
//! Prosefmt pipeline: sanitize, embed, texturize, and paragraph steps run in a
//! fixed order over editor HTML.

/// Parallel batch processing.
pub mod batch;
/// Step settings and JSON configuration.
pub mod config;
/// Media URL embedding.
pub mod embed;
/// Pipeline error types.
pub mod error;
/// Compiled pipelines.
pub mod processor;
/// Allowlist HTML sanitizing.
pub mod sanitize;

pub use batch::{
    BatchInput, BatchOptions, BatchProcessingResult, BatchResult, BatchStats, process_batch,
};
pub use config::{PipelineConfig, Step, StepSetting};
pub use embed::{EmbedConfig, EmbedProvider, EmbedResolver, ProviderEmbedResolver};
pub use error::PipelineError;
pub use processor::Processor;
pub use sanitize::{AllowlistSanitizer, Sanitizer, SanitizerConfig};

/// Builds a [`Processor`] for `config` and runs it over `input`.
///
/// ```
/// use prosefmt_pipeline::{PipelineConfig, process};
///
/// let out = process("It's \"fine\"...", &PipelineConfig::default()).unwrap();
/// assert_eq!(out, "<p>It&#8217;s &#8220;fine&#8221;&#8230;</p>");
/// ```
pub fn process(input: &str, config: &PipelineConfig) -> Result<String, PipelineError> {
    Processor::new(config)?.process(input)
}
