//! Runs the configured steps over a text value.

use crate::config::{PipelineConfig, Step};
use crate::embed::{EmbedConfig, EmbedResolver, ProviderEmbedResolver};
use crate::error::PipelineError;
use crate::sanitize::{AllowlistSanitizer, Sanitizer, SanitizerConfig};
use prosefmt_core::{AutopOptions, TexturizeOptions, Texturizer, autop};

enum Stage {
    Sanitize(Box<dyn Sanitizer>),
    Embed(Box<dyn EmbedResolver>),
    Texturize(Texturizer),
    Autop(AutopOptions),
}

impl Stage {
    fn step(&self) -> Step {
        match self {
            Stage::Sanitize(_) => Step::Sanitize,
            Stage::Embed(_) => Step::Embed,
            Stage::Texturize(_) => Step::Texturize,
            Stage::Autop(_) => Step::Autop,
        }
    }

    fn run(&self, text: &str) -> Result<String, PipelineError> {
        match self {
            Stage::Sanitize(sanitizer) => sanitizer.sanitize(text),
            Stage::Embed(resolver) => resolver.resolve(text),
            Stage::Texturize(texturizer) => Ok(texturizer.texturize(text)),
            Stage::Autop(options) => Ok(autop(text, options)),
        }
    }
}

/// A compiled pipeline.
///
/// Options payloads are parsed once, when the processor is built. A processor
/// is immutable and can be shared across threads.
pub struct Processor {
    stages: Vec<Stage>,
}

impl Processor {
    /// Builds the enabled steps of `config`.
    pub fn new(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let mut stages = Vec::new();
        for step in config.enabled_steps() {
            let setting = config.setting(step);
            let stage = match step {
                Step::Sanitize => setting
                    .resolve::<SanitizerConfig>(step)?
                    .map(|options| Stage::Sanitize(Box::new(AllowlistSanitizer::new(options)))),
                Step::Embed => match setting.resolve::<EmbedConfig>(step)? {
                    Some(options) => Some(Stage::Embed(Box::new(ProviderEmbedResolver::new(
                        options,
                    )?))),
                    None => None,
                },
                Step::Texturize => setting
                    .resolve::<TexturizeOptions>(step)?
                    .map(|options| Stage::Texturize(Texturizer::new(&options))),
                Step::Autop => setting.resolve::<AutopOptions>(step)?.map(Stage::Autop),
            };
            stages.extend(stage);
        }
        Ok(Self { stages })
    }

    /// Replaces the sanitizer used by the sanitize step, if it is enabled.
    pub fn with_sanitizer(mut self, sanitizer: impl Sanitizer + 'static) -> Self {
        if let Some(stage) = self
            .stages
            .iter_mut()
            .find(|stage| matches!(stage, Stage::Sanitize(_)))
        {
            *stage = Stage::Sanitize(Box::new(sanitizer));
        }
        self
    }

    /// Replaces the resolver used by the embed step, if it is enabled.
    pub fn with_embed_resolver(mut self, resolver: impl EmbedResolver + 'static) -> Self {
        if let Some(stage) = self
            .stages
            .iter_mut()
            .find(|stage| matches!(stage, Stage::Embed(_)))
        {
            *stage = Stage::Embed(Box::new(resolver));
        }
        self
    }

    /// Steps that will run, in order.
    pub fn steps(&self) -> Vec<Step> {
        self.stages.iter().map(Stage::step).collect()
    }

    /// Runs every enabled step over `input`, each on the previous output.
    pub fn process(&self, input: &str) -> Result<String, PipelineError> {
        let mut text = input.to_string();
        for stage in &self.stages {
            let step = stage.step();
            log::debug!("running {} step", step.name());
            text = stage.run(&text)?;
            log::trace!("{} step produced {} bytes", step.name(), text.len());
        }
        Ok(text)
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self {
            stages: vec![
                Stage::Sanitize(Box::new(AllowlistSanitizer::default())),
                Stage::Embed(Box::new(ProviderEmbedResolver::default())),
                Stage::Texturize(Texturizer::default()),
                Stage::Autop(AutopOptions::default()),
            ],
        }
    }
}

impl std::fmt::Debug for Processor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Processor")
            .field("steps", &self.steps())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Upper;

    impl Sanitizer for Upper {
        fn sanitize(&self, html: &str) -> Result<String, PipelineError> {
            Ok(html.to_uppercase())
        }
    }

    #[test]
    fn default_runs_all_steps_in_order() {
        assert_eq!(Processor::default().steps(), Step::ORDER);
        let built = Processor::new(&PipelineConfig::default()).unwrap();
        assert_eq!(built.steps(), Step::ORDER);
    }

    #[test]
    fn disabled_steps_are_skipped() {
        let config = PipelineConfig::from_json(&json!({ "sanitize": false, "autop": false }))
            .unwrap();
        let processor = Processor::new(&config).unwrap();
        assert_eq!(processor.steps(), [Step::Embed, Step::Texturize]);
        assert_eq!(
            processor.process("<b onclick=\"x\">\"hi\"</b>").unwrap(),
            "<b onclick=\"x\">&#8220;hi&#8221;</b>"
        );
    }

    #[test]
    fn options_reach_their_step() {
        let config = PipelineConfig::from_json(&json!({
            "sanitize": false,
            "embed": false,
            "texturize": false,
            "autop": { "convertBreaks": false }
        }))
        .unwrap();
        let processor = Processor::new(&config).unwrap();
        assert_eq!(processor.process("a\nb").unwrap(), "<p>a\nb</p>");
    }

    #[test]
    fn invalid_payload_fails_at_build_time() {
        let config = PipelineConfig::from_json(&json!({ "texturize": { "quotes": 5 } })).unwrap();
        let err = Processor::new(&config).unwrap_err();
        assert!(matches!(err, PipelineError::Options(ref inner) if inner.step() == "texturize"));
    }

    #[test]
    fn custom_sanitizer_replaces_default() {
        let config = PipelineConfig::from_json(&json!({
            "embed": false,
            "texturize": false,
            "autop": false
        }))
        .unwrap();
        let processor = Processor::new(&config).unwrap().with_sanitizer(Upper);
        assert_eq!(processor.process("<b>x</b>").unwrap(), "<B>X</B>");
    }

    #[test]
    fn custom_sanitizer_ignored_when_disabled() {
        let config = PipelineConfig::from_json(&json!({ "sanitize": false, "autop": false }))
            .unwrap();
        let processor = Processor::new(&config).unwrap().with_sanitizer(Upper);
        assert_eq!(processor.steps(), [Step::Embed, Step::Texturize]);
        assert_eq!(processor.process("x").unwrap(), "x");
    }
}
