//! Errors raised while configuring or running a pipeline.

use prosefmt_core::OptionsError;
use thiserror::Error;

/// Pipeline configuration and execution errors.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A step's options payload did not match its schema.
    #[error(transparent)]
    Options(#[from] OptionsError),
    /// An embed provider pattern failed to compile.
    #[error("Invalid pattern for embed provider `{provider}`: {source}")]
    Pattern {
        /// Provider name from the configuration.
        provider: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
    /// The HTML rewriter rejected the input or a handler failed.
    #[error("Sanitizer failed to rewrite input: {0}")]
    Sanitize(#[from] lol_html::errors::RewritingError),
    /// A configuration key does not name a step.
    #[error("Unknown pipeline step `{0}`")]
    UnknownStep(String),
    /// A step was configured with something other than a boolean or an object.
    #[error("Invalid setting for step `{step}`: expected true, false, or an options object")]
    InvalidSetting {
        /// Name of the step.
        step: &'static str,
    },
    /// The configuration payload was not a JSON object.
    #[error("Pipeline configuration must be a JSON object")]
    InvalidConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_step() {
        assert_eq!(
            PipelineError::UnknownStep("smarten".into()).to_string(),
            "Unknown pipeline step `smarten`"
        );
        assert!(
            PipelineError::InvalidSetting { step: "autop" }
                .to_string()
                .contains("`autop`")
        );
    }
}
