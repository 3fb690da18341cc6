use thiserror::Error;

/// Errors raised while reading an options payload for one of the core transforms.
///
/// The transforms themselves never fail; only turning a loosely typed payload
/// (for example a JSON object coming from a host configuration) into typed
/// options can.
#[derive(Debug, Error)]
pub enum OptionsError {
    /// The payload did not match the expected options shape.
    #[error("Invalid {step} options: {source}")]
    InvalidPayload {
        /// Name of the transform the payload was meant for.
        step: &'static str,
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
}

impl OptionsError {
    /// Wraps a deserialization error for the named transform.
    pub fn invalid(step: &'static str, source: serde_json::Error) -> Self {
        Self::InvalidPayload { step, source }
    }

    /// Name of the transform whose options were rejected.
    pub fn step(&self) -> &'static str {
        match self {
            OptionsError::InvalidPayload { step, .. } => step,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_step() {
        let source = serde_json::from_str::<bool>("\"nope\"").unwrap_err();
        let err = OptionsError::invalid("texturize", source);
        assert_eq!(err.step(), "texturize");
        assert!(err.to_string().starts_with("Invalid texturize options:"));
    }
}
