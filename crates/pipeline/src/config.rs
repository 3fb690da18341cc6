//! Which pipeline steps run, and with what options.

use crate::error::PipelineError;
use prosefmt_core::OptionsError;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A named pipeline step. Steps always run in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// Strip disallowed markup.
    Sanitize,
    /// Replace media URLs with embed markup.
    Embed,
    /// Typographic substitutions.
    Texturize,
    /// Paragraph formatting.
    Autop,
}

impl Step {
    /// Every step, in execution order.
    pub const ORDER: [Step; 4] = [Step::Sanitize, Step::Embed, Step::Texturize, Step::Autop];

    /// Configuration key for this step.
    pub fn name(self) -> &'static str {
        match self {
            Step::Sanitize => "sanitize",
            Step::Embed => "embed",
            Step::Texturize => "texturize",
            Step::Autop => "autop",
        }
    }

    /// Looks up a step by configuration key. `purify` and `essence` are
    /// accepted as aliases for `sanitize` and `embed`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "sanitize" | "purify" => Some(Step::Sanitize),
            "embed" | "essence" => Some(Step::Embed),
            "texturize" => Some(Step::Texturize),
            "autop" => Some(Step::Autop),
            _ => None,
        }
    }
}

/// How one step is configured.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum StepSetting {
    /// The step does not run.
    Disabled,
    /// The step runs with its default options.
    #[default]
    Defaults,
    /// The step runs with options read from this payload.
    Options(Value),
}

impl StepSetting {
    /// Reads a setting: `false`, `true`, or an options object.
    pub fn from_json(step: Step, value: &Value) -> Result<Self, PipelineError> {
        match value {
            Value::Bool(false) => Ok(StepSetting::Disabled),
            Value::Bool(true) => Ok(StepSetting::Defaults),
            Value::Object(_) => Ok(StepSetting::Options(value.clone())),
            _ => Err(PipelineError::InvalidSetting { step: step.name() }),
        }
    }

    /// Returns true unless the step is disabled.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, StepSetting::Disabled)
    }

    /// Resolves the options for `step`, or `None` when it is disabled.
    pub fn resolve<T>(&self, step: Step) -> Result<Option<T>, OptionsError>
    where
        T: DeserializeOwned + Default,
    {
        match self {
            StepSetting::Disabled => Ok(None),
            StepSetting::Defaults => Ok(Some(T::default())),
            StepSetting::Options(payload) => serde_json::from_value(payload.clone())
                .map(Some)
                .map_err(|err| OptionsError::invalid(step.name(), err)),
        }
    }
}

/// Settings for every pipeline step.
///
/// All steps are enabled with defaults unless configured otherwise.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    /// Sanitizer setting.
    pub sanitize: StepSetting,
    /// Embed resolver setting.
    pub embed: StepSetting,
    /// Texturizer setting.
    pub texturize: StepSetting,
    /// Paragraph formatter setting.
    pub autop: StepSetting,
}

impl PipelineConfig {
    /// Builds a configuration from a JSON object, starting from the defaults.
    ///
    /// ```
    /// use prosefmt_pipeline::{PipelineConfig, StepSetting};
    ///
    /// let config = PipelineConfig::from_json(&serde_json::json!({
    ///     "embed": false,
    ///     "autop": { "convertBreaks": false }
    /// }))
    /// .unwrap();
    /// assert_eq!(config.embed, StepSetting::Disabled);
    /// assert_eq!(config.texturize, StepSetting::Defaults);
    /// ```
    pub fn from_json(value: &Value) -> Result<Self, PipelineError> {
        let mut config = Self::default();
        config.configure(value)?;
        Ok(config)
    }

    /// Overrides the settings named in `overrides`; other steps keep their
    /// current setting.
    pub fn configure(&mut self, overrides: &Value) -> Result<(), PipelineError> {
        let Value::Object(entries) = overrides else {
            return Err(PipelineError::InvalidConfig);
        };
        for (key, value) in entries {
            let step =
                Step::from_name(key).ok_or_else(|| PipelineError::UnknownStep(key.clone()))?;
            *self.setting_mut(step) = StepSetting::from_json(step, value)?;
        }
        Ok(())
    }

    /// Setting for `step`.
    pub fn setting(&self, step: Step) -> &StepSetting {
        match step {
            Step::Sanitize => &self.sanitize,
            Step::Embed => &self.embed,
            Step::Texturize => &self.texturize,
            Step::Autop => &self.autop,
        }
    }

    /// Mutable setting for `step`.
    pub fn setting_mut(&mut self, step: Step) -> &mut StepSetting {
        match step {
            Step::Sanitize => &mut self.sanitize,
            Step::Embed => &mut self.embed,
            Step::Texturize => &mut self.texturize,
            Step::Autop => &mut self.autop,
        }
    }

    /// Enabled steps, in execution order.
    pub fn enabled_steps(&self) -> impl Iterator<Item = Step> + '_ {
        Step::ORDER
            .into_iter()
            .filter(|step| self.setting(*step).is_enabled())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prosefmt_core::AutopOptions;
    use serde_json::json;

    #[test]
    fn defaults_enable_everything() {
        let config = PipelineConfig::default();
        assert_eq!(config.enabled_steps().collect::<Vec<_>>(), Step::ORDER);
    }

    #[test]
    fn configure_replaces_only_named_steps() {
        let mut config = PipelineConfig::from_json(&json!({ "embed": false })).unwrap();
        config
            .configure(&json!({ "texturize": false, "autop": { "convertBreaks": false } }))
            .unwrap();

        assert_eq!(config.sanitize, StepSetting::Defaults);
        assert_eq!(config.embed, StepSetting::Disabled);
        assert_eq!(config.texturize, StepSetting::Disabled);
        assert_eq!(
            config.autop,
            StepSetting::Options(json!({ "convertBreaks": false }))
        );
        assert_eq!(
            config.enabled_steps().collect::<Vec<_>>(),
            [Step::Sanitize, Step::Autop]
        );
    }

    #[test]
    fn aliases_map_to_steps() {
        let config = PipelineConfig::from_json(&json!({ "purify": false, "essence": false }))
            .unwrap();
        assert!(!config.sanitize.is_enabled());
        assert!(!config.embed.is_enabled());
    }

    #[test]
    fn rejects_unknown_steps_and_bad_settings() {
        assert!(matches!(
            PipelineConfig::from_json(&json!({ "smarten": true })),
            Err(PipelineError::UnknownStep(name)) if name == "smarten"
        ));
        assert!(matches!(
            PipelineConfig::from_json(&json!({ "autop": 1 })),
            Err(PipelineError::InvalidSetting { step: "autop" })
        ));
        assert!(matches!(
            PipelineConfig::from_json(&json!(["autop"])),
            Err(PipelineError::InvalidConfig)
        ));
    }

    #[test]
    fn resolves_options_payloads() {
        let options: Option<AutopOptions> = StepSetting::Options(json!({ "convertBreaks": false }))
            .resolve(Step::Autop)
            .unwrap();
        assert_eq!(options, Some(AutopOptions { convert_breaks: false }));

        let disabled: Option<AutopOptions> = StepSetting::Disabled.resolve(Step::Autop).unwrap();
        assert!(disabled.is_none());

        let err = StepSetting::Options(json!({ "convertBreaks": 3 }))
            .resolve::<AutopOptions>(Step::Autop)
            .unwrap_err();
        assert_eq!(err.step(), "autop");
    }
}
