use prosefmt_core::{AutopOptions, TexturizeOptions};
use prosefmt_pipeline::{PipelineConfig, Processor};
use serde_json::Value;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

/// Reads an options object passed from JavaScript; `undefined` and `null`
/// mean "use defaults".
fn parse_options(opts: JsValue) -> Result<Option<Value>, JsError> {
    if opts.is_undefined() || opts.is_null() {
        return Ok(None);
    }
    serde_wasm_bindgen::from_value(opts)
        .map(Some)
        .map_err(|e| JsError::new(&format!("Invalid options: {}", e)))
}

fn build_processor(config: JsValue) -> Result<Processor, JsError> {
    let config = match parse_options(config)? {
        Some(value) => {
            PipelineConfig::from_json(&value).map_err(|e| JsError::new(&e.to_string()))?
        }
        None => PipelineConfig::default(),
    };
    Processor::new(&config).map_err(|e| JsError::new(&e.to_string()))
}

/// Replaces ASCII punctuation in the text portions of `text` with typographic
/// entities.
#[wasm_bindgen]
pub fn texturize(text: &str, opts: JsValue) -> Result<String, JsError> {
    let options = match parse_options(opts)? {
        Some(value) => {
            TexturizeOptions::from_json(&value).map_err(|e| JsError::new(&e.to_string()))?
        }
        None => TexturizeOptions::default(),
    };
    Ok(prosefmt_core::texturize(text, &options))
}

/// Wraps blank-line separated text in paragraphs.
#[wasm_bindgen]
pub fn autop(text: &str, opts: JsValue) -> Result<String, JsError> {
    let options = match parse_options(opts)? {
        Some(value) => {
            AutopOptions::from_json(&value).map_err(|e| JsError::new(&e.to_string()))?
        }
        None => AutopOptions::default(),
    };
    Ok(prosefmt_core::autop(text, &options))
}

/// Runs the full pipeline over `text`.
///
/// `config` maps step names (`sanitize`, `embed`, `texturize`, `autop`) to
/// `true`, `false`, or an options object.
#[wasm_bindgen]
pub fn process(text: &str, config: JsValue) -> Result<String, JsError> {
    build_processor(config)?
        .process(text)
        .map_err(|e| JsError::new(&e.to_string()))
}

/// Names of the steps `config` enables, in execution order.
#[wasm_bindgen(js_name = enabledSteps)]
pub fn enabled_steps(config: JsValue) -> Result<JsValue, JsError> {
    let names: Vec<&str> = build_processor(config)?
        .steps()
        .into_iter()
        .map(|step| step.name())
        .collect();
    serde_wasm_bindgen::to_value(&names)
        .map_err(|e| JsError::new(&format!("Serialization error: {}", e)))
}
