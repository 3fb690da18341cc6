//! Parallel processing of many inputs with one processor.

use crate::processor::Processor;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A single input to process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchInput {
    /// Caller-chosen identifier, echoed in the result.
    pub id: String,
    /// Text to process.
    pub source: String,
}

/// Result for a single input in a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    /// Identifier matching the input.
    pub id: String,
    /// Processed text (present on success).
    pub output: Option<String>,
    /// Error message (present on failure).
    pub error: Option<String>,
}

/// Statistics for batch processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchStats {
    /// Total number of inputs.
    pub total: u32,
    /// Number of inputs processed successfully.
    pub succeeded: u32,
    /// Number of inputs that failed.
    pub failed: u32,
    /// Total processing time in milliseconds.
    pub processing_time_ms: f64,
}

/// Options for batch processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchOptions {
    /// Maximum number of threads to use. Defaults to rayon's global pool.
    pub max_threads: Option<usize>,
    /// Whether to continue processing after an error. Defaults to true.
    pub continue_on_error: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_threads: None,
            continue_on_error: true,
        }
    }
}

/// Results and statistics for a batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchProcessingResult {
    /// Individual results, in input order.
    pub results: Vec<BatchResult>,
    /// Processing statistics.
    pub stats: BatchStats,
}

/// Processes `inputs` with `processor`.
///
/// With `continue_on_error` (the default) every input is processed in
/// parallel. Otherwise inputs run in order and processing stops after the
/// first failure; later inputs are left out of `results`.
pub fn process_batch(
    processor: &Processor,
    inputs: Vec<BatchInput>,
    options: &BatchOptions,
) -> BatchProcessingResult {
    let start = Instant::now();

    let pool = options.max_threads.and_then(|max_threads| {
        rayon::ThreadPoolBuilder::new()
            .num_threads(max_threads)
            .build()
            .map_err(|err| log::warn!("falling back to the global thread pool: {err}"))
            .ok()
    });

    let total = u32::try_from(inputs.len()).unwrap_or(u32::MAX);
    let succeeded = AtomicU32::new(0);
    let failed = AtomicU32::new(0);

    let process_input = |input: BatchInput| -> BatchResult {
        match processor.process(&input.source) {
            Ok(output) => {
                succeeded.fetch_add(1, Ordering::Relaxed);
                BatchResult {
                    id: input.id,
                    output: Some(output),
                    error: None,
                }
            }
            Err(err) => {
                failed.fetch_add(1, Ordering::Relaxed);
                log::debug!("batch input {} failed: {err}", input.id);
                BatchResult {
                    id: input.id,
                    output: None,
                    error: Some(err.to_string()),
                }
            }
        }
    };

    let results: Vec<BatchResult> = if options.continue_on_error {
        match &pool {
            Some(pool) => pool.install(|| inputs.into_par_iter().map(process_input).collect()),
            None => inputs.into_par_iter().map(process_input).collect(),
        }
    } else {
        let mut results = Vec::with_capacity(inputs.len());
        for input in inputs {
            let result = process_input(input);
            let stop = result.error.is_some();
            results.push(result);
            if stop {
                break;
            }
        }
        results
    };

    BatchProcessingResult {
        results,
        stats: BatchStats {
            total,
            succeeded: succeeded.load(Ordering::Relaxed),
            failed: failed.load(Ordering::Relaxed),
            processing_time_ms: start.elapsed().as_secs_f64() * 1000.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::error::PipelineError;
    use crate::sanitize::Sanitizer;
    use serde_json::json;

    struct RejectMarked;

    impl Sanitizer for RejectMarked {
        fn sanitize(&self, html: &str) -> Result<String, PipelineError> {
            if html.contains("FAIL") {
                Err(PipelineError::InvalidConfig)
            } else {
                Ok(html.to_string())
            }
        }
    }

    fn inputs(sources: &[&str]) -> Vec<BatchInput> {
        sources
            .iter()
            .enumerate()
            .map(|(i, source)| BatchInput {
                id: format!("doc-{i}"),
                source: source.to_string(),
            })
            .collect()
    }

    fn failing_processor() -> Processor {
        let config = PipelineConfig::from_json(&json!({ "embed": false })).unwrap();
        Processor::new(&config).unwrap().with_sanitizer(RejectMarked)
    }

    #[test]
    fn preserves_input_order() {
        let sources: Vec<String> = (0..32).map(|i| format!("Para {i}.")).collect();
        let refs: Vec<&str> = sources.iter().map(String::as_str).collect();
        let outcome = process_batch(
            &Processor::default(),
            inputs(&refs),
            &BatchOptions {
                max_threads: Some(4),
                ..BatchOptions::default()
            },
        );

        assert_eq!(outcome.stats.total, 32);
        assert_eq!(outcome.stats.succeeded, 32);
        for (i, result) in outcome.results.iter().enumerate() {
            assert_eq!(result.id, format!("doc-{i}"));
            assert_eq!(result.output.as_deref(), Some(format!("<p>Para {i}.</p>").as_str()));
        }
    }

    #[test]
    fn counts_failures_and_continues() {
        let outcome = process_batch(
            &failing_processor(),
            inputs(&["ok", "FAIL", "fine"]),
            &BatchOptions::default(),
        );
        assert_eq!(outcome.stats.succeeded, 2);
        assert_eq!(outcome.stats.failed, 1);
        assert_eq!(outcome.results.len(), 3);
        assert!(outcome.results[1].error.is_some());
        assert!(outcome.results[1].output.is_none());
    }

    #[test]
    fn stops_on_first_error_when_asked() {
        let outcome = process_batch(
            &failing_processor(),
            inputs(&["ok", "FAIL", "never"]),
            &BatchOptions {
                continue_on_error: false,
                ..BatchOptions::default()
            },
        );
        assert_eq!(outcome.results.len(), 2);
        assert_eq!(outcome.stats.total, 3);
        assert_eq!(outcome.stats.succeeded, 1);
        assert_eq!(outcome.stats.failed, 1);
    }

    #[test]
    fn empty_batch() {
        let outcome = process_batch(&Processor::default(), Vec::new(), &BatchOptions::default());
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.stats.total, 0);
    }
}
