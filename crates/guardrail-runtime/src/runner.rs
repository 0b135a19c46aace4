//! Sequential evaluation loop.
//!
//! For every case the runner builds the few-shot conversation, asks the
//! provider for a report and hands the raw text to the [`Harness`]. A
//! generation that fails (after retries, or because the circuit is open)
//! becomes a `generation_failed` result; the run always reaches the end of
//! the corpus.

use std::sync::Arc;

use backon::Retryable;
use guardrail_core::{EvaluationResult, Harness, Summary, TestCase};
use tracing::{debug, info, warn};

use crate::config::RuntimeConfig;
use crate::prompts::build_messages;
use crate::providers::{LlmProvider, ProviderError, ProviderRegistry};
use crate::resilience::CircuitBreaker;
use crate::RuntimeError;

/// Summary and per-case results of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub summary: Summary,
    pub results: Vec<EvaluationResult>,
}

pub struct EvaluationRunner {
    provider: Arc<dyn LlmProvider>,
    config: RuntimeConfig,
    circuit_breaker: CircuitBreaker,
}

impl EvaluationRunner {
    pub fn new(provider: Arc<dyn LlmProvider>, config: RuntimeConfig) -> Self {
        let circuit_breaker = CircuitBreaker::new(config.circuit_breaker.clone());
        Self {
            provider,
            config,
            circuit_breaker,
        }
    }

    /// Build the provider named in `config` from the default registry.
    pub fn from_config(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let registry = ProviderRegistry::with_defaults();
        let provider = registry.create(&config.provider.kind, &config.provider.config)?;
        Ok(Self::new(provider, config))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Raw model output for one case.
    ///
    /// Each attempt is bounded by the configured timeout; transient errors
    /// are retried with exponential backoff.
    pub async fn generate(&self, case: &TestCase) -> Result<String, RuntimeError> {
        if self.circuit_breaker.is_open() {
            return Err(RuntimeError::CircuitOpen);
        }

        let messages = build_messages(&case.input);
        let completion = self.config.completion_config();
        let timeout = completion.timeout;

        let provider = &self.provider;
        let messages = &messages;
        let completion = &completion;

        let result = (|| async move {
            match tokio::time::timeout(timeout, provider.complete(messages.clone(), completion))
                .await
            {
                Ok(response) => response,
                Err(_) => Err(ProviderError::Timeout(timeout)),
            }
        })
        .retry(self.config.retry.backoff())
        .sleep(tokio::time::sleep)
        .when(|e: &ProviderError| e.is_transient())
        .notify(|e: &ProviderError, delay| {
            warn!(case = case.index, error = %e, retry_in = ?delay, "Generation attempt failed");
        })
        .await;

        match result {
            Ok(response) => {
                self.circuit_breaker.record_success();
                debug!(
                    case = case.index,
                    model = %response.model,
                    stop_reason = ?response.stop_reason,
                    "Generation complete"
                );
                Ok(response.content)
            }
            Err(e) => {
                self.circuit_breaker.record_failure();
                Err(e.into())
            }
        }
    }

    /// Evaluate every case in order and close the run.
    pub async fn run(&self, mut harness: Harness, cases: &[TestCase]) -> RunOutcome {
        if !self.provider.health_check().await {
            warn!(provider = self.provider.name(), "Provider health check failed");
        }

        let mut results = Vec::with_capacity(cases.len());
        for case in cases {
            let result = match self.generate(case).await {
                Ok(raw) => harness.evaluate(case, &raw),
                Err(e) => {
                    warn!(case = case.index, error = %e, "Generation failed");
                    harness.generation_failed(case, e.to_string())
                }
            };
            harness.record(&result);

            match &result.failure {
                None => info!(case = case.index, category = %case.category, "PASS"),
                Some(failure) => info!(
                    case = case.index,
                    category = %case.category,
                    reason = ?failure.kind,
                    detail = %failure.detail,
                    "FAIL"
                ),
            }
            results.push(result);
        }

        let summary = harness.finish();
        info!(
            pass = summary.pass,
            fail = summary.fail,
            total = summary.total,
            ruleset = %summary.ruleset.version,
            "Run complete"
        );
        RunOutcome { summary, results }
    }
}
