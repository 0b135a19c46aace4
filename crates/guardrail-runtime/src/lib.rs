//! # guardrail-runtime
//!
//! Model-backed evaluation runs for guardrail reports.
//!
//! `guardrail-core` decides what the report for an input should be. This
//! crate asks a model for that report and feeds the raw answer back into
//! the core harness.
//!
//! ## Important
//!
//! Model output is never trusted. Whatever a provider returns is recovered,
//! normalized and compared against the deterministic oracle; the oracle
//! verdict is always the reference.
//!
//! ## Example
//!
//! ```rust,ignore
//! use guardrail_core::{load_corpus, Harness, RuleSet};
//! use guardrail_runtime::{EvaluationRunner, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_file("guardrail.yaml")?;
//! let runner = EvaluationRunner::from_config(config.clone())?;
//! let harness = Harness::new(RuleSet::load("rulesets/v1.json")?, config.comparison_mode);
//!
//! let outcome = runner.run(harness, &load_corpus("tests.jsonl")?).await;
//! outcome.summary.write_to("reports/guardrail_eval_report.json")?;
//! ```

use thiserror::Error;

pub mod config;
pub mod prompts;
pub mod providers;
pub mod resilience;
pub mod runner;

pub use config::{CompletionSettings, ConfigError, ProviderSettings, RuntimeConfig};
pub use prompts::{build_messages, render_prompt, SYSTEM_INSTRUCTION};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderFactory, ProviderRegistry, ReplayProvider,
};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig, CircuitState, RetryConfig};
pub use runner::{EvaluationRunner, RunOutcome};

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Circuit open, generation skipped")]
    CircuitOpen,

    #[error(transparent)]
    Config(#[from] ConfigError),
}
