//! Resilience patterns for guardrail-runtime.
//!
//! This module provides:
//! - Circuit breaker around the generation provider
//! - Retry policy for transient provider errors

mod circuit_breaker;
mod retry;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use retry::RetryConfig;
