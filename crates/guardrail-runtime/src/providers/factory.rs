//! Providers selected by name from the runtime config.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{LlmProvider, ProviderError};

/// Builds a provider from the `provider.config` section of the runtime config.
pub trait ProviderFactory: Send + Sync {
    /// Value of `provider.type` that selects this factory.
    fn provider_type(&self) -> &'static str;

    /// Validate `config` and build the provider.
    fn create(&self, config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError>;
}

#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<&'static str, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay, plus OpenAI when the `openai` feature is on.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::ReplayProviderFactory));
        #[cfg(feature = "openai")]
        registry.register(Arc::new(super::OpenAiProviderFactory));
        registry
    }

    /// Later registrations replace earlier ones of the same type.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.provider_type(), factory);
    }

    pub fn create(
        &self,
        provider_type: &str,
        config: &JsonValue,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        match self.factories.get(provider_type) {
            Some(factory) => factory.create(config),
            None => Err(ProviderError::NotConfigured(format!(
                "unknown provider '{}', expected one of {:?}",
                provider_type,
                self.factories.keys().collect::<Vec<_>>()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ReplayProvider;

    struct FixedFactory;

    impl ProviderFactory for FixedFactory {
        fn provider_type(&self) -> &'static str {
            "replay"
        }

        fn create(&self, _config: &JsonValue) -> Result<Arc<dyn LlmProvider>, ProviderError> {
            Ok(Arc::new(ReplayProvider::new(vec!["{}".to_string()])))
        }
    }

    #[test]
    fn test_unknown_type_lists_known_ones() {
        let registry = ProviderRegistry::with_defaults();
        match registry.create("anthropic", &JsonValue::Null) {
            Err(ProviderError::NotConfigured(msg)) => {
                assert!(msg.contains("anthropic"));
                assert!(msg.contains("replay"));
            }
            _ => panic!("expected NotConfigured"),
        }
    }

    #[test]
    fn test_defaults_reject_replay_without_path() {
        let registry = ProviderRegistry::with_defaults();
        assert!(registry.create("replay", &serde_json::json!({})).is_err());
    }

    #[test]
    fn test_register_replaces_same_type() {
        let mut registry = ProviderRegistry::with_defaults();
        registry.register(Arc::new(FixedFactory));

        let provider = registry.create("replay", &JsonValue::Null).unwrap();
        assert_eq!(provider.name(), "replay");
    }
}
