//! Process-wide agent reuse keyed by credential.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use sha2::{Digest, Sha256};
use tracing::debug;

use super::{Agent, AgentConfig, AgentFactory};
use crate::error::AskwebError;

/// Built agents, one per credential.
///
/// Keys are SHA-256 digests so raw credentials never sit in the map. The lock
/// is held across a build, so concurrent callers with the same credential
/// share one build.
#[derive(Default)]
pub struct AgentCache {
    agents: Mutex<HashMap<String, Arc<dyn Agent>>>,
}

impl AgentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_build(
        &self,
        config: &AgentConfig,
        factory: &dyn AgentFactory,
    ) -> Result<Arc<dyn Agent>, AskwebError> {
        let key = cache_key(&config.credential);
        let mut agents = self.agents.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(agent) = agents.get(&key) {
            return Ok(agent.clone());
        }

        debug!(key = &key[..12], "Agent cache miss");
        let agent = factory.build(config)?;
        agents.insert(key, agent.clone());
        Ok(agent)
    }

    pub fn len(&self) -> usize {
        self.agents.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.agents.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}

impl std::fmt::Debug for AgentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentCache").field("agents", &self.len()).finish()
    }
}

fn cache_key(credential: &str) -> String {
    format!("{:x}", Sha256::digest(credential.trim().as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentInput, AgentOutput};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Fixed;

    #[async_trait]
    impl Agent for Fixed {
        async fn invoke(&self, _input: AgentInput) -> Result<AgentOutput, AskwebError> {
            Ok(AgentOutput::new(serde_json::json!("ok")))
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        builds: AtomicUsize,
    }

    impl AgentFactory for CountingFactory {
        fn build(&self, _config: &AgentConfig) -> Result<Arc<dyn Agent>, AskwebError> {
            self.builds.fetch_add(1, Ordering::SeqCst);
            Ok(Arc::new(Fixed))
        }
    }

    struct Broken;

    impl AgentFactory for Broken {
        fn build(&self, _config: &AgentConfig) -> Result<Arc<dyn Agent>, AskwebError> {
            Err(AskwebError::Configuration("bad model".into()))
        }
    }

    #[test]
    fn builds_once_per_credential() {
        let cache = AgentCache::new();
        let factory = CountingFactory::default();

        let a = cache.get_or_build(&AgentConfig::new("k1"), &factory).unwrap();
        let b = cache.get_or_build(&AgentConfig::new("k1"), &factory).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);

        cache.get_or_build(&AgentConfig::new("k2"), &factory).unwrap();
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_callers_share_one_build() {
        let cache = Arc::new(AgentCache::new());
        let factory = Arc::new(CountingFactory::default());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                let factory = factory.clone();
                std::thread::spawn(move || {
                    cache
                        .get_or_build(&AgentConfig::new("shared"), factory.as_ref())
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn failed_build_is_not_cached() {
        let cache = AgentCache::new();
        assert!(cache.get_or_build(&AgentConfig::new("k"), &Broken).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn keys_do_not_contain_the_credential() {
        let key = cache_key("AIza-secret");
        assert_eq!(key.len(), 64);
        assert!(!key.contains("AIza"));
    }
}
