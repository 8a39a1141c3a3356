//! Lazy, memoized provider for the process-wide engine handle.
//!
//! The first caller pays the initialization cost; everyone after reuses the
//! cached `Arc`. The tri-state (unset / ready / failed) sits behind an async
//! mutex that is held across the initialization await, so callers racing the
//! first request wait for the single in-flight attempt instead of starting
//! their own.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::engine::{EngineError, TextGenerator, MODEL};

/// What to do when initialization fails.
///
/// `RetryNextRequest` leaves the state unset, so a later request attempts
/// initialization again. `CacheFailure` pins the diagnostic: every later
/// request fails fast without touching the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitRetryPolicy {
    RetryNextRequest,
    CacheFailure,
}

/// Constructs the engine. Injected so tests can substitute a double.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create(&self) -> Result<Arc<dyn TextGenerator>, EngineError>;
}

enum ProviderState {
    Unset,
    Ready(Arc<dyn TextGenerator>),
    Failed(String),
}

pub struct EngineProvider {
    state: tokio::sync::Mutex<ProviderState>,
    factory: Box<dyn EngineFactory>,
    retry_policy: InitRetryPolicy,
}

impl EngineProvider {
    pub fn new(factory: Box<dyn EngineFactory>, retry_policy: InitRetryPolicy) -> Self {
        Self {
            state: tokio::sync::Mutex::new(ProviderState::Unset),
            factory,
            retry_policy,
        }
    }

    /// Returns the cached engine handle, initializing it on first call.
    ///
    /// Initialization blocks the caller until it completes or fails; there
    /// is no timeout beyond what the engine itself enforces.
    pub async fn get_engine(&self) -> Result<Arc<dyn TextGenerator>, EngineError> {
        let mut state = self.state.lock().await;

        match &*state {
            ProviderState::Ready(engine) => return Ok(engine.clone()),
            // Only reachable under `CacheFailure`.
            ProviderState::Failed(message) => {
                return Err(EngineError::Unavailable(message.clone()));
            }
            ProviderState::Unset => {}
        }

        info!("Initializing simplification engine (model: {MODEL})");
        match self.factory.create().await {
            Ok(engine) => {
                *state = ProviderState::Ready(engine.clone());
                info!("Engine initialized");
                Ok(engine)
            }
            Err(e) => {
                warn!("Engine initialization failed: {e}");
                if self.retry_policy == InitRetryPolicy::CacheFailure {
                    *state = ProviderState::Failed(e.to_string());
                }
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{GeneratedText, GenerationParams};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubEngine;

    #[async_trait]
    impl TextGenerator for StubEngine {
        async fn generate(
            &self,
            _input: &str,
            _params: &GenerationParams,
        ) -> Result<Vec<GeneratedText>, EngineError> {
            Ok(vec![GeneratedText {
                generated_text: "ok".to_string(),
            }])
        }
    }

    /// Fails the first `fail_first` invocations, counting every one.
    struct CountingFactory {
        calls: Arc<AtomicUsize>,
        fail_first: usize,
    }

    #[async_trait]
    impl EngineFactory for CountingFactory {
        async fn create(&self) -> Result<Arc<dyn TextGenerator>, EngineError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.fail_first {
                Err(EngineError::Unavailable("model fetch failed".to_string()))
            } else {
                Ok(Arc::new(StubEngine))
            }
        }
    }

    fn counting_provider(
        fail_first: usize,
        policy: InitRetryPolicy,
    ) -> (EngineProvider, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let factory = CountingFactory {
            calls: calls.clone(),
            fail_first,
        };
        (EngineProvider::new(Box::new(factory), policy), calls)
    }

    #[tokio::test]
    async fn test_initializes_at_most_once_across_sequential_calls() {
        let (provider, calls) = counting_provider(0, InitRetryPolicy::RetryNextRequest);

        let first = provider.get_engine().await.unwrap();
        let second = provider.get_engine().await.unwrap();
        let third = provider.get_engine().await.unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&second, &third));
    }

    #[tokio::test]
    async fn test_concurrent_first_callers_share_one_initialization() {
        let (provider, calls) = counting_provider(0, InitRetryPolicy::RetryNextRequest);
        let provider = Arc::new(provider);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let p = provider.clone();
            handles.push(tokio::spawn(async move { p.get_engine().await }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_next_request_reattempts_after_failure() {
        let (provider, calls) = counting_provider(1, InitRetryPolicy::RetryNextRequest);

        assert!(provider.get_engine().await.is_err());
        assert!(provider.get_engine().await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_cache_failure_never_reattempts() {
        let (provider, calls) = counting_provider(1, InitRetryPolicy::CacheFailure);

        assert!(provider.get_engine().await.is_err());

        // Would succeed if the factory ran again, but the failure is pinned.
        let err = match provider.get_engine().await {
            Ok(_) => panic!("expected initialization failure to be cached"),
            Err(e) => e,
        };
        assert!(matches!(err, EngineError::Unavailable(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
