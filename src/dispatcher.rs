//! Dispatcher.
//!
//! The only control-flow component. For every request it runs:
//!
//! ```text
//!   resolve ──→ availability ──→ validate ──→ invoke ──→ normalize ──→ stamp
//!  (registry)    (adapter)       (schema)    (library)   (interop)    (metadata)
//! ```
//!
//! A failure at any step ends the request; nothing is retried. A request
//! for an unknown capability fails at `resolve` without touching any
//! adapter.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, instrument, warn};

use crate::adapter::{Adapter, ValidationResult};
use crate::capability::CapabilityDescriptor;
use crate::config::DispatchConfig;
use crate::error::{AdapterError, DispatchError, DispatchResult};
use crate::interop::{RawOutput, StandardResult, normalize};
use crate::params::Parameters;
use crate::registry::CapabilityRegistry;
use crate::request::DispatchRequest;

/// Routes capability requests to their adapters.
///
/// Owns a frozen registry: once a registry is handed to a dispatcher it can
/// no longer be mutated, so concurrent dispatches only ever read it.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<CapabilityRegistry>,
    config: DispatchConfig,
}

impl Dispatcher {
    /// Dispatcher with the default configuration.
    pub fn new(registry: CapabilityRegistry) -> Self {
        Self::with_config(registry, DispatchConfig::default())
    }

    /// Dispatcher with an explicit configuration.
    pub fn with_config(registry: CapabilityRegistry, config: DispatchConfig) -> Self {
        Self::from_shared(Arc::new(registry), config)
    }

    /// Share one registry between several dispatchers.
    pub fn from_shared(registry: Arc<CapabilityRegistry>, config: DispatchConfig) -> Self {
        debug!(
            capabilities = registry.len(),
            validate_parameters = config.validate_parameters,
            timeout_ms = ?config.timeout_ms,
            "Dispatcher ready"
        );
        Self { registry, config }
    }

    /// Registry this dispatcher resolves capabilities from.
    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    /// Active dispatch configuration.
    pub fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// Run `capability` with `params`.
    pub async fn execute(
        &self,
        capability: &str,
        params: Parameters,
    ) -> DispatchResult<StandardResult> {
        self.execute_request(DispatchRequest::new(capability, params))
            .await
    }

    /// Run a prepared request.
    #[instrument(
        name = "dispatch",
        skip_all,
        fields(request_id = %request.id, capability = %request.capability)
    )]
    pub async fn execute_request(&self, request: DispatchRequest) -> DispatchResult<StandardResult> {
        let started = Instant::now();
        match self.run(&request, started).await {
            Ok(result) => {
                info!(elapsed_ms = ?result.metadata.elapsed_ms, "Dispatch completed");
                Ok(result)
            }
            Err(err) => {
                warn!(error = %err, "Dispatch failed");
                Err(err)
            }
        }
    }

    /// Run independent requests concurrently. Results come back in request
    /// order.
    pub async fn execute_all(
        &self,
        requests: Vec<DispatchRequest>,
    ) -> Vec<DispatchResult<StandardResult>> {
        join_all(requests.into_iter().map(|r| self.execute_request(r))).await
    }

    /// Run `stages` in order, feeding each stage's payload to the next as
    /// parameters. Stops at the first failing stage. An empty stage list is
    /// [`DispatchError::EmptyPipeline`].
    pub async fn execute_pipeline(
        &self,
        stages: &[&str],
        params: Parameters,
    ) -> DispatchResult<StandardResult> {
        let Some((first, rest)) = stages.split_first() else {
            return Err(DispatchError::EmptyPipeline);
        };

        let mut result = self.execute(first, params).await?;
        for stage in rest {
            let next = Parameters::from_result(&result);
            result = self.execute(stage, next).await?;
        }
        Ok(result)
    }

    async fn run(
        &self,
        request: &DispatchRequest,
        started: Instant,
    ) -> DispatchResult<StandardResult> {
        let adapter = self.registry.resolve(&request.capability)?;
        let descriptor = adapter.describe();

        let availability = adapter.availability().await;
        if !availability.is_available {
            return Err(DispatchError::BackendUnavailable {
                capability: request.capability.clone(),
                reason: availability
                    .reason
                    .unwrap_or_else(|| "adapter reported unavailable".into()),
            });
        }

        if self.config.validate_parameters {
            if let ValidationResult::Invalid { reasons } = adapter.validate(&request.parameters) {
                return Err(DispatchError::InvalidParameters {
                    capability: request.capability.clone(),
                    reasons,
                });
            }
        }

        let raw = self.invoke(adapter.as_ref(), request).await?;
        let mut result = normalize(raw, descriptor.category)?;

        let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        result.metadata.request_id = Some(request.id);
        result.metadata.capability = Some(request.capability.clone());
        result.metadata.library = Some(descriptor.library.clone());
        result.metadata.elapsed_ms = Some(elapsed_ms);
        result.metadata.completed_at = Some(Utc::now());
        Ok(result)
    }

    async fn invoke(
        &self,
        adapter: &dyn Adapter,
        request: &DispatchRequest,
    ) -> DispatchResult<RawOutput> {
        let descriptor = adapter.describe();
        let call = adapter.invoke(&request.parameters);

        let outcome = match self.config.timeout_ms {
            Some(ms) => tokio::time::timeout(Duration::from_millis(ms), call)
                .await
                .map_err(|_| DispatchError::Timeout {
                    capability: request.capability.clone(),
                    timeout_ms: ms,
                })?,
            None => call.await,
        };

        outcome.map_err(|err| map_adapter_error(&request.capability, descriptor, err))
    }
}

fn map_adapter_error(
    capability: &str,
    descriptor: &CapabilityDescriptor,
    err: AdapterError,
) -> DispatchError {
    match err {
        AdapterError::Library(message) => DispatchError::BackendFailure {
            capability: capability.to_string(),
            library: descriptor.library.clone(),
            message,
        },
        AdapterError::InvalidParameter { name, reason } => DispatchError::InvalidParameters {
            capability: capability.to_string(),
            reasons: vec![format!("parameter '{name}': {reason}")],
        },
        AdapterError::Unavailable(reason) => DispatchError::BackendUnavailable {
            capability: capability.to_string(),
            reason,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;

    use super::*;
    use crate::adapter::{AdapterAvailability, EchoAdapter, FnAdapter};
    use crate::capability::{Category, ParameterKind, ParameterSchema, ParameterSpec};
    use crate::interop::Payload;

    fn echo_dispatcher() -> Dispatcher {
        let mut registry = CapabilityRegistry::new();
        registry.register_adapter(EchoAdapter::new()).unwrap();
        Dispatcher::new(registry)
    }

    #[tokio::test]
    async fn test_echo_roundtrip() {
        let dispatcher = echo_dispatcher();
        let result = dispatcher
            .execute("echo", Parameters::new().with("x", 1))
            .await
            .unwrap();
        assert_eq!(result.payload, Payload::Algorithm(json!({"x": 1})));
        assert_eq!(result.metadata.capability.as_deref(), Some("echo"));
        assert_eq!(result.metadata.library.as_deref(), Some("builtin"));
        assert!(result.metadata.request_id.is_some());
        assert!(result.metadata.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_unknown_capability() {
        let err = echo_dispatcher()
            .execute("nonexistent", Parameters::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::UnknownCapability(name) if name == "nonexistent"));
    }

    #[tokio::test]
    async fn test_library_error_becomes_backend_failure() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_fn(
                CapabilityDescriptor::new("surface-code-decode", Category::ErrorCorrection, "qecsim"),
                |_| Err(AdapterError::library("PlanarMPSDecoder: bond dimension exceeded")),
            )
            .unwrap();
        let err = Dispatcher::new(registry)
            .execute("surface-code-decode", Parameters::new())
            .await
            .unwrap_err();
        match err {
            DispatchError::BackendFailure {
                capability,
                library,
                message,
            } => {
                assert_eq!(capability, "surface-code-decode");
                assert_eq!(library, "qecsim");
                assert_eq!(message, "PlanarMPSDecoder: bond dimension exceeded");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_unavailable_adapter_is_not_invoked() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let adapter = FnAdapter::blocking(
            CapabilityDescriptor::new("qnn-train", Category::MachineLearning, "tensorflow-quantum"),
            move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(RawOutput::Json(json!({"parameters": [], "cost": 0.0})))
            },
        )
        .with_availability(AdapterAvailability::unavailable("tensorflow-quantum disabled"));

        let mut registry = CapabilityRegistry::new();
        registry.register_adapter(adapter).unwrap();
        let err = Dispatcher::new(registry)
            .execute("qnn-train", Parameters::new())
            .await
            .unwrap_err();

        assert!(err.is_transient());
        assert_eq!(
            err.to_string(),
            "Backend for 'qnn-train' unavailable: tensorflow-quantum disabled"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_schema_validation_toggle() {
        let descriptor = CapabilityDescriptor::new("shor-factor", Category::Algorithm, "mock")
            .with_parameters(
                ParameterSchema::open().with(ParameterSpec::required("n", ParameterKind::Integer)),
            );
        let build = |validate: bool| {
            let mut registry = CapabilityRegistry::new();
            registry
                .register_fn(descriptor.clone(), |_| Ok(RawOutput::Json(json!("ran"))))
                .unwrap();
            let config = DispatchConfig {
                validate_parameters: validate,
                ..DispatchConfig::default()
            };
            Dispatcher::with_config(registry, config)
        };

        let err = build(true)
            .execute("shor-factor", Parameters::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidParameters { .. }));

        let result = build(false)
            .execute("shor-factor", Parameters::new())
            .await
            .unwrap();
        assert_eq!(result.payload, Payload::Algorithm(json!("ran")));
    }

    #[tokio::test]
    async fn test_adapter_parameter_error_is_caller_error() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_fn(
                CapabilityDescriptor::new("shor-factor", Category::Algorithm, "mock"),
                |params| {
                    let n = params.require_u64("n")?;
                    Ok(RawOutput::Json(json!(n)))
                },
            )
            .unwrap();
        let err = Dispatcher::new(registry)
            .execute("shor-factor", Parameters::new().with("n", "fifteen"))
            .await
            .unwrap_err();
        assert!(err.is_caller_error());
        assert_eq!(
            err.to_string(),
            "Invalid parameters for 'shor-factor': parameter 'n': expected a non-negative integer"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_adapter(FnAdapter::new(
                CapabilityDescriptor::new("many-body-simulate", Category::Simulation, "quest"),
                |_| async {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok::<_, AdapterError>(RawOutput::Json(json!({})))
                },
            ))
            .unwrap();
        let config = DispatchConfig {
            timeout_ms: Some(50),
            ..DispatchConfig::default()
        };
        let err = Dispatcher::with_config(registry, config)
            .execute("many-body-simulate", Parameters::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::Timeout { timeout_ms: 50, .. }));
    }

    #[tokio::test]
    async fn test_normalization_failure_propagates() {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_fn(
                CapabilityDescriptor::new("qkd-generate-key", Category::Cryptography, "liboqs"),
                |_| Ok(RawOutput::Json(json!(true))),
            )
            .unwrap();
        let err = Dispatcher::new(registry)
            .execute("qkd-generate-key", Parameters::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DispatchError::Normalization {
                category: Category::Cryptography,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_execute_all_preserves_order() {
        let dispatcher = echo_dispatcher();
        let results = dispatcher
            .execute_all(vec![
                DispatchRequest::new("echo", Parameters::new().with("i", 0)),
                DispatchRequest::new("missing", Parameters::new()),
                DispatchRequest::new("echo", Parameters::new().with("i", 2)),
            ])
            .await;

        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap().payload,
            Payload::Algorithm(json!({"i": 0}))
        );
        assert!(matches!(
            results[1],
            Err(DispatchError::UnknownCapability(_))
        ));
        assert_eq!(
            results[2].as_ref().unwrap().payload,
            Payload::Algorithm(json!({"i": 2}))
        );
    }

    #[tokio::test]
    async fn test_pipeline_chains_payloads() {
        let mut registry = CapabilityRegistry::new();
        registry.register_adapter(EchoAdapter::new()).unwrap();
        registry
            .register_fn(
                CapabilityDescriptor::new("double", Category::Algorithm, "mock"),
                |params| {
                    let x = params.require_u64("x")?;
                    Ok(RawOutput::Json(json!({ "x": x * 2 })))
                },
            )
            .unwrap();
        let dispatcher = Dispatcher::new(registry);

        let result = dispatcher
            .execute_pipeline(&["echo", "double", "double"], Parameters::new().with("x", 3))
            .await
            .unwrap();
        assert_eq!(result.payload, Payload::Algorithm(json!({"x": 12})));
        assert_eq!(result.metadata.capability.as_deref(), Some("double"));

        let err = dispatcher
            .execute_pipeline(&[], Parameters::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::EmptyPipeline));
        assert!(err.is_caller_error());
    }
}
