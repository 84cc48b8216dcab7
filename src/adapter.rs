//! Adapter trait and stock adapters.
//!
//! An [`Adapter`] wraps exactly one entry point of a third-party library.
//! The dispatcher drives it through a fixed sequence:
//!
//! ```text
//!   describe() ──→ availability() ──→ validate() ──→ invoke() ──→ normalize()
//!   (sync, &ref)     (async)           (sync)         (async)      (interop)
//! ```
//!
//! ## Contract
//!
//! | Method | Kind | Required | Returns |
//! |--------|------|----------|---------|
//! | `describe()` | sync | yes | `&CapabilityDescriptor` |
//! | `invoke()` | async | yes | `AdapterResult<RawOutput>` |
//! | `availability()` | async | provided | `AdapterAvailability` |
//! | `validate()` | sync | provided | `ValidationResult` |
//!
//! - `describe()` is infallible; descriptors are built at construction.
//! - `invoke()` reports library failures as [`AdapterError::Library`] with
//!   the library's own message. It never retries.
//! - `validate()` defaults to the descriptor's parameter schema.
//!
//! [`AdapterError::Library`]: crate::error::AdapterError::Library

use std::future::Future;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};

use crate::capability::{CapabilityDescriptor, Category};
use crate::error::AdapterResult;
use crate::interop::RawOutput;
use crate::params::Parameters;

/// Trait for capability adapters.
#[async_trait]
pub trait Adapter: Send + Sync {
    /// Descriptor of the capability this adapter serves.
    fn describe(&self) -> &CapabilityDescriptor;

    /// Call the wrapped library.
    async fn invoke(&self, params: &Parameters) -> AdapterResult<RawOutput>;

    /// Whether the wrapped library can take calls right now.
    ///
    /// Adapters whose library is optional (not installed, disabled at build
    /// time, licence missing) override this so the dispatcher can decline
    /// the call before `invoke` runs.
    async fn availability(&self) -> AdapterAvailability {
        AdapterAvailability::available()
    }

    /// Check parameters before invocation.
    fn validate(&self, params: &Parameters) -> ValidationResult {
        let reasons = self.describe().parameters.check(params);
        if reasons.is_empty() {
            ValidationResult::Valid
        } else {
            ValidationResult::Invalid { reasons }
        }
    }
}

/// Adapter availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdapterAvailability {
    pub is_available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AdapterAvailability {
    /// The library is loaded and can be called.
    pub fn available() -> Self {
        Self {
            is_available: true,
            reason: None,
        }
    }

    /// The library cannot be called, with a reason for the caller.
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self {
            is_available: false,
            reason: Some(reason.into()),
        }
    }
}

/// Outcome of parameter validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    Invalid { reasons: Vec<String> },
}

impl ValidationResult {
    /// Returns `true` for [`ValidationResult::Valid`].
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }
}

type BoxedInvoke =
    Box<dyn Fn(Parameters) -> BoxFuture<'static, AdapterResult<RawOutput>> + Send + Sync>;

type BlockingInvoke = Box<dyn Fn(&Parameters) -> AdapterResult<RawOutput> + Send + Sync>;

enum Handler {
    Async(BoxedInvoke),
    Blocking(BlockingInvoke),
}

/// Adapter built from a closure.
///
/// This is the usual way to plug a library in: the closure performs the
/// single library call and maps its output into a [`RawOutput`].
pub struct FnAdapter {
    descriptor: CapabilityDescriptor,
    handler: Handler,
    availability: AdapterAvailability,
}

impl FnAdapter {
    /// Wrap an async closure.
    pub fn new<F, Fut>(descriptor: CapabilityDescriptor, f: F) -> Self
    where
        F: Fn(Parameters) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = AdapterResult<RawOutput>> + Send + 'static,
    {
        Self {
            descriptor,
            handler: Handler::Async(Box::new(move |params| f(params).boxed())),
            availability: AdapterAvailability::available(),
        }
    }

    /// Wrap a synchronous library call.
    pub fn blocking<F>(descriptor: CapabilityDescriptor, f: F) -> Self
    where
        F: Fn(&Parameters) -> AdapterResult<RawOutput> + Send + Sync + 'static,
    {
        Self {
            descriptor,
            handler: Handler::Blocking(Box::new(f)),
            availability: AdapterAvailability::available(),
        }
    }

    /// Report a fixed availability (e.g. the library was not found).
    pub fn with_availability(mut self, availability: AdapterAvailability) -> Self {
        self.availability = availability;
        self
    }
}

impl std::fmt::Debug for FnAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnAdapter")
            .field("descriptor", &self.descriptor)
            .field("availability", &self.availability)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Adapter for FnAdapter {
    fn describe(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, params: &Parameters) -> AdapterResult<RawOutput> {
        match &self.handler {
            Handler::Async(f) => f(params.clone()).await,
            Handler::Blocking(f) => f(params),
        }
    }

    async fn availability(&self) -> AdapterAvailability {
        self.availability.clone()
    }
}

/// Returns its parameters unchanged as an algorithm payload.
///
/// Useful as a smoke test for a dispatcher setup.
#[derive(Debug, Clone)]
pub struct EchoAdapter {
    descriptor: CapabilityDescriptor,
}

impl EchoAdapter {
    /// Echo adapter bound to `echo`.
    pub fn new() -> Self {
        Self::named("echo")
    }

    /// Echo adapter under a custom capability name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            descriptor: CapabilityDescriptor::new(name, Category::Algorithm, "builtin")
                .with_description("Returns its parameters unchanged"),
        }
    }
}

impl Default for EchoAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Adapter for EchoAdapter {
    fn describe(&self) -> &CapabilityDescriptor {
        &self.descriptor
    }

    async fn invoke(&self, params: &Parameters) -> AdapterResult<RawOutput> {
        Ok(RawOutput::Json(params.clone().into_value()))
    }
}
