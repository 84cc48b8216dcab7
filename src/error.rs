//! Dispatch error types.
//!
//! Errors are categorized by who has to act:
//!
//! | Category | Variants | Recovery |
//! |----------|----------|----------|
//! | **Caller** | `UnknownCapability`, `DuplicateCapability`, `IncompatibleVersion`, `InvalidParameters`, `EmptyPipeline`, `Configuration` | Fix the request or setup |
//! | **Transient** | `BackendUnavailable`, `Timeout` | Retry later or route elsewhere |
//! | **Backend** | `BackendFailure`, `Normalization` | Inspect the wrapped library |
//!
//! Adapters report failures with [`AdapterError`]; the dispatcher maps those
//! onto [`DispatchError`] so callers only ever see one error type.

use thiserror::Error;

use crate::capability::Category;

/// Errors surfaced by the registry, the interoperability layer and the
/// dispatcher.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DispatchError {
    // ── Caller errors ────────────────────────────────────────────────
    /// No adapter is bound to the requested capability.
    #[error("Unknown capability: {0}")]
    UnknownCapability(String),

    /// A capability was registered twice under the `Reject` policy.
    #[error("Capability already registered: {0}")]
    DuplicateCapability(String),

    /// The adapter wraps a library version its capability contract rejects.
    #[error("'{capability}' requires {library} {required}, adapter reports {found}")]
    IncompatibleVersion {
        capability: String,
        library: String,
        required: String,
        found: String,
    },

    /// Parameters failed the capability's schema.
    #[error("Invalid parameters for '{capability}': {}", .reasons.join("; "))]
    InvalidParameters {
        capability: String,
        reasons: Vec<String>,
    },

    /// `execute_pipeline` was called without any stages.
    #[error("Pipeline has no stages")]
    EmptyPipeline,

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ── Transient errors ─────────────────────────────────────────────
    /// The adapter declined the call because its library is not usable.
    #[error("Backend for '{capability}' unavailable: {reason}")]
    BackendUnavailable { capability: String, reason: String },

    /// The adapter did not finish within the configured budget.
    #[error("Capability '{capability}' timed out after {timeout_ms}ms")]
    Timeout { capability: String, timeout_ms: u64 },

    // ── Backend errors ───────────────────────────────────────────────
    /// The wrapped library call failed.
    #[error("Backend failure in '{capability}' ({library}): {message}")]
    BackendFailure {
        capability: String,
        library: String,
        message: String,
    },

    /// Adapter output could not be translated into the category's payload.
    #[error("Cannot normalize output as {category}: {reason}")]
    Normalization { category: Category, reason: String },
}

impl DispatchError {
    /// Returns `true` if the same request may succeed later.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::BackendUnavailable { .. } | Self::Timeout { .. })
    }

    /// Returns `true` if the caller has to change the request or setup.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownCapability(_)
                | Self::DuplicateCapability(_)
                | Self::IncompatibleVersion { .. }
                | Self::InvalidParameters { .. }
                | Self::EmptyPipeline
                | Self::Configuration(_)
        )
    }
}

/// Result type for registry and dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Errors an adapter reports back from its wrapped library call.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AdapterError {
    /// The library call itself failed. Carries the library's own message.
    #[error("{0}")]
    Library(String),

    /// A parameter was missing or had the wrong shape.
    #[error("parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// The library cannot be used right now (not installed, disabled, ...).
    #[error("{0}")]
    Unavailable(String),
}

impl AdapterError {
    /// Wrap any library error, keeping its display message.
    pub fn library(err: impl std::fmt::Display) -> Self {
        Self::Library(err.to_string())
    }

    /// Build an [`AdapterError::InvalidParameter`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for adapter calls.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Malformed state or circuit descriptor.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum DescriptorError {
    #[error("state vector is empty")]
    EmptyState,

    #[error("state vector length {0} is not a power of two")]
    NotPowerOfTwo(usize),

    #[error("invalid version '{0}'")]
    InvalidVersion(String),

    #[error("state vector norm is {0}, expected 1")]
    NotNormalized(f64),

    #[error("{requested} qubits requested, at most {max} supported")]
    TooManyQubits { requested: u32, max: u32 },

    #[error("unknown gate '{0}'")]
    UnknownGate(String),

    #[error("gate '{gate}' acts on {expected} qubit(s), got {got}")]
    Arity {
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("gate '{gate}' takes {expected} parameter(s), got {got}")]
    ParamCount {
        gate: String,
        expected: usize,
        got: usize,
    },

    #[error("gate '{gate}' addresses qubit {qubit} in a {num_qubits}-qubit circuit")]
    QubitOutOfRange {
        gate: String,
        qubit: u32,
        num_qubits: u32,
    },

    #[error("gate '{gate}' uses qubit {qubit} more than once")]
    DuplicateQubit { gate: String, qubit: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(
            DispatchError::BackendUnavailable {
                capability: "qnn-train".into(),
                reason: "not installed".into()
            }
            .is_transient()
        );
        assert!(
            DispatchError::Timeout {
                capability: "shor-factor".into(),
                timeout_ms: 10
            }
            .is_transient()
        );
        assert!(!DispatchError::UnknownCapability("x".into()).is_transient());
    }

    #[test]
    fn test_caller_errors() {
        assert!(DispatchError::UnknownCapability("x".into()).is_caller_error());
        assert!(DispatchError::DuplicateCapability("x".into()).is_caller_error());
        assert!(DispatchError::EmptyPipeline.is_caller_error());
        let version = DispatchError::IncompatibleVersion {
            capability: "shor-factor".into(),
            library: "qiskit".into(),
            required: "==0.44.1".into(),
            found: "1.0.0".into(),
        };
        assert!(version.is_caller_error());
        assert!(!version.is_transient());
        assert_eq!(
            version.to_string(),
            "'shor-factor' requires qiskit ==0.44.1, adapter reports 1.0.0"
        );
        assert!(
            !DispatchError::BackendFailure {
                capability: "x".into(),
                library: "lib".into(),
                message: "boom".into()
            }
            .is_caller_error()
        );
    }

    #[test]
    fn test_error_display() {
        let err = DispatchError::InvalidParameters {
            capability: "shor-factor".into(),
            reasons: vec!["missing 'n'".into(), "bad 'x'".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid parameters for 'shor-factor': missing 'n'; bad 'x'"
        );

        let err = DispatchError::Normalization {
            category: Category::Cryptography,
            reason: "expected object".into(),
        };
        assert_eq!(
            err.to_string(),
            "Cannot normalize output as cryptography: expected object"
        );
    }

    #[test]
    fn test_adapter_error_keeps_library_message() {
        let err = AdapterError::library("liboqs: keypair generation failed");
        assert_eq!(err.to_string(), "liboqs: keypair generation failed");
    }
}
