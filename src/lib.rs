//! Alpha Quantum: capability registry and dispatch layer
//!
//! This crate puts heterogeneous quantum-computing libraries (circuit
//! simulators, quantum-ML frameworks, post-quantum cryptography, error
//! correction decoders) behind one call contract. A caller names a
//! *capability*, passes a JSON parameter object, and gets back a
//! [`StandardResult`] whose payload shape depends only on the capability's
//! [`Category`], never on which library served it.
//!
//! # Overview
//!
//! - [`CapabilityRegistry`] binds capability names to adapters
//! - [`Adapter`] wraps one third-party entry point ([`FnAdapter`] for
//!   closures, [`EchoAdapter`] for smoke tests)
//! - [`normalize`] translates adapter output into a [`StandardResult`]
//! - [`Dispatcher`] resolves, validates, invokes and normalizes
//! - [`StateVector`], [`Circuit`] and [`Counts`] are the shared data
//!   formats adapters exchange
//! - [`catalogue`] holds the standard capability contracts
//!
//! # Flow
//!
//! ```text
//!   caller ──→ Dispatcher ──→ Registry ──→ Adapter ──→ library
//!                  ↑                                      │
//!                  └──────────── normalize ←──────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use alpha_quantum::{CapabilityRegistry, Dispatcher, EchoAdapter, Parameters, Payload};
//! use serde_json::json;
//!
//! # tokio_test_block_on(async {
//! let mut registry = CapabilityRegistry::new();
//! registry.register_adapter(EchoAdapter::new())?;
//!
//! let dispatcher = Dispatcher::new(registry);
//! let result = dispatcher.execute("echo", Parameters::new().with("x", 1)).await?;
//! assert_eq!(result.payload, Payload::Algorithm(json!({"x": 1})));
//! # Ok::<(), alpha_quantum::DispatchError>(())
//! # }).unwrap();
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     futures::executor::block_on(f)
//! # }
//! ```

pub mod adapter;
pub mod capability;
pub mod catalogue;
pub mod circuit;
pub mod config;
pub mod counts;
pub mod dispatcher;
pub mod error;
pub mod interop;
pub mod params;
pub mod registry;
pub mod request;
pub mod state;
pub mod telemetry;
pub mod version;

pub use adapter::{Adapter, AdapterAvailability, EchoAdapter, FnAdapter, ValidationResult};
pub use capability::{CapabilityDescriptor, Category, ParameterKind, ParameterSchema, ParameterSpec};
pub use circuit::{Circuit, GateOp};
pub use config::{ConfigError, DispatchConfig, LogFormat, LoggingConfig};
pub use counts::Counts;
pub use dispatcher::Dispatcher;
pub use error::{AdapterError, AdapterResult, DescriptorError, DispatchError, DispatchResult};
pub use interop::{
    DecodingOutcome, KeyMaterial, Payload, RawOutput, ResultMetadata, ResultStatus,
    SimulationOutput, StandardResult, TrainingOutput, normalize,
};
pub use params::Parameters;
pub use registry::{CapabilityRegistry, ConflictPolicy};
pub use request::{DispatchRequest, RequestId};
pub use state::StateVector;
pub use telemetry::init_tracing;
pub use version::{Version, VersionRequirement};
