//! Standard capability catalogue.
//!
//! Descriptors for the capabilities the framework is expected to host. They
//! fix each capability's name, category and parameter contract so that
//! every adapter bound under a given name accepts the same parameters and
//! produces the same payload shape. No adapters ship here; integrators
//! pair these descriptors with their own library calls.
//!
//! Contracts whose library has a known-good release carry a
//! [`VersionRequirement`]. Adapters record the version they actually load
//! with `with_version`, and registration rejects a mismatch:
//!
//! ```ignore
//! let descriptor = catalogue::shor_factor().with_version(qiskit_version);
//! registry.register_fn(descriptor, |params| {
//!     let n = params.require_u64("n")?;
//!     /* call the factoring library */
//! })?;
//! ```

use crate::capability::{
    CapabilityDescriptor, Category, ParameterKind, ParameterSchema, ParameterSpec,
};
use crate::version::{Version, VersionRequirement};

pub const SHOR_FACTOR: &str = "shor-factor";
pub const GROVER_SEARCH: &str = "grover-search";
pub const QAOA_OPTIMIZE: &str = "qaoa-optimize";
pub const CIRCUIT_SIMULATE: &str = "circuit-simulate";
pub const MANY_BODY_SIMULATE: &str = "many-body-simulate";
pub const QNN_TRAIN: &str = "qnn-train";
pub const QKD_GENERATE_KEY: &str = "qkd-generate-key";
pub const SURFACE_CODE_DECODE: &str = "surface-code-decode";

/// Qiskit release the factoring contract was validated against.
pub const QISKIT_REQUIREMENT: VersionRequirement = VersionRequirement::exact(Version::new(0, 44, 1));
/// Oldest QuEST binding with the simulation interface the contracts use.
pub const QUEST_REQUIREMENT: VersionRequirement = VersionRequirement::at_least(Version::new(0, 5, 0));
/// Oldest qecsim with planar-code decoding.
pub const QECSIM_REQUIREMENT: VersionRequirement = VersionRequirement::at_least(Version::new(1, 0, 0));

/// Integer factoring via Shor's algorithm.
pub fn shor_factor() -> CapabilityDescriptor {
    CapabilityDescriptor::new(SHOR_FACTOR, Category::Algorithm, "qiskit")
        .with_description("Factor an integer with Shor's algorithm")
        .with_requirement(QISKIT_REQUIREMENT)
        .with_parameters(ParameterSchema::open().with(
            ParameterSpec::required("n", ParameterKind::Integer).with_description("integer to factor"),
        ))
}

/// Unstructured search via Grover's algorithm.
pub fn grover_search() -> CapabilityDescriptor {
    CapabilityDescriptor::new(GROVER_SEARCH, Category::Algorithm, "pennylane")
        .with_description("Amplify marked basis states with Grover iterations")
        .with_parameters(
            ParameterSchema::open()
                .with(ParameterSpec::required("num_qubits", ParameterKind::Integer))
                .with(
                    ParameterSpec::required("marked", ParameterKind::Array)
                        .with_description("basis-state indices the oracle marks"),
                ),
        )
}

/// QAOA over a Pauli-Z Hamiltonian.
///
/// `hamiltonian` is a list of `{"coefficient": f64, "qubits": [u32]}` terms,
/// each a product of Z operators on the listed qubits.
pub fn qaoa_optimize() -> CapabilityDescriptor {
    CapabilityDescriptor::new(QAOA_OPTIMIZE, Category::Algorithm, "pennylane")
        .with_description("Optimize QAOA angles for a diagonal cost Hamiltonian")
        .with_parameters(
            ParameterSchema::open()
                .with(ParameterSpec::required("num_qubits", ParameterKind::Integer))
                .with(ParameterSpec::required("hamiltonian", ParameterKind::Array))
                .with(
                    ParameterSpec::optional("layers", ParameterKind::Integer)
                        .with_description("QAOA depth p (default 1)"),
                )
                .with(
                    ParameterSpec::optional("steps", ParameterKind::Integer)
                        .with_description("optimizer steps (default 100)"),
                ),
        )
}

/// Execute a [`Circuit`](crate::circuit::Circuit) descriptor.
pub fn circuit_simulate() -> CapabilityDescriptor {
    CapabilityDescriptor::new(CIRCUIT_SIMULATE, Category::Simulation, "quest")
        .with_description("Run a circuit descriptor on a state-vector simulator")
        .with_requirement(QUEST_REQUIREMENT)
        .with_parameters(
            ParameterSchema::open()
                .with(ParameterSpec::required("circuit", ParameterKind::Object))
                .with(ParameterSpec::optional("shots", ParameterKind::Integer)),
        )
}

/// Time evolution of a many-body Hamiltonian.
pub fn many_body_simulate() -> CapabilityDescriptor {
    CapabilityDescriptor::new(MANY_BODY_SIMULATE, Category::Simulation, "quest")
        .with_description("Evolve a many-body system under a Hamiltonian")
        .with_requirement(QUEST_REQUIREMENT)
        .with_parameters(
            ParameterSchema::open()
                .with(ParameterSpec::required("hamiltonian", ParameterKind::Array))
                .with(ParameterSpec::required("time", ParameterKind::Float)),
        )
}

/// Quantum neural network training.
pub fn qnn_train() -> CapabilityDescriptor {
    CapabilityDescriptor::new(QNN_TRAIN, Category::MachineLearning, "tensorflow-quantum")
        .with_description("Train a quantum neural network")
        .with_parameters(
            ParameterSchema::open()
                .with(ParameterSpec::required("data", ParameterKind::Array))
                .with(ParameterSpec::required("labels", ParameterKind::Array)),
        )
}

/// Key establishment through a KEM.
pub fn qkd_generate_key() -> CapabilityDescriptor {
    CapabilityDescriptor::new(QKD_GENERATE_KEY, Category::Cryptography, "liboqs")
        .with_description("Establish a shared secret with a key-encapsulation mechanism")
        .with_parameters(
            ParameterSchema::open().with(
                ParameterSpec::optional("scheme", ParameterKind::String)
                    .with_description("KEM name (default Kyber512)"),
            ),
        )
}

/// Planar surface-code decoding.
pub fn surface_code_decode() -> CapabilityDescriptor {
    CapabilityDescriptor::new(SURFACE_CODE_DECODE, Category::ErrorCorrection, "qecsim")
        .with_description("Sample a Pauli error on a planar code and decode its syndrome")
        .with_requirement(QECSIM_REQUIREMENT)
        .with_parameters(
            ParameterSchema::open()
                .with(ParameterSpec::required("code_size", ParameterKind::Integer))
                .with(
                    ParameterSpec::optional("error_probability", ParameterKind::Float)
                        .with_description("physical error rate (default 0.1)"),
                ),
        )
}

/// Every catalogue descriptor, sorted by name.
pub fn all() -> Vec<CapabilityDescriptor> {
    let mut all = vec![
        shor_factor(),
        grover_search(),
        qaoa_optimize(),
        circuit_simulate(),
        many_body_simulate(),
        qnn_train(),
        qkd_generate_key(),
        surface_code_decode(),
    ];
    all.sort_by(|a, b| a.name.cmp(&b.name));
    all
}

/// Look up a catalogue descriptor by capability name.
pub fn lookup(name: &str) -> Option<CapabilityDescriptor> {
    all().into_iter().find(|d| d.name == name)
}
