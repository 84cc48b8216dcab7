//! Minimal dispatcher setup with in-process mock adapters.
//!
//! Registers the built-in echo adapter plus three catalogue capabilities
//! backed by plain Rust closures, then dispatches a few requests.

use alpha_quantum::{
    AdapterAvailability, AdapterError, CapabilityRegistry, Circuit, Counts, DispatchConfig,
    DispatchRequest, Dispatcher, EchoAdapter, FnAdapter, Parameters, RawOutput, catalogue,
    init_tracing,
};
use serde_json::json;

/// Classical stand-in for Shor: trial division.
fn smallest_factor(n: u64) -> Option<u64> {
    (2..).take_while(|d| *d <= n / d).find(|d| n % d == 0)
}

fn mock_shor(params: &Parameters) -> Result<RawOutput, AdapterError> {
    let n = params.require_u64("n")?;
    if n < 2 {
        return Err(AdapterError::invalid("n", "must be at least 2"));
    }
    let factors = match smallest_factor(n) {
        Some(p) => vec![p, n / p],
        None => vec![n],
    };
    Ok(json!({ "n": n, "factors": factors }).into())
}

/// Splits shots evenly between all-zeros and all-ones, like an ideal GHZ run.
fn mock_circuit(params: &Parameters) -> Result<RawOutput, AdapterError> {
    let circuit: Circuit = params.require_as("circuit")?;
    circuit
        .validate()
        .map_err(|e| AdapterError::invalid("circuit", e.to_string()))?;
    let shots = params.get_u64("shots").unwrap_or(1000);

    let width = circuit.num_qubits as usize;
    let counts = Counts::from_pairs([
        ("0".repeat(width), shots / 2),
        ("1".repeat(width), shots - shots / 2),
    ]);
    Ok(counts.into())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = DispatchConfig::load(None)?;
    init_tracing(&config.logging);

    let mut registry = CapabilityRegistry::from_config(&config);
    registry.register_adapter(EchoAdapter::new())?;
    registry.register_fn(catalogue::shor_factor(), mock_shor)?;
    registry.register_fn(catalogue::circuit_simulate(), mock_circuit)?;
    registry.register_adapter(
        FnAdapter::blocking(catalogue::qnn_train(), |_| {
            Err(AdapterError::Unavailable("tensorflow-quantum not installed".into()))
        })
        .with_availability(AdapterAvailability::unavailable(
            "tensorflow-quantum not installed",
        )),
    )?;

    println!("Capabilities:");
    for descriptor in registry.descriptors() {
        println!(
            "  {:<18} {:<18} {}",
            descriptor.name,
            descriptor.category.as_str(),
            descriptor.library
        );
    }
    println!();

    let dispatcher = Dispatcher::with_config(registry, config);
    tracing::info!(capabilities = dispatcher.registry().len(), "Dispatcher ready");

    let echoed = dispatcher
        .execute("echo", Parameters::new().with("message", "hello"))
        .await?;
    println!("echo:        {}", echoed.payload.to_value());

    let factored = dispatcher
        .execute(catalogue::SHOR_FACTOR, Parameters::new().with("n", 15))
        .await?;
    println!("shor-factor: {}", factored.payload.to_value());
    println!(
        "             served by {} in {}ms",
        factored.metadata.library.as_deref().unwrap_or("?"),
        factored.metadata.elapsed_ms.unwrap_or(0)
    );

    let mut ghz = Circuit::new(3);
    ghz.h(0).cx(0, 1).cx(1, 2).measure_all();
    let requests = vec![
        DispatchRequest::new(
            catalogue::CIRCUIT_SIMULATE,
            Parameters::new()
                .with("circuit", serde_json::to_value(&ghz)?)
                .with("shots", 1024),
        ),
        DispatchRequest::new(catalogue::QNN_TRAIN, Parameters::new()),
        DispatchRequest::new("teleport", Parameters::new()),
    ];

    println!();
    println!("Batch:");
    for outcome in dispatcher.execute_all(requests).await {
        match outcome {
            Ok(result) => println!("  ok    {}", result.payload.to_value()),
            Err(err) => println!("  error {err} (transient: {})", err.is_transient()),
        }
    }

    Ok(())
}
