//! Interoperability layer.
//!
//! Every adapter hands back a [`RawOutput`]; [`normalize`] turns it into a
//! [`StandardResult`] whose [`Payload`] variant is fixed by the capability
//! [`Category`]:
//!
//! | Category | Payload | Accepted raw output |
//! |----------|---------|---------------------|
//! | `algorithm` | `Algorithm(Value)` | `Json`, `Counts` |
//! | `simulation` | `Simulation(SimulationOutput)` | `State`, `Counts`, `Json` object |
//! | `machine_learning` | `MachineLearning(TrainingOutput)` | `Json` object |
//! | `cryptography` | `Cryptography(KeyMaterial)` | `Json` object |
//! | `error_correction` | `ErrorCorrection(DecodingOutcome)` | `Json` object |
//!
//! `Payload` and `Normalized` raw outputs pass through when their category
//! matches, which makes `normalize` idempotent. Normalization only
//! reshapes data; it never computes anything from it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::capability::Category;
use crate::counts::Counts;
use crate::error::{DispatchError, DispatchResult};
use crate::request::RequestId;
use crate::state::StateVector;

/// Output of a simulation capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SimulationOutput {
    /// Final state, when the library exposes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<StateVector>,
    /// Sampled measurement outcomes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counts: Option<Counts>,
    /// Observable expectation values, in the order they were requested.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expectation_values: Vec<f64>,
}

/// Output of a quantum machine-learning capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingOutput {
    /// Trained model parameters.
    pub parameters: Vec<f64>,
    /// Final value of the cost function.
    pub cost: f64,
    /// Cost after each optimizer step.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<f64>,
}

/// Output of a key-establishment capability.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KeyMaterial {
    /// Scheme name as the wrapped library spells it (e.g. `Kyber512`).
    pub scheme: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_key: Vec<u8>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ciphertext: Vec<u8>,
    pub shared_secret: Vec<u8>,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("scheme", &self.scheme)
            .field("public_key_len", &self.public_key.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .field("shared_secret", &"[REDACTED]")
            .finish()
    }
}

/// Output of an error-correction decoder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecodingOutcome {
    pub code_distance: u32,
    pub syndrome: Vec<u8>,
    pub correction: Vec<u8>,
    /// Whether the correction undid the error (no logical failure).
    pub success: bool,
}

/// Category-shaped result payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", content = "data", rename_all = "snake_case")]
pub enum Payload {
    Algorithm(Value),
    Simulation(SimulationOutput),
    MachineLearning(TrainingOutput),
    Cryptography(KeyMaterial),
    ErrorCorrection(DecodingOutcome),
}

impl Payload {
    /// Category this payload belongs to.
    pub fn category(&self) -> Category {
        match self {
            Payload::Algorithm(_) => Category::Algorithm,
            Payload::Simulation(_) => Category::Simulation,
            Payload::MachineLearning(_) => Category::MachineLearning,
            Payload::Cryptography(_) => Category::Cryptography,
            Payload::ErrorCorrection(_) => Category::ErrorCorrection,
        }
    }

    /// The payload data as plain JSON, without the category tag.
    pub fn to_value(&self) -> Value {
        let encoded = match self {
            Payload::Algorithm(v) => return v.clone(),
            Payload::Simulation(s) => serde_json::to_value(s),
            Payload::MachineLearning(t) => serde_json::to_value(t),
            Payload::Cryptography(k) => serde_json::to_value(k),
            Payload::ErrorCorrection(d) => serde_json::to_value(d),
        };
        encoded.unwrap_or(Value::Null)
    }

    /// Borrow the algorithm output, if this is an algorithm payload.
    pub fn as_algorithm(&self) -> Option<&Value> {
        match self {
            Payload::Algorithm(v) => Some(v),
            _ => None,
        }
    }
}

/// Outcome status of a dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ResultStatus {
    /// The library call completed normally.
    Completed,
    /// The library returned something, but not everything asked for.
    Partial { reason: String },
}

/// Provenance attached to a result by the dispatcher.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<RequestId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    /// Adapter-specific extras.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub extra: Map<String, Value>,
}

/// Normalized envelope returned for every capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardResult {
    #[serde(flatten)]
    pub status: ResultStatus,
    pub payload: Payload,
    #[serde(default)]
    pub metadata: ResultMetadata,
}

impl StandardResult {
    /// Successful result.
    pub fn completed(payload: Payload) -> Self {
        Self {
            status: ResultStatus::Completed,
            payload,
            metadata: ResultMetadata::default(),
        }
    }

    /// Result the library only partly produced, e.g. a decoder that
    /// gave up before convergence.
    pub fn partial(payload: Payload, reason: impl Into<String>) -> Self {
        Self {
            status: ResultStatus::Partial {
                reason: reason.into(),
            },
            payload,
            metadata: ResultMetadata::default(),
        }
    }

    /// Attach an adapter-specific metadata entry.
    pub fn with_extra(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.extra.insert(key.into(), value);
        self
    }

    /// Returns `true` unless the status is partial.
    pub fn is_completed(&self) -> bool {
        matches!(self.status, ResultStatus::Completed)
    }

    /// Category of the payload.
    pub fn category(&self) -> Category {
        self.payload.category()
    }
}

/// What an adapter hands back before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawOutput {
    Json(Value),
    State(StateVector),
    Counts(Counts),
    Payload(Payload),
    /// A result that has already been normalized.
    Normalized(StandardResult),
}

impl RawOutput {
    fn kind(&self) -> &'static str {
        match self {
            RawOutput::Json(_) => "json",
            RawOutput::State(_) => "state vector",
            RawOutput::Counts(_) => "counts",
            RawOutput::Payload(_) => "payload",
            RawOutput::Normalized(_) => "normalized result",
        }
    }
}

impl From<Value> for RawOutput {
    fn from(value: Value) -> Self {
        RawOutput::Json(value)
    }
}

impl From<StateVector> for RawOutput {
    fn from(state: StateVector) -> Self {
        RawOutput::State(state)
    }
}

impl From<Counts> for RawOutput {
    fn from(counts: Counts) -> Self {
        RawOutput::Counts(counts)
    }
}

impl From<Payload> for RawOutput {
    fn from(payload: Payload) -> Self {
        RawOutput::Payload(payload)
    }
}

impl From<StandardResult> for RawOutput {
    fn from(result: StandardResult) -> Self {
        RawOutput::Normalized(result)
    }
}

/// Translate adapter output into the standard result for `category`.
pub fn normalize(raw: RawOutput, category: Category) -> DispatchResult<StandardResult> {
    let payload = match (raw, category) {
        (RawOutput::Normalized(result), _) => {
            ensure_category(result.payload.category(), category)?;
            return Ok(result);
        }
        (RawOutput::Payload(payload), _) => {
            ensure_category(payload.category(), category)?;
            payload
        }
        (RawOutput::Json(value), Category::Algorithm) => Payload::Algorithm(value),
        (RawOutput::Counts(counts), Category::Algorithm) => {
            Payload::Algorithm(json!({ "counts": counts }))
        }
        (RawOutput::State(state), Category::Simulation) => Payload::Simulation(SimulationOutput {
            state: Some(state),
            ..SimulationOutput::default()
        }),
        (RawOutput::Counts(counts), Category::Simulation) => {
            Payload::Simulation(SimulationOutput {
                counts: Some(counts),
                ..SimulationOutput::default()
            })
        }
        (RawOutput::Json(value), Category::Simulation) => {
            Payload::Simulation(decode(value, category)?)
        }
        (RawOutput::Json(value), Category::MachineLearning) => {
            Payload::MachineLearning(decode(value, category)?)
        }
        (RawOutput::Json(value), Category::Cryptography) => {
            Payload::Cryptography(decode(value, category)?)
        }
        (RawOutput::Json(value), Category::ErrorCorrection) => {
            Payload::ErrorCorrection(decode(value, category)?)
        }
        (other, _) => {
            return Err(DispatchError::Normalization {
                category,
                reason: format!("{} output has no {} form", other.kind(), category),
            });
        }
    };

    Ok(StandardResult::completed(payload))
}

fn ensure_category(found: Category, expected: Category) -> DispatchResult<()> {
    if found == expected {
        Ok(())
    } else {
        Err(DispatchError::Normalization {
            category: expected,
            reason: format!("payload belongs to category {found}"),
        })
    }
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, category: Category) -> DispatchResult<T> {
    if !value.is_object() {
        return Err(DispatchError::Normalization {
            category,
            reason: "expected a JSON object".into(),
        });
    }
    serde_json::from_value(value).map_err(|e| DispatchError::Normalization {
        category,
        reason: e.to_string(),
    })
}
