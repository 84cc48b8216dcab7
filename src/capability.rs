//! Capability descriptors.
//!
//! This module defines the types that describe what a registered adapter
//! offers: the capability name it answers to, the [`Category`] that fixes
//! the shape of its result payload, and the [`ParameterSchema`] its
//! parameters are checked against before the wrapped library is called.
//!
//! Descriptors are built once, when the adapter is constructed, and never
//! change afterwards. The registry and dispatcher only ever read them.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::params::Parameters;
use crate::version::VersionRequirement;

/// Broad family a capability belongs to.
///
/// The category, not the backend, decides which [`Payload`] variant a
/// result carries, so two adapters serving the same capability produce
/// interchangeable results.
///
/// [`Payload`]: crate::interop::Payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Quantum algorithms (factoring, search, variational optimizers).
    Algorithm,
    /// State or Hamiltonian simulation.
    Simulation,
    /// Quantum machine learning.
    MachineLearning,
    /// Quantum and post-quantum cryptography.
    Cryptography,
    /// Error-correcting codes and decoders.
    ErrorCorrection,
}

impl Category {
    /// All categories, in declaration order.
    pub const ALL: [Category; 5] = [
        Category::Algorithm,
        Category::Simulation,
        Category::MachineLearning,
        Category::Cryptography,
        Category::ErrorCorrection,
    ];

    /// Stable snake_case name, identical to the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Algorithm => "algorithm",
            Category::Simulation => "simulation",
            Category::MachineLearning => "machine_learning",
            Category::Cryptography => "cryptography",
            Category::ErrorCorrection => "error_correction",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON shape a parameter value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Integer,
    Float,
    Bool,
    String,
    Array,
    Object,
    /// Accept any JSON value.
    Any,
}

impl ParameterKind {
    /// Check whether `value` has this shape.
    ///
    /// `Float` accepts integers too; `Integer` accepts only integral numbers.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParameterKind::Integer => value.is_i64() || value.is_u64(),
            ParameterKind::Float => value.is_number(),
            ParameterKind::Bool => value.is_boolean(),
            ParameterKind::String => value.is_string(),
            ParameterKind::Array => value.is_array(),
            ParameterKind::Object => value.is_object(),
            ParameterKind::Any => true,
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterKind::Integer => "integer",
            ParameterKind::Float => "float",
            ParameterKind::Bool => "bool",
            ParameterKind::String => "string",
            ParameterKind::Array => "array",
            ParameterKind::Object => "object",
            ParameterKind::Any => "any",
        };
        f.write_str(name)
    }
}

/// One named parameter in a [`ParameterSchema`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    pub kind: ParameterKind,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: ParameterKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Parameters a capability accepts.
///
/// Keys not named in the schema are accepted unless the schema was built
/// with [`ParameterSchema::deny_unknown`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
    #[serde(default)]
    pub deny_unknown: bool,
}

impl ParameterSchema {
    /// A schema accepting anything.
    pub fn open() -> Self {
        Self::default()
    }

    /// Add a parameter spec.
    pub fn with(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Reject keys the schema does not name.
    pub fn deny_unknown(mut self) -> Self {
        self.deny_unknown = true;
        self
    }

    /// Look up a parameter spec by name.
    pub fn get(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Check `params` against the schema.
    ///
    /// Returns every violation found, in schema order followed by unknown
    /// keys in parameter order. An empty vector means the parameters are
    /// valid.
    pub fn check(&self, params: &Parameters) -> Vec<String> {
        let mut reasons = Vec::new();

        for spec in &self.parameters {
            match params.get(&spec.name) {
                None if spec.required => {
                    reasons.push(format!("missing required parameter '{}'", spec.name));
                }
                None => {}
                Some(value) if !spec.kind.matches(value) => {
                    reasons.push(format!(
                        "parameter '{}' must be {}, got {}",
                        spec.name,
                        spec.kind,
                        json_type_name(value)
                    ));
                }
                Some(_) => {}
            }
        }

        if self.deny_unknown {
            for key in params.keys() {
                if self.get(key).is_none() {
                    reasons.push(format!("unknown parameter '{key}'"));
                }
            }
        }

        reasons
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_f64() => "float",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Describes one capability served by an adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapabilityDescriptor {
    /// Capability name; the registry key.
    pub name: String,
    /// Category fixing the result payload shape.
    pub category: Category,
    /// Accepted parameters.
    #[serde(default)]
    pub parameters: ParameterSchema,
    /// Human-readable summary.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Third-party library the adapter wraps.
    pub library: String,
    /// Version of the wrapped library, as the adapter reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Library version the capability contract demands.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<VersionRequirement>,
}

impl CapabilityDescriptor {
    /// Create a descriptor with an open parameter schema.
    pub fn new(name: impl Into<String>, category: Category, library: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category,
            parameters: ParameterSchema::open(),
            description: None,
            library: library.into(),
            version: None,
            requires: None,
        }
    }

    /// Set the parameter schema.
    pub fn with_parameters(mut self, schema: ParameterSchema) -> Self {
        self.parameters = schema;
        self
    }

    /// Set the human-readable summary.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Record the wrapped library's version.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Demand a library version; checked when the adapter is registered.
    pub fn with_requirement(mut self, requirement: VersionRequirement) -> Self {
        self.requires = Some(requirement);
        self
    }
}
