//! Request parameters.
//!
//! Parameters travel as a JSON object so one call contract fits every
//! wrapped library. Adapters read them through the typed `require_*` /
//! `get_*` accessors, which turn shape mismatches into
//! [`AdapterError::InvalidParameter`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{AdapterError, AdapterResult};
use crate::interop::StandardResult;

/// Parameters for one capability call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Map<String, Value>);

impl Parameters {
    /// Empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON value. Returns `None` unless the value is an object.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    /// Turn a previous result's payload into parameters for the next call.
    ///
    /// Object payloads are used as-is; anything else is placed under the
    /// key `"value"`.
    pub fn from_result(result: &StandardResult) -> Self {
        match result.payload.to_value() {
            Value::Object(map) => Self(map),
            other => Self::new().with("value", other),
        }
    }

    /// Insert a parameter, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a parameter, returning the value it replaced.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Raw JSON value for `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Parameter names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Borrow the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Convert into a JSON object value.
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Optional non-negative integer. `None` if missing or mistyped.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    /// Optional number.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.0.get(key).and_then(Value::as_f64)
    }

    /// Optional boolean.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    /// Optional string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// Required non-negative integer.
    pub fn require_u64(&self, key: &str) -> AdapterResult<u64> {
        self.require(key)?
            .as_u64()
            .ok_or_else(|| AdapterError::invalid(key, "expected a non-negative integer"))
    }

    /// Required number.
    pub fn require_f64(&self, key: &str) -> AdapterResult<f64> {
        self.require(key)?
            .as_f64()
            .ok_or_else(|| AdapterError::invalid(key, "expected a number"))
    }

    /// Required string.
    pub fn require_str(&self, key: &str) -> AdapterResult<&str> {
        self.require(key)?
            .as_str()
            .ok_or_else(|| AdapterError::invalid(key, "expected a string"))
    }

    /// Required array.
    pub fn require_array(&self, key: &str) -> AdapterResult<&Vec<Value>> {
        self.require(key)?
            .as_array()
            .ok_or_else(|| AdapterError::invalid(key, "expected an array"))
    }

    /// Required value deserialized into `T`.
    pub fn require_as<T: serde::de::DeserializeOwned>(&self, key: &str) -> AdapterResult<T> {
        let value = self.require(key)?;
        serde_json::from_value(value.clone()).map_err(|e| AdapterError::invalid(key, e.to_string()))
    }

    fn require(&self, key: &str) -> AdapterResult<&Value> {
        self.0
            .get(key)
            .ok_or_else(|| AdapterError::invalid(key, "missing"))
    }
}

impl From<Map<String, Value>> for Parameters {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for Parameters {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::interop::{Payload, StandardResult};

    #[test]
    fn test_from_value_requires_object() {
        assert!(Parameters::from_value(json!({"x": 1})).is_some());
        assert!(Parameters::from_value(json!([1, 2])).is_none());
        assert!(Parameters::from_value(json!(null)).is_none());
    }

    #[test]
    fn test_typed_accessors() {
        let params = Parameters::new()
            .with("n", 15)
            .with("time", 0.5)
            .with("scheme", "Kyber512")
            .with("marked", json!([3, 5]));

        assert_eq!(params.require_u64("n").unwrap(), 15);
        assert!((params.require_f64("time").unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(params.require_str("scheme").unwrap(), "Kyber512");
        assert_eq!(params.require_array("marked").unwrap().len(), 2);
        let marked: Vec<u64> = params.require_as("marked").unwrap();
        assert_eq!(marked, vec![3, 5]);
        assert_eq!(params.get_bool("verbose"), None);
    }

    #[test]
    fn test_require_reports_parameter_name() {
        let params = Parameters::new().with("n", "fifteen");
        let err = params.require_u64("n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "parameter 'n': expected a non-negative integer"
        );
        let err = params.require_u64("missing").unwrap_err();
        assert_eq!(err.to_string(), "parameter 'missing': missing");
    }

    #[test]
    fn test_from_result_object_payload() {
        let result = StandardResult::completed(Payload::Algorithm(json!({"factors": [3, 5]})));
        let params = Parameters::from_result(&result);
        assert_eq!(params.get("factors"), Some(&json!([3, 5])));
    }

    #[test]
    fn test_from_result_scalar_payload() {
        let result = StandardResult::completed(Payload::Algorithm(json!(42)));
        let params = Parameters::from_result(&result);
        assert_eq!(params.get_u64("value"), Some(42));
    }

    #[test]
    fn test_serializes_as_plain_object() {
        let params = Parameters::new().with("x", 1);
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({"x": 1}));
    }
}
