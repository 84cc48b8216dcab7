//! Dispatch request types.
//!
//! Each call through the dispatcher gets a [`RequestId`]. It is attached to
//! the `dispatch` tracing span and to the result metadata, so log lines and
//! results from concurrent calls can be matched up.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::params::Parameters;

/// Unique identifier for one dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub Uuid);

impl RequestId {
    /// Create a new random request ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a request ID from a string.
    pub fn parse(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A capability call: which capability, with what parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRequest {
    #[serde(default)]
    pub id: RequestId,
    pub capability: String,
    #[serde(default)]
    pub parameters: Parameters,
}

impl DispatchRequest {
    /// Request for `capability` with a fresh [`RequestId`].
    pub fn new(capability: impl Into<String>, parameters: Parameters) -> Self {
        Self {
            id: RequestId::new(),
            capability: capability.into(),
            parameters,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_ids_are_unique() {
        assert_ne!(RequestId::new(), RequestId::new());
    }

    #[test]
    fn test_request_id_roundtrips_through_display() {
        let id = RequestId::new();
        assert_eq!(RequestId::parse(&id.to_string()).unwrap(), id);
        assert!(RequestId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let req: DispatchRequest =
            serde_json::from_str(r#"{"capability": "shor-factor"}"#).unwrap();
        assert_eq!(req.capability, "shor-factor");
        assert!(req.parameters.is_empty());
    }
}
