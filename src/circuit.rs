//! Circuit descriptor.
//!
//! A library-neutral circuit: a qubit count and an ordered list of gate
//! operations. Gate names follow OpenQASM 3 naming (lowercase: `h`, `cx`,
//! `rz`, ...) so adapters can translate them one-to-one into the circuit
//! objects of the library they wrap.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// `(name, qubit arity, parameter count)` for every gate the descriptor
/// understands.
const GATE_TABLE: &[(&str, usize, usize)] = &[
    ("id", 1, 0),
    ("x", 1, 0),
    ("y", 1, 0),
    ("z", 1, 0),
    ("h", 1, 0),
    ("s", 1, 0),
    ("sdg", 1, 0),
    ("t", 1, 0),
    ("tdg", 1, 0),
    ("sx", 1, 0),
    ("rx", 1, 1),
    ("ry", 1, 1),
    ("rz", 1, 1),
    ("p", 1, 1),
    ("u", 1, 3),
    ("measure", 1, 0),
    ("reset", 1, 0),
    ("cx", 2, 0),
    ("cy", 2, 0),
    ("cz", 2, 0),
    ("swap", 2, 0),
    ("crx", 2, 1),
    ("cry", 2, 1),
    ("crz", 2, 1),
    ("cp", 2, 1),
    ("rxx", 2, 1),
    ("ryy", 2, 1),
    ("rzz", 2, 1),
    ("ccx", 3, 0),
    ("cswap", 3, 0),
];

/// Arity and parameter count of a known gate.
pub fn gate_signature(name: &str) -> Option<(usize, usize)> {
    GATE_TABLE
        .iter()
        .find(|(n, _, _)| *n == name)
        .map(|&(_, arity, params)| (arity, params))
}

/// One gate application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GateOp {
    pub name: String,
    pub qubits: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<f64>,
}

impl GateOp {
    pub fn new(name: impl Into<String>, qubits: Vec<u32>, params: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            qubits,
            params,
        }
    }
}

/// Ordered gate sequence over a fixed qubit register.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub num_qubits: u32,
    #[serde(default)]
    pub operations: Vec<GateOp>,
}

impl Circuit {
    pub fn new(num_qubits: u32) -> Self {
        Self {
            num_qubits,
            operations: Vec::new(),
        }
    }

    /// Append an operation without checking it; see [`Circuit::validate`].
    pub fn push(&mut self, op: GateOp) -> &mut Self {
        self.operations.push(op);
        self
    }

    pub fn h(&mut self, q: u32) -> &mut Self {
        self.push(GateOp::new("h", vec![q], vec![]))
    }

    pub fn x(&mut self, q: u32) -> &mut Self {
        self.push(GateOp::new("x", vec![q], vec![]))
    }

    pub fn rx(&mut self, theta: f64, q: u32) -> &mut Self {
        self.push(GateOp::new("rx", vec![q], vec![theta]))
    }

    pub fn rz(&mut self, theta: f64, q: u32) -> &mut Self {
        self.push(GateOp::new("rz", vec![q], vec![theta]))
    }

    pub fn cx(&mut self, control: u32, target: u32) -> &mut Self {
        self.push(GateOp::new("cx", vec![control, target], vec![]))
    }

    pub fn rzz(&mut self, theta: f64, a: u32, b: u32) -> &mut Self {
        self.push(GateOp::new("rzz", vec![a, b], vec![theta]))
    }

    pub fn measure(&mut self, q: u32) -> &mut Self {
        self.push(GateOp::new("measure", vec![q], vec![]))
    }

    pub fn measure_all(&mut self) -> &mut Self {
        for q in 0..self.num_qubits {
            self.measure(q);
        }
        self
    }

    /// Check every operation: known gate, arity, parameter count, qubit
    /// range and distinct operands. Stops at the first problem.
    pub fn validate(&self) -> Result<(), DescriptorError> {
        for op in &self.operations {
            let (arity, n_params) = gate_signature(&op.name)
                .ok_or_else(|| DescriptorError::UnknownGate(op.name.clone()))?;
            if op.qubits.len() != arity {
                return Err(DescriptorError::Arity {
                    gate: op.name.clone(),
                    expected: arity,
                    got: op.qubits.len(),
                });
            }
            if op.params.len() != n_params {
                return Err(DescriptorError::ParamCount {
                    gate: op.name.clone(),
                    expected: n_params,
                    got: op.params.len(),
                });
            }
            for (i, &q) in op.qubits.iter().enumerate() {
                if q >= self.num_qubits {
                    return Err(DescriptorError::QubitOutOfRange {
                        gate: op.name.clone(),
                        qubit: q,
                        num_qubits: self.num_qubits,
                    });
                }
                if op.qubits[..i].contains(&q) {
                    return Err(DescriptorError::DuplicateQubit {
                        gate: op.name.clone(),
                        qubit: q,
                    });
                }
            }
        }
        Ok(())
    }

    /// Circuit depth: the longest chain of operations sharing a qubit.
    /// Operands outside the register are ignored.
    pub fn depth(&self) -> usize {
        let mut layer = vec![0usize; self.num_qubits as usize];
        for op in &self.operations {
            let in_range: Vec<usize> = op
                .qubits
                .iter()
                .map(|&q| q as usize)
                .filter(|&q| q < layer.len())
                .collect();
            let next = in_range.iter().map(|&q| layer[q]).max().unwrap_or(0) + 1;
            for q in in_range {
                layer[q] = next;
            }
        }
        layer.into_iter().max().unwrap_or(0)
    }

    /// Number of operations per gate name.
    pub fn gate_counts(&self) -> FxHashMap<String, usize> {
        let mut counts = FxHashMap::default();
        for op in &self.operations {
            *counts.entry(op.name.clone()).or_default() += 1;
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell() -> Circuit {
        let mut circuit = Circuit::new(2);
        circuit.h(0).cx(0, 1).measure_all();
        circuit
    }

    #[test]
    fn test_gate_signature() {
        assert_eq!(gate_signature("cx"), Some((2, 0)));
        assert_eq!(gate_signature("u"), Some((1, 3)));
        assert_eq!(gate_signature("ecr"), None);
    }

    #[test]
    fn test_bell_is_valid() {
        let circuit = bell();
        assert!(circuit.validate().is_ok());
        assert_eq!(circuit.depth(), 3);
        assert_eq!(circuit.gate_counts()["measure"], 2);
    }

    #[test]
    fn test_validate_rejects_unknown_gate() {
        let mut circuit = Circuit::new(1);
        circuit.push(GateOp::new("ecr", vec![0], vec![]));
        assert_eq!(
            circuit.validate(),
            Err(DescriptorError::UnknownGate("ecr".into()))
        );
    }

    #[test]
    fn test_validate_rejects_bad_operands() {
        let mut circuit = Circuit::new(2);
        circuit.cx(0, 2);
        assert!(matches!(
            circuit.validate(),
            Err(DescriptorError::QubitOutOfRange { qubit: 2, .. })
        ));

        let mut circuit = Circuit::new(2);
        circuit.cx(1, 1);
        assert!(matches!(
            circuit.validate(),
            Err(DescriptorError::DuplicateQubit { qubit: 1, .. })
        ));

        let mut circuit = Circuit::new(2);
        circuit.push(GateOp::new("rx", vec![0], vec![]));
        assert!(matches!(
            circuit.validate(),
            Err(DescriptorError::ParamCount { expected: 1, got: 0, .. })
        ));
    }

    #[test]
    fn test_depth_parallel_gates() {
        let mut circuit = Circuit::new(4);
        circuit.h(0).h(1).h(2).h(3).rzz(0.3, 0, 1).rzz(0.3, 2, 3);
        assert_eq!(circuit.depth(), 2);
    }

    #[test]
    fn test_json_shape() {
        let mut circuit = Circuit::new(1);
        circuit.rx(0.5, 0);
        let value = serde_json::to_value(&circuit).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "num_qubits": 1,
                "operations": [{"name": "rx", "qubits": [0], "params": [0.5]}]
            })
        );
    }
}
