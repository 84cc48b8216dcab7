//! State-vector descriptor.
//!
//! A pure state over `n` qubits is stored as its `2^n` complex amplitudes
//! in computational-basis order. Basis index `i` maps to the bitstring of
//! `i` written MSB first, so the rightmost bit is qubit 0, the same
//! convention [`Counts`](crate::counts::Counts) uses.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::DescriptorError;

/// Tolerance on `|norm - 1|` accepted by [`StateVector::new`].
pub const NORM_TOLERANCE: f64 = 1e-9;

/// Largest register [`StateVector::zero_state`] will allocate (4 GiB of
/// amplitudes).
pub const MAX_QUBITS: u32 = 28;

/// Normalized pure quantum state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Complex64>", into = "Vec<Complex64>")]
pub struct StateVector {
    amplitudes: Vec<Complex64>,
}

impl StateVector {
    /// Validate and wrap amplitudes.
    pub fn new(amplitudes: Vec<Complex64>) -> Result<Self, DescriptorError> {
        if amplitudes.is_empty() {
            return Err(DescriptorError::EmptyState);
        }
        if !amplitudes.len().is_power_of_two() {
            return Err(DescriptorError::NotPowerOfTwo(amplitudes.len()));
        }
        let norm = amplitudes.iter().map(Complex64::norm_sqr).sum::<f64>().sqrt();
        if !norm.is_finite() || (norm - 1.0).abs() > NORM_TOLERANCE {
            return Err(DescriptorError::NotNormalized(norm));
        }
        Ok(Self { amplitudes })
    }

    /// `|0...0>` on `num_qubits` qubits, at most [`MAX_QUBITS`].
    pub fn zero_state(num_qubits: u32) -> Result<Self, DescriptorError> {
        if num_qubits > MAX_QUBITS {
            return Err(DescriptorError::TooManyQubits {
                requested: num_qubits,
                max: MAX_QUBITS,
            });
        }
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); 1usize << num_qubits];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Ok(Self { amplitudes })
    }

    pub fn num_qubits(&self) -> u32 {
        self.amplitudes.len().trailing_zeros()
    }

    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    pub fn norm(&self) -> f64 {
        self.amplitudes
            .iter()
            .map(Complex64::norm_sqr)
            .sum::<f64>()
            .sqrt()
    }

    /// Born-rule probability of each basis state.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(Complex64::norm_sqr).collect()
    }

    /// Most probable basis state as `(index, bitstring)`. Ties go to the
    /// lowest index.
    pub fn most_probable(&self) -> (usize, String) {
        let mut best = 0;
        let mut best_p = f64::MIN;
        for (i, p) in self.probabilities().into_iter().enumerate() {
            if p > best_p {
                best = i;
                best_p = p;
            }
        }
        (best, self.bitstring(best))
    }

    /// Bitstring label of a basis index (rightmost bit = qubit 0).
    pub fn bitstring(&self, index: usize) -> String {
        let width = self.num_qubits() as usize;
        if width == 0 {
            return String::new();
        }
        format!("{index:0width$b}")
    }
}

impl TryFrom<Vec<Complex64>> for StateVector {
    type Error = DescriptorError;

    fn try_from(amplitudes: Vec<Complex64>) -> Result<Self, Self::Error> {
        Self::new(amplitudes)
    }
}

impl From<StateVector> for Vec<Complex64> {
    fn from(state: StateVector) -> Self {
        state.amplitudes
    }
}
