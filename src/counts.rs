//! Measurement counts.
//!
//! Bitstring ordering: the rightmost bit corresponds to qubit 0, so
//! `"01"` means qubit 0 measured `1` and qubit 1 measured `0`. Adapters
//! wrapping libraries with the opposite convention reverse their keys
//! before building [`Counts`].

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement outcomes: bitstring to number of shots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(bitstring, count)` pairs. Duplicates are summed.
    pub fn from_pairs(iter: impl IntoIterator<Item = (impl Into<String>, u64)>) -> Self {
        let mut counts = Self::new();
        for (k, v) in iter {
            counts.insert(k, v);
        }
        counts
    }

    /// Add `count` shots to `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_default() += count;
    }

    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Register width shared by every bitstring, or `None` if the counts
    /// are empty, mix widths, or contain characters other than `0`/`1`.
    pub fn width(&self) -> Option<usize> {
        let mut width = None;
        for key in self.counts.keys() {
            if !key.bytes().all(|b| b == b'0' || b == b'1') {
                return None;
            }
            match width {
                None => width = Some(key.len()),
                Some(w) if w != key.len() => return None,
                Some(_) => {}
            }
        }
        width
    }

    /// Most frequent outcome. Ties go to the lexicographically smallest
    /// bitstring so the answer does not depend on hash order.
    pub fn most_frequent(&self) -> Option<(&String, u64)> {
        self.sorted().into_iter().next()
    }

    /// Outcomes sorted by count (descending), then bitstring (ascending).
    pub fn sorted(&self) -> Vec<(&String, u64)> {
        let mut items: Vec<_> = self.counts.iter().map(|(k, &v)| (k, v)).collect();
        items.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        items
    }

    /// Relative frequency of each outcome. Empty when no shots were taken.
    #[allow(clippy::cast_precision_loss)]
    pub fn probabilities(&self) -> FxHashMap<String, f64> {
        let total = self.total_shots() as f64;
        if total == 0.0 {
            return FxHashMap::default();
        }
        self.counts
            .iter()
            .map(|(k, &v)| (k.clone(), v as f64 / total))
            .collect()
    }

    /// Empirical `<Z>` on `qubit`: +1 for outcomes where it reads `0`,
    /// -1 where it reads `1`. `None` if the qubit is outside the register
    /// or no shots were taken.
    #[allow(clippy::cast_precision_loss)]
    pub fn expectation_z(&self, qubit: usize) -> Option<f64> {
        let width = self.width()?;
        if qubit >= width {
            return None;
        }
        let total = self.total_shots();
        if total == 0 {
            return None;
        }
        let idx = width - 1 - qubit;
        let signed: i128 = self
            .counts
            .iter()
            .map(|(k, &v)| {
                if k.as_bytes()[idx] == b'0' {
                    i128::from(v)
                } else {
                    -i128::from(v)
                }
            })
            .sum();
        Some(signed as f64 / total as f64)
    }
}

impl FromIterator<(String, u64)> for Counts {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut counts = Self::new();
        for (key, value) in iter {
            counts.insert(key, value);
        }
        counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_accumulate() {
        let counts = Counts::from_pairs([("00", 300), ("11", 200), ("00", 200)]);
        assert_eq!(counts.get("00"), 500);
        assert_eq!(counts.get("01"), 0);
        assert_eq!(counts.total_shots(), 700);
        assert_eq!(counts.len(), 2);
    }

    #[test]
    fn test_width() {
        assert_eq!(Counts::from_pairs([("010", 1), ("111", 2)]).width(), Some(3));
        assert_eq!(Counts::from_pairs([("01", 1), ("111", 2)]).width(), None);
        assert_eq!(Counts::from_pairs([("0x", 1)]).width(), None);
        assert_eq!(Counts::new().width(), None);
    }

    #[test]
    fn test_most_frequent_tie_break() {
        let counts = Counts::from_pairs([("11", 500), ("00", 500), ("01", 10)]);
        let (bits, count) = counts.most_frequent().unwrap();
        assert_eq!(bits, "00");
        assert_eq!(count, 500);
    }

    #[test]
    fn test_probabilities() {
        let counts = Counts::from_pairs([("0", 250), ("1", 750)]);
        let probs = counts.probabilities();
        assert!((probs["0"] - 0.25).abs() < 1e-12);
        assert!((probs["1"] - 0.75).abs() < 1e-12);
        assert!(Counts::new().probabilities().is_empty());
    }

    #[test]
    fn test_expectation_z_uses_rightmost_bit_for_qubit_zero() {
        // qubit 0 is always 1, qubit 1 is always 0
        let counts = Counts::from_pairs([("01", 100)]);
        assert!((counts.expectation_z(0).unwrap() + 1.0).abs() < 1e-12);
        assert!((counts.expectation_z(1).unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(counts.expectation_z(2), None);
    }

    #[test]
    fn test_serializes_as_map() {
        let counts = Counts::from_pairs([("10", 3)]);
        assert_eq!(
            serde_json::to_value(&counts).unwrap(),
            serde_json::json!({"10": 3})
        );
    }
}
