//! Measurement results.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{HalError, HalResult};

/// A fixed-length measurement outcome.
///
/// Bit `i` is the outcome of the `i`-th measured qubit. The textual form
/// prints bit 0 leftmost, and the integer value reads that text as a binary
/// number, so bit 0 is the most significant bit. The derived ordering agrees
/// with integer order for bitstrings of equal width.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bitstring(Vec<bool>);

impl Bitstring {
    /// Create a bitstring from individual bits.
    pub fn from_bits(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    /// The `width`-bit bitstring whose integer value is `index`.
    pub fn from_index(index: usize, width: usize) -> Self {
        Self(
            (0..width)
                .map(|i| (index >> (width - 1 - i)) & 1 == 1)
                .collect(),
        )
    }

    /// Integer value, bit 0 most significant.
    pub fn to_index(&self) -> usize {
        self.0
            .iter()
            .fold(0usize, |acc, &bit| (acc << 1) | usize::from(bit))
    }

    /// Number of bits.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the bitstring has no bits.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Outcome of the `i`-th measured qubit.
    pub fn bit(&self, i: usize) -> Option<bool> {
        self.0.get(i).copied()
    }

    /// All bits in measurement order.
    pub fn bits(&self) -> &[bool] {
        &self.0
    }
}

impl fmt::Display for Bitstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &bit in &self.0 {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for Bitstring {
    type Err = HalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                _ => Err(HalError::InvalidBitstring(s.to_string())),
            })
            .collect::<HalResult<Vec<_>>>()
            .map(Self)
    }
}

/// Measurement counts from a circuit execution.
///
/// All bitstrings share one width, fixed by the first insertion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, u64>", into = "BTreeMap<String, u64>")]
pub struct Counts {
    counts: BTreeMap<Bitstring, u64>,
    width: Option<usize>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Dense counts indexed by integer bitstring value.
    ///
    /// Every one of the `values.len()` outcomes is listed, zeros included.
    pub fn from_dense(width: usize, values: &[u64]) -> HalResult<Self> {
        if values.len() != 1usize << width {
            return Err(HalError::ShapeMismatch {
                expected: 1usize << width,
                got: values.len(),
            });
        }
        let mut counts = Self::new();
        for (index, &value) in values.iter().enumerate() {
            counts.insert(Bitstring::from_index(index, width), value)?;
        }
        Ok(counts)
    }

    fn check_width(&mut self, bitstring: &Bitstring) -> HalResult<()> {
        match self.width {
            Some(expected) if expected != bitstring.len() => Err(HalError::ShapeMismatch {
                expected,
                got: bitstring.len(),
            }),
            Some(_) => Ok(()),
            None => {
                self.width = Some(bitstring.len());
                Ok(())
            }
        }
    }

    /// Set the count for a bitstring.
    pub fn insert(&mut self, bitstring: Bitstring, count: u64) -> HalResult<()> {
        self.check_width(&bitstring)?;
        self.counts.insert(bitstring, count);
        Ok(())
    }

    /// Add to the count for a bitstring.
    pub fn add(&mut self, bitstring: Bitstring, count: u64) -> HalResult<()> {
        self.check_width(&bitstring)?;
        *self.counts.entry(bitstring).or_insert(0) += count;
        Ok(())
    }

    /// Count for a bitstring (zero when absent).
    pub fn get(&self, bitstring: &Bitstring) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Count for a textual bitstring (zero when absent or malformed).
    pub fn get_str(&self, bitstring: &str) -> u64 {
        bitstring
            .parse::<Bitstring>()
            .map(|b| self.get(&b))
            .unwrap_or(0)
    }

    /// Total number of shots.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Bitstring width, `None` while empty.
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// Number of distinct outcomes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether there are no outcomes.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Iterate in increasing integer order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bitstring, &u64)> {
        self.counts.iter()
    }

    /// Most frequent outcome.
    pub fn most_frequent(&self) -> Option<(&Bitstring, u64)> {
        self.counts
            .iter()
            .max_by_key(|(_, c)| **c)
            .map(|(b, c)| (b, *c))
    }

    /// Dense counts of length `2^width`, indexed by integer bitstring value.
    pub fn to_dense(&self) -> Vec<u64> {
        let width = self.width.unwrap_or(0);
        let mut dense = vec![0u64; 1usize << width];
        for (bitstring, &count) in &self.counts {
            dense[bitstring.to_index()] += count;
        }
        dense
    }

    /// Dense probability vector of length `2^width`.
    pub fn probabilities(&self) -> Vec<f64> {
        let total = self.total();
        let dense = self.to_dense();
        if total == 0 {
            return vec![0.0; dense.len()];
        }
        dense.iter().map(|&c| c as f64 / total as f64).collect()
    }
}

impl TryFrom<BTreeMap<String, u64>> for Counts {
    type Error = HalError;

    fn try_from(map: BTreeMap<String, u64>) -> Result<Self, Self::Error> {
        let mut counts = Counts::new();
        for (text, count) in map {
            counts.insert(text.parse()?, count)?;
        }
        Ok(counts)
    }
}

impl From<Counts> for BTreeMap<String, u64> {
    fn from(counts: Counts) -> Self {
        counts
            .counts
            .into_iter()
            .map(|(b, c)| (b.to_string(), c))
            .collect()
    }
}

impl<'a> IntoIterator for &'a Counts {
    type Item = (&'a Bitstring, &'a u64);
    type IntoIter = std::collections::btree_map::Iter<'a, Bitstring, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.counts.iter()
    }
}
