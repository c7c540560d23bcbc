//! Dense truth tables over a small number of variables.
//!
//! Bit `x` of a table holds `f(x)` where bit `j` of `x` is the value of
//! variable `j`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{SynthError, SynthResult};

/// Largest supported variable count.
pub const MAX_VARS: u32 = 20;

/// A completely specified boolean function of `num_vars` variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TruthTable {
    num_vars: u32,
    words: Vec<u64>,
}

impl TruthTable {
    /// The constant-zero function.
    pub fn new(num_vars: u32) -> Self {
        debug_assert!(num_vars <= MAX_VARS);
        let num_words = (1usize << num_vars).div_ceil(64);
        Self {
            num_vars,
            words: vec![0; num_words],
        }
    }

    /// Build a table by evaluating `f` on every input.
    pub fn from_fn(num_vars: u32, f: impl Fn(u64) -> bool) -> Self {
        let mut tt = Self::new(num_vars);
        for x in 0..tt.num_bits() {
            if f(x) {
                tt.set(x, true);
            }
        }
        tt
    }

    /// Build a table from the set of inputs where the function is one.
    pub fn from_minterms(num_vars: u32, minterms: &[u64]) -> SynthResult<Self> {
        let mut tt = Self::new(num_vars);
        for &m in minterms {
            if m >= tt.num_bits() {
                return Err(SynthError::InvalidTruthTable(format!(
                    "minterm {m} out of range for {num_vars} variables"
                )));
            }
            tt.set(m, true);
        }
        Ok(tt)
    }

    /// Parse a binary string, most significant bit (input `2^n - 1`) first.
    pub fn from_binary_str(s: &str) -> SynthResult<Self> {
        let len = s.len();
        if len == 0 || !len.is_power_of_two() {
            return Err(SynthError::InvalidTruthTable(format!(
                "length {len} is not a power of two"
            )));
        }
        let num_vars = len.trailing_zeros();
        if num_vars > MAX_VARS {
            return Err(SynthError::InvalidTruthTable(format!(
                "{num_vars} variables exceed the limit of {MAX_VARS}"
            )));
        }
        let mut tt = Self::new(num_vars);
        for (i, ch) in s.chars().rev().enumerate() {
            match ch {
                '0' => {}
                '1' => tt.set(i as u64, true),
                other => {
                    return Err(SynthError::InvalidTruthTable(format!(
                        "unexpected character '{other}'"
                    )));
                }
            }
        }
        Ok(tt)
    }

    /// The projection onto variable `var`.
    pub fn nth_var(num_vars: u32, var: u32) -> Self {
        Self::from_fn(num_vars, |x| (x >> var) & 1 == 1)
    }

    /// The parity of all variables.
    pub fn parity(num_vars: u32) -> Self {
        Self::from_fn(num_vars, |x| x.count_ones() % 2 == 1)
    }

    /// Number of variables.
    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Number of rows, `2^num_vars`.
    pub fn num_bits(&self) -> u64 {
        1u64 << self.num_vars
    }

    /// Value at input `x`.
    pub fn get(&self, x: u64) -> bool {
        (self.words[(x / 64) as usize] >> (x % 64)) & 1 == 1
    }

    /// Set the value at input `x`.
    pub fn set(&mut self, x: u64, value: bool) {
        let word = &mut self.words[(x / 64) as usize];
        if value {
            *word |= 1 << (x % 64);
        } else {
            *word &= !(1 << (x % 64));
        }
    }

    /// Check if the function is constant zero.
    pub fn is_const0(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Number of inputs where the function is one.
    pub fn count_ones(&self) -> u64 {
        self.words.iter().map(|w| u64::from(w.count_ones())).sum()
    }

    /// Inputs where the function is one, ascending.
    pub fn minterms(&self) -> Vec<u64> {
        (0..self.num_bits()).filter(|&x| self.get(x)).collect()
    }

    /// Check if the function is the parity of all its variables.
    pub fn is_parity(&self) -> bool {
        self.num_vars > 0 && *self == Self::parity(self.num_vars)
    }

    /// The negated function.
    #[must_use]
    pub fn complement(&self) -> Self {
        Self::from_fn(self.num_vars, |x| !self.get(x))
    }

    /// The function with variable `var` negated.
    #[must_use]
    pub fn flip(&self, var: u32) -> Self {
        Self::from_fn(self.num_vars, |x| self.get(x ^ (1 << var)))
    }

    /// Positive-polarity Reed-Muller expansion.
    ///
    /// Returns the monomials with non-zero coefficient, each as a mask of
    /// the variables it multiplies; mask `0` is the constant one.
    pub fn pprm(&self) -> Vec<u64> {
        let mut coeffs: Vec<bool> = (0..self.num_bits()).map(|x| self.get(x)).collect();
        for var in 0..self.num_vars {
            let bit = 1usize << var;
            for x in 0..coeffs.len() {
                if x & bit != 0 {
                    coeffs[x] ^= coeffs[x ^ bit];
                }
            }
        }
        coeffs
            .iter()
            .enumerate()
            .filter(|(_, c)| **c)
            .map(|(m, _)| m as u64)
            .collect()
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for x in (0..self.num_bits()).rev() {
            write!(f, "{}", if self.get(x) { '1' } else { '0' })?;
        }
        Ok(())
    }
}
