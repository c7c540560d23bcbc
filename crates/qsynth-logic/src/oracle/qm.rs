//! Quine–McCluskey two-level minimization.
//!
//! Terms are rendered as strings over `{0, 1, -}`; character `i` is
//! variable `i`, which is bit `n - 1 - i` of a minterm.

use std::collections::BTreeSet;
use std::fmt;

use rustc_hash::FxHashSet;
use tracing::{debug, trace};

/// A product term: the minterm bits it fixes plus a mask of free positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Implicant {
    num_vars: u32,
    /// Values of the fixed positions; free positions are zero.
    bits: u64,
    /// Minterm bits that are don't-care.
    free: u64,
}

impl Implicant {
    /// The term covering exactly `minterm`.
    pub fn minterm(num_vars: u32, minterm: u64) -> Self {
        Self {
            num_vars,
            bits: minterm,
            free: 0,
        }
    }

    /// The term covering every assignment.
    pub fn tautology(num_vars: u32) -> Self {
        Self {
            num_vars,
            bits: 0,
            free: mask(num_vars),
        }
    }

    /// Parse a term string; character `i` is variable `i`.
    pub fn parse(term: &str) -> Option<Self> {
        let num_vars = term.len() as u32;
        if num_vars > 64 {
            return None;
        }
        let mut imp = Self {
            num_vars,
            bits: 0,
            free: 0,
        };
        for (i, ch) in term.chars().enumerate() {
            let bit = 1u64 << (num_vars as usize - 1 - i);
            match ch {
                '0' => {}
                '1' => imp.bits |= bit,
                '-' => imp.free |= bit,
                _ => return None,
            }
        }
        Some(imp)
    }

    /// Number of variables.
    pub fn num_vars(&self) -> u32 {
        self.num_vars
    }

    /// Number of fixed positions.
    pub fn num_literals(&self) -> u32 {
        self.num_vars - self.free.count_ones()
    }

    /// Literal of variable `var`: `Some(value)` if fixed, `None` if free.
    pub fn literal(&self, var: u32) -> Option<bool> {
        let bit = 1u64 << (self.num_vars - 1 - var);
        (self.free & bit == 0).then_some(self.bits & bit != 0)
    }

    /// Check if the term covers `minterm`.
    pub fn covers(&self, minterm: u64) -> bool {
        minterm & !self.free == self.bits
    }

    /// Check if the two terms share an assignment.
    pub fn intersects(&self, other: &Implicant) -> bool {
        (self.bits ^ other.bits) & !self.free & !other.free == 0
    }

    /// Merge two terms that differ in exactly one fixed position.
    fn merge(&self, other: &Implicant) -> Option<Implicant> {
        if self.free != other.free {
            return None;
        }
        let diff = self.bits ^ other.bits;
        (diff.count_ones() == 1).then_some(Implicant {
            num_vars: self.num_vars,
            bits: self.bits & !diff,
            free: self.free | diff,
        })
    }

    /// Disjoint decomposition of `self` minus `other` (cube sharp).
    pub fn sharp(&self, other: &Implicant) -> Vec<Implicant> {
        if !self.intersects(other) {
            return vec![*self];
        }
        let mut pieces = Vec::new();
        let mut rest = *self;
        for var in 0..self.num_vars {
            let bit = 1u64 << (self.num_vars - 1 - var);
            if other.free & bit != 0 || rest.free & bit == 0 {
                continue;
            }
            // Split on `var`: the half disagreeing with `other` is outside it.
            let mut piece = rest;
            piece.free &= !bit;
            piece.bits = (piece.bits & !bit) | (!other.bits & bit);
            pieces.push(piece);
            rest.free &= !bit;
            rest.bits = (rest.bits & !bit) | (other.bits & bit);
        }
        pieces
    }
}

impl fmt::Display for Implicant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for var in 0..self.num_vars {
            let ch = match self.literal(var) {
                None => '-',
                Some(true) => '1',
                Some(false) => '0',
            };
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

fn mask(num_vars: u32) -> u64 {
    if num_vars >= 64 {
        u64::MAX
    } else {
        (1u64 << num_vars) - 1
    }
}

/// Compute every prime implicant of the function with the given minterms.
///
/// Every minterm must fit in `num_vars` bits; [`OracleTable::new`] checks
/// this for oracle rows.
///
/// [`OracleTable::new`]: super::OracleTable::new
pub fn prime_implicants(num_vars: u32, minterms: &[u64]) -> Vec<Implicant> {
    debug_assert!(
        minterms.iter().all(|&m| m & !mask(num_vars) == 0),
        "minterm out of range for {num_vars} variables"
    );
    let mut current: BTreeSet<Implicant> = minterms
        .iter()
        .map(|&m| Implicant::minterm(num_vars, m))
        .collect();
    let mut primes = BTreeSet::new();

    while !current.is_empty() {
        // Group by the number of ones among the fixed positions.
        let mut groups: Vec<Vec<Implicant>> = vec![Vec::new(); num_vars as usize + 1];
        for imp in &current {
            groups[imp.bits.count_ones() as usize].push(*imp);
        }

        let mut merged_away: FxHashSet<Implicant> = FxHashSet::default();
        let mut next = BTreeSet::new();
        for pair in groups.windows(2) {
            for a in &pair[0] {
                for b in &pair[1] {
                    if let Some(m) = a.merge(b) {
                        merged_away.insert(*a);
                        merged_away.insert(*b);
                        next.insert(m);
                    }
                }
            }
        }
        trace!(
            "qm round: {} terms, {} merged",
            current.len(),
            next.len()
        );
        primes.extend(current.into_iter().filter(|t| !merged_away.contains(t)));
        current = next;
    }
    primes.into_iter().collect()
}

/// Pick a cover of `minterms` from `primes`.
///
/// Essential implicants are taken first; the rest is filled greedily with
/// the implicant covering the most uncovered minterms, preferring fewer
/// literals and then the smaller term string.
pub fn select_cover(primes: &[Implicant], minterms: &[u64]) -> Vec<Implicant> {
    let mut uncovered: BTreeSet<u64> = minterms.iter().copied().collect();
    let mut cover: Vec<Implicant> = Vec::new();

    let mut essential: BTreeSet<Implicant> = BTreeSet::new();
    for &m in &uncovered {
        let mut covering = primes.iter().filter(|p| p.covers(m));
        if let (Some(only), None) = (covering.next(), covering.next()) {
            essential.insert(*only);
        }
    }
    for imp in essential {
        uncovered.retain(|&m| !imp.covers(m));
        cover.push(imp);
    }

    while !uncovered.is_empty() {
        let best = primes
            .iter()
            .filter(|p| !cover.contains(p))
            .map(|p| (p, uncovered.iter().filter(|&&m| p.covers(m)).count()))
            .filter(|&(_, gain)| gain > 0)
            .min_by(|(a, ga), (b, gb)| {
                gb.cmp(ga)
                    .then(a.num_literals().cmp(&b.num_literals()))
                    .then_with(|| a.to_string().cmp(&b.to_string()))
            });
        let Some((&imp, _)) = best else {
            break;
        };
        uncovered.retain(|&m| !imp.covers(m));
        cover.push(imp);
    }
    cover
}

/// Minimize the function of `num_vars` variables that is one exactly on
/// `minterms`, returning the cover as term strings.
///
/// Minterms must fit in `num_vars` bits.
pub fn minimize(num_vars: u32, minterms: &[u64]) -> Vec<String> {
    minimize_implicants(num_vars, minterms)
        .iter()
        .map(Implicant::to_string)
        .collect()
}

/// [`minimize`] returning the implicants themselves.
pub fn minimize_implicants(num_vars: u32, minterms: &[u64]) -> Vec<Implicant> {
    if minterms.is_empty() {
        return Vec::new();
    }
    let primes = prime_implicants(num_vars, minterms);
    let cover = select_cover(&primes, minterms);
    debug!(
        "qm: {} minterms over {} vars -> {} primes, cover of {}",
        minterms.len(),
        num_vars,
        primes.len(),
        cover.len()
    );
    cover
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_function_is_tautology() {
        assert_eq!(minimize(2, &[0, 1, 2, 3]), vec!["--"]);
    }

    #[test]
    fn test_single_variable() {
        assert_eq!(minimize(2, &[1, 3]), vec!["-1"]);
        assert_eq!(minimize(2, &[2, 3]), vec!["1-"]);
    }

    #[test]
    fn test_empty_function() {
        assert!(minimize(3, &[]).is_empty());
    }

    #[test]
    fn test_classic_example() {
        // f(a, b, c, d) = sum m(4, 8, 10, 11, 12, 15)
        let cover = minimize(4, &[4, 8, 10, 11, 12, 15]);
        let terms: BTreeSet<&str> = cover.iter().map(String::as_str).collect();
        for m in [4u64, 8, 10, 11, 12, 15] {
            assert!(cover
                .iter()
                .any(|t| Implicant::parse(t).unwrap().covers(m)));
        }
        for m in [0u64, 1, 2, 3, 5, 6, 7, 9, 13, 14] {
            assert!(!cover
                .iter()
                .any(|t| Implicant::parse(t).unwrap().covers(m)));
        }
        assert!(terms.contains("-100"));
        assert!(terms.contains("1-11"));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of range")]
    fn test_out_of_range_minterm_panics() {
        minimize(2, &[4]);
    }

    #[test]
    fn test_prime_implicants_of_xor() {
        let primes = prime_implicants(2, &[1, 2]);
        let strs: Vec<String> = primes.iter().map(Implicant::to_string).collect();
        assert_eq!(strs.len(), 2);
        assert!(strs.contains(&"01".to_string()));
        assert!(strs.contains(&"10".to_string()));
    }

    #[test]
    fn test_parse_display() {
        let imp = Implicant::parse("1-0").unwrap();
        assert_eq!(imp.to_string(), "1-0");
        assert_eq!(imp.num_literals(), 2);
        assert!(imp.covers(0b100));
        assert!(imp.covers(0b110));
        assert!(!imp.covers(0b101));
        assert!(Implicant::parse("1x").is_none());
    }

    #[test]
    fn test_sharp_is_disjoint() {
        let a = Implicant::tautology(3);
        let b = Implicant::parse("1-0").unwrap();
        let pieces = a.sharp(&b);
        for m in 0..8u64 {
            let hits = pieces.iter().filter(|p| p.covers(m)).count();
            assert_eq!(hits, usize::from(!b.covers(m)), "minterm {m}");
        }
    }
}
