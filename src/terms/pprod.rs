use std::fmt::Display;

use itertools::Itertools;
use smallvec::SmallVec;

use super::Term;

/// A power product `x_1^e_1 * ... * x_k^e_k`.
///
/// Variables are sorted by term reference and every exponent is positive.
/// The empty product stands for the constant monomial.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PowerProduct(SmallVec<[(Term, u32); 2]>);

impl PowerProduct {
    /// The empty product
    pub fn one() -> Self {
        Self(SmallVec::new())
    }

    pub fn var(t: Term) -> Self {
        let mut v = SmallVec::new();
        v.push((t, 1));
        Self(v)
    }

    /// Builds the product from arbitrary `(variable, exponent)` pairs.
    /// Repeated variables are merged and zero exponents are dropped.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Term, u32)>) -> Self {
        let mut v: SmallVec<[(Term, u32); 2]> = pairs.into_iter().filter(|(_, e)| *e > 0).collect();
        v.sort_by_key(|(t, _)| *t);
        let mut merged: SmallVec<[(Term, u32); 2]> = SmallVec::with_capacity(v.len());
        for (t, e) in v {
            match merged.last_mut() {
                Some((last, le)) if *last == t => *le += e,
                _ => merged.push((t, e)),
            }
        }
        Self(merged)
    }

    pub fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the variable if this is a product `x^1`.
    pub fn as_var(&self) -> Option<Term> {
        match self.0.as_slice() {
            [(t, 1)] => Some(*t),
            _ => None,
        }
    }

    /// Total degree
    pub fn degree(&self) -> u64 {
        self.0.iter().map(|(_, e)| *e as u64).sum()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Term, u32)> {
        self.0.iter()
    }

    pub fn vars(&self) -> impl Iterator<Item = Term> + '_ {
        self.0.iter().map(|(t, _)| *t)
    }

    /// Returns the product of `self` and `other`.
    pub fn mul(&self, other: &PowerProduct) -> PowerProduct {
        if self.is_one() {
            return other.clone();
        }
        if other.is_one() {
            return self.clone();
        }
        let mut res: SmallVec<[(Term, u32); 2]> = SmallVec::with_capacity(self.len() + other.len());
        let (mut i, mut j) = (0, 0);
        while i < self.0.len() && j < other.0.len() {
            let (a, ea) = self.0[i];
            let (b, eb) = other.0[j];
            if a == b {
                res.push((a, ea + eb));
                i += 1;
                j += 1;
            } else if a < b {
                res.push((a, ea));
                i += 1;
            } else {
                res.push((b, eb));
                j += 1;
            }
        }
        res.extend_from_slice(&self.0[i..]);
        res.extend_from_slice(&other.0[j..]);
        PowerProduct(res)
    }

    /// Raises the product to the power `d`.
    pub fn pow(&self, d: u32) -> PowerProduct {
        if d == 0 {
            return PowerProduct::one();
        }
        PowerProduct(self.0.iter().map(|(t, e)| (*t, e * d)).collect())
    }
}

impl Display for PowerProduct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_one() {
            return write!(f, "1");
        }
        let s = self
            .0
            .iter()
            .map(|(t, e)| {
                if *e == 1 {
                    t.to_string()
                } else {
                    format!("{}^{}", t, e)
                }
            })
            .join("*");
        write!(f, "{}", s)
    }
}
