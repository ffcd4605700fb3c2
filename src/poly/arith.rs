use std::collections::BTreeMap;

use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};

use super::Scratch;
use crate::terms::{PowerProduct, Term, TermKind, TermTable};

/// A rational polynomial under construction.
///
/// Monomials are kept sorted by power product with zero coefficients removed, so the constant monomial (if any) comes first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArithBuffer {
    monomials: BTreeMap<PowerProduct, BigRational>,
}

impl Scratch for ArithBuffer {
    fn reset(&mut self) {
        self.monomials.clear();
    }
}

impl ArithBuffer {
    pub fn is_zero(&self) -> bool {
        self.monomials.is_empty()
    }

    pub fn len(&self) -> usize {
        self.monomials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomials.is_empty()
    }

    /// Returns the value of the polynomial if it is constant.
    pub fn constant(&self) -> Option<BigRational> {
        match self.monomials.len() {
            0 => Some(BigRational::zero()),
            1 => self
                .monomials
                .get(&PowerProduct::one())
                .cloned(),
            _ => None,
        }
    }

    /// The constant monomial, zero if absent.
    pub fn constant_part(&self) -> BigRational {
        self.monomials
            .get(&PowerProduct::one())
            .cloned()
            .unwrap_or_else(BigRational::zero)
    }

    pub fn monomials(&self) -> impl Iterator<Item = (&PowerProduct, &BigRational)> {
        self.monomials.iter()
    }

    /// Total degree, 0 for the zero polynomial.
    pub fn degree(&self) -> u64 {
        self.monomials.keys().map(|pp| pp.degree()).max().unwrap_or(0)
    }

    /* Additive operations */

    pub fn add_mono(&mut self, coeff: &BigRational, pp: &PowerProduct) {
        if coeff.is_zero() {
            return;
        }
        let entry = self
            .monomials
            .entry(pp.clone())
            .or_insert_with(BigRational::zero);
        *entry += coeff;
        if entry.is_zero() {
            self.monomials.remove(pp);
        }
    }

    pub fn add_const(&mut self, q: &BigRational) {
        self.add_mono(q, &PowerProduct::one());
    }

    /// Adds `coeff * other` to this buffer.
    pub fn add_scaled_buffer(&mut self, other: &ArithBuffer, coeff: &BigRational) {
        for (pp, c) in other.monomials.iter() {
            self.add_mono(&(c * coeff), pp);
        }
    }

    pub fn add_buffer(&mut self, other: &ArithBuffer) {
        self.add_scaled_buffer(other, &BigRational::one());
    }

    pub fn sub_buffer(&mut self, other: &ArithBuffer) {
        self.add_scaled_buffer(other, &-BigRational::one());
    }

    pub fn negate(&mut self) {
        for c in self.monomials.values_mut() {
            *c = -c.clone();
        }
    }

    /* Multiplicative operations */

    pub fn mul_const(&mut self, q: &BigRational) {
        if q.is_zero() {
            self.monomials.clear();
            return;
        }
        for c in self.monomials.values_mut() {
            *c *= q;
        }
    }

    /// Divides all coefficients by `q`, which must be non-zero.
    pub fn div_const(&mut self, q: &BigRational) {
        debug_assert!(!q.is_zero());
        for c in self.monomials.values_mut() {
            *c /= q;
        }
    }

    pub fn mul_mono(&mut self, coeff: &BigRational, pp: &PowerProduct) {
        if coeff.is_zero() {
            self.monomials.clear();
            return;
        }
        let old = std::mem::take(&mut self.monomials);
        for (p, c) in old {
            self.add_mono(&(c * coeff), &p.mul(pp));
        }
    }

    pub fn mul_buffer(&mut self, other: &ArithBuffer) {
        let old = std::mem::take(&mut self.monomials);
        for (p1, c1) in old.iter() {
            for (p2, c2) in other.monomials.iter() {
                self.add_mono(&(c1 * c2), &p1.mul(p2));
            }
        }
    }

    pub fn square(&mut self) {
        let copy = self.clone();
        self.mul_buffer(&copy);
    }

    /// Degree of the product of this buffer with `other`, computed without building it.
    pub fn product_degree(&self, other: &ArithBuffer) -> u64 {
        if self.is_zero() || other.is_zero() {
            0
        } else {
            self.degree() + other.degree()
        }
    }

    /* Terms */

    /// Adds `coeff * t` to the buffer, where `t` is an arithmetic term.
    pub fn add_term(&mut self, terms: &TermTable, t: Term, coeff: &BigRational) {
        match terms.kind(t) {
            TermKind::ArithConst(q) => self.add_const(&(q * coeff)),
            TermKind::ArithPoly(monos) => {
                for (c, pp) in monos {
                    self.add_mono(&(c * coeff), pp);
                }
            }
            TermKind::PowerProduct(pp) => self.add_mono(coeff, pp),
            _ => self.add_mono(coeff, &PowerProduct::var(t)),
        }
    }

    /// Resets the buffer to the polynomial of `t`.
    pub fn set_term(&mut self, terms: &TermTable, t: Term) {
        self.monomials.clear();
        self.add_term(terms, t, &BigRational::one());
    }

    /* Shape recognition */

    /// Recognizes `a * x - a * y` (no constant), the shape of a binary equality between `x` and `y`.
    pub fn binary_equality(&self) -> Option<(PowerProduct, PowerProduct)> {
        if self.monomials.len() != 2 {
            return None;
        }
        let mut it = self.monomials.iter();
        let (p1, c1) = it.next()?;
        let (p2, c2) = it.next()?;
        if p1.is_one() || p2.is_one() {
            return None;
        }
        if (c1 + c2).is_zero() {
            Some((p1.clone(), p2.clone()))
        } else {
            None
        }
    }

    /// The gcd of all coefficients if they are all integers, `None` otherwise or if the buffer is zero.
    pub fn integer_gcd(&self) -> Option<BigInt> {
        let mut gcd: Option<BigInt> = None;
        for c in self.monomials.values() {
            if !c.is_integer() {
                return None;
            }
            let n = c.numer().abs();
            gcd = Some(match gcd {
                Some(g) => g.gcd(&n),
                None => n,
            });
        }
        gcd
    }

    /// Returns true if all coefficients are integers.
    pub fn has_integer_coefficients(&self) -> bool {
        self.monomials.values().all(|c| c.is_integer())
    }

    pub fn to_monomials(&self) -> Vec<(BigRational, PowerProduct)> {
        self.monomials
            .iter()
            .map(|(pp, c)| (c.clone(), pp.clone()))
            .collect()
    }
}
