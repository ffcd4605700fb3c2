use std::collections::BTreeMap;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::Scratch;
use crate::terms::{PowerProduct, Term, TermKind, TermTable};

/// `2^width`
pub(crate) fn modulus(width: u32) -> BigUint {
    BigUint::one() << width as usize
}

/// Reduces `x` modulo `2^width`.
pub(crate) fn normalize(x: &BigUint, width: u32) -> BigUint {
    x % modulus(width)
}

/// `-x` modulo `2^width`
pub(crate) fn negate(x: &BigUint, width: u32) -> BigUint {
    let m = modulus(width);
    let x = x % &m;
    if x.is_zero() {
        x
    } else {
        m - x
    }
}

/// A bit-vector polynomial of arbitrary width under construction.
/// Coefficients are reduced modulo `2^width` and never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BvArithBuffer {
    width: u32,
    monomials: BTreeMap<PowerProduct, BigUint>,
}

impl Scratch for BvArithBuffer {
    fn reset(&mut self) {
        self.monomials.clear();
    }
}

impl BvArithBuffer {
    pub fn prepare(&mut self, width: u32) {
        debug_assert!(width >= 1);
        self.width = width;
        self.monomials.clear();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn is_zero(&self) -> bool {
        self.monomials.is_empty()
    }

    pub fn len(&self) -> usize {
        self.monomials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomials.is_empty()
    }

    pub fn constant(&self) -> Option<BigUint> {
        match self.monomials.len() {
            0 => Some(BigUint::zero()),
            1 => self.monomials.get(&PowerProduct::one()).cloned(),
            _ => None,
        }
    }

    pub fn monomials(&self) -> impl Iterator<Item = (&PowerProduct, &BigUint)> {
        self.monomials.iter()
    }

    pub fn degree(&self) -> u64 {
        self.monomials.keys().map(|pp| pp.degree()).max().unwrap_or(0)
    }

    pub fn add_mono(&mut self, coeff: &BigUint, pp: &PowerProduct) {
        let coeff = normalize(coeff, self.width);
        if coeff.is_zero() {
            return;
        }
        let width = self.width;
        let entry = self
            .monomials
            .entry(pp.clone())
            .or_insert_with(BigUint::zero);
        *entry = normalize(&(&*entry + coeff), width);
        if entry.is_zero() {
            self.monomials.remove(pp);
        }
    }

    pub fn add_const(&mut self, c: &BigUint) {
        self.add_mono(c, &PowerProduct::one());
    }

    pub fn add_scaled_buffer(&mut self, other: &BvArithBuffer, coeff: &BigUint) {
        debug_assert_eq!(self.width, other.width);
        for (pp, c) in other.monomials.iter() {
            self.add_mono(&(c * coeff), pp);
        }
    }

    pub fn add_buffer(&mut self, other: &BvArithBuffer) {
        self.add_scaled_buffer(other, &BigUint::one());
    }

    pub fn sub_buffer(&mut self, other: &BvArithBuffer) {
        let minus_one = negate(&BigUint::one(), self.width);
        self.add_scaled_buffer(other, &minus_one);
    }

    pub fn negate(&mut self) {
        let width = self.width;
        for c in self.monomials.values_mut() {
            *c = negate(c, width);
        }
    }

    pub fn mul_const(&mut self, k: &BigUint) {
        let old = std::mem::take(&mut self.monomials);
        for (pp, c) in old {
            self.add_mono(&(c * k), &pp);
        }
    }

    pub fn mul_buffer(&mut self, other: &BvArithBuffer) {
        debug_assert_eq!(self.width, other.width);
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

    pub fn add_term(&mut self, terms: &TermTable, t: Term, coeff: &BigUint) {
        match terms.kind(t) {
            TermKind::BvConst { value, .. } => self.add_const(&(value * coeff)),
            TermKind::BvPoly { monomials, .. } => {
                for (c, pp) in monomials {
                    self.add_mono(&(c * coeff), pp);
                }
            }
            TermKind::PowerProduct(pp) => self.add_mono(coeff, pp),
            _ => self.add_mono(coeff, &PowerProduct::var(t)),
        }
    }

    pub fn set_term(&mut self, terms: &TermTable, t: Term) {
        self.monomials.clear();
        self.add_term(terms, t, &BigUint::one());
    }

    pub fn to_monomials(&self) -> Vec<(BigUint, PowerProduct)> {
        self.monomials
            .iter()
            .map(|(pp, c)| (c.clone(), pp.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negate() {
        assert_eq!(negate(&BigUint::one(), 70), modulus(70) - BigUint::one());
        assert_eq!(negate(&BigUint::zero(), 70), BigUint::zero());
    }

    #[test]
    fn test_wide_wraparound() {
        let mut b = BvArithBuffer::default();
        b.prepare(100);
        let max = modulus(100) - BigUint::one();
        b.add_const(&max);
        b.add_const(&BigUint::from(5u32));
        assert_eq!(b.constant(), Some(BigUint::from(4u32)));
    }

    #[test]
    fn test_sub_self_is_zero() {
        let mut b = BvArithBuffer::default();
        b.prepare(80);
        b.add_const(&BigUint::from(12345u32));
        let copy = b.clone();
        b.sub_buffer(&copy);
        assert!(b.is_zero());
    }
}
