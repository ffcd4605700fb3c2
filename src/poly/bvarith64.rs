use std::collections::BTreeMap;

use super::Scratch;
use crate::terms::{PowerProduct, Term, TermKind, TermTable};

/// Mask for the low `width` bits
pub(crate) fn mask64(width: u32) -> u64 {
    debug_assert!(width >= 1 && width <= 64);
    if width == 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// A bit-vector polynomial of width at most 64 under construction.
/// Coefficients are reduced modulo `2^width` and never zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BvArith64Buffer {
    width: u32,
    monomials: BTreeMap<PowerProduct, u64>,
}

impl Scratch for BvArith64Buffer {
    fn reset(&mut self) {
        self.monomials.clear();
    }
}

impl BvArith64Buffer {
    /// Clears the buffer and sets its width.
    pub fn prepare(&mut self, width: u32) {
        debug_assert!(width >= 1 && width <= 64);
        self.width = width;
        self.monomials.clear();
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    fn mask(&self) -> u64 {
        mask64(self.width)
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

    pub fn constant(&self) -> Option<u64> {
        match self.monomials.len() {
            0 => Some(0),
            1 => self.monomials.get(&PowerProduct::one()).copied(),
            _ => None,
        }
    }

    pub fn monomials(&self) -> impl Iterator<Item = (&PowerProduct, &u64)> {
        self.monomials.iter()
    }

    pub fn degree(&self) -> u64 {
        self.monomials.keys().map(|pp| pp.degree()).max().unwrap_or(0)
    }

    pub fn add_mono(&mut self, coeff: u64, pp: &PowerProduct) {
        let mask = self.mask();
        let coeff = coeff & mask;
        if coeff == 0 {
            return;
        }
        let entry = self.monomials.entry(pp.clone()).or_insert(0);
        *entry = entry.wrapping_add(coeff) & mask;
        if *entry == 0 {
            self.monomials.remove(pp);
        }
    }

    pub fn add_const(&mut self, c: u64) {
        self.add_mono(c, &PowerProduct::one());
    }

    pub fn add_scaled_buffer(&mut self, other: &BvArith64Buffer, coeff: u64) {
        debug_assert_eq!(self.width, other.width);
        for (pp, c) in other.monomials.iter() {
            self.add_mono(c.wrapping_mul(coeff), pp);
        }
    }

    pub fn add_buffer(&mut self, other: &BvArith64Buffer) {
        self.add_scaled_buffer(other, 1);
    }

    pub fn sub_buffer(&mut self, other: &BvArith64Buffer) {
        self.add_scaled_buffer(other, u64::MAX);
    }

    pub fn negate(&mut self) {
        let mask = self.mask();
        for c in self.monomials.values_mut() {
            *c = c.wrapping_neg() & mask;
        }
    }

    pub fn mul_const(&mut self, k: u64) {
        let old = std::mem::take(&mut self.monomials);
        for (pp, c) in old {
            self.add_mono(c.wrapping_mul(k), &pp);
        }
    }

    pub fn mul_buffer(&mut self, other: &BvArith64Buffer) {
        debug_assert_eq!(self.width, other.width);
        let old = std::mem::take(&mut self.monomials);
        for (p1, c1) in old.iter() {
            for (p2, c2) in other.monomials.iter() {
                self.add_mono(c1.wrapping_mul(*c2), &p1.mul(p2));
            }
        }
    }

    pub fn square(&mut self) {
        let copy = self.clone();
        self.mul_buffer(&copy);
    }

    /// Adds `coeff * t` where `t` is a bit-vector term of the buffer's width.
    pub fn add_term(&mut self, terms: &TermTable, t: Term, coeff: u64) {
        match terms.kind(t) {
            TermKind::BvConst64 { value, .. } => self.add_const(value.wrapping_mul(coeff)),
            TermKind::BvPoly64 { monomials, .. } => {
                for (c, pp) in monomials {
                    self.add_mono(c.wrapping_mul(coeff), pp);
                }
            }
            TermKind::PowerProduct(pp) => self.add_mono(coeff, pp),
            _ => self.add_mono(coeff, &PowerProduct::var(t)),
        }
    }

    pub fn set_term(&mut self, terms: &TermTable, t: Term) {
        self.monomials.clear();
        self.add_term(terms, t, 1);
    }

    pub fn to_monomials(&self) -> Vec<(u64, PowerProduct)> {
        self.monomials
            .iter()
            .map(|(pp, c)| (*c, pp.clone()))
            .collect()
    }
}
