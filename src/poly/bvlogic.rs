use num_bigint::BigUint;
use num_traits::{One, Zero};

use super::{big_bit, Scratch};
use crate::terms::Term;

/// A bit-vector given bit by bit, least significant bit first.
///
/// Every bit is a Boolean term. The structural operations (shifts, rotations, extraction, concatenation, extension) only move bits around.
/// Bitwise connectives need the term manager and are implemented there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BvLogicBuffer {
    bits: Vec<Term>,
}

impl Scratch for BvLogicBuffer {
    fn reset(&mut self) {
        self.bits.clear();
    }
}

fn const_bit(b: bool) -> Term {
    if b {
        Term::TRUE
    } else {
        Term::FALSE
    }
}

impl BvLogicBuffer {
    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }

    pub fn bits(&self) -> &[Term] {
        &self.bits
    }

    pub fn bits_mut(&mut self) -> &mut [Term] {
        &mut self.bits
    }

    pub fn set_bits(&mut self, bits: &[Term]) {
        self.bits.clear();
        self.bits.extend_from_slice(bits);
    }

    /// Sets the buffer to the constant `value` of width `width`.
    pub fn set_constant_u64(&mut self, width: u32, value: u64) {
        self.bits.clear();
        self.bits
            .extend((0..width).map(|i| const_bit(i < 64 && (value >> i) & 1 == 1)));
    }

    pub fn set_constant(&mut self, width: u32, value: &BigUint) {
        self.bits.clear();
        self.bits
            .extend((0..width).map(|i| const_bit(big_bit(value, i))));
    }

    /// Returns the value of the buffer if every bit is constant.
    pub fn constant_value(&self) -> Option<BigUint> {
        let mut value = BigUint::zero();
        for (i, b) in self.bits.iter().enumerate() {
            if *b == Term::TRUE {
                value |= BigUint::one() << i;
            } else if *b != Term::FALSE {
                return None;
            }
        }
        Some(value)
    }

    pub fn is_constant(&self) -> bool {
        self.bits.iter().all(|b| b.index() == Term::TRUE.index())
    }

    /* Shifts and rotations; amounts are at most the width */

    /// Shift left, padding with `false`
    pub fn shift_left0(&mut self, k: u32) {
        self.shift_left(k, Term::FALSE)
    }

    /// Shift left, padding with `true`
    pub fn shift_left1(&mut self, k: u32) {
        self.shift_left(k, Term::TRUE)
    }

    fn shift_left(&mut self, k: u32, pad: Term) {
        let n = self.bits.len();
        let k = (k as usize).min(n);
        self.bits.truncate(n - k);
        self.bits.splice(0..0, std::iter::repeat(pad).take(k));
    }

    /// Logical shift right, padding with `false`
    pub fn shift_right0(&mut self, k: u32) {
        self.shift_right(k, Term::FALSE)
    }

    /// Shift right, padding with `true`
    pub fn shift_right1(&mut self, k: u32) {
        self.shift_right(k, Term::TRUE)
    }

    /// Arithmetic shift right, copying the sign bit
    pub fn ashift_right(&mut self, k: u32) {
        if let Some(sign) = self.bits.last().copied() {
            self.shift_right(k, sign)
        }
    }

    fn shift_right(&mut self, k: u32, pad: Term) {
        let n = self.bits.len();
        let k = (k as usize).min(n);
        self.bits.drain(0..k);
        self.bits.extend(std::iter::repeat(pad).take(k));
    }

    pub fn rotate_left(&mut self, k: u32) {
        let n = self.bits.len();
        if n > 0 {
            self.bits.rotate_right(k as usize % n);
        }
    }

    pub fn rotate_right(&mut self, k: u32) {
        let n = self.bits.len();
        if n > 0 {
            self.bits.rotate_left(k as usize % n);
        }
    }

    /* Restructuring */

    /// Keeps bits `low` to `high` (both included).
    pub fn extract(&mut self, low: u32, high: u32) {
        debug_assert!(low <= high && (high as usize) < self.bits.len());
        self.bits.truncate(high as usize + 1);
        self.bits.drain(0..low as usize);
    }

    /// Appends `high` as the most significant part.
    pub fn concat_high(&mut self, high: &[Term]) {
        self.bits.extend_from_slice(high);
    }

    /// Concatenates `n` copies of the buffer.
    pub fn repeat(&mut self, n: u32) {
        debug_assert!(n >= 1);
        let copy = self.bits.clone();
        for _ in 1..n {
            self.bits.extend_from_slice(&copy);
        }
    }

    /// Adds `n` copies of the sign bit on the left.
    pub fn sign_extend(&mut self, n: u32) {
        if let Some(sign) = self.bits.last().copied() {
            self.bits.extend(std::iter::repeat(sign).take(n as usize));
        }
    }

    /// Adds `n` zeros on the left.
    pub fn zero_extend(&mut self, n: u32) {
        self.bits
            .extend(std::iter::repeat(Term::FALSE).take(n as usize));
    }
}
